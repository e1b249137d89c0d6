use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::slug::asciify;

pub const NON_LETTER_BUCKET: &str = "#";

/// Alphabetical navigation over a slugged dataset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterIndex {
    pub total_count: usize,
    #[serde(rename = "slugMap")]
    pub by_identifier: HashMap<String, String>,
    pub slug_to_identifier: HashMap<String, String>,
    #[serde(rename = "letterIndex")]
    pub by_first_letter: BTreeMap<String, Vec<String>>,
}

impl LetterIndex {
    pub fn letters(&self) -> Vec<&str> {
        self.by_first_letter.keys().map(|k| k.as_str()).collect()
    }

    pub fn slugs_for(&self, letter: &str) -> &[String] {
        self.by_first_letter
            .get(&letter.to_uppercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn slug_for(&self, identifier: &str) -> Option<&str> {
        self.by_identifier.get(identifier).map(|s| s.as_str())
    }

    pub fn identifier_for(&self, slug: &str) -> Option<&str> {
        self.slug_to_identifier.get(slug).map(|s| s.as_str())
    }
}

/// The bucket for a slug: "h1-ab" with id "H1" → "A", "h5" → "#".
pub fn display_letter(identifier: &str, slug: &str) -> String {
    let prefix = format!("{}-", identifier.to_lowercase());

    let segment = match slug.strip_prefix(&prefix) {
        Some(rest) => rest,
        None if slug.eq_ignore_ascii_case(identifier) => return NON_LETTER_BUCKET.to_string(),
        None => slug,
    };

    match segment.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase().to_string(),
        _ => NON_LETTER_BUCKET.to_string(),
    }
}

/// The bucket for a plain title: "FAITH" → "F", "Ēden" → "E", "144,000" → "#".
pub fn title_letter(title: &str) -> String {
    match asciify(title).chars().next() {
        Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase().to_string(),
        _ => NON_LETTER_BUCKET.to_string(),
    }
}

/// Build the index from (identifier, slug) pairs of a lexicon, where the slug
/// carries the identifier as its prefix.
pub fn build_index<'a, I>(entries: I) -> LetterIndex
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    build_index_with(entries.into_iter().map(|(id, slug)| (id, slug, display_letter(id, slug))))
}

/// Build the index from (identifier, slug, title) triples, bucketed by title.
pub fn build_title_index<'a, I>(entries: I) -> LetterIndex
where
    I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
{
    build_index_with(entries.into_iter().map(|(id, slug, title)| (id, slug, title_letter(title))))
}

fn build_index_with<'a, I>(entries: I) -> LetterIndex
where
    I: IntoIterator<Item = (&'a str, &'a str, String)>,
{
    let mut index = LetterIndex::default();

    for (identifier, slug, letter) in entries {
        index.total_count += 1;
        index.by_identifier.insert(identifier.to_string(), slug.to_string());
        index.slug_to_identifier.insert(slug.to_string(), identifier.to_string());
        index.by_first_letter.entry(letter).or_default().push(slug.to_string());
    }

    for bucket in index.by_first_letter.values_mut() {
        bucket.sort();
    }

    index
}
