//! Strong's Hebrew and Greek dictionaries.
//!
//! The raw files are JavaScript modules of the form
//! `var strongsHebrewDictionary = {"H1": {...}, ...}; module.exports = ...;`.
//! The object literal is located by brace matching and parsed as JSON.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::letter_index::{build_index, LetterIndex};
use crate::logger::info;
use crate::slug::{assign_slugs, compare_identifiers, generate_slug};
use crate::types::{CatalogError, DictionaryEntry, Language};

pub const RELATED_LIMIT: usize = 12;

lazy_static! {
    static ref RE_HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref RE_BRACE_WRAPPED: Regex = Regex::new(r"^\{(.+)\}$").unwrap();
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_HEBREW_NUMBER: Regex = Regex::new(r"H(\d+)").unwrap();
    static ref RE_GREEK_NUMBER: Regex = Regex::new(r"G(\d+)").unwrap();
    static ref RE_ASSIGNMENT: Regex = Regex::new(r"(?:var|let|const)\s+([A-Za-z_$][\w$]*)\s*=\s*").unwrap();

    static ref RE_IDIOM: Regex = Regex::new(r"\[idiom\]\s*").unwrap();
    static ref RE_COMPARE: Regex = Regex::new(r"(?i)\[?Compare.*$").unwrap();
    static ref RE_PLUS: Regex = Regex::new(r"\(?\+\)?").unwrap();
    static ref RE_TRAILING_PERIOD: Regex = Regex::new(r"\.\s*$").unwrap();
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEntry {
    lemma: Option<String>,
    xlit: Option<String>,
    translit: Option<String>,
    pron: Option<String>,
    derivation: Option<String>,
    strongs_def: Option<String>,
    kjv_def: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongsEntry {
    /// "H1", "G26"
    pub number: String,
    pub lemma: String,
    pub transliteration: String,
    pub pronunciation: String,
    pub derivation: String,
    pub definition: String,
    pub kjv_translations: String,
    pub slug: String,
}

impl StrongsEntry {
    pub fn to_entry(&self) -> DictionaryEntry {
        let mut fields = IndexMap::new();
        fields.insert("lemma".to_string(), self.lemma.clone());
        fields.insert("transliteration".to_string(), self.transliteration.clone());
        fields.insert("pronunciation".to_string(), self.pronunciation.clone());
        fields.insert("derivation".to_string(), self.derivation.clone());
        fields.insert("definition".to_string(), self.definition.clone());
        fields.insert("kjvTranslations".to_string(), self.kjv_translations.clone());

        let title = if self.transliteration.is_empty() { &self.lemma } else { &self.transliteration };

        DictionaryEntry {
            id: self.number.clone(),
            title: title.clone(),
            slug: self.slug.clone(),
            fields,
            source_reference: None,
        }
    }
}

/// Strip HTML tags, decode entities, unwrap a `{...}` wrapper and collapse whitespace.
pub fn clean_field(s: &str) -> String {
    let s = RE_HTML_TAG.replace_all(s, "");
    let s = html_escape::decode_html_entities(&s).to_string();
    let inner = RE_BRACE_WRAPPED
        .captures(&s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    let s = inner.unwrap_or(s);
    RE_WHITESPACE.replace_all(&s, " ").trim().to_string()
}

/// The object literal assigned to `variable`, e.g. `var strongsGreekDictionary = {...}`.
/// String contents and escapes are skipped while matching braces.
pub fn extract_payload<'a>(text: &'a str, variable: &str, dataset: &str, path: &Path) -> Result<&'a str, CatalogError> {
    let Some(assignment) = RE_ASSIGNMENT
        .captures_iter(text)
        .find(|caps| &caps[1] == variable)
        .and_then(|caps| caps.get(0))
    else {
        return Err(CatalogError::MissingPayload {
            path: path.to_path_buf(),
            variable: variable.to_string(),
        });
    };

    let corrupt = |message: &str| CatalogError::CorruptSource {
        dataset: dataset.to_string(),
        message: format!("{}: {}", path.display(), message),
    };

    let start = assignment.end();
    if !text[start..].starts_with('{') {
        return Err(corrupt("assignment is not an object literal"));
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Err(corrupt("unbalanced braces in object literal"))
}

/// "h1", "H1", "1", "H0001" → "H1"
pub fn normalize_number(language: Language, number: &str) -> String {
    let upper = number.trim().to_uppercase();
    let rest = upper.strip_prefix(language.prefix()).unwrap_or(upper.as_str());
    match rest.parse::<u32>() {
        Ok(n) => format!("{}{}", language.prefix(), n),
        Err(_) => format!("{}{}", language.prefix(), rest),
    }
}

fn number_value(number: &str) -> Option<u32> {
    number.trim_start_matches(|c: char| c.is_ascii_alphabetic()).parse().ok()
}

/// Split a KJV translation list into individual renderings.
/// "chief, (fore-) father(-less), [idiom] patrimony, principal." →
/// ["chief", "(fore-) father(-less)", "patrimony", "principal"]
pub fn parse_kjv_translations(kjv: &str) -> Vec<String> {
    let kjv = kjv.trim();
    let kjv = kjv.strip_suffix('.').unwrap_or(kjv);

    kjv.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            let t = RE_IDIOM.replace_all(t, "");
            let t = RE_COMPARE.replace(&t, "");
            let t = RE_PLUS.replace_all(&t, "");
            let t = t.replace("--", "");
            RE_TRAILING_PERIOD.replace(&t, "").trim().to_string()
        })
        .filter(|t| !t.is_empty() && !t.starts_with("Compare"))
        .collect()
}

/// One language's dictionary with its lookups.
#[derive(Debug, Clone)]
pub struct Lexicon {
    language: Language,
    entries: Vec<StrongsEntry>,
    by_slug: HashMap<String, usize>,
    by_number: HashMap<String, usize>,
    /// entry index → indexes of entries whose derivation cites it
    cited_by: HashMap<usize, Vec<usize>>,
    index: LetterIndex,
}

impl Lexicon {
    pub fn empty(language: Language) -> Self {
        Lexicon::new(language, Vec::new())
    }

    /// Build lookups over entries already sorted by number and slugged.
    pub fn new(language: Language, entries: Vec<StrongsEntry>) -> Self {
        let by_slug = entries.iter().enumerate().map(|(i, e)| (e.slug.clone(), i)).collect();
        let by_number: HashMap<String, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (normalize_number(language, &e.number), i))
            .collect();

        let re = Lexicon::number_regex(language);
        let mut cited_by: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, e) in entries.iter().enumerate() {
            let mut seen = HashSet::new();
            for caps in re.captures_iter(&e.derivation) {
                let cited = format!("{}{}", language.prefix(), &caps[1]);
                match by_number.get(&normalize_number(language, &cited)) {
                    Some(&target) if target != i && seen.insert(target) => {
                        cited_by.entry(target).or_default().push(i);
                    }
                    _ => {}
                }
            }
        }

        let index = build_index(entries.iter().map(|e| (e.number.as_str(), e.slug.as_str())));

        Lexicon { language, entries, by_slug, by_number, cited_by, index }
    }

    fn number_regex(language: Language) -> &'static Regex {
        match language {
            Language::Hebrew => &*RE_HEBREW_NUMBER,
            Language::Greek => &*RE_GREEK_NUMBER,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn all(&self) -> &[StrongsEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_slug(&self, slug: &str) -> Option<&StrongsEntry> {
        self.by_slug.get(slug).map(|&i| &self.entries[i])
    }

    /// Accepts "H1", "h1" and "1".
    pub fn by_number(&self, number: &str) -> Option<&StrongsEntry> {
        self.by_number
            .get(&normalize_number(self.language, number))
            .map(|&i| &self.entries[i])
    }

    pub fn letter_index(&self) -> &LetterIndex {
        &self.index
    }

    /// Previous and next entries by number.
    pub fn neighbors(&self, entry: &StrongsEntry) -> (Option<&StrongsEntry>, Option<&StrongsEntry>) {
        let Some(n) = number_value(&entry.number) else {
            return (None, None);
        };
        let prev = if n > 1 { self.by_number(&(n - 1).to_string()) } else { None };
        let next = self.by_number(&(n + 1).to_string());
        (prev, next)
    }

    /// Entries cited in this entry's derivation and KJV text, then entries whose
    /// derivation cites this one. At most [`RELATED_LIMIT`].
    pub fn related(&self, entry: &StrongsEntry) -> Vec<&StrongsEntry> {
        let mut related: Vec<&StrongsEntry> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(normalize_number(self.language, &entry.number));

        let re = Lexicon::number_regex(self.language);
        for text in [&entry.derivation, &entry.kjv_translations] {
            for caps in re.captures_iter(text) {
                let cited = normalize_number(self.language, &caps[1]);
                if seen.contains(&cited) {
                    continue;
                }
                if let Some(e) = self.by_number(&cited) {
                    seen.insert(cited);
                    related.push(e);
                }
            }
        }

        let own_idx = self.by_number.get(&normalize_number(self.language, &entry.number));
        let citing = own_idx.and_then(|i| self.cited_by.get(i)).into_iter().flatten();
        for &i in citing {
            let e = &self.entries[i];
            if seen.insert(normalize_number(self.language, &e.number)) {
                related.push(e);
            }
        }

        // Entries that name this lemma in their derivation, "(ʼâb)".
        if !entry.lemma.is_empty() {
            let marker = format!("({})", entry.lemma);
            for e in &self.entries {
                if related.len() >= RELATED_LIMIT {
                    break;
                }
                if e.derivation.contains(&marker) && seen.insert(normalize_number(self.language, &e.number)) {
                    related.push(e);
                }
            }
        }

        related.truncate(RELATED_LIMIT);
        related
    }
}

/// Parse a raw dictionary module into a slugged, number-ordered lexicon.
pub fn parse_lexicon(text: &str, variable: &str, language: Language, path: &Path) -> Result<Lexicon, CatalogError> {
    let dataset = format!("strongs-{}", language.as_str());
    let payload = extract_payload(text, variable, &dataset, path)?;

    let raw: IndexMap<String, RawEntry> = serde_json::from_str(payload).map_err(|e| CatalogError::CorruptSource {
        dataset,
        message: e.to_string(),
    })?;

    let mut entries: Vec<StrongsEntry> = raw
        .into_iter()
        .map(|(number, r)| {
            // Hebrew uses xlit, Greek uses translit
            let transliteration = match language {
                Language::Hebrew => r.xlit.or(r.translit),
                Language::Greek => r.translit.or(r.xlit),
            };
            StrongsEntry {
                number: number.trim().to_string(),
                lemma: r.lemma.unwrap_or_default().trim().to_string(),
                transliteration: clean_field(&transliteration.unwrap_or_default()),
                pronunciation: clean_field(&r.pron.unwrap_or_default()),
                derivation: clean_field(&r.derivation.unwrap_or_default()),
                definition: clean_field(&r.strongs_def.unwrap_or_default()),
                kjv_translations: clean_field(&r.kjv_def.unwrap_or_default()),
                slug: String::new(),
            }
        })
        .collect();

    entries.sort_by(|a, b| compare_identifiers(&a.number, &b.number));

    let slugs = assign_slugs(&entries, |e| e.number.as_str(), |e| generate_slug(&e.number, &e.transliteration));
    for (e, slug) in entries.iter_mut().zip(slugs) {
        e.slug = slug;
    }

    info(&format!("Parsed {} Strong's {} entries", entries.len(), language.as_str()));
    Ok(Lexicon::new(language, entries))
}
