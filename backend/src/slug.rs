//! URL slugs for dictionary entries and topics.
//!
//! Lexicon slugs are `{id}-{first transliteration word}`, e.g. "H1" + "ʼâb" → "h1-ab".
//! Characters that canonical decomposition leaves behind are resolved through
//! [`SLUG_SUBSTITUTIONS`], which is plain data and can be extended without
//! touching [`generate_slug`].

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Replacements applied after NFD and combining-mark removal.
/// An empty replacement deletes the character.
pub const SLUG_SUBSTITUTIONS: &[(char, &str)] = &[
    // Semitic consonant markers: aleph and ayin
    ('\u{02BC}', ""), // ʼ
    ('\u{02BB}', ""), // ʻ
    ('\u{02BE}', ""), // ʾ
    ('\u{02BF}', ""), // ʿ
    ('\u{2018}', ""), // ‘
    ('\u{2019}', ""), // ’
    ('\'', ""),
    ('\u{201C}', ""), // “
    ('\u{201D}', ""), // ”
    // Superscript and subscript vowels (reduced vowels in Hebrew transliteration)
    ('\u{1D43}', ""), // ᵃ
    ('\u{1D49}', ""), // ᵉ
    ('\u{1D4A}', ""), // ᵊ
    ('\u{1D52}', ""), // ᵒ
    ('\u{1D58}', ""), // ᵘ
    ('\u{1D62}', ""), // ᵢ
    // Latin letters without a canonical decomposition
    ('\u{0131}', "i"),  // ı
    ('\u{0111}', "d"),  // đ
    ('\u{0127}', "h"),  // ħ
    ('\u{0142}', "l"),  // ł
    ('\u{00F8}', "o"),  // ø
    ('\u{00E6}', "ae"), // æ
    ('\u{0153}', "oe"), // œ
    ('\u{00DF}', "ss"), // ß
    ('\u{0259}', "e"),  // ə
    // Greek letters appearing in transliterations
    ('\u{03B1}', "a"),  // α
    ('\u{03B2}', "b"),  // β
    ('\u{03B3}', "g"),  // γ
    ('\u{03B4}', "d"),  // δ
    ('\u{03B5}', "e"),  // ε
    ('\u{03B6}', "z"),  // ζ
    ('\u{03B7}', "e"),  // η
    ('\u{03B8}', "th"), // θ
    ('\u{03B9}', "i"),  // ι
    ('\u{03BA}', "k"),  // κ
    ('\u{03BB}', "l"),  // λ
    ('\u{03BC}', "m"),  // μ
    ('\u{03BD}', "n"),  // ν
    ('\u{03BE}', "x"),  // ξ
    ('\u{03BF}', "o"),  // ο
    ('\u{03C0}', "p"),  // π
    ('\u{03C1}', "r"),  // ρ
    ('\u{03C2}', "s"),  // ς
    ('\u{03C3}', "s"),  // σ
    ('\u{03C4}', "t"),  // τ
    ('\u{03C5}', "u"),  // υ
    ('\u{03C6}', "ph"), // φ
    ('\u{03C7}', "ch"), // χ
    ('\u{03C8}', "ps"), // ψ
    ('\u{03C9}', "o"),  // ω
];

lazy_static! {
    static ref SUBSTITUTIONS: HashMap<char, &'static str> =
        SLUG_SUBSTITUTIONS.iter().copied().collect();

    static ref RE_TOKEN_SEPARATORS: Regex = Regex::new(r"[\s,;()/]+").unwrap();
    static ref RE_NON_SLUG: Regex = Regex::new(r"[^a-z0-9-]").unwrap();
    static ref RE_NON_ALNUM_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    static ref RE_DASHES: Regex = Regex::new(r"-+").unwrap();
}

/// Reduce text to ASCII slug characters: NFD, strip marks, apply the substitution
/// table, drop anything outside `[a-z0-9-]`, collapse and trim hyphens.
pub fn asciify(text: &str) -> String {
    let lower = text.to_lowercase();

    let mut out = String::with_capacity(lower.len());
    for c in lower.nfd().filter(|c| !is_combining_mark(*c)) {
        match SUBSTITUTIONS.get(&c) {
            Some(rep) => out.push_str(rep),
            None => out.push(c),
        }
    }

    let out: String = out.chars().filter(|c| c.is_ascii()).collect();
    let out = RE_NON_SLUG.replace_all(&out, "");
    let out = RE_DASHES.replace_all(&out, "-");
    out.trim_matches('-').to_string()
}

/// Slug for a lexicon entry. Falls back to the lowercased id when the
/// transliteration is empty or reduces to nothing.
pub fn generate_slug(id: &str, transliteration: &str) -> String {
    let id_part = id.trim().to_lowercase();

    let first_word = RE_TOKEN_SEPARATORS
        .split(transliteration.trim())
        .find(|w| !w.is_empty())
        .unwrap_or("");

    let word = asciify(first_word);

    match (id_part.is_empty(), word.is_empty()) {
        (false, false) => format!("{}-{}", id_part, word),
        (false, true) => id_part,
        (true, false) => word,
        (true, true) => String::new(),
    }
}

/// Slug for a plain label: "Love & Mercy" → "love-and-mercy", "God's Word" → "gods-word".
pub fn slugify(label: &str) -> String {
    let s = label.to_lowercase()
        .replace(['\'', '\u{2019}', '\u{2018}'], "")
        .replace('&', " and ");
    let s: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let s = RE_NON_ALNUM_RUN.replace_all(&s, "-");
    s.trim_matches('-').to_string()
}

/// Hands out unique slugs in call order. The first request for a base slug
/// receives it unchanged; later requests get `-2`, `-3`, ... Suffixed candidates
/// already taken by some other base are skipped.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    counts: HashMap<String, u32>,
    taken: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "entry" } else { base };

        let count = self.counts.entry(base.to_string()).or_insert(0);
        *count += 1;

        if *count == 1 && !self.taken.contains(base) {
            self.taken.insert(base.to_string());
            return base.to_string();
        }

        let mut n = (*count).max(2);
        loop {
            let candidate = format!("{}-{}", base, n);
            if !self.taken.contains(&candidate) {
                *count = n;
                self.taken.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }

    pub fn is_taken(&self, slug: &str) -> bool {
        self.taken.contains(slug)
    }
}

/// Natural ordering of identifiers: "H2" < "H10" < "H10a".
pub fn compare_identifiers(a: &str, b: &str) -> Ordering {
    fn split(s: &str) -> (&str, Option<u64>, &str) {
        let start = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let rest = &s[start..];
        let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        (&s[..start], rest[..end].parse().ok(), &rest[end..])
    }

    let (pa, na, ra) = split(a);
    let (pb, nb, rb) = split(b);

    pa.cmp(pb)
        .then_with(|| match (na, nb) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| ra.cmp(rb))
        .then_with(|| a.cmp(b))
}

/// Assign slugs to a whole batch. Entries are visited in ascending identifier
/// order regardless of input order, so the collision suffixes are reproducible.
/// Returns one slug per input item, aligned with the input.
pub fn assign_slugs<T, I, B>(items: &[T], id_of: I, base_of: B) -> Vec<String>
where
    I: Fn(&T) -> &str,
    B: Fn(&T) -> String,
{
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&x, &y| compare_identifiers(id_of(&items[x]), id_of(&items[y])).then(x.cmp(&y)));

    let mut allocator = SlugAllocator::new();
    let mut slugs = vec![String::new(); items.len()];
    for idx in order {
        let base = base_of(&items[idx]);
        slugs[idx] = allocator.allocate(&base);
    }
    slugs
}
