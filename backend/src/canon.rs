//! The 66-book Protestant canon.
//!
//! Every book-related normalization goes through [`BOOKS`]: external USX codes,
//! the alternate abbreviations used by the SWORD topical-dictionary export,
//! display names and URL slugs all resolve to the same [`CanonicalBook`].

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Testament {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
}

impl Testament {
    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Old => "OT",
            Testament::New => "NT",
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalBook {
    /// USX book code, e.g. "GEN", "1SA"
    pub code: &'static str,
    pub display_name: &'static str,
    pub url_slug: &'static str,
    /// Position in the canon, 1..=66
    pub order: u8,
    pub testament: Testament,
}

macro_rules! book {
    ($code:expr, $name:expr, $slug:expr, $order:expr, $t:ident) => {
        CanonicalBook {
            code: $code,
            display_name: $name,
            url_slug: $slug,
            order: $order,
            testament: Testament::$t,
        }
    };
}

pub static BOOKS: [CanonicalBook; 66] = [
    book!("GEN", "Genesis", "genesis", 1, Old),
    book!("EXO", "Exodus", "exodus", 2, Old),
    book!("LEV", "Leviticus", "leviticus", 3, Old),
    book!("NUM", "Numbers", "numbers", 4, Old),
    book!("DEU", "Deuteronomy", "deuteronomy", 5, Old),
    book!("JOS", "Joshua", "joshua", 6, Old),
    book!("JDG", "Judges", "judges", 7, Old),
    book!("RUT", "Ruth", "ruth", 8, Old),
    book!("1SA", "1 Samuel", "1-samuel", 9, Old),
    book!("2SA", "2 Samuel", "2-samuel", 10, Old),
    book!("1KI", "1 Kings", "1-kings", 11, Old),
    book!("2KI", "2 Kings", "2-kings", 12, Old),
    book!("1CH", "1 Chronicles", "1-chronicles", 13, Old),
    book!("2CH", "2 Chronicles", "2-chronicles", 14, Old),
    book!("EZR", "Ezra", "ezra", 15, Old),
    book!("NEH", "Nehemiah", "nehemiah", 16, Old),
    book!("EST", "Esther", "esther", 17, Old),
    book!("JOB", "Job", "job", 18, Old),
    book!("PSA", "Psalms", "psalms", 19, Old),
    book!("PRO", "Proverbs", "proverbs", 20, Old),
    book!("ECC", "Ecclesiastes", "ecclesiastes", 21, Old),
    book!("SNG", "Song of Solomon", "song-of-solomon", 22, Old),
    book!("ISA", "Isaiah", "isaiah", 23, Old),
    book!("JER", "Jeremiah", "jeremiah", 24, Old),
    book!("LAM", "Lamentations", "lamentations", 25, Old),
    book!("EZK", "Ezekiel", "ezekiel", 26, Old),
    book!("DAN", "Daniel", "daniel", 27, Old),
    book!("HOS", "Hosea", "hosea", 28, Old),
    book!("JOL", "Joel", "joel", 29, Old),
    book!("AMO", "Amos", "amos", 30, Old),
    book!("OBA", "Obadiah", "obadiah", 31, Old),
    book!("JON", "Jonah", "jonah", 32, Old),
    book!("MIC", "Micah", "micah", 33, Old),
    book!("NAM", "Nahum", "nahum", 34, Old),
    book!("HAB", "Habakkuk", "habakkuk", 35, Old),
    book!("ZEP", "Zephaniah", "zephaniah", 36, Old),
    book!("HAG", "Haggai", "haggai", 37, Old),
    book!("ZEC", "Zechariah", "zechariah", 38, Old),
    book!("MAL", "Malachi", "malachi", 39, Old),
    book!("MAT", "Matthew", "matthew", 40, New),
    book!("MRK", "Mark", "mark", 41, New),
    book!("LUK", "Luke", "luke", 42, New),
    book!("JHN", "John", "john", 43, New),
    book!("ACT", "Acts", "acts", 44, New),
    book!("ROM", "Romans", "romans", 45, New),
    book!("1CO", "1 Corinthians", "1-corinthians", 46, New),
    book!("2CO", "2 Corinthians", "2-corinthians", 47, New),
    book!("GAL", "Galatians", "galatians", 48, New),
    book!("EPH", "Ephesians", "ephesians", 49, New),
    book!("PHP", "Philippians", "philippians", 50, New),
    book!("COL", "Colossians", "colossians", 51, New),
    book!("1TH", "1 Thessalonians", "1-thessalonians", 52, New),
    book!("2TH", "2 Thessalonians", "2-thessalonians", 53, New),
    book!("1TI", "1 Timothy", "1-timothy", 54, New),
    book!("2TI", "2 Timothy", "2-timothy", 55, New),
    book!("TIT", "Titus", "titus", 56, New),
    book!("PHM", "Philemon", "philemon", 57, New),
    book!("HEB", "Hebrews", "hebrews", 58, New),
    book!("JAS", "James", "james", 59, New),
    book!("1PE", "1 Peter", "1-peter", 60, New),
    book!("2PE", "2 Peter", "2-peter", 61, New),
    book!("1JN", "1 John", "1-john", 62, New),
    book!("2JN", "2 John", "2-john", 63, New),
    book!("3JN", "3 John", "3-john", 64, New),
    book!("JUD", "Jude", "jude", 65, New),
    book!("REV", "Revelation", "revelation", 66, New),
];

/// Alternate external codes, matched exactly like the primary codes.
/// Most come from the SWORD export of Nave's Topical Bible.
const CODE_ALIASES: &[(&str, &str)] = &[
    ("NAH", "NAM"),
    ("SOL", "SNG"),
    ("So", "SNG"),
    ("EZE", "EZK"),
    ("JOE", "JOL"),
    ("MAR", "MRK"),
    ("JOH", "JHN"),
    ("JAM", "JAS"),
    ("1JO", "1JN"),
    ("2JO", "2JN"),
    ("3JO", "3JN"),
    ("JDE", "JUD"),
    ("Jude", "JUD"),
];

/// Alternate display names, matched case-insensitively.
const NAME_ALIASES: &[(&str, &str)] = &[
    ("psalm", "PSA"),
    ("song of songs", "SNG"),
    ("canticles", "SNG"),
];

lazy_static! {
    static ref BY_CODE: HashMap<&'static str, &'static CanonicalBook> = {
        let mut map = HashMap::new();
        for b in BOOKS.iter() {
            map.insert(b.code, b);
        }
        for (alias, code) in CODE_ALIASES {
            if let Some(b) = BOOKS.iter().find(|b| b.code == *code) {
                map.insert(*alias, b);
            }
        }
        map
    };

    static ref BY_NAME: HashMap<String, &'static CanonicalBook> = {
        let mut map = HashMap::new();
        for b in BOOKS.iter() {
            map.insert(b.display_name.to_lowercase(), b);
        }
        for (alias, code) in NAME_ALIASES {
            if let Some(b) = BOOKS.iter().find(|b| b.code == *code) {
                map.insert(alias.to_string(), b);
            }
        }
        map
    };

    static ref BY_SLUG: HashMap<&'static str, &'static CanonicalBook> =
        BOOKS.iter().map(|b| (b.url_slug, b)).collect();

    /// Every external code and alias, longest first, for building regex alternations.
    pub static ref ALL_CODES_LONGEST_FIRST: Vec<&'static str> = {
        let mut codes: Vec<&'static str> = BY_CODE.keys().copied().collect();
        codes.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        codes
    };
}

/// Exact match on USX code or an alternate code.
pub fn book_by_code(code: &str) -> Option<&'static CanonicalBook> {
    BY_CODE.get(code).copied()
}

/// Case-insensitive match on display name or a name alias.
/// Inner whitespace runs are collapsed first, "1  Samuel" == "1 Samuel".
pub fn book_by_name(name: &str) -> Option<&'static CanonicalBook> {
    let key = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    BY_NAME.get(key.as_str()).copied()
}

pub fn book_by_slug(slug: &str) -> Option<&'static CanonicalBook> {
    BY_SLUG.get(slug).copied()
}

pub fn book_by_order(order: u8) -> Option<&'static CanonicalBook> {
    if order == 0 {
        return None;
    }
    BOOKS.get(usize::from(order) - 1)
}

/// Resolve a book token the way the reference parser does: code first, then name.
pub fn resolve_book(token: &str) -> Option<&'static CanonicalBook> {
    book_by_code(token.trim()).or_else(|| book_by_name(token))
}

pub fn books_in(testament: Testament) -> impl Iterator<Item = &'static CanonicalBook> {
    BOOKS.iter().filter(move |b| b.testament == testament)
}
