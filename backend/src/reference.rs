use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;

use crate::canon::{book_by_slug, resolve_book, CanonicalBook};

lazy_static! {
    // GEN 1:1; Genesis 12:1-3; 1 Samuel 4; 2SA  8:17; Song of Solomon 2:1,3
    static ref RE_REFERENCE: Regex = Regex::new(
        r"^\s*((?:\d\s*)?[A-Za-z]+(?:\s+[A-Za-z]+)*)\s+(\d+)(?::(\d+)(?:\s*[-–]\s*(\d+))?)?"
    ).unwrap();

    // exodus-20-2; 1-samuel-3; song-of-solomon-2-1
    static ref RE_VERSE_KEY: Regex = Regex::new(
        r"^([a-z0-9-]+?)-(\d+)(?:-(\d+))?$"
    ).unwrap();
}

/// A scripture citation normalized against the canon table.
/// "Genesis 12:1-3" → book: Genesis, chapter: 12, verse: 1, verse_range_end: 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    pub book: &'static CanonicalBook,
    pub chapter: u32,
    pub verse: Option<u32>,
    pub verse_range_end: Option<u32>,
}

/// Verse-level identity: (book order, chapter, verse).
pub type VerseId = (u8, u32, u32);

/// Chapter-level identity: (book order, chapter).
pub type ChapterId = (u8, u32);

impl Reference {
    pub fn chapter_level(book: &'static CanonicalBook, chapter: u32) -> Self {
        Reference { book, chapter, verse: None, verse_range_end: None }
    }

    pub fn verse_level(book: &'static CanonicalBook, chapter: u32, verse: u32) -> Self {
        Reference { book, chapter, verse: Some(verse), verse_range_end: None }
    }

    pub fn is_verse_level(&self) -> bool {
        self.verse.is_some()
    }

    /// "exodus-20-2", or "exodus-20" for a chapter-level reference.
    pub fn verse_key(&self) -> String {
        match self.verse {
            Some(v) => format!("{}-{}-{}", self.book.url_slug, self.chapter, v),
            None => self.chapter_key(),
        }
    }

    /// "exodus-20"
    pub fn chapter_key(&self) -> String {
        format!("{}-{}", self.book.url_slug, self.chapter)
    }

    pub fn verse_id(&self) -> Option<VerseId> {
        self.verse.map(|v| (self.book.order, self.chapter, v))
    }

    pub fn chapter_id(&self) -> ChapterId {
        (self.book.order, self.chapter)
    }

    /// Parse a verse key as produced by [`Reference::verse_key`].
    /// Returns None for unknown book slugs.
    pub fn from_key(key: &str) -> Option<Reference> {
        let caps = RE_VERSE_KEY.captures(key.trim())?;
        let book = book_by_slug(caps.get(1)?.as_str())?;
        let chapter = positive(caps.get(2)?.as_str())?;
        match caps.get(3) {
            Some(v) => Some(Reference::verse_level(book, chapter, positive(v.as_str())?)),
            None => Some(Reference::chapter_level(book, chapter)),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book.display_name, self.chapter)?;
        if let Some(v) = self.verse {
            write!(f, ":{}", v)?;
            if let Some(end) = self.verse_range_end {
                write!(f, "-{}", end)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Reference", 6)?;
        s.serialize_field("book", self.book.display_name)?;
        s.serialize_field("bookSlug", self.book.url_slug)?;
        s.serialize_field("bookOrder", &self.book.order)?;
        s.serialize_field("chapter", &self.chapter)?;
        s.serialize_field("verse", &self.verse)?;
        s.serialize_field("verseRangeEnd", &self.verse_range_end)?;
        s.end()
    }
}

fn positive(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Parse a raw scripture reference: "GEN 1:1", "Genesis 12:1-3", "1 Samuel 4".
///
/// The book token resolves by exact external code first, then by case-insensitive
/// display name. Returns None for unrecognized books or malformed input.
/// Text following the reference grammar ("Genesis 1:1,3; 2:4") is ignored.
pub fn parse_reference(raw: &str) -> Option<Reference> {
    let caps = RE_REFERENCE.captures(raw)?;

    let book_token = caps.get(1)?.as_str();
    let book = resolve_book(book_token)?;

    let chapter = positive(caps.get(2)?.as_str())?;

    let verse = match caps.get(3) {
        Some(v) => Some(positive(v.as_str())?),
        None => None,
    };

    // Ranges that run backwards ("1:5-3") keep the start verse only.
    let verse_range_end = caps.get(4)
        .and_then(|m| positive(m.as_str()))
        .filter(|end| verse.is_some_and(|v| *end > v));

    Some(Reference { book, chapter, verse, verse_range_end })
}

/// "EXO 20:2" → "Exodus 20:2". Unresolvable ids are returned unchanged.
pub fn format_reference_id(reference_id: &str) -> String {
    let trimmed = reference_id.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((code, rest)) => match crate::canon::book_by_code(code) {
            Some(book) => format!("{} {}", book.display_name, rest.trim()),
            None => reference_id.to_string(),
        },
        None => reference_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::BOOKS;

    #[test]
    fn test_parse_usx_code() {
        let r = parse_reference("GEN 1:1").unwrap();
        assert_eq!(r.book.code, "GEN");
        assert_eq!(r.chapter, 1);
        assert_eq!(r.verse, Some(1));
        assert_eq!(r.verse_range_end, None);
    }

    #[test]
    fn test_parse_display_name_with_range() {
        let r = parse_reference("Genesis 12:1-3").unwrap();
        assert_eq!(r.book.order, 1);
        assert_eq!(r.chapter, 12);
        assert_eq!(r.verse, Some(1));
        assert_eq!(r.verse_range_end, Some(3));
        assert_eq!(r.to_string(), "Genesis 12:1-3");
    }

    #[test]
    fn test_parse_numeric_prefix_chapter_only() {
        let r = parse_reference("1 Samuel 4").unwrap();
        assert_eq!(r.book.code, "1SA");
        assert_eq!(r.chapter, 4);
        assert!(r.verse.is_none());
        assert!(!r.is_verse_level());
    }

    #[test]
    fn test_parse_multi_word_and_trailing_text() {
        let r = parse_reference("Song of Solomon 2:1,3").unwrap();
        assert_eq!(r.book.code, "SNG");
        assert_eq!(r.verse, Some(1));

        let r = parse_reference("2SA  8:17").unwrap();
        assert_eq!(r.book.code, "2SA");
        assert_eq!(r.chapter, 8);
    }

    #[test]
    fn test_every_code_parses() {
        for b in BOOKS.iter() {
            let r = parse_reference(&format!("{} 3:5", b.code)).unwrap();
            assert_eq!(r.book, b);
            assert_eq!((r.chapter, r.verse), (3, Some(5)));

            let r = parse_reference(&format!("{} 3:5", b.display_name)).unwrap();
            assert_eq!(r.book, b);
        }
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(parse_reference("Narnia 1:1").is_none());
        assert!(parse_reference("").is_none());
        assert!(parse_reference("42").is_none());
        assert!(parse_reference("Genesis").is_none());
        assert!(parse_reference("Genesis 0:1").is_none());
        assert!(parse_reference("gen 1:1").is_none());
    }

    #[test]
    fn test_verse_keys() {
        let r = parse_reference("EXO 20:2").unwrap();
        assert_eq!(r.verse_key(), "exodus-20-2");
        assert_eq!(r.chapter_key(), "exodus-20");
        assert_eq!(Reference::from_key("exodus-20-2"), Some(Reference::verse_level(r.book, 20, 2)));

        let r = Reference::from_key("1-samuel-3").unwrap();
        assert_eq!(r.book.code, "1SA");
        assert!(r.verse.is_none());

        let r = Reference::from_key("song-of-solomon-2-1").unwrap();
        assert_eq!(r.book.code, "SNG");
        assert_eq!(r.verse, Some(1));

        assert!(Reference::from_key("narnia-1-1").is_none());
    }

    #[test]
    fn test_format_reference_id() {
        assert_eq!(format_reference_id("EXO 20:2"), "Exodus 20:2");
        assert_eq!(format_reference_id("XYZ 1:1"), "XYZ 1:1");
        assert_eq!(format_reference_id("nothing"), "nothing");
    }
}
