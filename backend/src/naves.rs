//! Nave's Topical Bible, from the SWORD module CSV export.
//!
//! Each CSV row is `section,subject,entry`, where the entry is a multi-line quoted
//! field. Entry lines look like:
//!
//! ```text
//! -Lineage of EXO 6:16-20; JOS 21:4,10; 1CH 6:2,3; 23:13
//! -Marriage of EXO 6:23
//! -See PRIEST, HIGH
//! ```
//!
//! A line starting with `-Title` opens a sub-topic. References after a `;` with no
//! book code continue the previous book.

use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::canon::{book_by_code, CanonicalBook, ALL_CODES_LONGEST_FIRST};
use crate::csv_tokenizer::CsvTokenizer;
use crate::logger::info;
use crate::reference::{parse_reference, Reference};
use crate::slug::{slugify, SlugAllocator};
use crate::types::DictionaryEntry;

pub const GENERAL_SUB_TOPIC: &str = "General";

lazy_static! {
    static ref CODE_ALTERNATION: String = ALL_CODES_LONGEST_FIRST
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");

    static ref RE_REFS_START: Regex =
        Regex::new(&format!(r"(?:^|\s|;)({})\s+\d", *CODE_ALTERNATION)).unwrap();

    static ref RE_BOOK_PART: Regex =
        Regex::new(&format!(r"^({})\s+(.+)$", *CODE_ALTERNATION)).unwrap();

    static ref RE_TITLE: Regex =
        Regex::new(r"^-(.+?)(?:\s+(?:\d?[A-Za-z]{2,3}\s+\d)|$)").unwrap();

    static ref RE_TITLE_TAIL: Regex = Regex::new(r",?\s*$").unwrap();

    static ref RE_CHAPTER_VERSE: Regex = Regex::new(r"\d+:\d+").unwrap();
    static ref RE_SEE_LINE: Regex = Regex::new(r"(?i)^-?\s*See\s+").unwrap();
    static ref RE_NOTE_LINE: Regex = Regex::new(r"^-?\(").unwrap();
    static ref RE_SUB_TOPIC_LINE: Regex = Regex::new(r"^-[A-Za-z0-9]").unwrap();

    static ref RE_HAS_SEE: Regex = Regex::new(r"(?i)See\s+").unwrap();
    static ref RE_SEE: Regex = Regex::new(r#"(?i)[-\s]*See\s+(.+?)(?:"|$)"#).unwrap();
    static ref RE_SEE_TAIL: Regex = Regex::new(r#"[",;.]+$"#).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NaveSubTopic {
    pub title: String,
    /// Expanded references, "1 Chronicles 6:2,3"
    pub verses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NaveTopic {
    pub slug: String,
    pub subject: String,
    pub section: String,
    pub sub_topics: Vec<NaveSubTopic>,
    pub related_topics: Vec<String>,
    pub total_verses: usize,
}

impl NaveTopic {
    /// Every verse that resolves against the canon, with its sub-topic title.
    pub fn parsed_verses(&self) -> impl Iterator<Item = (&NaveSubTopic, &str, Reference)> + '_ {
        self.sub_topics.iter().flat_map(|st| {
            st.verses
                .iter()
                .filter_map(move |v| parse_reference(v).map(|r| (st, v.as_str(), r)))
        })
    }

    /// Books referenced by this topic, in canon order.
    pub fn books(&self) -> Vec<&'static CanonicalBook> {
        let mut books: Vec<&'static CanonicalBook> = self.parsed_verses().map(|(_, _, r)| r.book).collect();
        books.sort_by_key(|b| b.order);
        books.dedup_by_key(|b| b.order);
        books
    }

    pub fn to_entry(&self) -> DictionaryEntry {
        let mut fields = IndexMap::new();
        fields.insert("section".to_string(), self.section.clone());
        fields.insert("subTopics".to_string(), self.sub_topics.len().to_string());
        fields.insert("totalVerses".to_string(), self.total_verses.to_string());
        fields.insert("relatedTopics".to_string(), self.related_topics.join("; "));

        DictionaryEntry {
            id: self.slug.clone(),
            title: self.subject.clone(),
            slug: self.slug.clone(),
            fields,
            source_reference: self.parsed_verses().next().map(|(_, _, r)| r),
        }
    }
}

/// A topic narrowed to the sub-topics and verses that fall in one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInBook {
    pub slug: String,
    pub subject: String,
    pub book_slug: String,
    pub sub_topics: Vec<NaveSubTopic>,
    pub verse_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicVerseCount {
    pub slug: String,
    pub subject: String,
    pub total_verses: usize,
}

/// Summary written next to the topic list by the generation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavesSummary {
    pub total_topics: usize,
    pub total_verse_refs: usize,
    /// slug → subject
    pub slug_map: BTreeMap<String, String>,
    /// section letter → slugs, in subject order
    pub letter_index: BTreeMap<String, Vec<String>>,
    pub top_verse_count: Vec<TopicVerseCount>,
}

/// Verse references in one line of entry text, with book carry-over across `;`.
/// "-Lineage of EXO 6:16-20; 1CH 6:2,3; 23:13" →
/// ["Exodus 6:16-20", "1 Chronicles 6:2,3", "1 Chronicles 23:13"]
pub fn extract_verse_refs(text: &str) -> Vec<String> {
    let mut refs = Vec::new();

    let Some(start) = RE_REFS_START.find(text) else {
        return refs;
    };

    let mut current_book: Option<&'static CanonicalBook> = None;

    for part in text[start.start()..].trim().split(';').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(caps) = RE_BOOK_PART.captures(part) {
            current_book = caps.get(1).and_then(|m| book_by_code(m.as_str()));
            let verse_part = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            match current_book {
                Some(book) if !verse_part.is_empty() => {
                    refs.push(format!("{} {}", book.display_name, verse_part));
                }
                _ => {}
            }
        } else if let Some(book) = current_book {
            // A bare "23:13" continues the previous book.
            if part.starts_with(|c: char| c.is_ascii_digit()) {
                refs.push(format!("{} {}", book.display_name, part));
            }
        }
    }

    refs
}

/// "See X" cross-references in entry lines, deduplicated in first-seen order.
pub fn extract_related_topics<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut related: Vec<String> = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        if !RE_HAS_SEE.is_match(trimmed) {
            continue;
        }
        for caps in RE_SEE.captures_iter(trimmed) {
            let Some(m) = caps.get(1) else { continue };
            let topic = RE_SEE_TAIL.replace(m.as_str().trim(), "").trim().to_string();
            if topic.chars().count() > 1
                && !topic.starts_with(|c: char| c.is_ascii_digit())
                && !related.contains(&topic)
            {
                related.push(topic);
            }
        }
    }

    related
}

fn sub_topic_title(trimmed: &str) -> String {
    match RE_TITLE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(m) => RE_TITLE_TAIL.replace(m.as_str().trim(), "").to_string(),
        None => trimmed.trim_start_matches('-').trim().to_string(),
    }
}

/// Parse the entry text of one topic into sub-topics and related topics.
pub fn parse_entry(entry: &str) -> (Vec<NaveSubTopic>, Vec<String>) {
    let mut sub_topics: Vec<NaveSubTopic> = Vec::new();
    let mut current: Option<NaveSubTopic> = None;
    let mut lines: Vec<&str> = Vec::new();

    for raw_line in entry.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        let line = line.strip_prefix('"').unwrap_or(line);
        let line = line.strip_suffix('"').unwrap_or(line);
        lines.push(line);

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let has_verse = RE_CHAPTER_VERSE.is_match(trimmed);

        // Cross-reference and descriptive note lines carry no verses.
        if (RE_SEE_LINE.is_match(trimmed) || RE_NOTE_LINE.is_match(trimmed)) && !has_verse {
            continue;
        }

        if RE_SUB_TOPIC_LINE.is_match(trimmed) {
            if let Some(done) = current.take() {
                sub_topics.push(done);
            }
            current = Some(NaveSubTopic {
                title: sub_topic_title(trimmed),
                verses: extract_verse_refs(trimmed),
            });
        } else if let Some(st) = current.as_mut() {
            st.verses.extend(extract_verse_refs(trimmed));
        }
    }

    if let Some(done) = current.take() {
        sub_topics.push(done);
    }

    if sub_topics.is_empty() {
        let verses = extract_verse_refs(&entry.replace('"', ""));
        if !verses.is_empty() {
            sub_topics.push(NaveSubTopic { title: GENERAL_SUB_TOPIC.to_string(), verses });
        }
    }

    let related = extract_related_topics(lines);
    (sub_topics, related)
}

/// Parse the whole CSV. The first record is the header; rows with fewer than three
/// fields are skipped. Rows sharing (section, subject) are merged in file order.
pub fn parse_naves(text: &str) -> Vec<NaveTopic> {
    let mut grouped: IndexMap<(String, String), Vec<String>> = IndexMap::new();
    let mut rows = 0;
    let mut skipped = 0;

    for row in CsvTokenizer::new(text).skip(1) {
        if row.len() < 3 {
            skipped += 1;
            continue;
        }
        rows += 1;
        let mut fields = row.into_iter();
        let section = fields.next().unwrap_or_default();
        let subject = fields.next().unwrap_or_default();
        let entry = fields.next().unwrap_or_default();
        grouped.entry((section, subject)).or_default().push(entry);
    }

    let mut allocator = SlugAllocator::new();
    let mut topics: Vec<NaveTopic> = Vec::with_capacity(grouped.len());

    for ((section, subject), entries) in grouped {
        let (sub_topics, related_topics) = parse_entry(&entries.join("\n"));
        let total_verses = sub_topics.iter().map(|st| st.verses.len()).sum();

        let base = slugify(&subject);
        let base = if base.is_empty() { "unknown".to_string() } else { base };

        topics.push(NaveTopic {
            slug: allocator.allocate(&base),
            subject,
            section,
            sub_topics,
            related_topics,
            total_verses,
        });
    }

    topics.sort_by(|a, b| {
        a.subject.to_lowercase()
            .cmp(&b.subject.to_lowercase())
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.slug.cmp(&b.slug))
    });

    info(&format!(
        "Parsed {} Nave's rows into {} topics, skipped {} rows",
        rows, topics.len(), skipped
    ));

    topics
}

/// The parsed topical dictionary with its lookups.
#[derive(Debug, Clone, Default)]
pub struct NaveIndex {
    topics: Vec<NaveTopic>,
    by_slug: HashMap<String, usize>,
}

impl NaveIndex {
    pub fn new(topics: Vec<NaveTopic>) -> Self {
        let by_slug = topics.iter().enumerate().map(|(i, t)| (t.slug.clone(), i)).collect();
        NaveIndex { topics, by_slug }
    }

    pub fn all(&self) -> &[NaveTopic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&NaveTopic> {
        self.by_slug.get(slug).map(|&i| &self.topics[i])
    }

    pub fn by_section(&self, section: &str) -> Vec<&NaveTopic> {
        self.topics.iter().filter(|t| t.section.eq_ignore_ascii_case(section)).collect()
    }

    /// Section letters with topic counts, alphabetical.
    pub fn sections(&self) -> Vec<(String, usize)> {
        let mut map: BTreeMap<String, usize> = BTreeMap::new();
        for t in &self.topics {
            *map.entry(t.section.to_uppercase()).or_default() += 1;
        }
        map.into_iter().collect()
    }

    /// Topics citing at least one verse in the book.
    pub fn topics_for_book(&self, book_slug: &str) -> Vec<&NaveTopic> {
        self.topics
            .iter()
            .filter(|t| t.parsed_verses().any(|(_, _, r)| r.book.url_slug == book_slug))
            .collect()
    }

    pub fn topic_in_book(&self, slug: &str, book_slug: &str) -> Option<TopicInBook> {
        let topic = self.get(slug)?;

        let mut sub_topics = Vec::new();
        for st in &topic.sub_topics {
            let verses: Vec<String> = st.verses
                .iter()
                .filter(|v| parse_reference(v).is_some_and(|r| r.book.url_slug == book_slug))
                .cloned()
                .collect();
            if !verses.is_empty() {
                sub_topics.push(NaveSubTopic { title: st.title.clone(), verses });
            }
        }

        if sub_topics.is_empty() {
            return None;
        }

        let verse_count = sub_topics.iter().map(|st| st.verses.len()).sum();
        Some(TopicInBook {
            slug: topic.slug.clone(),
            subject: topic.subject.clone(),
            book_slug: book_slug.to_string(),
            sub_topics,
            verse_count,
        })
    }

    pub fn summary(&self, top: usize) -> NavesSummary {
        let mut slug_map = BTreeMap::new();
        let mut letter_index: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for t in &self.topics {
            slug_map.insert(t.slug.clone(), t.subject.clone());
            letter_index.entry(t.section.to_uppercase()).or_default().push(t.slug.clone());
        }

        let mut by_verses: Vec<&NaveTopic> = self.topics.iter().collect();
        by_verses.sort_by(|a, b| b.total_verses.cmp(&a.total_verses));

        NavesSummary {
            total_topics: self.topics.len(),
            total_verse_refs: self.topics.iter().map(|t| t.total_verses).sum(),
            slug_map,
            letter_index,
            top_verse_count: by_verses
                .into_iter()
                .take(top)
                .map(|t| TopicVerseCount {
                    slug: t.slug.clone(),
                    subject: t.subject.clone(),
                    total_verses: t.total_verses,
                })
                .collect(),
        }
    }

    pub fn slugs(&self) -> HashSet<&str> {
        self.topics.iter().map(|t| t.slug.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_verse_refs_carry_over() {
        let refs = extract_verse_refs("-Lineage of EXO 6:16-20; JOS 21:4,10; 1CH 6:2,3; 23:13");
        assert_eq!(refs, vec![
            "Exodus 6:16-20",
            "Joshua 21:4,10",
            "1 Chronicles 6:2,3",
            "1 Chronicles 23:13",
        ]);
    }

    #[test]
    fn test_extract_verse_refs_sword_codes() {
        assert_eq!(extract_verse_refs("SOL 2:1"), vec!["Song of Solomon 2:1"]);
        assert_eq!(extract_verse_refs("-Type of JOH 1:29; 1JO 2:2"), vec!["John 1:29", "1 John 2:2"]);
        assert_eq!(extract_verse_refs("2SA  8:17"), vec!["2 Samuel 8:17"]);
        assert!(extract_verse_refs("-No references here").is_empty());
    }

    #[test]
    fn test_parse_entry() {
        let entry = "-Lineage of EXO 6:16-20; 1CH 6:2,3; 23:13\n\
                     -Marriage of EXO 6:23\n     NUM 26:59\n\
                     -(A priest of the tribe of Levi)\n\
                     -See PRIEST, HIGH\n\
                     -See LEVITES";
        let (subs, related) = parse_entry(entry);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].title, "Lineage of");
        assert_eq!(subs[0].verses.len(), 3);
        assert_eq!(subs[1].title, "Marriage of");
        assert_eq!(subs[1].verses, vec!["Exodus 6:23", "Numbers 26:59"]);
        assert_eq!(related, vec!["PRIEST, HIGH", "LEVITES"]);
    }

    #[test]
    fn test_general_sub_topic() {
        let (subs, _) = parse_entry("GEN 11:9; ISA 13:19");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].title, GENERAL_SUB_TOPIC);
        assert_eq!(subs[0].verses, vec!["Genesis 11:9", "Isaiah 13:19"]);
    }

    #[test]
    fn test_parse_naves_groups_and_slugs() {
        let csv = "section,subject,entry\n\
                   B,BABEL,\"-Tower of GEN 11:1-9\"\n\
                   A,AARON,\"-Lineage of\nEXO 6:16-20\n-Marriage of EXO 6:23\"\n\
                   A,AARON,\"-Death of NUM 20:28\"\n\
                   A,Aaron,\"-Rod of NUM 17:8\"\n\
                   A,***,\"GEN 1:1\"\n\
                   short,row\n";
        let topics = parse_naves(csv);
        assert_eq!(topics.len(), 4);

        let index = NaveIndex::new(topics);
        let aaron = index.get("aaron").unwrap();
        assert_eq!(aaron.subject, "AARON");
        assert_eq!(aaron.sub_topics.len(), 3);
        assert_eq!(aaron.total_verses, 3);
        assert_eq!(aaron.sub_topics[0].verses, vec!["Exodus 6:16-20"]);

        assert_eq!(index.get("aaron-2").map(|t| t.subject.as_str()), Some("Aaron"));
        assert_eq!(index.get("unknown").map(|t| t.total_verses), Some(1));

        assert_eq!(index.sections(), vec![("A".to_string(), 3), ("B".to_string(), 1)]);
        assert_eq!(index.topics_for_book("numbers").len(), 2);

        let view = index.topic_in_book("aaron", "exodus").unwrap();
        assert_eq!(view.verse_count, 2);
        assert!(index.topic_in_book("babel", "exodus").is_none());

        let summary = index.summary(2);
        assert_eq!(summary.total_topics, 4);
        assert_eq!(summary.total_verse_refs, 6);
        assert_eq!(summary.top_verse_count[0].slug, "aaron");
    }
}
