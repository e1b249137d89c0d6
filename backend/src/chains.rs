//! Chain studies: topical dictionary topics that run through the canon.
//!
//! A topic qualifies as a chain when its verses touch enough distinct books and
//! both testaments. Qualification is recomputed from the topics on every build.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::canon::{CanonicalBook, Testament};
use crate::logger::info;
use crate::naves::{NaveSubTopic, NaveTopic};
use crate::reference::Reference;
use crate::settings::ChainPolicy;
use crate::slug::slugify;

pub const RELATED_CHAINS_LIMIT: usize = 6;
pub const FEATURED_CHAINS_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerse {
    pub reference: Reference,
    /// The reference as written in the source, "Genesis 12:1-3"
    pub raw: String,
    pub sub_topic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookGroup {
    pub book: &'static CanonicalBook,
    pub verses: Vec<ChainVerse>,
    /// Unique sub-topic titles, first-seen order
    pub sub_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStudy {
    pub slug: String,
    pub subject: String,
    pub section: String,
    pub book_groups: Vec<BookGroup>,
    pub total_verses: usize,
    pub book_count: usize,
    pub ot_book_count: usize,
    pub nt_book_count: usize,
    pub related_topics: Vec<String>,
    pub sub_topics: Vec<NaveSubTopic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHighlight {
    pub slug: String,
    pub subject: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionCount {
    pub letter: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
    pub total_chains: usize,
    pub total_verses: usize,
    /// Rounded to one decimal.
    pub average_books: f64,
    pub most_books: ChainHighlight,
    pub most_verses: ChainHighlight,
    pub sections: Vec<SectionCount>,
}

/// "HOLY SPIRIT" → "Holy Spirit". Short words already in upper case are kept.
pub fn format_subject(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| {
            if w.chars().count() <= 2 && w == w.to_uppercase() {
                return w.to_string();
            }
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Build the chain study for one topic, or None if it does not qualify.
pub fn build_chain(topic: &NaveTopic, policy: &ChainPolicy) -> Option<ChainStudy> {
    let verses: Vec<ChainVerse> = topic.parsed_verses()
        .map(|(st, raw, reference)| ChainVerse {
            reference,
            raw: raw.to_string(),
            sub_topic: st.title.clone(),
        })
        .collect();

    let total_verses = verses.len();

    let mut by_book: BTreeMap<u8, Vec<ChainVerse>> = BTreeMap::new();
    for v in verses {
        by_book.entry(v.reference.book.order).or_default().push(v);
    }

    if by_book.len() < policy.min_books {
        return None;
    }

    let book_groups: Vec<BookGroup> = by_book
        .into_values()
        .filter_map(|mut verses| {
            let book = verses.first()?.reference.book;
            verses.sort_by_key(|v| v.reference.chapter);

            let mut sub_topics: Vec<String> = Vec::new();
            for v in &verses {
                if !sub_topics.contains(&v.sub_topic) {
                    sub_topics.push(v.sub_topic.clone());
                }
            }

            Some(BookGroup { book, verses, sub_topics })
        })
        .collect();

    let ot_book_count = book_groups.iter().filter(|g| g.book.testament == Testament::Old).count();
    let nt_book_count = book_groups.len() - ot_book_count;

    if policy.require_both_testaments && (ot_book_count == 0 || nt_book_count == 0) {
        return None;
    }

    Some(ChainStudy {
        slug: topic.slug.clone(),
        subject: format_subject(&topic.subject),
        section: topic.section.clone(),
        book_count: book_groups.len(),
        book_groups,
        total_verses,
        ot_book_count,
        nt_book_count,
        related_topics: topic.related_topics.clone(),
        sub_topics: topic.sub_topics.clone(),
    })
}

fn compare_chains(a: &ChainStudy, b: &ChainStudy) -> Ordering {
    a.subject.to_lowercase()
        .cmp(&b.subject.to_lowercase())
        .then_with(|| a.slug.cmp(&b.slug))
}

/// All qualifying chains, sorted by subject.
pub fn build_chains(topics: &[NaveTopic], policy: &ChainPolicy) -> Vec<ChainStudy> {
    let mut chains: Vec<ChainStudy> = topics.iter().filter_map(|t| build_chain(t, policy)).collect();
    chains.sort_by(compare_chains);
    info(&format!("Built {} chain studies from {} topics", chains.len(), topics.len()));
    chains
}

pub fn chain_sections(chains: &[ChainStudy]) -> Vec<SectionCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for c in chains {
        *counts.entry(c.section.as_str()).or_insert(0) += 1;
    }
    counts.into_iter()
        .map(|(letter, count)| SectionCount { letter: letter.to_string(), count })
        .collect()
}

/// First chain with the largest value, in list order.
fn highlight(chains: &[ChainStudy], value: impl Fn(&ChainStudy) -> usize) -> ChainHighlight {
    let mut best: Option<&ChainStudy> = None;
    for c in chains {
        if best.is_none_or(|b| value(c) > value(b)) {
            best = Some(c);
        }
    }
    best.map(|c| ChainHighlight { slug: c.slug.clone(), subject: c.subject.clone(), count: value(c) })
        .unwrap_or_default()
}

pub fn chain_stats(chains: &[ChainStudy]) -> ChainStats {
    if chains.is_empty() {
        return ChainStats::default();
    }

    let total_books: usize = chains.iter().map(|c| c.book_count).sum();
    let average_books = (total_books as f64 / chains.len() as f64 * 10.0).round() / 10.0;

    ChainStats {
        total_chains: chains.len(),
        total_verses: chains.iter().map(|c| c.total_verses).sum(),
        average_books,
        most_books: highlight(chains, |c| c.book_count),
        most_verses: highlight(chains, |c| c.total_verses),
        sections: chain_sections(chains),
    }
}

/// Looked-up chains over a built list.
#[derive(Debug, Clone, Default)]
pub struct ChainIndex {
    chains: Vec<ChainStudy>,
    by_slug: HashMap<String, usize>,
}

impl ChainIndex {
    pub fn new(chains: Vec<ChainStudy>) -> Self {
        let mut by_slug = HashMap::new();
        for (i, c) in chains.iter().enumerate() {
            by_slug.entry(c.slug.clone()).or_insert(i);
        }
        ChainIndex { chains, by_slug }
    }

    pub fn all(&self) -> &[ChainStudy] {
        &self.chains
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&ChainStudy> {
        self.by_slug.get(slug).map(|&i| &self.chains[i])
    }

    pub fn by_section(&self, section: &str) -> Vec<&ChainStudy> {
        self.chains.iter().filter(|c| c.section == section).collect()
    }

    pub fn sections(&self) -> Vec<SectionCount> {
        chain_sections(&self.chains)
    }

    pub fn stats(&self) -> ChainStats {
        chain_stats(&self.chains)
    }

    /// Chains scored against the one at `slug`: a related-topic link counts most,
    /// then shared section, shared books and a similar book span.
    pub fn related(&self, slug: &str, limit: usize) -> Vec<&ChainStudy> {
        let Some(chain) = self.get(slug) else {
            return Vec::new();
        };

        let related_slugs: HashSet<String> = chain.related_topics.iter().map(|t| slugify(t)).collect();
        let books: HashSet<u8> = chain.book_groups.iter().map(|g| g.book.order).collect();

        let mut scored: Vec<(&ChainStudy, f64)> = self.chains
            .iter()
            .filter(|c| c.slug != chain.slug)
            .filter_map(|c| {
                let mut score = 0.0;
                if related_slugs.contains(&c.slug) {
                    score += 10.0;
                }
                if c.section == chain.section {
                    score += 1.0;
                }
                let overlap = c.book_groups.iter().filter(|g| books.contains(&g.book.order)).count();
                score += overlap as f64 * 0.5;
                if c.book_count.abs_diff(chain.book_count) <= 3 {
                    score += 2.0;
                }
                (score > 0.0).then_some((c, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.into_iter().take(limit).map(|(c, _)| c).collect()
    }

    /// Widest chains first, ties broken by verse count.
    pub fn featured(&self, limit: usize) -> Vec<&ChainStudy> {
        let mut all: Vec<&ChainStudy> = self.chains.iter().collect();
        all.sort_by(|a, b| {
            b.book_count.cmp(&a.book_count)
                .then_with(|| b.total_verses.cmp(&a.total_verses))
        });
        all.truncate(limit);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(slug: &str, subject: &str, verses: &[&str]) -> NaveTopic {
        NaveTopic {
            slug: slug.to_string(),
            subject: subject.to_string(),
            section: subject.chars().next().map(|c| c.to_string()).unwrap_or_default(),
            sub_topics: vec![NaveSubTopic {
                title: "General".to_string(),
                verses: verses.iter().map(|v| v.to_string()).collect(),
            }],
            related_topics: Vec::new(),
            total_verses: verses.len(),
        }
    }

    #[test]
    fn test_format_subject() {
        assert_eq!(format_subject("HOLY SPIRIT"), "Holy Spirit");
        assert_eq!(format_subject("ABRAHAM"), "Abraham");
        assert_eq!(format_subject("KING OF ISRAEL"), "King OF Israel");
        assert_eq!(format_subject("faith  in god"), "Faith In God");
    }

    #[test]
    fn test_three_books_rejected() {
        let t = topic("t", "Three", &["Genesis 1:1", "Isaiah 2:2", "Matthew 3:3"]);
        assert!(build_chain(&t, &ChainPolicy::default()).is_none());
    }

    #[test]
    fn test_old_testament_only_rejected() {
        let t = topic("t", "Law", &["Genesis 1:1", "Exodus 2:2", "Leviticus 3:3", "Numbers 4:4", "Deuteronomy 5:5"]);
        assert!(build_chain(&t, &ChainPolicy::default()).is_none());

        let relaxed = ChainPolicy { require_both_testaments: false, ..ChainPolicy::default() };
        assert!(build_chain(&t, &relaxed).is_some());
    }

    #[test]
    fn test_four_books_both_testaments_accepted() {
        let mut t = topic("faith", "FAITH", &[
            "Revelation 2:10",
            "Matthew 17:20",
            "Isaiah 7:9",
            "Genesis 15:6",
            "Genesis 12:1-3",
            "Narnia 1:1",
        ]);
        t.sub_topics.push(NaveSubTopic {
            title: "Trial of".to_string(),
            verses: vec!["Genesis 22:1".to_string()],
        });

        let chain = build_chain(&t, &ChainPolicy::default()).unwrap();
        let orders: Vec<u8> = chain.book_groups.iter().map(|g| g.book.order).collect();
        assert_eq!(orders, vec![1, 23, 40, 66]);
        assert_eq!(chain.subject, "Faith");
        assert_eq!(chain.book_count, 4);
        assert_eq!(chain.ot_book_count, 2);
        assert_eq!(chain.nt_book_count, 2);
        assert_eq!(chain.total_verses, 6);

        let genesis = &chain.book_groups[0];
        let chapters: Vec<u32> = genesis.verses.iter().map(|v| v.reference.chapter).collect();
        assert_eq!(chapters, vec![12, 15, 22]);
        assert_eq!(genesis.sub_topics, vec!["General", "Trial of"]);
        assert_eq!(genesis.verses[0].raw, "Genesis 12:1-3");
    }

    fn sample_index() -> ChainIndex {
        let wide = ["Genesis 1:1", "Exodus 1:1", "Isaiah 1:1", "Matthew 1:1", "Mark 1:1", "Revelation 1:1"];
        let mut faith = topic("faith", "Faith", &["Genesis 15:6", "Isaiah 7:9", "Matthew 17:20", "Revelation 2:10"]);
        faith.related_topics = vec!["Trust".to_string()];

        let topics = vec![
            topic("trust", "TRUST", &["Psalms 37:3", "Proverbs 3:5", "John 14:1", "Romans 4:3", "Romans 4:5"]),
            faith,
            topic("fire", "Fire", &wide),
            topic("angels", "Angels", &["Genesis 19:1", "Daniel 6:22", "Luke 1:26", "Hebrews 1:14"]),
        ];
        ChainIndex::new(build_chains(&topics, &ChainPolicy::default()))
    }

    #[test]
    fn test_chains_sorted_and_looked_up() {
        let index = sample_index();
        let slugs: Vec<&str> = index.all().iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["angels", "faith", "fire", "trust"]);
        assert_eq!(index.get("trust").map(|c| c.subject.as_str()), Some("Trust"));
        assert!(index.get("missing").is_none());
        assert_eq!(index.by_section("F").len(), 2);
    }

    #[test]
    fn test_stats_and_sections() {
        let index = sample_index();
        let stats = index.stats();
        assert_eq!(stats.total_chains, 4);
        assert_eq!(stats.total_verses, 4 + 4 + 6 + 5);
        // (4 + 4 + 6 + 4) / 4 = 4.5
        assert_eq!(stats.average_books, 4.5);
        assert_eq!(stats.most_books.slug, "fire");
        assert_eq!(stats.most_books.count, 6);
        assert_eq!(stats.most_verses.slug, "fire");
        assert_eq!(stats.sections, vec![
            SectionCount { letter: "A".to_string(), count: 1 },
            SectionCount { letter: "F".to_string(), count: 2 },
            SectionCount { letter: "T".to_string(), count: 1 },
        ]);

        assert_eq!(chain_stats(&[]), ChainStats::default());
    }

    #[test]
    fn test_related_and_featured() {
        let index = sample_index();

        let related: Vec<&str> = index.related("faith", RELATED_CHAINS_LIMIT)
            .iter()
            .map(|c| c.slug.as_str())
            .collect();
        // trust 12, fire 5, angels 2.5
        assert_eq!(related, vec!["trust", "fire", "angels"]);
        assert_eq!(index.related("faith", 1).len(), 1);
        assert!(index.related("missing", 6).is_empty());

        let featured: Vec<&str> = index.featured(2).iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(featured, vec!["fire", "trust"]);
    }
}
