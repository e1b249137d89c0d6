//! The 613 commandments (mitzvot) from the BibleData commandments CSV.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use serde::Serialize;

use crate::csv_tokenizer::CsvTokenizer;
use crate::logger::{debug, info};
use crate::reference::{format_reference_id, parse_reference, Reference};
use crate::slug::slugify;
use crate::types::DictionaryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Polarity {
    /// "Thou shalt"
    #[serde(rename = "P")]
    Positive,
    /// "Thou shalt not"
    #[serde(rename = "N")]
    Negative,
}

impl Polarity {
    pub fn parse(s: &str) -> Option<Polarity> {
        match s.trim() {
            "P" | "p" => Some(Polarity::Positive),
            "N" | "n" => Some(Polarity::Negative),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Commandment {
    pub number: u32,
    pub concept: String,
    pub polarity: Polarity,
    /// "EXO 20:2"
    pub reference_id: String,
    pub scripture_english: String,
    pub scripture_hebrew: String,
    pub scripture_greek: String,
    pub parashah: String,
    pub sefer_hachinuch_number: u32,
    pub mishnah_torah_book_number: u32,
    pub mishnah_torah_book_name: String,
    pub mishnah_torah_category: String,
    pub category: String,
    /// Book url slug, "exodus"
    pub book: String,
    pub chapter: u32,
    pub slug: String,
    #[serde(skip)]
    pub reference: Option<Reference>,
}

impl Commandment {
    pub fn category_slug(&self) -> String {
        slugify(&self.category)
    }

    /// "Exodus 20:2"
    pub fn display_reference(&self) -> String {
        format_reference_id(&self.reference_id)
    }

    pub fn to_entry(&self) -> DictionaryEntry {
        let mut fields = IndexMap::new();
        fields.insert("polarity".to_string(), match self.polarity {
            Polarity::Positive => "P".to_string(),
            Polarity::Negative => "N".to_string(),
        });
        fields.insert("reference".to_string(), self.display_reference());
        fields.insert("category".to_string(), self.category.clone());
        fields.insert("scriptureEnglish".to_string(), self.scripture_english.clone());
        fields.insert("parashah".to_string(), self.parashah.clone());
        fields.insert("mishnahTorahBookName".to_string(), self.mishnah_torah_book_name.clone());

        DictionaryEntry {
            id: self.number.to_string(),
            title: self.concept.clone(),
            slug: self.slug.clone(),
            fields,
            source_reference: self.reference,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandmentCategory {
    pub slug: String,
    pub name: String,
    pub count: usize,
    pub positive: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub book_slug: String,
    pub chapter: u32,
    pub count: usize,
    pub positive: usize,
    pub negative: usize,
    pub numbers: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandmentStats {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub categories: usize,
    pub books: usize,
}

/// All commandments in file order, with a number lookup.
#[derive(Debug, Clone, Default)]
pub struct CommandmentSet {
    items: Vec<Commandment>,
    by_number: HashMap<u32, usize>,
}

fn column(row: &[String], idx: usize) -> String {
    row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn number_column(row: &[String], idx: usize) -> u32 {
    row.get(idx).and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Parse the commandments CSV. The first record is the header.
/// Rows with a non-numeric number or an unknown polarity are skipped.
pub fn parse_commandments(text: &str) -> CommandmentSet {
    let mut items = Vec::new();
    let mut skipped = 0;

    for row in CsvTokenizer::new(text).skip(1) {
        let Some(number) = row.first().and_then(|s| s.trim().parse::<u32>().ok()) else {
            debug(&format!("Skipping commandment row without a number: {:?}", row.first()));
            skipped += 1;
            continue;
        };
        let Some(polarity) = row.get(2).and_then(|s| Polarity::parse(s)) else {
            debug(&format!("Skipping commandment {}: unknown polarity", number));
            skipped += 1;
            continue;
        };

        let reference_id = column(&row, 3);
        let reference = parse_reference(&reference_id);
        if reference.is_none() {
            debug(&format!("Commandment {}: unparsable reference '{}'", number, reference_id));
        }

        let (book, chapter) = match reference {
            Some(r) => (r.book.url_slug.to_string(), r.chapter),
            None => (
                reference_id.split_whitespace().next().unwrap_or("").to_lowercase(),
                0,
            ),
        };

        items.push(Commandment {
            number,
            concept: column(&row, 1),
            polarity,
            reference_id,
            scripture_english: column(&row, 4),
            scripture_hebrew: column(&row, 5),
            scripture_greek: column(&row, 6),
            parashah: column(&row, 7),
            sefer_hachinuch_number: number_column(&row, 8),
            mishnah_torah_book_number: number_column(&row, 9),
            mishnah_torah_book_name: column(&row, 10),
            mishnah_torah_category: column(&row, 11),
            category: column(&row, 12),
            book,
            chapter,
            slug: format!("commandment-{}", number),
            reference,
        });
    }

    info(&format!("Parsed {} commandments, skipped {} rows", items.len(), skipped));
    CommandmentSet::new(items)
}

impl CommandmentSet {
    pub fn new(items: Vec<Commandment>) -> Self {
        let mut by_number = HashMap::new();
        for (idx, c) in items.iter().enumerate() {
            by_number.entry(c.number).or_insert(idx);
        }
        CommandmentSet { items, by_number }
    }

    pub fn all(&self) -> &[Commandment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, number: u32) -> Option<&Commandment> {
        self.by_number.get(&number).map(|&idx| &self.items[idx])
    }

    pub fn by_category(&self, category: &str) -> Vec<&Commandment> {
        self.items.iter().filter(|c| c.category == category).collect()
    }

    pub fn by_category_slug(&self, slug: &str) -> Vec<&Commandment> {
        self.items.iter().filter(|c| c.category_slug() == slug).collect()
    }

    pub fn by_book(&self, book_slug: &str) -> Vec<&Commandment> {
        self.items.iter().filter(|c| c.book == book_slug).collect()
    }

    pub fn by_chapter(&self, book_slug: &str, chapter: u32) -> Vec<&Commandment> {
        self.items.iter().filter(|c| c.book == book_slug && c.chapter == chapter).collect()
    }

    pub fn by_polarity(&self, polarity: Polarity) -> Vec<&Commandment> {
        self.items.iter().filter(|c| c.polarity == polarity).collect()
    }

    /// Categories with counts, largest first. Ties keep first-seen order.
    pub fn categories(&self) -> Vec<CommandmentCategory> {
        let mut map: IndexMap<&str, CommandmentCategory> = IndexMap::new();
        for c in &self.items {
            let entry = map.entry(c.category.as_str()).or_insert_with(|| CommandmentCategory {
                slug: c.category_slug(),
                name: c.category.clone(),
                count: 0,
                positive: 0,
                negative: 0,
            });
            entry.count += 1;
            match c.polarity {
                Polarity::Positive => entry.positive += 1,
                Polarity::Negative => entry.negative += 1,
            }
        }

        let mut categories: Vec<CommandmentCategory> = map.into_values().collect();
        categories.sort_by(|a, b| b.count.cmp(&a.count));
        categories
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<CommandmentCategory> {
        self.categories().into_iter().find(|c| c.slug == slug)
    }

    /// Chapters containing commandments, most commandments first.
    pub fn chapters_with_commandments(&self) -> Vec<ChapterSummary> {
        let mut map: IndexMap<(String, u32), ChapterSummary> = IndexMap::new();
        for c in &self.items {
            let entry = map.entry((c.book.clone(), c.chapter)).or_insert_with(|| ChapterSummary {
                book_slug: c.book.clone(),
                chapter: c.chapter,
                count: 0,
                positive: 0,
                negative: 0,
                numbers: Vec::new(),
            });
            entry.count += 1;
            match c.polarity {
                Polarity::Positive => entry.positive += 1,
                Polarity::Negative => entry.negative += 1,
            }
            entry.numbers.push(c.number);
        }

        let mut chapters: Vec<ChapterSummary> = map.into_values().collect();
        chapters.sort_by(|a, b| b.count.cmp(&a.count));
        chapters
    }

    pub fn stats(&self) -> CommandmentStats {
        let books: BTreeSet<&str> = self.items.iter().map(|c| c.book.as_str()).collect();
        CommandmentStats {
            total: self.items.len(),
            positive: self.by_polarity(Polarity::Positive).len(),
            negative: self.by_polarity(Polarity::Negative).len(),
            categories: self.categories().len(),
            books: books.len(),
        }
    }

    /// The commandments given in Exodus 20.
    pub fn ten_commandments(&self) -> Vec<&Commandment> {
        self.by_chapter("exodus", 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\u{FEFF}number,concept,polarity,reference,english,hebrew,greek,parashah,chinuch,mt_num,mt_name,mt_cat,category\r\n\
1,To know there is a God,P,EXO 20:2,I am the LORD thy God,,,Yitro,25,1,Madda,Foundations,Relationship with God\r\n\
2,Not to entertain thoughts of other gods,N,EXO 20:3,Thou shalt have no other gods,,,Yitro,26,1,Madda,Foundations,Relationship with God\r\n\
x,Broken row,P,GEN 1:1,,,,,,,,,\r\n\
3,To honor father and mother,P,EXO 20:12,\"Honour thy father, and thy mother\",,,Yitro,33,14,Shoftim,Rebels,Family & Home\r\n\
4,Not to eat a limb,Q,GEN 9:4,,,,,,,,,Food\r\n\
5,To circumcise,P,GEN 17:10,,,,Lech Lecha,2,2,Ahavah,Circumcision,Family & Home\r\n";

    #[test]
    fn test_parse_skips_bad_rows() {
        let set = parse_commandments(CSV);
        assert_eq!(set.len(), 4);
        assert!(set.get(4).is_none());

        let c = set.get(3).unwrap();
        assert_eq!(c.polarity, Polarity::Positive);
        assert_eq!(c.scripture_english, "Honour thy father, and thy mother");
        assert_eq!(c.book, "exodus");
        assert_eq!(c.chapter, 20);
        assert_eq!(c.slug, "commandment-3");
        assert_eq!(c.sefer_hachinuch_number, 33);
        assert_eq!(c.display_reference(), "Exodus 20:12");
        assert_eq!(c.category_slug(), "family-and-home");
    }

    #[test]
    fn test_queries() {
        let set = parse_commandments(CSV);
        assert_eq!(set.ten_commandments().len(), 3);
        assert_eq!(set.by_book("genesis").len(), 1);
        assert_eq!(set.by_polarity(Polarity::Negative).len(), 1);
        assert_eq!(set.by_category_slug("relationship-with-god").len(), 2);

        let categories = set.categories();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Relationship with God");
        assert_eq!((categories[0].positive, categories[0].negative), (1, 1));

        let chapters = set.chapters_with_commandments();
        assert_eq!(chapters[0].book_slug, "exodus");
        assert_eq!(chapters[0].numbers, vec![1, 2, 3]);

        let stats = set.stats();
        assert_eq!(stats, CommandmentStats { total: 4, positive: 3, negative: 1, categories: 2, books: 2 });
    }

    #[test]
    fn test_entry_shape() {
        let set = parse_commandments(CSV);
        let entry = set.get(1).unwrap().to_entry();
        assert_eq!(entry.id, "1");
        assert_eq!(entry.slug, "commandment-1");
        assert_eq!(entry.fields.get("reference").map(|s| s.as_str()), Some("Exodus 20:2"));
        assert_eq!(entry.source_reference.map(|r| r.verse_key()), Some("exodus-20-2".to_string()));
    }
}
