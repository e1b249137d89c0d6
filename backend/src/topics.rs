//! Curated topics from `topics.json`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::logger::{debug, info};
use crate::reference::Reference;
use crate::slug::slugify;
use crate::types::{CatalogError, Dataset, DictionaryEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicEntry {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: String,
    /// Verse keys, "exodus-20-2"
    #[serde(default)]
    pub verse_refs: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TopicsFile {
    #[serde(default)]
    topics: Vec<TopicEntry>,
}

impl TopicEntry {
    /// Verse keys resolved against the canon. Unknown keys are dropped.
    pub fn references(&self) -> Vec<Reference> {
        self.verse_refs.iter().filter_map(|k| Reference::from_key(k)).collect()
    }

    pub fn to_entry(&self) -> DictionaryEntry {
        let mut fields = IndexMap::new();
        fields.insert("category".to_string(), self.category.clone());
        fields.insert("keywords".to_string(), self.keywords.join(", "));
        fields.insert("verseRefs".to_string(), self.verse_refs.join(", "));

        DictionaryEntry {
            id: self.slug.clone(),
            title: self.name.clone(),
            slug: self.slug.clone(),
            fields,
            source_reference: self.references().into_iter().next(),
        }
    }
}

/// Parse `{"topics": [...]}`. Topics without a slug get one from their name.
pub fn parse_topics(text: &str) -> Result<Vec<TopicEntry>, CatalogError> {
    let file: TopicsFile = serde_json::from_str(text).map_err(|e| CatalogError::CorruptSource {
        dataset: Dataset::Topics.to_string(),
        message: e.to_string(),
    })?;

    let mut topics = file.topics;
    for t in topics.iter_mut() {
        if t.slug.trim().is_empty() {
            t.slug = slugify(&t.name);
            debug(&format!("Topic '{}' has no slug, using '{}'", t.name, t.slug));
        }
    }

    info(&format!("Parsed {} topics", topics.len()));
    Ok(topics)
}
