//! Relevance bridge between topics and a target dataset (commandments).
//!
//! Each (topic, target) pair is scored by a list of independent rules and the
//! points are summed. A pair is an edge when the sum reaches the policy threshold,
//! and a topic is bridged only when it has enough edges. The reverse map is
//! filled from the same edges, so both directions always agree.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

use crate::commandments::Commandment;
use crate::logger::{info, warn};
use crate::reference::{ChapterId, Reference, VerseId};
use crate::settings::BridgePolicy;
use crate::topics::TopicEntry;

/// Something topics are linked from.
pub trait BridgeSource: Sync {
    fn slug(&self) -> &str;
    fn name(&self) -> &str;
    fn category(&self) -> &str;
    fn keywords(&self) -> &[String];
    fn references(&self) -> Vec<Reference>;
}

/// Something topics are linked to.
pub trait BridgeTarget: Sync {
    type Id: Clone + Ord + Send + Sync;

    fn target_id(&self) -> Self::Id;
    /// The text names and keywords are searched in.
    fn primary_text(&self) -> &str;
    fn category(&self) -> &str;
    fn reference(&self) -> Option<Reference>;
}

/// Lower-cased, precomputed view of a source.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub name: String,
    /// Explicit keywords and name tokens, lower-cased, first-seen order, no duplicates.
    pub keywords: Vec<String>,
    pub verses: HashSet<VerseId>,
    pub chapters: HashSet<ChapterId>,
}

impl SourceProfile {
    pub fn new<S: BridgeSource + ?Sized>(source: &S) -> Self {
        let name = source.name().trim().to_lowercase();

        let mut keywords: Vec<String> = Vec::new();
        let candidates = source.keywords()
            .iter()
            .map(|k| k.trim().to_lowercase())
            .chain(name.split_whitespace().map(str::to_string));
        for kw in candidates {
            if !kw.is_empty() && !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }

        let refs = source.references();
        SourceProfile {
            name,
            keywords,
            verses: refs.iter().filter_map(|r| r.verse_id()).collect(),
            chapters: refs.iter().map(|r| r.chapter_id()).collect(),
        }
    }
}

/// Lower-cased, precomputed view of a target.
#[derive(Debug, Clone)]
pub struct TargetProfile {
    pub text: String,
    pub category: String,
    pub verse: Option<VerseId>,
    pub chapter: Option<ChapterId>,
}

impl TargetProfile {
    pub fn new<T: BridgeTarget + ?Sized>(target: &T) -> Self {
        let reference = target.reference();
        TargetProfile {
            text: target.primary_text().to_lowercase(),
            category: target.category().to_lowercase(),
            verse: reference.and_then(|r| r.verse_id()),
            chapter: reference.map(|r| r.chapter_id()),
        }
    }
}

fn long_enough(token: &str, policy: &BridgePolicy) -> bool {
    token.chars().count() >= policy.min_token_len
}

pub trait ScoringRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn score(&self, source: &SourceProfile, target: &TargetProfile, policy: &BridgePolicy) -> u32;
}

/// Exact shared verse, or failing that a shared chapter.
pub struct VerseOverlap;

impl ScoringRule for VerseOverlap {
    fn name(&self) -> &'static str {
        "verse-overlap"
    }

    fn score(&self, source: &SourceProfile, target: &TargetProfile, policy: &BridgePolicy) -> u32 {
        if target.verse.is_some_and(|v| source.verses.contains(&v)) {
            policy.weights.verse
        } else if target.chapter.is_some_and(|c| source.chapters.contains(&c)) {
            policy.weights.chapter
        } else {
            0
        }
    }
}

/// The whole topic name appears in the target text.
pub struct NameInText;

impl ScoringRule for NameInText {
    fn name(&self) -> &'static str {
        "name-in-text"
    }

    fn score(&self, source: &SourceProfile, target: &TargetProfile, policy: &BridgePolicy) -> u32 {
        if long_enough(&source.name, policy) && target.text.contains(&source.name) {
            policy.weights.name_in_text
        } else {
            0
        }
    }
}

/// The whole topic name appears in the target category.
pub struct NameInCategory;

impl ScoringRule for NameInCategory {
    fn name(&self) -> &'static str {
        "name-in-category"
    }

    fn score(&self, source: &SourceProfile, target: &TargetProfile, policy: &BridgePolicy) -> u32 {
        if long_enough(&source.name, policy) && target.category.contains(&source.name) {
            policy.weights.name_in_category
        } else {
            0
        }
    }
}

/// Points for every keyword found in the target text.
pub struct KeywordContainment;

impl ScoringRule for KeywordContainment {
    fn name(&self) -> &'static str {
        "keyword-containment"
    }

    fn score(&self, source: &SourceProfile, target: &TargetProfile, policy: &BridgePolicy) -> u32 {
        let hits = source.keywords
            .iter()
            .filter(|kw| long_enough(kw, policy) && target.text.contains(kw.as_str()))
            .count() as u32;
        hits * policy.weights.keyword
    }
}

pub fn default_rules() -> Vec<Box<dyn ScoringRule>> {
    vec![
        Box::new(VerseOverlap),
        Box::new(KeywordContainment),
        Box::new(NameInText),
        Box::new(NameInCategory),
    ]
}

pub fn score_pair(
    rules: &[Box<dyn ScoringRule>],
    source: &SourceProfile,
    target: &TargetProfile,
    policy: &BridgePolicy,
) -> u32 {
    rules.iter().map(|r| r.score(source, target, policy)).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeEdge<Id> {
    pub target: Id,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedTopic {
    pub slug: String,
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStats {
    pub bridged_topics: usize,
    pub distinct_targets: usize,
    /// Rounded to the nearest whole number.
    pub average_targets_per_topic: usize,
}

/// Topic slug → edges, and target id → topics.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeMapping<Id: Ord> {
    pub forward: IndexMap<String, Vec<BridgeEdge<Id>>>,
    pub reverse: BTreeMap<Id, Vec<RelatedTopic>>,
}

impl<Id: Ord> Default for BridgeMapping<Id> {
    fn default() -> Self {
        BridgeMapping { forward: IndexMap::new(), reverse: BTreeMap::new() }
    }
}

impl<Id: Clone + Ord> BridgeMapping<Id> {
    pub fn targets_for(&self, slug: &str) -> &[BridgeEdge<Id>] {
        self.forward.get(slug).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn topics_for(&self, id: &Id) -> &[RelatedTopic] {
        self.reverse.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn topic_slugs(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(|k| k.as_str())
    }

    pub fn stats(&self) -> BridgeStats {
        let bridged_topics = self.forward.len();
        let total_edges: usize = self.forward.values().map(|v| v.len()).sum();
        let average = if bridged_topics == 0 {
            0
        } else {
            (total_edges as f64 / bridged_topics as f64).round() as usize
        };
        BridgeStats {
            bridged_topics,
            distinct_targets: self.reverse.len(),
            average_targets_per_topic: average,
        }
    }
}

/// Score every source against every target and keep qualifying edges.
///
/// Sources are scored in parallel and collected in input order, so forward
/// lists follow target input order and reverse lists follow source input order.
pub fn build_bridge<S, T>(
    sources: &[S],
    targets: &[T],
    rules: &[Box<dyn ScoringRule>],
    policy: &BridgePolicy,
) -> BridgeMapping<T::Id>
where
    S: BridgeSource,
    T: BridgeTarget,
{
    let target_profiles: Vec<TargetProfile> = targets.par_iter().map(TargetProfile::new).collect();

    let scored: Vec<Vec<(usize, u32)>> = sources
        .par_iter()
        .map(|source| {
            let profile = SourceProfile::new(source);
            target_profiles
                .iter()
                .enumerate()
                .filter_map(|(i, tp)| {
                    let score = score_pair(rules, &profile, tp, policy);
                    (score >= policy.threshold).then_some((i, score))
                })
                .collect()
        })
        .collect();

    let mut mapping = BridgeMapping::default();

    for (source, edges) in sources.iter().zip(scored) {
        if edges.len() < policy.min_fan_out || edges.is_empty() {
            continue;
        }
        if mapping.forward.contains_key(source.slug()) {
            warn(&format!("Duplicate topic slug '{}' in bridge input, keeping the first", source.slug()));
            continue;
        }

        for &(i, score) in &edges {
            mapping.reverse
                .entry(targets[i].target_id())
                .or_insert_with(Vec::new)
                .push(RelatedTopic {
                    slug: source.slug().to_string(),
                    name: source.name().to_string(),
                    score,
                });
        }

        let forward_edges = edges
            .into_iter()
            .map(|(i, score)| BridgeEdge { target: targets[i].target_id(), score })
            .collect();
        mapping.forward.insert(source.slug().to_string(), forward_edges);
    }

    info(&format!(
        "Bridged {} of {} topics to {} targets",
        mapping.forward.len(),
        sources.len(),
        mapping.reverse.len()
    ));

    mapping
}

impl BridgeSource for TopicEntry {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn references(&self) -> Vec<Reference> {
        TopicEntry::references(self)
    }
}

impl BridgeTarget for Commandment {
    type Id = u32;

    fn target_id(&self) -> u32 {
        self.number
    }

    fn primary_text(&self) -> &str {
        &self.concept
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn reference(&self) -> Option<Reference> {
        self.reference
    }
}
