//! Offline generation of the derived JSON files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;

use crate::bridge::{BridgeEdge, BridgeStats, RelatedTopic};
use crate::catalog::Catalog;
use crate::logger::info;
use crate::strongs::StrongsEntry;
use crate::types::Language;

/// Number of topics listed by verse count in the topical dictionary summary.
pub const TOP_VERSE_COUNT: usize = 50;

#[derive(Serialize)]
struct BridgeFile<'a> {
    stats: BridgeStats,
    #[serde(rename = "topicToCommandments")]
    forward: &'a IndexMap<String, Vec<BridgeEdge<u32>>>,
    #[serde(rename = "commandmentToTopics")]
    reverse: &'a BTreeMap<u32, Vec<RelatedTopic>>,
}

fn write_json<T: Serialize + ?Sized>(out_dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    let path = out_dir.join(file_name);
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", file_name))?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info(&format!("Wrote {}", path.display()));
    Ok(path)
}

/// Write every derived dataset into `out_dir` as pretty JSON. Returns the written paths.
pub fn write_outputs(catalog: &Catalog, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut written = Vec::new();

    for language in [Language::Hebrew, Language::Greek] {
        let lexicon = catalog.strongs(language)
            .with_context(|| format!("Failed to load Strong's {} dictionary", language.as_str()))?;

        let by_number: IndexMap<&str, &StrongsEntry> = lexicon.all()
            .iter()
            .map(|e| (e.number.as_str(), e))
            .collect();

        written.push(write_json(out_dir, &format!("strongs-{}.json", language.as_str()), &by_number)?);
        written.push(write_json(out_dir, &format!("strongs-{}-index.json", language.as_str()), lexicon.letter_index())?);
    }

    let naves = catalog.nave_topics().context("Failed to load the topical dictionary")?;
    written.push(write_json(out_dir, "naves-topics.json", naves.all())?);
    written.push(write_json(out_dir, "naves-summary.json", &naves.summary(TOP_VERSE_COUNT))?);

    let chains = catalog.chains().context("Failed to build chain studies")?;
    written.push(write_json(out_dir, "chain-studies.json", chains.all())?);
    written.push(write_json(out_dir, "chain-stats.json", &chains.stats())?);

    let bridge = catalog.bridge().context("Failed to build the commandment bridge")?;
    let bridge_file = BridgeFile {
        stats: bridge.stats(),
        forward: &bridge.forward,
        reverse: &bridge.reverse,
    };
    written.push(write_json(out_dir, "commandment-topic-bridge.json", &bridge_file)?);

    Ok(written)
}
