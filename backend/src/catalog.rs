//! The query surface over all datasets.
//!
//! Every dataset and derived index sits in its own [`LazyCache`], filled on first
//! access. A missing source file gives an empty dataset. A corrupt one returns
//! [`CatalogError`] and leaves the cache empty, so the next call reads again.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::bridge::{build_bridge, default_rules, BridgeMapping, BridgeStats, RelatedTopic};
use crate::chains::{build_chains, ChainIndex, ChainStats, ChainStudy};
use crate::commandments::{parse_commandments, Commandment, CommandmentSet};
use crate::lazy_cache::LazyCache;
use crate::letter_index::{build_index, build_title_index, LetterIndex};
use crate::logger::{info, timed, warn};
use crate::naves::{parse_naves, NaveIndex};
use crate::settings::Settings;
use crate::strongs::{parse_lexicon, Lexicon};
use crate::topics::{parse_topics, TopicEntry};
use crate::types::{CatalogError, Dataset, DictionaryEntry, Language};

pub const HEBREW_VARIABLE: &str = "strongsHebrewDictionary";
pub const GREEK_VARIABLE: &str = "strongsGreekDictionary";

/// Source file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub commandments: PathBuf,
    pub topics: PathBuf,
    pub naves: PathBuf,
    pub strongs_hebrew: PathBuf,
    pub strongs_greek: PathBuf,
    pub hebrew_variable: String,
    pub greek_variable: String,
    pub settings: PathBuf,
}

impl DataPaths {
    pub fn from_data_dir(data_dir: &Path) -> Self {
        DataPaths {
            commandments: data_dir.join("bible-data").join("BibleData-Commandments.csv"),
            topics: data_dir.join("topics.json"),
            naves: data_dir.join("sword-modules").join("naves-raw.csv"),
            strongs_hebrew: data_dir.join("sword-modules").join("strongs-hebrew-raw.js"),
            strongs_greek: data_dir.join("sword-modules").join("strongs-greek-raw.js"),
            hebrew_variable: HEBREW_VARIABLE.to_string(),
            greek_variable: GREEK_VARIABLE.to_string(),
            settings: data_dir.join("settings.json"),
        }
    }

    pub fn path_for(&self, dataset: Dataset) -> &Path {
        match dataset {
            Dataset::Commandments => &self.commandments,
            Dataset::Topics => &self.topics,
            Dataset::Naves => &self.naves,
            Dataset::StrongsHebrew => &self.strongs_hebrew,
            Dataset::StrongsGreek => &self.strongs_greek,
        }
    }
}

/// Reads raw source text. `Ok(None)` means the source does not exist.
pub trait SourceReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Option<String>, CatalogError>;
}

pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read(&self, path: &Path) -> Result<Option<String>, CatalogError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CatalogError::Io { path: path.to_path_buf(), source: e }),
        }
    }
}

/// One dataset in the generic entry shape, with slug lookup and letter index.
/// Lexicons are bucketed by the slug after the number prefix, every other dataset by title.
#[derive(Debug, Clone)]
pub struct EntryTable {
    entries: Vec<DictionaryEntry>,
    by_slug: HashMap<String, usize>,
    index: LetterIndex,
}

impl EntryTable {
    pub fn new(dataset: Dataset, entries: Vec<DictionaryEntry>) -> Self {
        let mut by_slug = HashMap::new();
        for (i, e) in entries.iter().enumerate() {
            by_slug.entry(e.slug.clone()).or_insert(i);
        }
        let index = match dataset.language() {
            Some(_) => build_index(entries.iter().map(|e| (e.id.as_str(), e.slug.as_str()))),
            None => build_title_index(entries.iter().map(|e| (e.id.as_str(), e.slug.as_str(), e.title.as_str()))),
        };
        EntryTable { entries, by_slug, index }
    }

    pub fn all(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&DictionaryEntry> {
        self.by_slug.get(slug).map(|&i| &self.entries[i])
    }

    pub fn letter_index(&self) -> &LetterIndex {
        &self.index
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedCommandment {
    pub commandment: Commandment,
    pub score: u32,
}

pub struct Catalog {
    paths: DataPaths,
    settings: Settings,
    reader: Box<dyn SourceReader>,
    commandments: LazyCache<CommandmentSet>,
    topics: LazyCache<Vec<TopicEntry>>,
    naves: LazyCache<NaveIndex>,
    hebrew: LazyCache<Lexicon>,
    greek: LazyCache<Lexicon>,
    bridge: LazyCache<BridgeMapping<u32>>,
    chains: LazyCache<ChainIndex>,
    commandment_table: LazyCache<EntryTable>,
    topic_table: LazyCache<EntryTable>,
    nave_table: LazyCache<EntryTable>,
    hebrew_table: LazyCache<EntryTable>,
    greek_table: LazyCache<EntryTable>,
}

pub static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// Install the process-wide catalog. Returns false if one is already installed.
pub fn init_catalog(catalog: Catalog) -> bool {
    CATALOG.set(catalog).is_ok()
}

pub fn get_catalog() -> Option<&'static Catalog> {
    CATALOG.get()
}

impl Catalog {
    pub fn new(paths: DataPaths, settings: Settings) -> Self {
        Catalog::with_reader(paths, settings, Box::new(FsSourceReader))
    }

    pub fn with_reader(paths: DataPaths, settings: Settings, reader: Box<dyn SourceReader>) -> Self {
        Catalog {
            paths,
            settings,
            reader,
            commandments: LazyCache::new(),
            topics: LazyCache::new(),
            naves: LazyCache::new(),
            hebrew: LazyCache::new(),
            greek: LazyCache::new(),
            bridge: LazyCache::new(),
            chains: LazyCache::new(),
            commandment_table: LazyCache::new(),
            topic_table: LazyCache::new(),
            nave_table: LazyCache::new(),
            hebrew_table: LazyCache::new(),
            greek_table: LazyCache::new(),
        }
    }

    /// Catalog over the default layout of `data_dir`, with `settings.json` applied if present.
    pub fn open(data_dir: &Path) -> Result<Self, CatalogError> {
        let paths = DataPaths::from_data_dir(data_dir);
        let settings = Settings::load(&paths.settings)?;
        Ok(Catalog::new(paths, settings))
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn read_source(&self, dataset: Dataset) -> Result<Option<String>, CatalogError> {
        let path = self.paths.path_for(dataset);
        let text = self.reader.read(path)?;
        if text.is_none() {
            warn(&format!("Source for {} not found at {}, using an empty dataset", dataset, path.display()));
        }
        Ok(text)
    }

    // === Datasets ===

    pub fn commandments(&self) -> Result<Arc<CommandmentSet>, CatalogError> {
        self.commandments.get_or_try_init(|| {
            let set = match self.read_source(Dataset::Commandments)? {
                Some(text) => timed("parse commandments", || parse_commandments(&text)),
                None => CommandmentSet::new(Vec::new()),
            };
            Ok(set)
        })
    }

    pub fn topics(&self) -> Result<Arc<Vec<TopicEntry>>, CatalogError> {
        self.topics.get_or_try_init(|| match self.read_source(Dataset::Topics)? {
            Some(text) => parse_topics(&text),
            None => Ok(Vec::new()),
        })
    }

    pub fn nave_topics(&self) -> Result<Arc<NaveIndex>, CatalogError> {
        self.naves.get_or_try_init(|| {
            let topics = match self.read_source(Dataset::Naves)? {
                Some(text) => timed("parse naves", || parse_naves(&text)),
                None => Vec::new(),
            };
            Ok(NaveIndex::new(topics))
        })
    }

    pub fn strongs(&self, language: Language) -> Result<Arc<Lexicon>, CatalogError> {
        let (cache, dataset, variable) = match language {
            Language::Hebrew => (&self.hebrew, Dataset::StrongsHebrew, &self.paths.hebrew_variable),
            Language::Greek => (&self.greek, Dataset::StrongsGreek, &self.paths.greek_variable),
        };
        cache.get_or_try_init(|| match self.read_source(dataset)? {
            Some(text) => timed(&format!("parse {}", dataset), || {
                parse_lexicon(&text, variable, language, self.paths.path_for(dataset))
            }),
            None => Ok(Lexicon::empty(language)),
        })
    }

    // === Generic entries ===

    fn table_cache(&self, dataset: Dataset) -> &LazyCache<EntryTable> {
        match dataset {
            Dataset::Commandments => &self.commandment_table,
            Dataset::Topics => &self.topic_table,
            Dataset::Naves => &self.nave_table,
            Dataset::StrongsHebrew => &self.hebrew_table,
            Dataset::StrongsGreek => &self.greek_table,
        }
    }

    pub fn all_entries(&self, dataset: Dataset) -> Result<Arc<EntryTable>, CatalogError> {
        self.table_cache(dataset).get_or_try_init(|| {
            let entries: Vec<DictionaryEntry> = match dataset {
                Dataset::Commandments => self.commandments()?.all().iter().map(|c| c.to_entry()).collect(),
                Dataset::Topics => self.topics()?.iter().map(|t| t.to_entry()).collect(),
                Dataset::Naves => self.nave_topics()?.all().iter().map(|t| t.to_entry()).collect(),
                Dataset::StrongsHebrew | Dataset::StrongsGreek => {
                    let language = dataset.language().unwrap_or(Language::Hebrew);
                    self.strongs(language)?.all().iter().map(|e| e.to_entry()).collect()
                }
            };
            Ok(EntryTable::new(dataset, entries))
        })
    }

    pub fn entries(&self, dataset: Dataset) -> Result<Vec<DictionaryEntry>, CatalogError> {
        Ok(self.all_entries(dataset)?.all().to_vec())
    }

    pub fn entry_by_slug(&self, dataset: Dataset, slug: &str) -> Result<Option<DictionaryEntry>, CatalogError> {
        Ok(self.all_entries(dataset)?.get(slug).cloned())
    }

    pub fn letter_index(&self, dataset: Dataset) -> Result<LetterIndex, CatalogError> {
        Ok(self.all_entries(dataset)?.letter_index().clone())
    }

    // === Bridge ===

    pub fn bridge(&self) -> Result<Arc<BridgeMapping<u32>>, CatalogError> {
        self.bridge.get_or_try_init(|| {
            let topics = self.topics()?;
            let commandments = self.commandments()?;
            let rules = default_rules();
            Ok(timed("build bridge", || {
                build_bridge(topics.as_slice(), commandments.all(), &rules, &self.settings.bridge)
            }))
        })
    }

    /// Commandments linked to a topic, in commandment list order.
    pub fn bridge_for(&self, topic_slug: &str) -> Result<Vec<RelatedCommandment>, CatalogError> {
        let bridge = self.bridge()?;
        let commandments = self.commandments()?;
        Ok(bridge.targets_for(topic_slug)
            .iter()
            .filter_map(|edge| {
                commandments.get(edge.target).map(|c| RelatedCommandment {
                    commandment: c.clone(),
                    score: edge.score,
                })
            })
            .collect())
    }

    pub fn topics_for_commandment(&self, number: u32) -> Result<Vec<RelatedTopic>, CatalogError> {
        Ok(self.bridge()?.topics_for(&number).to_vec())
    }

    pub fn bridge_stats(&self) -> Result<BridgeStats, CatalogError> {
        Ok(self.bridge()?.stats())
    }

    // === Chains ===

    pub fn chains(&self) -> Result<Arc<ChainIndex>, CatalogError> {
        self.chains.get_or_try_init(|| {
            let naves = self.nave_topics()?;
            Ok(ChainIndex::new(build_chains(naves.all(), &self.settings.chain)))
        })
    }

    pub fn chain_by_slug(&self, slug: &str) -> Result<Option<ChainStudy>, CatalogError> {
        Ok(self.chains()?.get(slug).cloned())
    }

    pub fn all_chains(&self) -> Result<Vec<ChainStudy>, CatalogError> {
        Ok(self.chains()?.all().to_vec())
    }

    pub fn chain_stats(&self) -> Result<ChainStats, CatalogError> {
        Ok(self.chains()?.stats())
    }

    pub fn related_chains(&self, slug: &str, limit: usize) -> Result<Vec<ChainStudy>, CatalogError> {
        Ok(self.chains()?.related(slug, limit).into_iter().cloned().collect())
    }

    pub fn featured_chains(&self, limit: usize) -> Result<Vec<ChainStudy>, CatalogError> {
        Ok(self.chains()?.featured(limit).into_iter().cloned().collect())
    }

    /// Parse every dataset and build every derived index now.
    pub fn warm_up(&self) -> Result<(), CatalogError> {
        for dataset in Dataset::ALL {
            let table = self.all_entries(dataset)?;
            info(&format!("{}: {} entries", dataset, table.len()));
        }
        self.bridge()?;
        self.chains()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let paths = DataPaths::from_data_dir(Path::new("/data"));
        assert_eq!(paths.commandments, Path::new("/data/bible-data/BibleData-Commandments.csv"));
        assert_eq!(paths.path_for(Dataset::StrongsGreek), Path::new("/data/sword-modules/strongs-greek-raw.js"));
        assert_eq!(paths.hebrew_variable, "strongsHebrewDictionary");
    }

    #[test]
    fn test_missing_sources_give_empty_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::open(dir.path()).unwrap();

        for dataset in Dataset::ALL {
            assert!(catalog.all_entries(dataset).unwrap().is_empty());
            assert_eq!(catalog.entry_by_slug(dataset, "anything").unwrap(), None);
        }
        assert!(catalog.bridge_for("god").unwrap().is_empty());
        assert_eq!(catalog.bridge_stats().unwrap().bridged_topics, 0);
        assert_eq!(catalog.chain_stats().unwrap(), ChainStats::default());
        assert!(catalog.strongs(Language::Greek).unwrap().is_empty());
    }

    #[test]
    fn test_each_dataset_has_its_own_table() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::open(dir.path()).unwrap();

        catalog.all_entries(Dataset::Naves).unwrap();
        for dataset in Dataset::ALL {
            assert_eq!(catalog.table_cache(dataset).is_initialized(), dataset == Dataset::Naves);
        }

        catalog.warm_up().unwrap();
        assert!(Dataset::ALL.iter().all(|&d| catalog.table_cache(d).is_initialized()));
    }
}
