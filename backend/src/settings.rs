use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::CatalogError;

/// Points added by each bridge scoring rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    /// Shared exact verse
    pub verse: u32,
    /// Shared chapter, only when no verse matches
    pub chapter: u32,
    pub name_in_text: u32,
    pub name_in_category: u32,
    /// Per contained keyword
    pub keyword: u32,
}

impl Default for RuleWeights {
    fn default() -> Self {
        RuleWeights {
            verse: 3,
            chapter: 1,
            name_in_text: 3,
            name_in_category: 2,
            keyword: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgePolicy {
    /// Minimum pair score for an edge.
    pub threshold: u32,
    /// Minimum number of qualifying targets for a topic to be bridged at all.
    pub min_fan_out: usize,
    /// Names and keywords shorter than this never match text.
    pub min_token_len: usize,
    pub weights: RuleWeights,
}

impl Default for BridgePolicy {
    fn default() -> Self {
        BridgePolicy {
            threshold: 6,
            min_fan_out: 3,
            min_token_len: 4,
            weights: RuleWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainPolicy {
    pub min_books: usize,
    pub require_both_testaments: bool,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        ChainPolicy {
            min_books: 4,
            require_both_testaments: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bridge: BridgePolicy,
    pub chain: ChainPolicy,
}

impl Settings {
    /// Read settings from a JSON file. A missing file gives the defaults,
    /// and fields absent from the file keep their default values.
    pub fn load(path: &Path) -> Result<Settings, CatalogError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => return Err(CatalogError::Io { path: path.to_path_buf(), source: e }),
        };

        serde_json::from_str(&text).map_err(|e| CatalogError::CorruptSource {
            dataset: "settings".to_string(),
            message: e.to_string(),
        })
    }
}
