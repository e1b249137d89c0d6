use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reference::Reference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "hebrew")]
    Hebrew,
    #[serde(rename = "greek")]
    Greek,
}

impl Language {
    /// Strong's number prefix, "H" or "G".
    pub fn prefix(&self) -> char {
        match self {
            Language::Hebrew => 'H',
            Language::Greek => 'G',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Hebrew => "hebrew",
            Language::Greek => "greek",
        }
    }
}

/// The raw datasets known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dataset {
    #[serde(rename = "commandments")]
    Commandments,
    #[serde(rename = "topics")]
    Topics,
    #[serde(rename = "naves")]
    Naves,
    #[serde(rename = "strongs-hebrew")]
    StrongsHebrew,
    #[serde(rename = "strongs-greek")]
    StrongsGreek,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Commandments,
        Dataset::Topics,
        Dataset::Naves,
        Dataset::StrongsHebrew,
        Dataset::StrongsGreek,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Commandments => "commandments",
            Dataset::Topics => "topics",
            Dataset::Naves => "naves",
            Dataset::StrongsHebrew => "strongs-hebrew",
            Dataset::StrongsGreek => "strongs-greek",
        }
    }

    pub fn language(&self) -> Option<Language> {
        match self {
            Dataset::StrongsHebrew => Some(Language::Hebrew),
            Dataset::StrongsGreek => Some(Language::Greek),
            _ => None,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid dataset name: {0}")]
pub struct ParseDatasetError(String);

impl FromStr for Dataset {
    type Err = ParseDatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "commandments" => Ok(Dataset::Commandments),
            "topics" => Ok(Dataset::Topics),
            "naves" => Ok(Dataset::Naves),
            "strongs-hebrew" | "hebrew" => Ok(Dataset::StrongsHebrew),
            "strongs-greek" | "greek" => Ok(Dataset::StrongsGreek),
            _ => Err(ParseDatasetError(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt {dataset} source: {message}")]
    CorruptSource { dataset: String, message: String },

    #[error("No `{variable}` assignment found in {path}")]
    MissingPayload { path: PathBuf, variable: String },
}

/// A dataset row in the generic shape shared by all datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryEntry {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub fields: IndexMap<String, String>,
    pub source_reference: Option<Reference>,
}
