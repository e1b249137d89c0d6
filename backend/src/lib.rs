pub mod types;
pub mod logger;
pub mod settings;
pub mod lazy_cache;

pub mod canon;
pub mod reference;
pub mod slug;
pub mod letter_index;
pub mod csv_tokenizer;

pub mod commandments;
pub mod topics;
pub mod naves;
pub mod strongs;

pub mod bridge;
pub mod chains;
pub mod catalog;
pub mod export;

use std::env;
use std::fs::create_dir_all;
use std::path::PathBuf;
use std::error::Error;
use app_dirs::{get_app_root, AppDataType, AppInfo};

pub use catalog::{get_catalog, init_catalog, Catalog, DataPaths};
pub use reference::{parse_reference, Reference};
pub use types::{CatalogError, Dataset, DictionaryEntry, Language};

pub const APP_INFO: AppInfo = AppInfo{name: "scriptorium", author: "scriptorium"};

/// Application directory for logs. `SCRIPTORIUM_DIR` overrides the platform default.
pub fn get_create_scriptorium_dir() -> Result<PathBuf, Box<dyn Error>> {
    let p = match env::var("SCRIPTORIUM_DIR") {
        Ok(s) if !s.trim().is_empty() => PathBuf::from(s),
        _ => get_app_root(AppDataType::UserData, &APP_INFO)?,
    };
    if !p.exists() {
        create_dir_all(&p)?;
    }
    Ok(p)
}
