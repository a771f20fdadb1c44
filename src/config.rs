//! Configuration: source URL lists, the ASN-to-provider map and run settings.
//!
//! Everything here is loaded once at start-up and passed down explicitly.

use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCES_FILE: &str = "data/sources/sources.json";
pub const DEFAULT_ASN_FILE: &str = "data/asn/providers.json";
pub const DEFAULT_OUTPUT_DIR: &str = "lists";
pub const USER_AGENT: &str = concat!("cloud-ip-lists/", env!("CARGO_PKG_VERSION"));

/// Marker in a replacement URL that is substituted with a date found in a pre-download.
pub const DATE_PLACEHOLDER: &str = "%YYYYMMDD%";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ConfigError::Json {
        path: path.to_path_buf(),
        json_path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

/// Where to download provider documents from (`sources.json`).
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Sources {
    /// Pages fetched first to discover URLs that change over time (Azure).
    #[serde(default)]
    pub pre_download_list: BTreeMap<String, String>,
    /// Provider documents, keyed by provider name (`name_ipv4`/`name_ipv6` for split feeds).
    #[serde(default)]
    pub download_list: BTreeMap<String, String>,
    /// URL templates containing [`DATE_PLACEHOLDER`], keyed by provider name.
    #[serde(default)]
    pub replace_download_list: BTreeMap<String, String>,
}

impl Sources {
    pub fn load(path: &Path) -> Result<Sources, ConfigError> {
        let sources: Sources = read_json(path)?;
        log::info!(
            "Loaded {} source URL(s) and {} pre-download URL(s) from {}",
            sources.download_list.len(),
            sources.pre_download_list.len(),
            path.display()
        );
        Ok(sources)
    }
}

/// Which ASNs belong to which provider (`providers.json`).
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AsnConfig {
    pub providers: BTreeMap<String, Vec<u32>>,
}

impl AsnConfig {
    pub fn load(path: &Path) -> Result<AsnConfig, ConfigError> {
        let config: AsnConfig = read_json(path)?;
        log::info!(
            "Loaded ASN map for {} provider(s) from {}",
            config.providers.len(),
            path.display()
        );
        Ok(config)
    }

    /// Reverse index ASN -> provider name. The first provider listing an ASN keeps it.
    pub fn index(&self) -> HashMap<u32, &str> {
        let mut index = HashMap::new();
        for (provider, asns) in &self.providers {
            for asn in asns {
                match index.entry(*asn) {
                    Entry::Occupied(existing) => log::warn!(
                        "AS{asn} listed for both '{}' and '{provider}', keeping '{}'",
                        existing.get(),
                        existing.get()
                    ),
                    Entry::Vacant(slot) => {
                        slot.insert(provider.as_str());
                    }
                }
            }
        }
        index
    }
}

/// Resolved run settings, after `.env`, environment and command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sources_file: PathBuf,
    pub asn_file: PathBuf,
    pub output_dir: PathBuf,
    pub user_agent: String,
}
