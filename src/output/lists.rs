//! List files on disk.
//!
//! For every provider a directory gets `<name>.txt` (both families), `<name>-ipv4.txt`
//! and `<name>-ipv6.txt`, plus the same three files under `aggregated/`.
//! Files hold one CIDR per line without a trailing newline.

use crate::models::Family;
use crate::providers::ProviderLists;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory holding the aggregated variants.
pub const AGGREGATED_DIR: &str = "aggregated";

/// Writes provider lists below one directory.
#[derive(Debug, Clone)]
pub struct ListWriter {
    dir: PathBuf,
}

impl ListWriter {
    pub fn new(dir: impl Into<PathBuf>) -> ListWriter {
        ListWriter { dir: dir.into() }
    }

    /// Write the source and aggregated lists of one provider.
    ///
    /// # Returns
    /// The paths written, in write order.
    pub fn write_provider(
        &self,
        name: &str,
        source: &ProviderLists,
        aggregated: &ProviderLists,
    ) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        let mut written = write_lists(&self.dir, name, source)?;
        written.extend(write_lists(&self.dir.join(AGGREGATED_DIR), name, aggregated)?);
        log::info!("{name}: wrote {} list file(s) to {}", written.len(), self.dir.display());
        Ok(written)
    }

    /// Keep the raw downloaded document next to the lists as `<key>.orig`.
    pub fn write_original(&self, key: &str, contents: &str) -> Result<PathBuf, Box<dyn Error>> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("Error creating {}: {e}", self.dir.display()))?;
        let path = self.dir.join(format!("{key}.orig"));
        fs::write(&path, contents).map_err(|e| format!("Error writing {}: {e}", path.display()))?;
        log::debug!("Saved original document {}", path.display());
        Ok(path)
    }
}

fn write_lists(
    dir: &Path,
    name: &str,
    lists: &ProviderLists,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    fs::create_dir_all(dir).map_err(|e| format!("Error creating {}: {e}", dir.display()))?;

    let mut written = Vec::new();
    if lists.is_empty() {
        log::warn!("{name}: no prefixes, nothing written to {}", dir.display());
        return Ok(written);
    }
    written.push(write_list(&dir.join(format!("{name}.txt")), &lists.combined())?);

    for family in [Family::Ipv4, Family::Ipv6] {
        let entries = lists.get(family);
        if entries.is_empty() {
            log::info!("{name}: no {family} prefixes, skipping");
            continue;
        }
        let suffix = match family {
            Family::Ipv4 => "ipv4",
            Family::Ipv6 => "ipv6",
        };
        written.push(write_list(&dir.join(format!("{name}-{suffix}.txt")), entries)?);
    }
    Ok(written)
}

fn write_list(path: &Path, entries: &[String]) -> Result<PathBuf, Box<dyn Error>> {
    fs::write(path, entries.join("\n"))
        .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    log::debug!("Wrote {} entries to {}", entries.len(), path.display());
    Ok(path.to_path_buf())
}

/// Read a list file: one entry per line, blank lines and `#` comments skipped.
pub fn read_list(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
