//! Provider document parsing.
//!
//! Each cloud provider publishes its ranges in its own format. This module turns
//! those documents into [`ProviderLists`]:
//! - [`json`] - AWS, Azure, Google Cloud, Oracle Cloud and GitHub JSON feeds
//! - [`csv`] - DigitalOcean and Linode CSV feeds, plain text lists (Cloudflare)
//! - [`ip2asn`] - bulk IP-to-ASN tables classified by an [`crate::config::AsnConfig`]

mod csv;
pub mod ip2asn;
mod json;

use crate::error::ProviderError;
use crate::models::Family;
use crate::processing::sort_cidrs;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// CIDR strings of one provider, split by family.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProviderLists {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

impl ProviderLists {
    pub fn new() -> ProviderLists {
        Self::default()
    }

    /// Classify one entry by the family of its address part and append it.
    ///
    /// Bare addresses become host routes (`/32`, `/128`). Returns the family, or
    /// `None` when the entry is not an IP address or CIDR at all.
    pub fn push(&mut self, entry: &str) -> Option<Family> {
        let entry = entry.trim();
        let family = Family::detect(entry)?;
        let entry = if entry.contains('/') {
            entry.to_string()
        } else {
            format!("{entry}/{}", family.max_length())
        };
        match family {
            Family::Ipv4 => self.ipv4.push(entry),
            Family::Ipv6 => self.ipv6.push(entry),
        }
        Some(family)
    }

    /// Push every entry, logging the ones that are not addresses.
    pub fn extend<I, S>(&mut self, provider: &str, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in entries {
            let entry = entry.as_ref();
            if entry.trim().is_empty() {
                continue;
            }
            if self.push(entry).is_none() {
                log::warn!("{provider}: unrecognized prefix format: '{entry}'");
            }
        }
    }

    /// Append another provider document's lists.
    pub fn append(&mut self, mut other: ProviderLists) {
        self.ipv4.append(&mut other.ipv4);
        self.ipv6.append(&mut other.ipv6);
    }

    /// De-duplicate (first occurrence wins) and sort both lists numerically.
    pub fn finish(self) -> ProviderLists {
        let mut ipv4: Vec<String> = self.ipv4.into_iter().unique().collect();
        let mut ipv6: Vec<String> = self.ipv6.into_iter().unique().collect();
        sort_cidrs(&mut ipv4, Family::Ipv4);
        sort_cidrs(&mut ipv6, Family::Ipv6);
        ProviderLists { ipv4, ipv6 }
    }

    /// IPv4 entries followed by IPv6 entries.
    pub fn combined(&self) -> Vec<String> {
        self.ipv4.iter().chain(self.ipv6.iter()).cloned().collect()
    }

    pub fn get(&self, family: Family) -> &[String] {
        match family {
            Family::Ipv4 => &self.ipv4,
            Family::Ipv6 => &self.ipv6,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }
}

/// Providers with a known document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Aws,
    Azure,
    GoogleCloud,
    DigitalOcean,
    Cloudflare,
    OracleCloud,
    Linode,
    Github,
}

impl Provider {
    pub const ALL: [Provider; 8] = [
        Provider::Aws,
        Provider::Azure,
        Provider::GoogleCloud,
        Provider::DigitalOcean,
        Provider::Cloudflare,
        Provider::OracleCloud,
        Provider::Linode,
        Provider::Github,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::GoogleCloud => "google-cloud",
            Provider::DigitalOcean => "digitalocean",
            Provider::Cloudflare => "cloudflare",
            Provider::OracleCloud => "oracle-cloud",
            Provider::Linode => "linode",
            Provider::Github => "github",
        }
    }

    /// Parse one raw document of this provider.
    pub fn parse(self, contents: &str) -> Result<ProviderLists, ProviderError> {
        let lists = match self {
            Provider::Aws => json::parse_aws(contents)?,
            Provider::Azure => json::parse_azure(contents)?,
            Provider::GoogleCloud => json::parse_google_cloud(contents)?,
            Provider::OracleCloud => json::parse_oracle_cloud(contents)?,
            Provider::Github => json::parse_github(contents)?,
            Provider::DigitalOcean => csv::parse_first_column(self.name(), contents, false),
            Provider::Linode => csv::parse_first_column(self.name(), contents, true),
            Provider::Cloudflare => csv::parse_lines(self.name(), contents),
        };
        Ok(lists.finish())
    }

    /// Parse a provider's document(s), whether published as one file or split per family.
    pub fn parse_document(
        self,
        document: &ProviderDocument,
    ) -> Result<ProviderLists, ProviderError> {
        match document {
            ProviderDocument::Single(contents) => self.parse(contents),
            ProviderDocument::Split { ipv4, ipv6 } => {
                let mut lists = ProviderLists::new();
                for contents in [ipv4, ipv6].into_iter().flatten() {
                    lists.append(self.parse(contents)?);
                }
                Ok(lists.finish())
            }
        }
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(name: &str) -> Result<Provider, ProviderError> {
        Provider::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ProviderError::Unknown(name.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A provider's downloaded content: one document, or one per family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderDocument {
    Single(String),
    Split {
        ipv4: Option<String>,
        ipv6: Option<String>,
    },
}

/// Group downloads by provider name.
///
/// Keys named `<provider>_ipv4` / `<provider>_ipv6` are paired under `<provider>`.
pub fn group_documents(downloads: BTreeMap<String, String>) -> BTreeMap<String, ProviderDocument> {
    let mut grouped: BTreeMap<String, ProviderDocument> = BTreeMap::new();

    for (key, contents) in downloads {
        let split = match key.split_once('_') {
            Some((name, "ipv4")) => Some((name.to_string(), Family::Ipv4)),
            Some((name, "ipv6")) => Some((name.to_string(), Family::Ipv6)),
            _ => None,
        };

        let Some((name, family)) = split else {
            grouped.insert(key, ProviderDocument::Single(contents));
            continue;
        };
        let entry = grouped
            .entry(name)
            .or_insert_with(|| ProviderDocument::Split {
                ipv4: None,
                ipv6: None,
            });
        if let ProviderDocument::Split { ipv4, ipv6 } = entry {
            match family {
                Family::Ipv4 => *ipv4 = Some(contents),
                Family::Ipv6 => *ipv6 = Some(contents),
            }
        } else {
            log::warn!("ignoring split {family} document for single-document provider");
        }
    }

    grouped
}
