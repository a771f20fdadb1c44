//! Download -> parse -> aggregate -> write.
//!
//! Glue between the fetcher, the provider parsers, the aggregator and the list writer.

use crate::config::{AsnConfig, Settings, Sources};
use crate::error::{AggregateError, EntryError};
use crate::fetch::{fetch_all, resolve_dated_urls};
use crate::models::{AddressFamily, Cidr, Family, V4, V6};
use crate::output::ListWriter;
use crate::processing::{aggregate_lenient, to_strings, Aggregated};
use crate::providers::ip2asn::classify;
use crate::providers::{group_documents, Provider, ProviderLists};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

/// Directory below the output root for lists built from provider documents.
pub const SOURCE_DIR: &str = "source";
/// Directory below the output root for lists built from the ip2asn table.
pub const ASN_DIR: &str = "asn";

/// Prefix counts of one provider, before and after aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSummary {
    pub name: String,
    pub source_ipv4: usize,
    pub source_ipv6: usize,
    pub aggregated_ipv4: usize,
    pub aggregated_ipv6: usize,
    pub rejected: usize,
}

impl ProviderSummary {
    fn new(
        name: &str,
        source: &ProviderLists,
        aggregated: &ProviderLists,
        rejected: usize,
    ) -> Self {
        ProviderSummary {
            name: name.to_string(),
            source_ipv4: source.ipv4.len(),
            source_ipv6: source.ipv6.len(),
            aggregated_ipv4: aggregated.ipv4.len(),
            aggregated_ipv6: aggregated.ipv6.len(),
            rejected,
        }
    }
}

/// Aggregate both families of one provider.
///
/// Malformed entries are logged and left out.
///
/// # Returns
/// The aggregated lists and the number of rejected entries
pub fn aggregate_provider_lists(name: &str, lists: &ProviderLists) -> (ProviderLists, usize) {
    let ipv4 = aggregate_lenient::<V4, _>(&lists.ipv4);
    let ipv6 = aggregate_lenient::<V6, _>(&lists.ipv6);

    for rejected in ipv4.rejected.iter().chain(ipv6.rejected.iter()) {
        log::warn!("{name}: skipping {rejected}");
    }
    let rejected = ipv4.rejected.len() + ipv6.rejected.len();

    let aggregated = ProviderLists {
        ipv4: to_strings(ipv4.cidrs),
        ipv6: to_strings(ipv6.cidrs),
    };
    log::info!(
        "{name}: IPv4 {} -> {}, IPv6 {} -> {}",
        lists.ipv4.len(),
        aggregated.ipv4.len(),
        lists.ipv6.len(),
        aggregated.ipv6.len()
    );
    (aggregated, rejected)
}

/// A list of mixed families, aggregated per family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListAggregate {
    pub ipv4: Vec<Cidr<V4>>,
    pub ipv6: Vec<Cidr<V6>>,
    #[serde(skip)]
    pub rejected: Vec<EntryError>,
}

/// Aggregate a plain list of entries.
///
/// # Arguments
/// * `entries` - CIDR strings, possibly of both families
/// * `family` - Treat every entry as this family; when `None` each entry's family is
///   taken from its address, and entries that are no address at all count as IPv4
/// * `lenient` - Keep going past malformed entries instead of failing
///
/// Rejected entries keep their index into `entries`.
pub fn aggregate_list(
    entries: &[String],
    family: Option<Family>,
    lenient: bool,
) -> Result<ListAggregate, AggregateError> {
    let mut ipv4 = Vec::new();
    let mut ipv6 = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match family.or_else(|| Family::detect(entry)).unwrap_or(Family::Ipv4) {
            Family::Ipv4 => ipv4.push((index, entry.as_str())),
            Family::Ipv6 => ipv6.push((index, entry.as_str())),
        }
    }

    let ipv4 = aggregate_indexed::<V4>(&ipv4);
    let ipv6 = aggregate_indexed::<V6>(&ipv6);
    if !lenient {
        for (family, rejected) in [(Family::Ipv4, &ipv4.rejected), (Family::Ipv6, &ipv6.rejected)] {
            if !rejected.is_empty() {
                return Err(AggregateError {
                    family,
                    entries: rejected.clone(),
                });
            }
        }
    }

    let mut rejected: Vec<EntryError> = ipv4.rejected.into_iter().chain(ipv6.rejected).collect();
    rejected.sort_by_key(|e| e.index);
    Ok(ListAggregate {
        ipv4: ipv4.cidrs,
        ipv6: ipv6.cidrs,
        rejected,
    })
}

fn aggregate_indexed<F: AddressFamily>(entries: &[(usize, &str)]) -> Aggregated<F> {
    let inputs: Vec<&str> = entries.iter().map(|(_, entry)| *entry).collect();
    let mut result = aggregate_lenient::<F, _>(&inputs);
    for rejected in &mut result.rejected {
        rejected.index = entries[rejected.index].0;
    }
    result
}

fn write_provider(
    name: &str,
    lists: &ProviderLists,
    writer: &ListWriter,
) -> Result<ProviderSummary, Box<dyn Error>> {
    let (aggregated, rejected) = aggregate_provider_lists(name, lists);
    writer.write_provider(name, lists, &aggregated)?;
    Ok(ProviderSummary::new(name, lists, &aggregated, rejected))
}

/// Parse, aggregate and write every downloaded provider document.
///
/// Raw documents are kept as `<key>.orig`. Unknown providers and documents that
/// fail to parse are logged and skipped; the remaining providers are still written.
pub fn process_documents(
    downloads: BTreeMap<String, String>,
    writer: &ListWriter,
) -> Result<Vec<ProviderSummary>, Box<dyn Error>> {
    for (key, contents) in &downloads {
        writer.write_original(key, contents)?;
    }

    let mut summaries = Vec::new();
    for (name, document) in group_documents(downloads) {
        let provider: Provider = match name.parse() {
            Ok(provider) => provider,
            Err(e) => {
                log::warn!("{e}, skipping");
                continue;
            }
        };
        let lists = match provider.parse_document(&document) {
            Ok(lists) => lists,
            Err(e) => {
                log::error!("{provider}: {e}");
                continue;
            }
        };
        summaries.push(write_provider(provider.name(), &lists, writer)?);
    }
    Ok(summaries)
}

/// The full update run: resolve dated URLs, download everything, write all lists.
pub async fn update_provider_sources(
    settings: &Settings,
) -> Result<Vec<ProviderSummary>, Box<dyn Error>> {
    let started = chrono::Utc::now();
    log::info!("#Start update at {}", started.format("%Y-%m-%d %H:%M:%S"));

    let mut sources = Sources::load(&settings.sources_file)?;
    if !sources.pre_download_list.is_empty() {
        let pre_downloads = fetch_all(&sources.pre_download_list, &settings.user_agent).await?;
        resolve_dated_urls(&mut sources, &pre_downloads);
    }

    let downloads = fetch_all(&sources.download_list, &settings.user_agent).await?;
    let writer = ListWriter::new(settings.output_dir.join(SOURCE_DIR));
    let summaries = process_documents(downloads, &writer)?;

    let elapsed = chrono::Utc::now() - started;
    log::info!(
        "#End update: {} provider(s) in {}.{:03}s",
        summaries.len(),
        elapsed.num_seconds(),
        elapsed.num_milliseconds() % 1000
    );
    Ok(summaries)
}

/// Classify an ip2asn TSV file and write one set of lists per mapped provider.
pub fn process_ip2asn(
    tsv_path: &Path,
    config: &AsnConfig,
    writer: &ListWriter,
) -> Result<Vec<ProviderSummary>, Box<dyn Error>> {
    let tsv = std::fs::read_to_string(tsv_path)
        .map_err(|e| format!("Error reading {}: {e}", tsv_path.display()))?;
    let classified = classify(&tsv, config);

    let mut summaries = Vec::new();
    for (name, lists) in &classified.providers {
        summaries.push(write_provider(name, lists, writer)?);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_aggregate_provider_lists() {
        let lists = ProviderLists {
            ipv4: vec![
                "10.0.0.0/25".to_string(),
                "10.0.0.128/25".to_string(),
                "10.0.0.0/99".to_string(),
            ],
            ipv6: vec!["2001:db8::/33".to_string(), "2001:db8:8000::/33".to_string()],
        };
        let (aggregated, rejected) = aggregate_provider_lists("test", &lists);
        assert_eq!(aggregated.ipv4, vec!["10.0.0.0/24"]);
        assert_eq!(aggregated.ipv6, vec!["2001:db8::/32"]);
        assert_eq!(rejected, 1);
    }

    fn entries(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aggregate_list_mixed() {
        let list = entries(&["10.0.0.1/32", "2001:db8::/33", "10.0.0.0/32", "2001:db8:8000::/33"]);
        let result = aggregate_list(&list, None, false).unwrap();
        assert_eq!(to_strings(result.ipv4.clone()), vec!["10.0.0.0/31"]);
        assert_eq!(to_strings(result.ipv6.clone()), vec!["2001:db8::/32"]);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"ipv4":["10.0.0.0/31"],"ipv6":["2001:db8::/32"]}"#
        );
    }

    #[test]
    fn test_aggregate_list_strict_reports_original_index() {
        let list = entries(&["2001:db8::/32", "10.0.0.0/8", "garbage", "10.0.0.0/33"]);
        let err = aggregate_list(&list, None, false).unwrap_err();
        assert_eq!(err.family, Family::Ipv4);
        let indexes: Vec<usize> = err.entries.iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![2, 3]);
    }

    #[test]
    fn test_aggregate_list_lenient_and_forced_family() {
        let list = entries(&["2001:db8::/32", "10.0.0.0/8", "::/129"]);
        let result = aggregate_list(&list, None, true).unwrap();
        assert_eq!(result.ipv4.len(), 1);
        assert_eq!(result.ipv6.len(), 1);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].index, 2);

        let result = aggregate_list(&list, Some(Family::Ipv6), true).unwrap();
        assert!(result.ipv4.is_empty());
        let indexes: Vec<usize> = result.rejected.iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![1, 2]);
    }

    #[test]
    fn test_process_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ListWriter::new(tmp.path());
        let downloads = BTreeMap::from([
            (
                "cloudflare_ipv4".to_string(),
                include_str!("tests/test_data/cloudflare-ipv4.txt").to_string(),
            ),
            (
                "cloudflare_ipv6".to_string(),
                include_str!("tests/test_data/cloudflare-ipv6.txt").to_string(),
            ),
            ("fastly".to_string(), "{}".to_string()),
            ("github".to_string(), "not json".to_string()),
        ]);

        let summaries = process_documents(downloads, &writer).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "cloudflare");
        assert_eq!(summaries[0].source_ipv4, 3);
        assert_eq!(summaries[0].aggregated_ipv4, 3);
        assert_eq!(summaries[0].source_ipv6, 2);

        assert!(tmp.path().join("cloudflare_ipv4.orig").exists());
        assert!(tmp.path().join("github.orig").exists());
        assert!(!tmp.path().join("github.txt").exists());
        assert_eq!(
            fs::read_to_string(tmp.path().join("aggregated/cloudflare-ipv4.txt")).unwrap(),
            "103.21.244.0/22\n103.22.200.0/22\n173.245.48.0/20"
        );
    }

    #[test]
    fn test_process_ip2asn() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ListWriter::new(tmp.path());
        let config: AsnConfig =
            serde_json::from_str(r#"{"providers": {"aws": [16509]}}"#).unwrap();

        let summaries = process_ip2asn(
            Path::new("src/tests/test_data/ip2asn.tsv"),
            &config,
            &writer,
        )
        .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(
            fs::read_to_string(tmp.path().join("aggregated/aws-ipv4.txt")).unwrap(),
            "3.5.140.0/22\n3.5.144.0/22"
        );
    }
}
