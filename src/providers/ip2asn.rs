//! IP-to-ASN table classification.
//!
//! Reads ip2asn TSV rows (`range_start  range_end  AS_number  country_code  AS_description`),
//! keeps the rows whose ASN is mapped to a provider and converts their boundaries to CIDRs.

use super::ProviderLists;
use crate::config::AsnConfig;
use crate::error::ProviderError;
use crate::models::Family;
use crate::processing::range_to_cidr_strings;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;

/// One row of an ip2asn table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnRange<'a> {
    pub start: &'a str,
    pub end: &'a str,
    pub asn: u32,
    pub country: &'a str,
    pub description: &'a str,
}

/// Parse one TSV record. `line` is 1-based and only used for error reporting.
pub fn parse_record(record: &StringRecord, line: usize) -> Result<AsnRange<'_>, ProviderError> {
    if record.len() < 3 {
        return Err(ProviderError::Ip2Asn {
            line,
            message: format!("expected at least 3 tab separated fields, got {}", record.len()),
        });
    }
    let asn = record[2]
        .trim_start_matches("AS")
        .parse()
        .map_err(|_| ProviderError::Ip2Asn {
            line,
            message: format!("invalid AS number '{}'", &record[2]),
        })?;

    Ok(AsnRange {
        start: &record[0],
        end: &record[1],
        asn,
        country: record.get(3).unwrap_or_default(),
        description: record.get(4).unwrap_or_default(),
    })
}

/// Per-provider lists built from an ip2asn table, plus the rows that could not be used.
#[derive(Debug, Default)]
pub struct Classified {
    pub providers: BTreeMap<String, ProviderLists>,
    pub rejected: Vec<ProviderError>,
    pub rows: usize,
    pub matched: usize,
}

/// Classify every row of `tsv` by ASN and convert matching ranges to CIDRs.
///
/// Blank lines and `#` comments are skipped. Malformed rows (bad field count, bad ASN,
/// bad or inverted addresses) are collected in [`Classified::rejected`]; unmapped ASNs
/// are skipped silently.
pub fn classify(tsv: &str, config: &AsnConfig) -> Classified {
    let index = config.index();
    let mut classified = Classified::default();
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(tsv.as_bytes());

    for record in reader.records() {
        classified.rows += 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line() as usize);
                let e = ProviderError::Ip2Asn {
                    line,
                    message: e.to_string(),
                };
                log::warn!("{e}");
                classified.rejected.push(e);
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line() as usize);

        let range = match parse_record(&record, line) {
            Ok(range) => range,
            Err(e) => {
                log::warn!("{e}");
                classified.rejected.push(e);
                continue;
            }
        };
        let Some(provider) = index.get(&range.asn) else {
            continue;
        };

        match range_cidrs(&range, line) {
            Ok((family, cidrs)) => {
                log::trace!(
                    "AS{} {}-{} -> {provider}: {} CIDR(s)",
                    range.asn,
                    range.start,
                    range.end,
                    cidrs.len()
                );
                let lists = classified.providers.entry(provider.to_string()).or_default();
                match family {
                    Family::Ipv4 => lists.ipv4.extend(cidrs),
                    Family::Ipv6 => lists.ipv6.extend(cidrs),
                }
                classified.matched += 1;
            }
            Err(e) => {
                log::warn!("{e}");
                classified.rejected.push(e);
            }
        }
    }

    classified.providers = classified
        .providers
        .into_iter()
        .map(|(name, lists)| (name, lists.finish()))
        .collect();

    log::info!(
        "ip2asn: {} row(s), {} matched {} provider(s), {} rejected",
        classified.rows,
        classified.matched,
        classified.providers.len(),
        classified.rejected.len()
    );
    classified
}

fn range_cidrs(range: &AsnRange, line: usize) -> Result<(Family, Vec<String>), ProviderError> {
    let family = Family::detect(range.start).ok_or_else(|| ProviderError::Ip2Asn {
        line,
        message: format!("invalid range start '{}'", range.start),
    })?;
    let cidrs =
        range_to_cidr_strings(range.start, range.end, family).map_err(|e| ProviderError::Ip2Asn {
            line,
            message: e.to_string(),
        })?;
    Ok((family, cidrs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AsnConfig {
        serde_json::from_str(
            r#"{"providers": {"aws": [16509], "cloudflare": [13335], "google-cloud": [15169]}}"#,
        )
        .unwrap()
    }

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_parse_record() {
        let row = record(&["1.0.0.0", "1.0.0.255", "13335", "US", "CLOUDFLARENET"]);
        let row = parse_record(&row, 1).unwrap();
        assert_eq!(row.start, "1.0.0.0");
        assert_eq!(row.end, "1.0.0.255");
        assert_eq!(row.asn, 13335);
        assert_eq!(row.country, "US");
        assert_eq!(row.description, "CLOUDFLARENET");

        let row = record(&["1.0.0.0", "1.0.0.255", "AS13335"]);
        let row = parse_record(&row, 2).unwrap();
        assert_eq!(row.asn, 13335);
        assert_eq!(row.country, "");
    }

    #[test]
    fn test_parse_record_errors() {
        assert!(matches!(
            parse_record(&record(&["broken line"]), 7),
            Err(ProviderError::Ip2Asn { line: 7, .. })
        ));
        assert!(parse_record(&record(&["1.0.0.0", "1.0.0.255", "x"]), 1).is_err());
    }

    #[test]
    fn test_classify_skips_comments_and_keeps_quotes() {
        let tsv = concat!(
            "# ip2asn\n\n",
            "1.0.0.0\t1.0.0.255\t13335\tUS\t\"CLOUDFLARE, INC\n",
            "2.0.0.0\t2.0.0.1\n"
        );
        let classified = classify(tsv, &config());
        assert_eq!(classified.rows, 2);
        assert_eq!(classified.matched, 1);
        assert!(matches!(
            classified.rejected[..],
            [ProviderError::Ip2Asn { .. }]
        ));
    }

    #[test]
    fn test_classify() {
        let tsv = include_str!("../tests/test_data/ip2asn.tsv");
        let classified = classify(tsv, &config());

        assert_eq!(classified.rows, 9);
        assert_eq!(classified.matched, 6);
        assert_eq!(classified.providers.len(), 3);

        let cloudflare = &classified.providers["cloudflare"];
        assert_eq!(
            cloudflare.ipv4,
            vec!["1.0.0.0/24", "104.16.0.0/29", "104.16.0.8/31"]
        );
        assert_eq!(cloudflare.ipv6, vec!["2400:cb00::/32"]);

        let aws = &classified.providers["aws"];
        assert_eq!(aws.ipv4, vec!["3.5.140.0/22", "3.5.144.0/22"]);
        assert!(aws.ipv6.is_empty());

        assert_eq!(classified.providers["google-cloud"].ipv4, vec!["8.8.8.0/24"]);

        let lines: Vec<usize> = classified
            .rejected
            .iter()
            .map(|e| match e {
                ProviderError::Ip2Asn { line, .. } => *line,
                other => panic!("unexpected error {other:?}"),
            })
            .collect();
        assert_eq!(lines, vec![8, 9]);
    }

    #[test]
    fn test_classify_empty_config() {
        let classified = classify("1.0.0.0\t1.0.0.255\t13335\tUS\tX\n", &AsnConfig::default());
        assert!(classified.providers.is_empty());
        assert_eq!(classified.matched, 0);
    }
}
