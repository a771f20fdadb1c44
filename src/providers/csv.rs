//! CSV and plain text provider feeds.

use super::ProviderLists;
use csv::{ReaderBuilder, Trim};

/// First field of every CSV record, quote aware and trimmed.
///
/// With `comment`, lines starting with that byte are skipped. Records that fail
/// to parse are logged and skipped.
fn first_columns(provider: &str, contents: &str, comment: Option<u8>) -> Vec<String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(comment)
        .from_reader(contents.as_bytes());

    let mut columns = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                if let Some(first) = record.get(0) {
                    columns.push(first.to_string());
                }
            }
            Err(e) => log::warn!("{provider}: skipping CSV record: {e}"),
        }
    }
    columns
}

/// Take the first column of every row (DigitalOcean, Linode geofeeds).
///
/// With `skip_comments`, rows starting with `#` are ignored.
pub fn parse_first_column(provider: &str, contents: &str, skip_comments: bool) -> ProviderLists {
    let comment = if skip_comments { Some(b'#') } else { None };
    let mut lists = ProviderLists::new();
    lists.extend(provider, first_columns(provider, contents, comment));
    lists
}

/// One CIDR per line (Cloudflare `ips-v4` / `ips-v6`).
pub fn parse_lines(provider: &str, contents: &str) -> ProviderLists {
    let mut lists = ProviderLists::new();
    lists.extend(provider, contents.lines());
    lists
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_columns() {
        let contents = "5.101.96.0/21,NL,NL-NH\n\"45.55.32.0/19\" ,US\n\"a,b\",c\n\n,,\n";
        assert_eq!(
            first_columns("test", contents, None),
            vec!["5.101.96.0/21", "45.55.32.0/19", "a,b", ""]
        );
    }

    #[test]
    fn test_first_columns_comments() {
        let contents = "# header\n10.0.0.0/8,x\n#10.1.0.0/16,y\n";
        assert_eq!(first_columns("test", contents, Some(b'#')), vec!["10.0.0.0/8"]);
        assert_eq!(first_columns("test", contents, None).len(), 3);
    }

    #[test]
    fn test_parse_digitalocean() {
        let contents = include_str!("../tests/test_data/digitalocean.csv");
        let lists = parse_first_column("digitalocean", contents, false).finish();
        assert_eq!(
            lists.ipv4,
            vec!["5.101.96.0/21", "45.55.32.0/19", "104.131.0.0/18"]
        );
        assert_eq!(lists.ipv6, vec!["2a03:b0c0::/32"]);
    }

    #[test]
    fn test_parse_linode_skips_comments() {
        let contents = include_str!("../tests/test_data/linode.csv");
        let lists = parse_first_column("linode", contents, true).finish();
        assert_eq!(lists.ipv4, vec!["45.33.0.0/24", "139.162.0.0/21"]);
        assert_eq!(lists.ipv6, vec!["2600:3c00::/32"]);
    }

    #[test]
    fn test_parse_lines() {
        let lists = parse_lines(
            "cloudflare",
            include_str!("../tests/test_data/cloudflare-ipv6.txt"),
        );
        assert_eq!(lists.ipv6, vec!["2400:cb00::/32", "2606:4700::/32"]);
        assert!(lists.ipv4.is_empty());
    }
}
