//! JSON provider feeds.

use super::ProviderLists;
use crate::error::ProviderError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Deserialize a provider document, reporting the JSON path of any mismatch.
fn from_json<T: DeserializeOwned>(provider: &str, contents: &str) -> Result<T, ProviderError> {
    let mut deserializer = serde_json::Deserializer::from_str(contents);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ProviderError::Json {
        provider: provider.to_string(),
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

#[derive(Deserialize, Debug)]
struct AwsRanges {
    #[serde(default)]
    prefixes: Vec<AwsPrefix>,
    #[serde(default)]
    ipv6_prefixes: Vec<AwsIpv6Prefix>,
}

#[derive(Deserialize, Debug)]
struct AwsPrefix {
    ip_prefix: Option<String>,
}

#[derive(Deserialize, Debug)]
struct AwsIpv6Prefix {
    ipv6_prefix: Option<String>,
}

/// AWS `ip-ranges.json`: `prefixes[].ip_prefix` and `ipv6_prefixes[].ipv6_prefix`.
pub fn parse_aws(contents: &str) -> Result<ProviderLists, ProviderError> {
    let ranges: AwsRanges = from_json("aws", contents)?;
    let mut lists = ProviderLists::new();
    lists.extend("aws", ranges.prefixes.iter().filter_map(|p| p.ip_prefix.as_deref()));
    lists.extend(
        "aws",
        ranges.ipv6_prefixes.iter().filter_map(|p| p.ipv6_prefix.as_deref()),
    );
    Ok(lists)
}

#[derive(Deserialize, Debug)]
struct AzureServiceTags {
    values: Option<Vec<AzureServiceTag>>,
}

#[derive(Deserialize, Debug)]
struct AzureServiceTag {
    #[serde(default)]
    name: String,
    #[serde(default)]
    properties: AzureProperties,
}

#[derive(Deserialize, Debug, Default)]
struct AzureProperties {
    #[serde(rename = "addressPrefixes")]
    address_prefixes: Option<Vec<String>>,
}

/// Azure Service Tags: `values[].properties.addressPrefixes[]`.
///
/// Both keys are mandatory; their absence means the published format changed.
pub fn parse_azure(contents: &str) -> Result<ProviderLists, ProviderError> {
    let tags: AzureServiceTags = from_json("azure", contents)?;
    let values = tags.values.ok_or_else(|| ProviderError::Format {
        provider: "azure".to_string(),
        message: "'values' key not found".to_string(),
    })?;

    let mut lists = ProviderLists::new();
    for tag in values {
        let prefixes = tag.properties.address_prefixes.ok_or_else(|| ProviderError::Format {
            provider: "azure".to_string(),
            message: format!("'addressPrefixes' key not found in value '{}'", tag.name),
        })?;
        lists.extend("azure", prefixes);
    }
    Ok(lists)
}

#[derive(Deserialize, Debug)]
struct GoogleRanges {
    #[serde(default)]
    prefixes: Vec<GooglePrefix>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GooglePrefix {
    ipv4_prefix: Option<String>,
    ipv6_prefix: Option<String>,
}

/// Google Cloud `cloud.json`: `prefixes[].ipv4Prefix` / `ipv6Prefix`.
pub fn parse_google_cloud(contents: &str) -> Result<ProviderLists, ProviderError> {
    let ranges: GoogleRanges = from_json("google-cloud", contents)?;
    let mut lists = ProviderLists::new();
    for prefix in &ranges.prefixes {
        lists.extend(
            "google-cloud",
            prefix.ipv4_prefix.iter().chain(prefix.ipv6_prefix.iter()),
        );
    }
    Ok(lists)
}

#[derive(Deserialize, Debug)]
struct OracleRanges {
    #[serde(default)]
    regions: Vec<OracleRegion>,
}

#[derive(Deserialize, Debug)]
struct OracleRegion {
    #[serde(default)]
    cidrs: Vec<OracleCidr>,
}

#[derive(Deserialize, Debug)]
struct OracleCidr {
    cidr: Option<String>,
}

/// Oracle Cloud `public_ip_ranges.json`: `regions[].cidrs[].cidr`.
pub fn parse_oracle_cloud(contents: &str) -> Result<ProviderLists, ProviderError> {
    let ranges: OracleRanges = from_json("oracle-cloud", contents)?;
    let mut lists = ProviderLists::new();
    for region in &ranges.regions {
        lists.extend(
            "oracle-cloud",
            region.cidrs.iter().filter_map(|c| c.cidr.as_deref()),
        );
    }
    Ok(lists)
}

#[derive(Deserialize, Debug)]
struct GithubMeta {
    hooks: Option<Vec<String>>,
    web: Option<Vec<String>>,
    git: Option<Vec<String>>,
    pages: Option<Vec<String>>,
    actions: Option<Vec<String>>,
}

/// GitHub `meta` API: the `hooks`, `web`, `git`, `pages` and `actions` sections.
pub fn parse_github(contents: &str) -> Result<ProviderLists, ProviderError> {
    let meta: GithubMeta = from_json("github", contents)?;
    let mut lists = ProviderLists::new();
    for section in [meta.hooks, meta.web, meta.git, meta.pages, meta.actions]
        .into_iter()
        .flatten()
    {
        lists.extend("github", section);
    }
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AWS: &str = include_str!("../tests/test_data/aws.json");
    const AZURE: &str = include_str!("../tests/test_data/azure.json");
    const GOOGLE: &str = include_str!("../tests/test_data/google-cloud.json");
    const ORACLE: &str = include_str!("../tests/test_data/oracle-cloud.json");
    const GITHUB: &str = include_str!("../tests/test_data/github.json");

    #[test]
    fn test_parse_aws() {
        let lists = parse_aws(AWS).unwrap().finish();
        assert_eq!(
            lists.ipv4,
            vec!["3.5.140.0/22", "13.34.37.64/27", "52.93.153.170/32"]
        );
        assert_eq!(lists.ipv6, vec!["2600:1f14::/35", "2a05:d07a:a000::/40"]);
    }

    #[test]
    fn test_parse_aws_bad_type() {
        let err = parse_aws(r#"{"prefixes": [{"ip_prefix": 42}]}"#).unwrap_err();
        match err {
            ProviderError::Json { provider, path, .. } => {
                assert_eq!(provider, "aws");
                assert_eq!(path, "prefixes[0].ip_prefix");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_azure() {
        let lists = parse_azure(AZURE).unwrap().finish();
        assert_eq!(lists.ipv4, vec!["13.66.60.119/32", "20.36.32.0/19", "40.74.0.0/18"]);
        assert_eq!(lists.ipv6, vec!["2603:1030:f:400::/64"]);
    }

    #[test]
    fn test_parse_azure_missing_keys() {
        assert!(matches!(
            parse_azure(r#"{"changeNumber": 1}"#),
            Err(ProviderError::Format { .. })
        ));
        let err = parse_azure(r#"{"values": [{"name": "ActionGroup", "properties": {}}]}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected azure format: 'addressPrefixes' key not found in value 'ActionGroup'"
        );
    }

    #[test]
    fn test_parse_google_cloud() {
        let lists = parse_google_cloud(GOOGLE).unwrap().finish();
        assert_eq!(lists.ipv4, vec!["34.35.0.0/16", "34.152.86.0/23"]);
        assert_eq!(lists.ipv6, vec!["2600:1900:4000::/44"]);
    }

    #[test]
    fn test_parse_oracle_cloud() {
        let lists = parse_oracle_cloud(ORACLE).unwrap().finish();
        assert_eq!(lists.ipv4, vec!["129.146.0.0/21", "134.70.8.0/21"]);
        assert!(lists.ipv6.is_empty());
    }

    #[test]
    fn test_parse_github() {
        let lists = parse_github(GITHUB).unwrap().finish();
        assert_eq!(
            lists.ipv4,
            vec!["140.82.112.0/20", "185.199.108.0/22", "192.30.252.0/22"]
        );
        assert_eq!(lists.ipv6, vec!["2606:50c0::/32", "2a0a:a440::/29"]);
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_github("not json"),
            Err(ProviderError::Json { .. })
        ));
    }
}
