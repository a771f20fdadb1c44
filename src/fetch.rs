//! Concurrent download of provider documents.
//!
//! All requests of a batch run at once; the batch succeeds only if every one of them does.

use crate::config::{Sources, DATE_PLACEHOLDER};
use crate::error::{FetchError, FetchFailure};
use futures::future::join_all;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Date of the current Azure Service Tags file, as linked from the download page.
static AZURE_SERVICE_TAGS_REGEX: OnceLock<Regex> = OnceLock::new();

fn azure_service_tags_regex() -> &'static Regex {
    AZURE_SERVICE_TAGS_REGEX.get_or_init(|| {
        Regex::new(r"(?i)da13a5de5b63/ServiceTags_Public_(\d{8})\.json").expect("Invalid Regex")
    })
}

/// Download every URL in `urls` concurrently.
///
/// # Returns
/// * `Ok(map)` - name -> response body, for every entry of `urls`
/// * `Err(FetchError::Batch)` - listing every download that failed
pub async fn fetch_all(
    urls: &BTreeMap<String, String>,
    user_agent: &str,
) -> Result<BTreeMap<String, String>, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))?;

    log::info!("Downloading {} file(s)", urls.len());
    let requests = urls.iter().map(|(name, url)| {
        let client = &client;
        async move { (name, url, fetch_one(client, url).await) }
    });
    let results = join_all(requests).await;

    let mut bodies = BTreeMap::new();
    let mut failures = Vec::new();
    for (name, url, result) in results {
        match result {
            Ok(body) => {
                log::debug!("{name}: {} bytes from {url}", body.len());
                bodies.insert(name.clone(), body);
            }
            Err(reason) => {
                log::warn!("{name}: download of {url} failed: {reason}");
                failures.push(FetchFailure {
                    name: name.clone(),
                    url: url.clone(),
                    reason,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(bodies)
    } else {
        Err(FetchError::Batch { failures })
    }
}

async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<String, String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {status}"));
    }
    response.text().await.map_err(|e| e.to_string())
}

/// Fill in dated download URLs from the pre-downloaded pages.
///
/// For every provider with a pre-download page and a replacement template, the date
/// found in the page replaces [`DATE_PLACEHOLDER`] and the result is added to
/// `sources.download_list`. Returns the names that were resolved.
pub fn resolve_dated_urls(
    sources: &mut Sources,
    pre_downloads: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut resolved = Vec::new();

    for (name, template) in &sources.replace_download_list {
        let Some(page) = pre_downloads.get(name) else {
            log::warn!("{name} download URL not added: pre-download file not set");
            continue;
        };
        let Some(date) = azure_service_tags_regex()
            .captures(page)
            .and_then(|caps| caps.get(1))
        else {
            log::warn!("{name} download URL not added: date not found in pre-download file");
            continue;
        };

        let url = template.replace(DATE_PLACEHOLDER, date.as_str());
        log::info!("Added {name} download URL: {url}");
        sources.download_list.insert(name.clone(), url);
        resolved.push(name.clone());
    }

    resolved
}
