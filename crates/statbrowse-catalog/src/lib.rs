// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use statbrowse_app::{LoadOutcome, Record};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Host of the per-record detail pages.
pub const DEFAULT_DETAIL_BASE_URL: &str = "https://statbank.dk";

/// Blocking HTTP reader for a remote catalog document.
#[derive(Debug, Clone)]
pub struct Client {
    source_url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(source_url: &str, timeout: Duration) -> Result<Self> {
        let source_url = source_url.trim().to_owned();
        if source_url.is_empty() {
            bail!("source.url must not be empty");
        }
        Url::parse(&source_url).with_context(|| format!("invalid source URL {source_url:?}"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { source_url, http })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn fetch(&self) -> Result<LoadOutcome> {
        let response = self
            .http
            .get(&self.source_url)
            .send()
            .map_err(|error| connection_error(&self.source_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let raw = response.text().context("read catalog body")?;
        decode_records(&raw)
    }
}

/// The record store's single external interface: load all records, once
/// per session, from wherever the catalog lives.
#[derive(Debug, Clone)]
pub enum Catalog {
    Remote(Client),
    Local(PathBuf),
}

impl Catalog {
    /// `http(s)` sources become remote clients; anything else is read as a
    /// filesystem path.
    pub fn from_source(source: &str, timeout: Duration) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            Ok(Self::Remote(Client::new(source, timeout)?))
        } else if source.trim().is_empty() {
            bail!("catalog source must not be empty");
        } else {
            Ok(Self::Local(PathBuf::from(source)))
        }
    }

    /// Returns the records exactly as present in the source, in source
    /// order, plus the count of array elements that failed to decode.
    pub fn load(&self) -> Result<LoadOutcome> {
        match self {
            Self::Remote(client) => client.fetch(),
            Self::Local(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("read catalog file {}", path.display()))?;
                decode_records(&raw)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Remote(client) => client.source_url().to_owned(),
            Self::Local(path) => path.display().to_string(),
        }
    }
}

/// Decodes the catalog document leniently: the document must be a JSON
/// array, but an element that fails to decode is skipped and counted
/// rather than failing the load.
pub fn decode_records(raw: &str) -> Result<LoadOutcome> {
    let elements: Vec<serde_json::Value> =
        serde_json::from_str(raw).context("decode catalog document; expected a JSON array")?;

    let mut outcome = LoadOutcome {
        records: Vec::with_capacity(elements.len()),
        skipped: 0,
    };
    for element in elements {
        match serde_json::from_value::<Record>(element) {
            Ok(record) => outcome.records.push(record),
            Err(_) => outcome.skipped += 1,
        }
    }
    Ok(outcome)
}

/// Canonical detail page for a record: `<base>/<record id>`.
pub fn detail_url(base: &str, record_id: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), record_id)
}

fn connection_error(source_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach catalog at {} -- check [source].url and network access ({})",
        source_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    let trimmed = body.trim();
    if trimmed.len() < 100 && !trimmed.contains('{') && !trimmed.is_empty() {
        return anyhow!("catalog server error ({}): {}", status.as_u16(), trimmed);
    }
    anyhow!("catalog server returned {}", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::{Catalog, DEFAULT_DETAIL_BASE_URL, Client, decode_records, detail_url};
    use std::time::Duration;

    #[test]
    fn decode_preserves_source_order() {
        let outcome = decode_records(
            r#"[{"id":"B","title":"second"},{"id":"A","title":"first"},{"id":"C"}]"#,
        )
        .expect("array should decode");
        let ids: Vec<&str> = outcome
            .records
            .iter()
            .map(|record| record.id.as_str())
            .collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn decode_skips_malformed_elements_without_failing() {
        let outcome = decode_records(r#"[{"id":"A"},42,{"id":"B"},"oops"]"#)
            .expect("array with bad elements should still decode");
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn decode_rejects_non_array_documents() {
        let error = decode_records(r#"{"records":[]}"#).expect_err("object should fail");
        assert!(error.to_string().contains("JSON array"));
    }

    #[test]
    fn client_rejects_empty_and_unparseable_urls() {
        assert!(Client::new("", Duration::from_secs(1)).is_err());
        assert!(Client::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn catalog_source_dispatches_on_scheme() {
        let remote = Catalog::from_source("https://example.test/data.json", Duration::from_secs(1))
            .expect("http source should build");
        assert!(matches!(remote, Catalog::Remote(_)));
        assert_eq!(remote.describe(), "https://example.test/data.json");

        let local = Catalog::from_source("/tmp/data.json", Duration::from_secs(1))
            .expect("path source should build");
        assert!(matches!(local, Catalog::Local(_)));
        assert!(Catalog::from_source("  ", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn detail_url_joins_base_and_id() {
        assert_eq!(
            detail_url(DEFAULT_DETAIL_BASE_URL, "FOLK1A"),
            "https://statbank.dk/FOLK1A"
        );
        assert_eq!(
            detail_url("https://statbank.dk///", "BEF5"),
            "https://statbank.dk/BEF5"
        );
    }
}
