// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use statbrowse_app::{LoadOutcome, Record};
use statbrowse_catalog::Catalog;
use statbrowse_tui::AppRuntime;

/// Wires the TUI to a catalog source. `--demo` swaps the catalog for the
/// deterministic testkit corpus so the UI can run without any source.
pub struct CatalogRuntime {
    source: RuntimeSource,
    detail_base_url: String,
}

enum RuntimeSource {
    Catalog(Catalog),
    Demo,
}

impl CatalogRuntime {
    pub fn new(catalog: Catalog, detail_base_url: impl Into<String>) -> Self {
        Self {
            source: RuntimeSource::Catalog(catalog),
            detail_base_url: detail_base_url.into(),
        }
    }

    pub fn demo(detail_base_url: impl Into<String>) -> Self {
        Self {
            source: RuntimeSource::Demo,
            detail_base_url: detail_base_url.into(),
        }
    }

    fn detail_url_for(&self, record: &Record) -> String {
        statbrowse_catalog::detail_url(&self.detail_base_url, &record.id)
    }
}

impl AppRuntime for CatalogRuntime {
    fn load_records(&mut self) -> Result<LoadOutcome> {
        match &self.source {
            RuntimeSource::Catalog(catalog) => catalog.load(),
            RuntimeSource::Demo => Ok(LoadOutcome {
                records: statbrowse_testkit::sample_records(),
                skipped: 0,
            }),
        }
    }

    fn open_detail(&mut self, record: &Record) -> Result<String> {
        let url = self.detail_url_for(record);
        open_in_browser(&url)?;
        Ok(url)
    }
}

fn open_in_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .with_context(|| format!("open browser for {url}"))?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .with_context(|| format!("open browser for {url}"))?;
    }

    #[cfg(target_os = "windows")]
    {
        // explorer.exe takes the URL as a plain process argument, no shell
        std::process::Command::new("explorer")
            .arg(url)
            .spawn()
            .with_context(|| format!("open browser for {url}"))?;
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    anyhow::bail!("no browser opener available for this platform ({url})");

    Ok(())
}
