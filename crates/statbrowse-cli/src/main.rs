// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::CatalogRuntime;
use statbrowse_app::AppState;
use statbrowse_catalog::Catalog;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `statbrowse --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let detail_base = config.detail_base_url().to_owned();
    let mut runtime = if options.demo {
        CatalogRuntime::demo(detail_base)
    } else {
        let source = options
            .source
            .as_deref()
            .unwrap_or_else(|| config.source_url());
        let catalog = Catalog::from_source(source, config.timeout()?)
            .with_context(|| format!("configure catalog source {source:?}"))?;
        CatalogRuntime::new(catalog, detail_base)
    };

    if options.check_only {
        return Ok(());
    }

    let mut state = AppState::default();
    statbrowse_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    source: Option<String>,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        source: None,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--source" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--source requires a URL or file path"))?;
                options.source = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("statbrowse");
    println!("  --config <path>          Use a specific config path");
    println!("  --source <url-or-path>   Load the catalog from this URL or file");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with the built-in sample catalog");
    println!("  --check                  Validate config + catalog source without launching");
    println!("  --help                   Show this help");
}
