//! Resolve and materialize a dependency tree

use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use deptree_core::{Layout, ResolutionEngine, ResolutionReport, Resolver, SubBuildManifest};
use deptree_fetch::{SourceFetcher, UrlFetcher};
use deptree_fs::constants::SUBBUILD_MANIFEST;
use deptree_fs::{ConfigStore, NormalizedPath};

use crate::cli::SettingsArgs;
use crate::commands::{effective_settings, project_root};
use crate::error::Result;

/// Resolve the tree rooted at `path` and write the sub-build list.
pub fn run_resolve(
    path: &Path,
    args: &SettingsArgs,
    json: bool,
    summary_file: Option<&Path>,
    retry_window: Duration,
) -> Result<()> {
    let root = project_root(path)?;
    let settings = effective_settings(&root, args)?;
    let layout = Layout::from_settings(&root, &settings);

    if let Some(fallback) = layout.fallback() {
        eprintln!("{}: {}", "warning".yellow().bold(), fallback);
    }
    if !json {
        println!("{} Resolving dependencies of {}", "=>".blue().bold(), root);
    }

    let fetcher =
        SourceFetcher::new().with_url_fetcher(UrlFetcher::new().with_retry_window(retry_window));
    let mut subbuilds = SubBuildManifest::new();
    let engine = ResolutionEngine::from_settings(&layout, &fetcher, &mut subbuilds, &settings);
    let report = Resolver::new(engine).run(&root)?;

    let subbuild_path = layout.build_dir().join(SUBBUILD_MANIFEST);
    subbuilds.save(&subbuild_path)?;

    if let Some(file) = summary_file {
        let cwd = std::env::current_dir()?;
        let target = NormalizedPath::new(cwd.join(file));
        ConfigStore::new().save(&target, &report)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report, &subbuild_path);
    Ok(())
}

fn print_report(report: &ResolutionReport, subbuild_path: &NormalizedPath) {
    for notice in &report.notices {
        println!("{} {}", "OVERRIDE".yellow().bold(), notice);
    }
    if !report.notices.is_empty() {
        println!();
    }

    print!("{}", report.summary.render());
    println!();
    println!(
        "{} {} dependencies integrated; sub-builds written to {}",
        "OK".green().bold(),
        report.integrated.len(),
        subbuild_path
    );
}
