//! List the declarations of one manifest

use std::path::Path;

use colored::Colorize;
use indexmap::IndexMap;
use serde::Serialize;

use deptree_meta::ManifestReader;

use crate::cli::SettingsArgs;
use crate::commands::{effective_settings, project_root};
use crate::error::{CliError, Result};

#[derive(Debug, Serialize)]
struct ListedDependency<'a> {
    name: &'a str,
    kind: String,
    uri: &'a str,
    revision: String,
    options: &'a IndexMap<String, String>,
}

/// Print the declarations of the manifest in `path` without fetching.
pub fn run_list(path: &Path, args: &SettingsArgs, json: bool) -> Result<()> {
    let root = project_root(path)?;
    let settings = effective_settings(&root, args)?;
    let reader = ManifestReader::new(settings.manifest.clone());

    let specs = reader
        .read_specs(&root, settings.mixed_sources)?
        .ok_or_else(|| CliError::user(format!("no {} found in {}", reader.file_name(), root)))?;

    if json {
        let listed: Vec<ListedDependency<'_>> = specs
            .iter()
            .map(|spec| ListedDependency {
                name: &spec.name,
                kind: spec.kind().to_string(),
                uri: spec.uri(),
                revision: spec.revision(),
                options: &spec.options,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if specs.is_empty() {
        println!("{}", "(no dependencies declared)".dimmed());
        return Ok(());
    }

    let width = specs.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for spec in &specs {
        let revision = spec.revision();
        let revision = if revision.is_empty() {
            "(default)".dimmed().to_string()
        } else {
            revision
        };
        println!(
            "  {:<width$}  {:<11}  {}  {}",
            spec.name,
            spec.kind().to_string().cyan(),
            spec.uri(),
            revision,
        );
        for (key, value) in &spec.options {
            println!("  {:<width$}    {} {}", "", key.dimmed(), value);
        }
    }
    Ok(())
}
