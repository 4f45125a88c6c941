//! Show effective settings

use std::path::Path;

use colored::Colorize;

use deptree_core::ConfigResolver;

use crate::cli::SettingsArgs;
use crate::commands::{effective_settings, project_root};
use crate::error::Result;

/// Display the settings a `resolve` in `path` would use
pub fn run_config(path: &Path, args: &SettingsArgs, json: bool) -> Result<()> {
    let root = project_root(path)?;
    let settings = effective_settings(&root, args)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let files = ConfigResolver::new(root.clone());
    println!("{}", "deptree settings".bold());
    println!();
    println!("  {:<16} {}", "Project:".dimmed(), root);
    println!("  {:<16} {}", "Manifest:".dimmed(), settings.manifest);
    println!(
        "  {:<16} {}",
        "Mode:".dimmed(),
        if settings.use_workspace {
            "workspace"
        } else {
            "cache"
        }
    );
    println!("  {:<16} {}", "Workspace dir:".dimmed(), settings.workspace_dir);
    println!("  {:<16} {}", "Build dir:".dimmed(), settings.build_dir);
    println!("  {:<16} {}", "Reuse existing:".dimmed(), settings.reuse_existing);
    println!("  {:<16} {}", "Mixed sources:".dimmed(), settings.mixed_sources);
    println!();
    println!(
        "  {:<16} {}",
        "Config file:".dimmed(),
        if files.has_config() { "yes" } else { "no" }
    );
    println!(
        "  {:<16} {}",
        "Local overrides:".dimmed(),
        if files.has_local_overrides() { "yes" } else { "no" }
    );
    Ok(())
}
