//! CLI argument parsing using clap derive

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use deptree_core::SettingsLayer;
use deptree_meta::SourcePolicy;

/// deptree - resolve nested dependency manifests, fetching each dependency once
#[derive(Parser, Debug)]
#[command(name = "deptree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve and materialize the dependency tree of a project
    ///
    /// Reads the project's manifest, fetches every dependency once, recurses
    /// into their manifests and writes `<build_dir>/deptree-subbuilds.toml`.
    ///
    /// Examples:
    ///   deptree resolve                      # Resolve the current directory
    ///   deptree resolve app --workspace      # Share checkouts across builds
    ///   deptree resolve --json               # Machine-readable report
    Resolve {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Also write the report to FILE (.toml, .json or .yaml)
        #[arg(long, value_name = "FILE")]
        summary_file: Option<PathBuf>,

        /// Keep retrying failed URL downloads for up to SECS seconds
        #[arg(long, value_name = "SECS", default_value_t = 30)]
        retry_window: u64,
    },

    /// List the declarations of a single manifest without fetching anything
    ///
    /// The manifest name and mixed-source policy come from the same layered
    /// settings `resolve` uses.
    List {
        /// Directory holding the manifest
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the effective settings for a project
    Config {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

/// Settings overrides shared by `resolve` and `config`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsArgs {
    /// Materialize into the shared workspace
    #[arg(long, env = "DEPTREE_WORKSPACE")]
    pub workspace: bool,

    /// Materialize into the build cache even if configured otherwise
    #[arg(long)]
    pub no_workspace: bool,

    /// Shared workspace directory
    #[arg(long, env = "DEPTREE_WORKSPACE_DIR", value_name = "DIR")]
    pub workspace_dir: Option<PathBuf>,

    /// Manifest file name
    #[arg(long, env = "DEPTREE_MANIFEST", value_name = "NAME")]
    pub manifest: Option<String>,

    /// Build directory
    #[arg(long, env = "DEPTREE_BUILD_DIR", value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Declarations mixing source kinds: reject (strict) or pick by priority
    #[arg(long, value_name = "POLICY")]
    pub mixed_sources: Option<SourcePolicy>,
}

impl SettingsArgs {
    /// Override layer; relative directories are taken from `cwd`.
    pub fn layer(&self, cwd: &Path) -> SettingsLayer {
        let use_workspace = if self.no_workspace {
            Some(false)
        } else if self.workspace {
            Some(true)
        } else {
            None
        };

        SettingsLayer {
            manifest: self.manifest.clone(),
            use_workspace,
            workspace_dir: self.workspace_dir.as_deref().map(|dir| absolute(cwd, dir)),
            build_dir: self.build_dir.as_deref().map(|dir| absolute(cwd, dir)),
            reuse_existing: None,
            mixed_sources: self.mixed_sources,
        }
    }
}

fn absolute(cwd: &Path, dir: &Path) -> String {
    if dir.as_os_str().is_empty() || dir.is_absolute() {
        dir.to_string_lossy().to_string()
    } else {
        cwd.join(dir).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from::<[&str; 0], &str>([]);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_short_verbose_flag_after_subcommand() {
        let cli = Cli::parse_from(["deptree", "list", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_resolve_defaults() {
        let cli = Cli::parse_from(["deptree", "resolve"]);
        match cli.command {
            Some(Commands::Resolve {
                path,
                json,
                summary_file,
                retry_window,
                ..
            }) => {
                assert_eq!(path, PathBuf::from("."));
                assert!(!json);
                assert!(summary_file.is_none());
                assert_eq!(retry_window, 30);
            }
            other => panic!("expected resolve, got {other:?}"),
        }
    }

    #[test]
    fn parse_mixed_sources_policy() {
        let cli = Cli::parse_from(["deptree", "resolve", "--mixed-sources", "priority"]);
        let Some(Commands::Resolve { settings, .. }) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(settings.mixed_sources, Some(SourcePolicy::Priority));
    }

    #[test]
    fn parse_retry_window() {
        let cli = Cli::parse_from(["deptree", "resolve", "--retry-window", "0"]);
        let Some(Commands::Resolve { retry_window, .. }) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(retry_window, 0);
    }

    #[test]
    fn invalid_policy_is_rejected() {
        let result = Cli::try_parse_from(["deptree", "resolve", "--mixed-sources", "loose"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_list_takes_settings_flags() {
        let cli = Cli::parse_from([
            "deptree",
            "list",
            "app",
            "--manifest",
            "deps.lst",
            "--mixed-sources",
            "priority",
        ]);
        let Some(Commands::List { path, settings, .. }) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(path, PathBuf::from("app"));
        assert_eq!(settings.manifest.as_deref(), Some("deps.lst"));
        assert_eq!(settings.mixed_sources, Some(SourcePolicy::Priority));
    }

    #[test]
    fn no_workspace_wins_over_workspace() {
        let args = SettingsArgs {
            workspace: true,
            no_workspace: true,
            ..Default::default()
        };
        assert_eq!(args.layer(Path::new("/cwd")).use_workspace, Some(false));
    }

    #[test]
    fn unset_flags_leave_layer_empty() {
        assert_eq!(
            SettingsArgs::default().layer(Path::new("/cwd")),
            SettingsLayer::default()
        );
    }

    #[test]
    fn relative_dirs_use_cwd() {
        let args = SettingsArgs {
            build_dir: Some(PathBuf::from("out")),
            workspace_dir: Some(PathBuf::from("/abs/ws")),
            ..Default::default()
        };
        let layer = args.layer(Path::new("/cwd"));
        assert_eq!(layer.build_dir.as_deref(), Some("/cwd/out"));
        assert_eq!(layer.workspace_dir.as_deref(), Some("/abs/ws"));
    }
}
