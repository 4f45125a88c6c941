//! Subversion, Mercurial and CVS sources, driven through their command-line
//! clients.

use std::fs;
use std::io;
use std::process::Command;

use deptree_fs::NormalizedPath;
use deptree_meta::Source;

use crate::{Error, ErrorKind, FetchRequest, Fetcher, Result};

type StepResult<T = ()> = std::result::Result<T, ErrorKind>;

/// Runs `svn`, `hg` or `cvs` to check out or update a source directory.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    svn: String,
    hg: String,
    cvs: String,
}

impl Default for CommandFetcher {
    fn default() -> Self {
        Self {
            svn: "svn".into(),
            hg: "hg".into(),
            cvs: "cvs".into(),
        }
    }
}

impl CommandFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use other client programs, e.g. absolute paths.
    pub fn with_programs(
        svn: impl Into<String>,
        hg: impl Into<String>,
        cvs: impl Into<String>,
    ) -> Self {
        Self {
            svn: svn.into(),
            hg: hg.into(),
            cvs: cvs.into(),
        }
    }

    fn svn(&self, dir: &NormalizedPath, repository: &str, revision: Option<&str>) -> StepResult {
        let mut args: Vec<&str> = Vec::new();
        if dir.join(".svn").is_dir() {
            args.push("update");
            if let Some(revision) = revision {
                args.extend(["-r", revision]);
            }
            return run(&self.svn, &args, dir);
        }

        require_uri(repository)?;
        let parent = ensure_parent(dir)?;
        args.extend(["checkout", "--non-interactive"]);
        if let Some(revision) = revision {
            args.extend(["-r", revision]);
        }
        let target = dir.to_native();
        let target = target.to_string_lossy();
        args.extend([repository, &*target]);
        run(&self.svn, &args, &parent)
    }

    fn hg(&self, dir: &NormalizedPath, repository: &str, tag: Option<&str>) -> StepResult {
        if dir.join(".hg").is_dir() {
            run(&self.hg, &["pull"], dir)?;
        } else {
            require_uri(repository)?;
            let parent = ensure_parent(dir)?;
            let target = dir.to_native();
            let target = target.to_string_lossy();
            run(&self.hg, &["clone", "--noupdate", repository, &*target], &parent)?;
        }

        match tag {
            Some(tag) => run(&self.hg, &["update", "--clean", "-r", tag], dir),
            None => run(&self.hg, &["update", "--clean"], dir),
        }
    }

    fn cvs(
        &self,
        dir: &NormalizedPath,
        repository: &str,
        module: &str,
        tag: Option<&str>,
    ) -> StepResult {
        if dir.join("CVS").is_dir() {
            // Without -d, cvs reads the root recorded in CVS/Root
            let mut args = if repository.is_empty() {
                vec!["update", "-d", "-P"]
            } else {
                vec!["-d", repository, "update", "-d", "-P"]
            };
            if let Some(tag) = tag {
                args.extend(["-r", tag]);
            }
            return run(&self.cvs, &args, dir);
        }

        require_uri(repository)?;
        let parent = ensure_parent(dir)?;
        let dir_name = dir.file_name().unwrap_or(module);
        let mut args = vec!["-d", repository, "checkout", "-d", dir_name];
        if let Some(tag) = tag {
            args.extend(["-r", tag]);
        }
        args.push(module);
        run(&self.cvs, &args, &parent)
    }
}

impl Fetcher for CommandFetcher {
    fn materialize(&self, request: &FetchRequest<'_>) -> Result<NormalizedPath> {
        let dir = &request.source_dir;
        let outcome = match request.source() {
            Source::Svn {
                repository,
                revision,
            } => self.svn(dir, repository, revision.as_deref()),
            Source::Hg { repository, tag } => self.hg(dir, repository, tag.as_deref()),
            Source::Cvs {
                repository,
                module,
                tag,
            } => {
                let module = module.as_deref().unwrap_or(request.name());
                self.cvs(dir, repository, module, tag.as_deref())
            }
            other => Err(ErrorKind::UnsupportedSource { kind: other.kind() }),
        };

        outcome.map_err(|kind| Error::new(request, kind))?;
        Ok(dir.clone())
    }
}

/// A fresh checkout needs somewhere to check out from.
fn require_uri(repository: &str) -> StepResult {
    if repository.is_empty() {
        return Err(ErrorKind::MissingUri);
    }
    Ok(())
}

fn ensure_parent(dir: &NormalizedPath) -> StepResult<NormalizedPath> {
    let parent = dir.parent().unwrap_or_else(|| NormalizedPath::new("."));
    let native = parent.to_native();
    fs::create_dir_all(&native).map_err(|e| deptree_fs::Error::io(&native, e))?;
    Ok(parent)
}

fn run(program: &str, args: &[&str], cwd: &NormalizedPath) -> StepResult {
    tracing::info!(program = %program, args = ?args, cwd = %cwd, "Running source client");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd.to_native())
        .output()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ErrorKind::CommandNotFound {
                program: program.to_string(),
            },
            _ => deptree_fs::Error::io(cwd.to_native(), e).into(),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(ErrorKind::CommandFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
