//! Recursive resolution of a dependency tree
//!
//! Each manifest is handled in two phases:
//!
//! 1. [`ResolutionEngine::register_all`] records every declaration with the
//!    registry before anything below it is looked at, so a project's own
//!    choices beat those of its dependencies.
//! 2. [`ResolutionEngine::materialize_and_recurse`] fetches the names this
//!    manifest was first to request, then descends into each dependency not
//!    yet visited and integrates it once its subtree is done.

use deptree_fetch::{FetchRequest, Fetcher};
use deptree_fs::NormalizedPath;
use deptree_meta::{DependencySpec, ManifestReader, SourcePolicy};
use serde::Serialize;

use crate::context::display_revision;
use crate::{
    ConflictNotice, Error, Layout, Materialized, ProjectIntegrator, Registration,
    ResolutionContext, Result, Settings, Summary,
};

/// Walks manifests and drives the fetcher and integrator.
pub struct ResolutionEngine<'a> {
    layout: &'a Layout,
    fetcher: &'a dyn Fetcher,
    integrator: &'a mut dyn ProjectIntegrator,
    reader: ManifestReader,
    policy: SourcePolicy,
    reuse_existing: bool,
    integrated: Vec<String>,
}

impl<'a> ResolutionEngine<'a> {
    pub fn new(
        layout: &'a Layout,
        fetcher: &'a dyn Fetcher,
        integrator: &'a mut dyn ProjectIntegrator,
    ) -> Self {
        Self {
            layout,
            fetcher,
            integrator,
            reader: ManifestReader::default(),
            policy: SourcePolicy::default(),
            reuse_existing: true,
            integrated: Vec::new(),
        }
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.reader = ManifestReader::new(name);
        self
    }

    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// In workspace mode, skip fetching dependencies whose source dir is
    /// already populated.
    pub fn with_reuse_existing(mut self, reuse: bool) -> Self {
        self.reuse_existing = reuse;
        self
    }

    /// Engine configured from effective settings.
    pub fn from_settings(
        layout: &'a Layout,
        fetcher: &'a dyn Fetcher,
        integrator: &'a mut dyn ProjectIntegrator,
        settings: &Settings,
    ) -> Self {
        Self::new(layout, fetcher, integrator)
            .with_manifest_name(settings.manifest.clone())
            .with_policy(settings.mixed_sources)
            .with_reuse_existing(settings.reuse_existing)
    }

    /// Names handed to the integrator so far, in integration order.
    pub fn integrated(&self) -> &[String] {
        &self.integrated
    }

    /// Resolve everything reachable from `dir`.
    ///
    /// A directory without a manifest has no dependencies. Any parse, fetch
    /// or integration error aborts the whole run.
    pub fn resolve(&mut self, ctx: &mut ResolutionContext, dir: &NormalizedPath) -> Result<()> {
        tracing::info!(dir = %dir, "Resolving");

        let Some(specs) = self.reader.read_specs(dir, self.policy)? else {
            tracing::debug!(dir = %dir, manifest = %self.reader.file_name(), "No manifest");
            return Ok(());
        };

        let registrations = self.register_all(ctx, dir, &specs);
        self.materialize_and_recurse(ctx, dir, &specs, &registrations)
    }

    /// Register every declaration of one manifest, in file order.
    ///
    /// Conflicting requests produce a notice and a warning; the returned
    /// registrations line up with `specs`.
    pub fn register_all(
        &self,
        ctx: &mut ResolutionContext,
        dir: &NormalizedPath,
        specs: &[DependencySpec],
    ) -> Vec<Registration> {
        specs
            .iter()
            .map(|spec| {
                let requested = spec.revision();
                let registration = ctx.registry_mut().register_request(&spec.name, &requested);

                if registration.conflict {
                    tracing::warn!(
                        dependency = %spec.name,
                        requested = %requested,
                        using = %display_revision(&registration.chosen_revision),
                        declared_in = %dir,
                        "Revision overridden by an earlier request"
                    );
                    ctx.push_notice(ConflictNotice {
                        name: spec.name.clone(),
                        requested,
                        chosen: registration.chosen_revision.clone(),
                        declared_in: dir.clone(),
                    });
                }
                registration
            })
            .collect()
    }

    /// Fetch first requests, then recurse into and integrate each pending
    /// dependency of one manifest.
    pub fn materialize_and_recurse(
        &mut self,
        ctx: &mut ResolutionContext,
        dir: &NormalizedPath,
        specs: &[DependencySpec],
        registrations: &[Registration],
    ) -> Result<()> {
        for (spec, registration) in specs.iter().zip(registrations) {
            if !registration.is_first_request || ctx.registry().is_materialized(&spec.name) {
                continue;
            }
            let materialized = self.materialize(dir, spec)?;
            ctx.registry_mut().mark_materialized(&spec.name, materialized);
        }

        for spec in specs {
            if !ctx.registry_mut().begin_recursion(&spec.name) {
                tracing::debug!(dependency = %spec.name, "Already visited, skipping");
                continue;
            }

            let materialized = ctx
                .registry()
                .entry(&spec.name)
                .and_then(|entry| entry.materialized.clone())
                .ok_or_else(|| Error::NotMaterialized {
                    name: spec.name.clone(),
                })?;

            self.resolve(ctx, &materialized.project_dir)?;
            self.integrator.integrate(
                &spec.name,
                &materialized.project_dir,
                &materialized.binary_dir,
            )?;
            ctx.registry_mut().mark_added(&spec.name);
            self.integrated.push(spec.name.clone());
        }
        Ok(())
    }

    fn materialize(&self, dir: &NormalizedPath, spec: &DependencySpec) -> Result<Materialized> {
        let dirs = self.layout.dirs(&spec.name);

        let source_dir = if self.layout.uses_workspace()
            && self.reuse_existing
            && dirs.source_dir.is_populated_dir()
        {
            tracing::info!(
                dependency = %spec.name,
                dir = %dirs.source_dir,
                "Reusing existing workspace checkout"
            );
            dirs.source_dir.clone()
        } else {
            let request = FetchRequest {
                spec,
                declared_in: dir.clone(),
                source_dir: dirs.source_dir.clone(),
                binary_dir: dirs.binary_dir.clone(),
            };
            let path = self.fetcher.materialize(&request)?;
            tracing::info!(
                dependency = %spec.name,
                kind = %spec.kind(),
                revision = %display_revision(&spec.revision()),
                dir = %path,
                "Materialized"
            );
            path
        };

        let project_dir = match spec.source_subdir() {
            Some(subdir) => source_dir.join(subdir),
            None => source_dir.clone(),
        };

        Ok(Materialized {
            uri: spec.uri().to_string(),
            source_dir,
            binary_dir: dirs.binary_dir,
            project_dir,
        })
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub summary: Summary,
    pub notices: Vec<ConflictNotice>,
    /// Dependency names in integration (post-) order
    pub integrated: Vec<String>,
}

/// Top-level entry point: one fresh context per run.
pub struct Resolver<'a> {
    engine: ResolutionEngine<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(engine: ResolutionEngine<'a>) -> Self {
        Self { engine }
    }

    /// Resolve the tree rooted at `root` and report on it.
    pub fn run(mut self, root: &NormalizedPath) -> Result<ResolutionReport> {
        let mut ctx = ResolutionContext::new();
        self.engine.resolve(&mut ctx, root)?;

        let summary = Summary::from_registry(ctx.registry());
        let (_, notices) = ctx.into_parts();
        Ok(ResolutionReport {
            summary,
            notices,
            integrated: self.engine.integrated,
        })
    }
}
