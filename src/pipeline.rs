//! The end-to-end pipeline: load, merge, resolve, validate, compile.
//!
//! [`build_plan`] is the one-call entry point the CLI uses. Library callers
//! who need intermediate results (the merged configuration, the diagnostics
//! before compilation) can run the phases individually; each is a plain
//! function in its own module.

use std::path::PathBuf;

use crate::error::PlanError;
use crate::file;
use crate::overrides::CliOverrides;
use crate::plan::{self, InvocationPlan};
use crate::profile::{BuildProfile, ResolvedConfig, resolve_profile};
use crate::resolve::{ResolveInput, resolve_configuration};
use crate::validate::{ValidationReport, validate};

/// Everything needed to build a plan for one project.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// The project root. Discover it with [`file::find_project_root`].
    pub project_root: PathBuf,
    pub profile: BuildProfile,
    pub overrides: CliOverrides,
    /// Reject unknown keys in the config file.
    pub strict: bool,
}

impl PlanRequest {
    pub fn new(project_root: PathBuf, profile: BuildProfile) -> Self {
        PlanRequest {
            project_root,
            profile,
            overrides: CliOverrides::default(),
            strict: true,
        }
    }
}

/// A successfully compiled plan plus everything learned along the way.
///
/// The report is included even on success: it may carry notes (advisory
/// diagnostics that do not block compilation).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub resolved: ResolvedConfig,
    pub report: ValidationReport,
    pub plan: InvocationPlan,
}

/// Run the full pipeline for one project.
///
/// Phases, in order: read `vcplan.toml` if present, merge defaults + file +
/// CLI overrides, resolve `auto` values for the profile, validate, compile.
/// Validation errors abort with [`PlanError::Validation`] carrying the full
/// batched report; notes alone do not abort.
pub fn build_plan(request: PlanRequest) -> Result<PlanOutcome, PlanError> {
    let input = ResolveInput {
        file: file::load_config_file(&request.project_root)?,
        overrides: request.overrides,
        strict: request.strict,
        project_dir_name: file::project_dir_name(&request.project_root),
    };
    let config = resolve_configuration(input)?;
    let resolved = resolve_profile(config, request.profile);

    let report = validate(&resolved);
    if !report.is_ok() {
        return Err(PlanError::Validation(report));
    }

    let plan = plan::compile_plan(&resolved, &request.project_root);
    Ok(PlanOutcome {
        resolved,
        report,
        plan,
    })
}
