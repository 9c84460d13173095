//! Layered build configuration for MSVC projects. Write a `vcplan.toml`,
//! pick a profile, and get the exact `cl.exe` / `link.exe` invocation.
//!
//! Vcplan turns a small, sparse TOML file into a complete, validated,
//! deterministic compiler invocation plan:
//!
//! ```ignore
//! let root = find_project_root(&std::env::current_dir()?);
//! let outcome = build_plan(PlanRequest::new(root, BuildProfile::Release))?;
//! println!("{}", outcome.plan.command_line());
//! ```
//!
//! That single call reads `vcplan.toml` if present, merges it over compiled
//! defaults, applies any CLI overrides, resolves `auto` values for the
//! profile, validates the result, and compiles the ordered argument lists.
//!
//! # Design: struct as source of truth
//!
//! [`Configuration`] (via confique's `Config` derive) is the schema for
//! everything. `#[config(default = ...)]` attributes are the defaults table,
//! `#[config(nested)]` sections map to TOML tables and dotted diagnostic
//! paths, and `///` doc comments become the comments in the `--init`
//! template. Add a field to the struct and the file format, defaults, and
//! template all pick it up.
//!
//! # Layer precedence
//!
//! ```text
//! Compiled defaults     #[config(default = ...)]
//!        ↑ overridden by
//! vcplan.toml           the project's persisted file
//!        ↑ overridden by
//! CLI overrides         -D / --arch / --standard / -o
//! ```
//!
//! Every layer is sparse: a file only needs the keys it wants to change, and
//! unset keys fall through to the layer below. Presence is what counts — a
//! key set to an explicit empty list stays empty instead of falling through.
//! The one append-style override is `-D`: each occurrence adds a define to
//! the merged list rather than replacing it.
//!
//! # The `auto` sentinel
//!
//! Four fields default to the string `"auto"` and are profile-resolved
//! rather than fixed: `compiler.optimization`, `compiler.debug_info`,
//! `linker.lto`, and `linker.strip_unreferenced`. `debug` turns
//! optimization off and debugging on; `release` does the opposite. An
//! explicit concrete value always wins over the profile policy. In the model
//! this is [`Setting<T>`](Setting), and profile resolution is the only code
//! that turns `Auto` into a value — downstream phases take a
//! [`ResolvedConfig`] and cannot see an unresolved configuration.
//!
//! # Validation
//!
//! [`validate`] runs every cross-field check and batches all findings into a
//! [`ValidationReport`] — one run reports every problem, not just the first.
//! Each [`Diagnostic`] carries a stable code (`VC101`...), the dotted path
//! of the offending field, and a severity; notes are advisory and never
//! block compilation.
//!
//! # Determinism
//!
//! The same resolved configuration always compiles to byte-identical
//! argument lists. Flags are emitted in a fixed category order,
//! order-independent collections (defines, disabled warning codes) are
//! sorted before emission, and order-significant collections (libraries,
//! library paths, include dirs) keep their input order exactly. Plans are
//! safe to diff and to cache-key.
//!
//! # Strict mode
//!
//! Strict parsing is on by default: a key in `vcplan.toml` that matches no
//! field fails loading with the file path, key, and line number. Pass
//! `strict: false` (or `--lenient`) to ignore unknown keys instead.
//!
//! # Error handling
//!
//! All fallible operations return [`PlanError`]. Errors are user-facing:
//! parse failures name the file, unknown keys include line numbers, and
//! validation failures carry the full batched report. Internal invariant
//! violations — an `auto` value reaching the plan compiler — are defects in
//! calling code and panic instead.
//!
//! # CLI
//!
//! The `vcplan` binary (behind the `clap` feature, on by default) fronts the
//! pipeline: positional profile, `-D`/`--arch`/`--standard`/`-o` overrides,
//! `--init` for a commented starter file, `--show-config` for the resolved
//! configuration as JSON. The library itself has no dependency on any CLI
//! framework:
//!
//! ```toml
//! vcplan = { version = "...", default-features = false }
//! ```

pub mod error;

#[cfg(feature = "clap")]
mod cli;
mod file;
mod model;
mod overrides;
mod persist;
mod pipeline;
mod plan;
mod profile;
mod resolve;
mod setting;
mod validate;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::{Cli, run};
pub use error::PlanError;
pub use file::{CONFIG_FILE_NAME, find_project_root, load_config_file, project_dir_name};
pub use model::{
    Arch, CallingConvention, Charset, CompilerSection, CompilerSecuritySection, Configuration,
    ConformanceSection, DebugInfo, DriverModel, DriverSection, FloatMode, LinkerSection,
    LinkerSecuritySection, OptLevel, OutputKind, PchSection, ProjectSection, ResourcesSection,
    RuntimeLinkage, SourcesSection, Standard, Subsystem, WarningsSection,
};
pub use overrides::CliOverrides;
pub use persist::{generate_template, save, to_document, write_template};
pub use pipeline::{PlanOutcome, PlanRequest, build_plan};
pub use plan::{InvocationPlan, compile_plan};
pub use profile::{BuildProfile, ResolvedConfig, resolve_profile};
pub use resolve::{ResolveInput, resolve_configuration};
pub use setting::{Setting, Toggle};
pub use validate::{Diagnostic, Severity, ValidationReport, validate};
