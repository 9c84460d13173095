//! Clap front end for the `vcplan` binary.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! The parser maps flags onto [`CliOverrides`] and hands everything to the
//! clap-free [`build_plan`](crate::pipeline::build_plan) pipeline; callers
//! with a different CLI parser (or none) can skip this module and construct
//! [`PlanRequest`](crate::pipeline::PlanRequest) values directly.
//!
//! Exit codes: `0` success, `1` validation failure, `2` load or parse
//! failure.

use std::path::PathBuf;

use clap::Parser;

use crate::error::PlanError;
use crate::file::{self, CONFIG_FILE_NAME};
use crate::model::{Arch, Standard};
use crate::overrides::CliOverrides;
use crate::persist;
use crate::pipeline::{PlanRequest, build_plan};
use crate::profile::BuildProfile;

#[derive(Debug, Parser)]
#[command(name = "vcplan", version, about = "Compute MSVC build invocations from vcplan.toml")]
pub struct Cli {
    /// Build profile.
    #[arg(value_enum, default_value_t = BuildProfile::Release)]
    pub profile: BuildProfile,

    /// Append a preprocessor define (NAME or NAME=VALUE). Repeatable.
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    pub defines: Vec<String>,

    /// Override the target architecture.
    #[arg(long, value_enum, value_name = "ARCH")]
    pub arch: Option<Arch>,

    /// Override the language standard (c11, c17, c++17, c++20, c++23, latest).
    #[arg(long, value_name = "STD")]
    pub standard: Option<Standard>,

    /// Override the output file name.
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    pub output: Option<String>,

    /// Use DIR as the project root instead of discovering it.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Accept unknown keys in the config file instead of failing.
    #[arg(long)]
    pub lenient: bool,

    /// Write a commented starter vcplan.toml to the project root and exit.
    #[arg(long)]
    pub init: bool,

    /// Print the resolved configuration as JSON instead of the plan.
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// The override layer this invocation carries.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            defines: self.defines.clone(),
            arch: self.arch,
            standard: self.standard,
            output_name: self.output.clone(),
        }
    }
}

/// Run one invocation end to end and return the process exit code.
pub fn run(cli: Cli) -> u8 {
    match execute(cli) {
        Ok(()) => 0,
        Err(err @ PlanError::Validation(_)) => {
            eprintln!("{err}");
            1
        }
        Err(PlanError::UnknownKeys(errors)) => {
            for err in errors {
                eprintln!("{err}");
            }
            2
        }
        Err(err) => {
            eprintln!("{err}");
            2
        }
    }
}

fn execute(cli: Cli) -> Result<(), PlanError> {
    let overrides = cli.overrides();
    let root = match cli.root {
        Some(root) => root,
        None => {
            let cwd = std::env::current_dir().map_err(|e| PlanError::Io {
                path: PathBuf::from("."),
                source: e,
            })?;
            file::find_project_root(&cwd)
        }
    };

    if cli.init {
        let path = root.join(CONFIG_FILE_NAME);
        persist::write_template(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let outcome = build_plan(PlanRequest {
        project_root: root,
        profile: cli.profile,
        overrides,
        strict: !cli.lenient,
    })?;

    for note in outcome.report.notes() {
        eprintln!("{note}");
    }

    if cli.show_config {
        let json = serde_json::to_string_pretty(outcome.resolved.config()).map_err(|e| {
            PlanError::InvalidValue {
                key: "<config>".into(),
                reason: e.to_string(),
            }
        })?;
        println!("{json}");
        return Ok(());
    }

    println!("cl");
    for arg in &outcome.plan.compiler_args {
        println!("  {arg}");
    }
    println!("link");
    for arg in &outcome.plan.linker_args {
        println!("  {arg}");
    }
    println!("output: {}", outcome.plan.output_path.display());
    Ok(())
}
