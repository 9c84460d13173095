//! Profile resolution: replace every `auto` with the profile's concrete value.
//!
//! The policy table:
//!
//! | field | debug | release |
//! |---|---|---|
//! | `compiler.optimization` | none | full |
//! | `compiler.debug_info` | full | none (minimal when `linker.debug_info` requests symbols) |
//! | `linker.lto` | off | on |
//! | `linker.strip_unreferenced` | off | on |
//!
//! Resolution touches nothing else, never fails, and is idempotent: a
//! configuration with no `auto` left comes back unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Configuration, DebugInfo, OptLevel};
use crate::setting::Toggle;

/// The build profile, selected once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum BuildProfile {
    Debug,
    #[default]
    Release,
}

impl fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildProfile::Debug => "debug",
            BuildProfile::Release => "release",
        })
    }
}

/// A configuration with no `auto` values left, paired with the profile that
/// resolved it. The validator and the plan compiler accept only this type,
/// so an unresolved configuration cannot reach them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    config: Configuration,
    profile: BuildProfile,
}

impl ResolvedConfig {
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn profile(&self) -> BuildProfile {
        self.profile
    }

    pub fn into_config(self) -> Configuration {
        self.config
    }
}

/// Resolve every auto-capable field for `profile`.
pub fn resolve_profile(mut config: Configuration, profile: BuildProfile) -> ResolvedConfig {
    let debug = profile == BuildProfile::Debug;

    config.compiler.optimization = config.compiler.optimization.or_resolve(if debug {
        OptLevel::None
    } else {
        OptLevel::Full
    });

    let release_debug_info = if config.linker.debug_info {
        DebugInfo::Minimal
    } else {
        DebugInfo::None
    };
    config.compiler.debug_info = config.compiler.debug_info.or_resolve(if debug {
        DebugInfo::Full
    } else {
        release_debug_info
    });

    let toggle = if debug { Toggle::Off } else { Toggle::On };
    config.linker.lto = config.linker.lto.or_resolve(toggle);
    config.linker.strip_unreferenced = config.linker.strip_unreferenced.or_resolve(toggle);

    ResolvedConfig { config, profile }
}
