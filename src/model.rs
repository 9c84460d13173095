//! The typed configuration model: every recognized setting, grouped into
//! sections that mirror the `vcplan.toml` layout.
//!
//! The struct is the schema for everything. `#[config(default = ...)]`
//! attributes are the defaults table — total, pure, profile-independent.
//! `///` doc comments become the comments in the generated template. Nesting
//! maps to TOML sections and dotted key paths (`compiler.warnings.level`).
//!
//! Fields without a compiled default (`Option<T>`) are truly optional or are
//! filled by the merger: `project.name` defaults to the containing directory
//! name and `project.output_name` to `{name}{extension-for-kind}` once the
//! project root is known.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::setting::{Setting, Toggle};

/// The fully-typed build configuration, one invocation's worth.
///
/// Constructed fresh per run by the merger, mutated only by the profile
/// resolver (replacing `auto`), read-only everywhere after that.
#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Project identity and output selection.
    #[config(nested)]
    pub project: ProjectSection,

    /// Compiler (cl.exe) options.
    #[config(nested)]
    pub compiler: CompilerSection,

    /// Linker (link.exe) options.
    #[config(nested)]
    pub linker: LinkerSection,

    /// Source and include selection.
    #[config(nested)]
    pub sources: SourcesSection,

    /// Precompiled header settings.
    #[config(nested)]
    pub pch: PchSection,

    /// Windows resource script settings.
    #[config(nested)]
    pub resources: ResourcesSection,

    /// Kernel-driver settings. Only meaningful when `project.kind = "driver"`.
    #[config(nested)]
    pub driver: DriverSection,
}

impl Configuration {
    /// The configuration with every field at its compiled default — the
    /// lowest-precedence layer, before any file or CLI override.
    pub fn baseline() -> Configuration {
        Configuration::builder()
            .load()
            .expect("vcplan: every non-optional field carries a compiled default")
    }

    /// Look up the baseline value for a dotted key path, e.g.
    /// `"compiler.warnings.level"`. `None` for unknown keys and for fields
    /// whose default is "absent".
    pub fn default_for(dotted_key: &str) -> Option<toml::Value> {
        let table = toml::Value::try_from(Self::baseline()).ok()?;
        table_get(table.as_table()?, dotted_key).cloned()
    }
}

/// Navigate a `toml::Table` by dotted key path (e.g. `"linker.security.aslr"`).
pub(crate) fn table_get<'a>(table: &'a toml::Table, dotted_key: &str) -> Option<&'a toml::Value> {
    let mut current = table;
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((path, leaf)) => (Some(path), leaf),
        None => (None, dotted_key),
    };
    if let Some(path) = path {
        for segment in path.split('.') {
            current = current.get(segment)?.as_table()?;
        }
    }
    current.get(leaf)
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct ProjectSection {
    /// Project name. Defaults to the name of the project root directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// What to build: "exe", "dll", "lib", or "driver".
    #[config(default = "exe")]
    pub kind: OutputKind,

    /// Target architecture: "x86", "x64", or "arm64".
    #[config(default = "x64")]
    pub architecture: Arch,

    /// Directory for build outputs, relative to the project root.
    #[config(default = "build")]
    pub output_dir: PathBuf,

    /// Output file name. Defaults to `{name}` plus the extension for `kind`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

impl ProjectSection {
    /// Project name after the merger has run.
    ///
    /// # Panics
    ///
    /// Panics if the merger has not filled the name — a defect in calling code.
    pub fn resolved_name(&self) -> &str {
        self.name
            .as_deref()
            .expect("vcplan: internal invariant violated — project.name unresolved, merger must run first")
    }

    /// Output file name after the merger has run.
    ///
    /// # Panics
    ///
    /// Panics if the merger has not filled the output name.
    pub fn resolved_output_name(&self) -> &str {
        self.output_name
            .as_deref()
            .expect("vcplan: internal invariant violated — project.output_name unresolved, merger must run first")
    }
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct CompilerSection {
    /// Language standard: "c11", "c17", "c++17", "c++20", "c++23", or "latest".
    #[config(default = "c++20")]
    pub standard: Standard,

    /// C runtime linkage: "dynamic" (/MD) or "static" (/MT).
    #[config(default = "dynamic")]
    pub runtime: RuntimeLinkage,

    /// Optimization level: "auto", "none", "size", "speed", or "full".
    /// "auto" resolves to "none" in debug and "full" in release.
    #[config(default = "auto")]
    pub optimization: Setting<OptLevel>,

    /// Debug information: "auto", "none", "minimal", or "full".
    /// "auto" resolves to "full" in debug and "none" in release (or "minimal"
    /// when `linker.debug_info` explicitly requests symbols).
    #[config(default = "auto")]
    pub debug_info: Setting<DebugInfo>,

    /// Compile translation units in parallel (/MP).
    #[config(default = true)]
    pub parallel: bool,

    /// Enable C++ exceptions (/EHsc).
    #[config(default = true)]
    pub exceptions: bool,

    /// Enable run-time type information. Disabling emits /GR-.
    #[config(default = true)]
    pub rtti: bool,

    /// Floating-point model: "precise", "fast", or "strict".
    #[config(default = "precise")]
    pub float_mode: FloatMode,

    /// Default calling convention: "cdecl", "stdcall", "fastcall", or "vectorcall".
    #[config(default = "cdecl")]
    pub calling_convention: CallingConvention,

    /// Character set: "unicode", "multibyte", or "none".
    #[config(default = "unicode")]
    pub charset: Charset,

    /// Package individual functions for the linker (/Gy).
    #[config(default = false)]
    pub function_level_linking: bool,

    /// Pool identical string literals (/GF).
    #[config(default = false)]
    pub string_pooling: bool,

    /// Preprocessor defines, `NAME` or `NAME=VALUE`. Duplicate names are a
    /// validation error. Sorted by name before emission.
    #[config(default = [])]
    pub defines: Vec<String>,

    /// Warning configuration.
    #[config(nested)]
    pub warnings: WarningsSection,

    /// Conformance options.
    #[config(nested)]
    pub conformance: ConformanceSection,

    /// Compile-time security options.
    #[config(nested)]
    pub security: CompilerSecuritySection,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct WarningsSection {
    /// Warning level 0-4 (/W{n}).
    #[config(default = 4)]
    pub level: u8,

    /// Treat warnings as errors (/WX).
    #[config(default = false)]
    pub as_errors: bool,

    /// Warning codes to disable (/wd{code}). Order-independent.
    #[config(default = [])]
    pub disabled: Vec<String>,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct ConformanceSection {
    /// Permissive mode. When false (the default), /permissive- is emitted.
    #[config(default = false)]
    pub permissive: bool,

    /// Report the real __cplusplus value (/Zc:__cplusplus).
    #[config(default = true)]
    pub cplusplus_macro: bool,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct CompilerSecuritySection {
    /// Buffer security checks (/GS). Disabling emits /GS-.
    #[config(default = true)]
    pub buffer_checks: bool,

    /// Control flow guard at compile time (/guard:cf).
    #[config(default = false)]
    pub control_flow_guard: bool,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct LinkerSection {
    /// Libraries to link, in order. Link order is preserved exactly.
    #[config(default = [])]
    pub libraries: Vec<String>,

    /// Library search paths (/LIBPATH), in order.
    #[config(default = [])]
    pub library_paths: Vec<PathBuf>,

    /// Subsystem: "console", "windows", "native", "efi_application",
    /// "boot_application", or "posix".
    #[config(default = "console")]
    pub subsystem: Subsystem,

    /// Link-time code generation (/LTCG): "auto", "off", or "on".
    /// "auto" resolves to "off" in debug and "on" in release.
    #[config(default = "auto")]
    pub lto: Setting<Toggle>,

    /// Strip unreferenced symbols (/OPT:REF /OPT:ICF): "auto", "off", or "on".
    /// "auto" resolves to "off" in debug and "on" in release.
    #[config(default = "auto")]
    pub strip_unreferenced: Setting<Toggle>,

    /// Entry point override (/ENTRY). Driver builds default to
    /// `driver.entry_point` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Module-definition file (/DEF). Library kinds only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub def_file: Option<PathBuf>,

    /// Stack reservation in bytes (/STACK). Must be a positive multiple of 4096.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_reserve: Option<u64>,

    /// Heap reservation in bytes (/HEAP). Must be a positive multiple of 4096.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap_reserve: Option<u64>,

    /// Generate a map file (/MAP).
    #[config(default = false)]
    pub map_file: bool,

    /// Generate linker debug info (/DEBUG), independent of the profile.
    #[config(default = false)]
    pub debug_info: bool,

    /// Link-time security options.
    #[config(nested)]
    pub security: LinkerSecuritySection,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct LinkerSecuritySection {
    /// Address space layout randomization (/DYNAMICBASE).
    #[config(default = true)]
    pub aslr: bool,

    /// Data execution prevention (/NXCOMPAT).
    #[config(default = true)]
    pub dep: bool,

    /// Control flow guard at link time (/guard:cf).
    #[config(default = false)]
    pub cfg: bool,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct SourcesSection {
    /// Directories scanned for sources, relative to the project root.
    #[config(default = ["src"])]
    pub source_dirs: Vec<PathBuf>,

    /// Include directories (/I), in order.
    #[config(default = ["src", "include"])]
    pub include_dirs: Vec<PathBuf>,

    /// Recognized source file extensions.
    #[config(default = [".cpp", ".cc", ".c", ".cxx"])]
    pub extensions: Vec<String>,

    /// Glob patterns excluded from discovery.
    #[config(default = [])]
    pub exclude_patterns: Vec<String>,

    /// External directories compiled without warnings.
    #[config(default = [])]
    pub external_dirs: Vec<PathBuf>,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct PchSection {
    /// Use a precompiled header.
    #[config(default = false)]
    pub enabled: bool,

    /// Header to precompile (e.g. "pch.h"). Required when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Source file that creates the precompiled header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct ResourcesSection {
    /// Compile resource scripts.
    #[config(default = false)]
    pub enabled: bool,

    /// Resource script files (.rc).
    #[config(default = [])]
    pub files: Vec<PathBuf>,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct DriverSection {
    /// Build as a kernel driver. Required when `project.kind = "driver"`.
    #[config(default = false)]
    pub enabled: bool,

    /// Driver model: "wdm", "kmdf", or "wdf".
    #[config(default = "kmdf")]
    pub model: DriverModel,

    /// Driver entry point symbol.
    #[config(default = "DriverEntry")]
    pub entry_point: String,

    /// Minimum target OS version.
    #[config(default = "win10")]
    pub target_os_floor: String,

    /// Build as a file system minifilter. Requires `enabled = true`.
    #[config(default = false)]
    pub minifilter: bool,
}

// ---------------------------------------------------------------------------
// Enumerated values
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Exe,
    Dll,
    Lib,
    Driver,
}

impl OutputKind {
    /// File extension for this kind, dot included.
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Exe => ".exe",
            OutputKind::Dll => ".dll",
            OutputKind::Lib => ".lib",
            OutputKind::Driver => ".sys",
        }
    }

    pub fn is_library(self) -> bool {
        matches!(self, OutputKind::Dll | OutputKind::Lib)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Arch {
    X86,
    X64,
    Arm64,
}

impl Arch {
    /// Value for the linker's /MACHINE flag.
    pub fn machine(self) -> &'static str {
        match self {
            Arch::X86 => "X86",
            Arch::X64 => "X64",
            Arch::Arm64 => "ARM64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standard {
    #[serde(rename = "c11")]
    C11,
    #[serde(rename = "c17")]
    C17,
    #[serde(rename = "c++17")]
    Cpp17,
    #[serde(rename = "c++20")]
    Cpp20,
    #[serde(rename = "c++23")]
    Cpp23,
    #[serde(rename = "latest")]
    Latest,
}

impl Standard {
    pub fn flag(self) -> &'static str {
        match self {
            Standard::C11 => "/std:c11",
            Standard::C17 => "/std:c17",
            Standard::Cpp17 => "/std:c++17",
            Standard::Cpp20 => "/std:c++20",
            Standard::Cpp23 => "/std:c++23",
            Standard::Latest => "/std:c++latest",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Standard::C11 => "c11",
            Standard::C17 => "c17",
            Standard::Cpp17 => "c++17",
            Standard::Cpp20 => "c++20",
            Standard::Cpp23 => "c++23",
            Standard::Latest => "latest",
        })
    }
}

impl FromStr for Standard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c11" => Ok(Standard::C11),
            "c17" => Ok(Standard::C17),
            "c++17" => Ok(Standard::Cpp17),
            "c++20" => Ok(Standard::Cpp20),
            "c++23" => Ok(Standard::Cpp23),
            "latest" => Ok(Standard::Latest),
            other => Err(format!(
                "unknown standard '{other}' (expected c11, c17, c++17, c++20, c++23, or latest)"
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeLinkage {
    Dynamic,
    Static,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptLevel {
    None,
    Size,
    Speed,
    Full,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugInfo {
    None,
    Minimal,
    Full,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FloatMode {
    Precise,
    Fast,
    Strict,
}

impl FloatMode {
    pub fn flag(self) -> &'static str {
        match self {
            FloatMode::Precise => "/fp:precise",
            FloatMode::Fast => "/fp:fast",
            FloatMode::Strict => "/fp:strict",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallingConvention {
    Cdecl,
    Stdcall,
    Fastcall,
    Vectorcall,
}

impl CallingConvention {
    pub fn flag(self) -> &'static str {
        match self {
            CallingConvention::Cdecl => "/Gd",
            CallingConvention::Stdcall => "/Gz",
            CallingConvention::Fastcall => "/Gr",
            CallingConvention::Vectorcall => "/Gv",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    Unicode,
    Multibyte,
    None,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    Console,
    Windows,
    Native,
    EfiApplication,
    BootApplication,
    Posix,
}

impl Subsystem {
    /// Value for /SUBSYSTEM.
    pub fn name(self) -> &'static str {
        match self {
            Subsystem::Console => "CONSOLE",
            Subsystem::Windows => "WINDOWS",
            Subsystem::Native => "NATIVE",
            Subsystem::EfiApplication => "EFI_APPLICATION",
            Subsystem::BootApplication => "BOOT_APPLICATION",
            Subsystem::Posix => "POSIX",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverModel {
    Wdm,
    Kmdf,
    Wdf,
}
