//! Cross-field validation of a resolved configuration.
//!
//! Every check runs; every violation found is reported, each with a stable
//! code and the dotted path of the offending field. The report is plain data:
//! the one-shot CLI aborts on any error, while an interactive editor layered
//! on top could merely display the list.

use std::collections::HashMap;
use std::fmt;

use crate::model::{OutputKind, RuntimeLinkage, Subsystem};
use crate::profile::ResolvedConfig;

/// Page granularity for stack/heap reservation sizes.
const PAGE_SIZE: u64 = 4096;

pub const DRIVER_NOT_ENABLED: &str = "VC101";
pub const DRIVER_SUBSYSTEM: &str = "VC102";
pub const MINIFILTER_WITHOUT_DRIVER: &str = "VC103";
pub const STATIC_RUNTIME_ON_EFI: &str = "VC104";
pub const BAD_STACK_RESERVE: &str = "VC105";
pub const BAD_HEAP_RESERVE: &str = "VC106";
pub const DEF_FILE_MISUSE: &str = "VC107";
pub const DUPLICATE_DEFINE: &str = "VC108";
pub const BAD_WARNING_LEVEL: &str = "VC109";
pub const PCH_WITHOUT_HEADER: &str = "VC110";
pub const WX_WITH_DISABLED: &str = "VC120";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot produce a usable plan.
    Error,
    /// Worth knowing, never fatal.
    Note,
}

/// One violation (or note): stable code, dotted field path, advisory text.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub path: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn error(code: &'static str, path: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            path,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn note(code: &'static str, path: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            path,
            severity: Severity::Note,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "error",
            Severity::Note => "note",
        };
        write!(f, "{kind}[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// Everything found in one validation pass, errors and notes together, in
/// check order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// True when no error-severity diagnostic is present. Notes don't fail.
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Note)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}

/// Run every cross-field check and report all violations in one pass.
pub fn validate(resolved: &ResolvedConfig) -> ValidationReport {
    let config = resolved.config();
    let mut diagnostics = Vec::new();

    if config.project.kind == OutputKind::Driver {
        if !config.driver.enabled {
            diagnostics.push(Diagnostic::error(
                DRIVER_NOT_ENABLED,
                "driver.enabled",
                "project.kind = \"driver\" requires driver.enabled = true",
            ));
        }
        if config.linker.subsystem != Subsystem::Native {
            diagnostics.push(Diagnostic::error(
                DRIVER_SUBSYSTEM,
                "linker.subsystem",
                format!(
                    "kernel drivers require the \"native\" subsystem, got \"{}\"",
                    config.linker.subsystem.name().to_lowercase()
                ),
            ));
        }
    }

    if config.driver.minifilter && !config.driver.enabled {
        diagnostics.push(Diagnostic::error(
            MINIFILTER_WITHOUT_DRIVER,
            "driver.minifilter",
            "minifilter builds require driver.enabled = true",
        ));
    }

    if config.compiler.runtime == RuntimeLinkage::Static
        && config.linker.subsystem == Subsystem::EfiApplication
    {
        diagnostics.push(Diagnostic::error(
            STATIC_RUNTIME_ON_EFI,
            "compiler.runtime",
            "static runtime linkage is incompatible with the efi_application subsystem (EFI binaries cannot depend on the CRT)",
        ));
    }

    if let Some(bytes) = config.linker.stack_reserve
        && !page_aligned(bytes)
    {
        diagnostics.push(Diagnostic::error(
            BAD_STACK_RESERVE,
            "linker.stack_reserve",
            format!("{bytes} is not a positive multiple of {PAGE_SIZE}"),
        ));
    }

    if let Some(bytes) = config.linker.heap_reserve
        && !page_aligned(bytes)
    {
        diagnostics.push(Diagnostic::error(
            BAD_HEAP_RESERVE,
            "linker.heap_reserve",
            format!("{bytes} is not a positive multiple of {PAGE_SIZE}"),
        ));
    }

    if let Some(def) = &config.linker.def_file {
        if !config.project.kind.is_library() {
            diagnostics.push(Diagnostic::error(
                DEF_FILE_MISUSE,
                "linker.def_file",
                format!(
                    "module-definition files apply to dll/lib outputs only, project.kind is \"{}\"",
                    kind_name(config.project.kind)
                ),
            ));
        } else if !def
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("def"))
        {
            diagnostics.push(Diagnostic::error(
                DEF_FILE_MISUSE,
                "linker.def_file",
                format!("'{}' does not have a .def extension", def.display()),
            ));
        }
    }

    check_defines(&config.compiler.defines, &mut diagnostics);

    if config.compiler.warnings.level > 4 {
        diagnostics.push(Diagnostic::error(
            BAD_WARNING_LEVEL,
            "compiler.warnings.level",
            format!(
                "warning level {} is out of range (0-4)",
                config.compiler.warnings.level
            ),
        ));
    }

    if config.pch.enabled && config.pch.header.is_none() {
        diagnostics.push(Diagnostic::error(
            PCH_WITHOUT_HEADER,
            "pch.header",
            "pch.enabled = true requires pch.header",
        ));
    }

    if config.compiler.warnings.as_errors && !config.compiler.warnings.disabled.is_empty() {
        diagnostics.push(Diagnostic::note(
            WX_WITH_DISABLED,
            "compiler.warnings",
            format!(
                "warnings are errors but {} warning code(s) are disabled",
                config.compiler.warnings.disabled.len()
            ),
        ));
    }

    ValidationReport { diagnostics }
}

fn page_aligned(bytes: u64) -> bool {
    bytes > 0 && bytes % PAGE_SIZE == 0
}

fn kind_name(kind: OutputKind) -> &'static str {
    match kind {
        OutputKind::Exe => "exe",
        OutputKind::Dll => "dll",
        OutputKind::Lib => "lib",
        OutputKind::Driver => "driver",
    }
}

/// Every define name may appear once. A second occurrence is an error whether
/// the value conflicts or merely repeats; the message tells them apart.
fn check_defines(defines: &[String], diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, Option<&str>> = HashMap::new();
    for define in defines {
        let (name, value) = match define.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (define.as_str(), None),
        };
        match seen.get(name) {
            None => {
                seen.insert(name, value);
            }
            Some(first) if *first == value => {
                diagnostics.push(Diagnostic::error(
                    DUPLICATE_DEFINE,
                    "compiler.defines",
                    format!("'{name}' is defined more than once"),
                ));
            }
            Some(first) => {
                diagnostics.push(Diagnostic::error(
                    DUPLICATE_DEFINE,
                    "compiler.defines",
                    format!(
                        "'{name}' is defined with conflicting values ('{}' vs '{}')",
                        first.unwrap_or(""),
                        value.unwrap_or("")
                    ),
                ));
            }
        }
    }
}
