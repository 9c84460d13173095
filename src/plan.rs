//! The plan compiler: turn a resolved, validated configuration into the
//! ordered argument lists for cl.exe and link.exe plus the output path.
//!
//! Output is deterministic: the same resolved configuration always yields
//! byte-identical sequences. Flags are emitted in a fixed category order
//! (standard → runtime → optimization → debug info → warnings → language →
//! conformance → security → codegen → defines → includes), order-independent
//! collections (defines, disabled warning codes) are sorted before emission,
//! and order-significant collections (libraries, library paths, include
//! dirs) keep their input order exactly.

use std::path::{Path, PathBuf};

use crate::model::{Charset, Configuration, DebugInfo, OptLevel, OutputKind, RuntimeLinkage};
use crate::profile::{BuildProfile, ResolvedConfig};

/// The final invocation plan, ready to hand to a process runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPlan {
    /// Arguments for cl.exe, in emission order.
    pub compiler_args: Vec<String>,
    /// Arguments following /link, in emission order.
    pub linker_args: Vec<String>,
    /// Resolved output path: `{root}/{output_dir}/{output_name}`.
    pub output_path: PathBuf,
}

impl InvocationPlan {
    /// The full invocation as one command line.
    pub fn command_line(&self) -> String {
        format!(
            "cl.exe /nologo {} /link {}",
            self.compiler_args.join(" "),
            self.linker_args.join(" ")
        )
    }
}

/// Compile the invocation plan.
///
/// Requires a configuration that has passed profile resolution and
/// validation; the `ResolvedConfig` type enforces the former and a residual
/// `auto` panics as an internal invariant.
pub fn compile_plan(resolved: &ResolvedConfig, project_root: &Path) -> InvocationPlan {
    let config = resolved.config();
    let profile = resolved.profile();

    let output_path = project_root
        .join(&config.project.output_dir)
        .join(config.project.resolved_output_name());

    InvocationPlan {
        compiler_args: compiler_args(config, profile, project_root),
        linker_args: linker_args(config, &output_path),
        output_path,
    }
}

fn compiler_args(config: &Configuration, profile: BuildProfile, root: &Path) -> Vec<String> {
    let comp = &config.compiler;
    let mut args = Vec::new();

    args.push(comp.standard.flag().to_string());
    args.push(runtime_flag(comp.runtime, profile).to_string());

    let opt = comp.optimization.expect_resolved("compiler.optimization");
    args.extend(optimization_flags(*opt).iter().map(|s| s.to_string()));

    let dbg = comp.debug_info.expect_resolved("compiler.debug_info");
    args.extend(debug_flags(*dbg).iter().map(|s| s.to_string()));

    args.push(format!("/W{}", comp.warnings.level));
    if comp.warnings.as_errors {
        args.push("/WX".to_string());
    }
    let mut disabled = comp.warnings.disabled.clone();
    disabled.sort();
    args.extend(disabled.iter().map(|code| format!("/wd{code}")));

    if comp.exceptions {
        args.push("/EHsc".to_string());
    }
    if !comp.rtti {
        args.push("/GR-".to_string());
    }

    if !comp.conformance.permissive {
        args.push("/permissive-".to_string());
    }
    if comp.conformance.cplusplus_macro {
        args.push("/Zc:__cplusplus".to_string());
    }

    if comp.security.buffer_checks {
        args.push("/GS".to_string());
    } else {
        args.push("/GS-".to_string());
    }
    if comp.security.control_flow_guard {
        args.push("/guard:cf".to_string());
    }

    args.push(comp.float_mode.flag().to_string());
    args.push(comp.calling_convention.flag().to_string());
    if comp.function_level_linking {
        args.push("/Gy".to_string());
    }
    if comp.string_pooling {
        args.push("/GF".to_string());
    }
    if comp.parallel {
        args.push("/MP".to_string());
    }
    args.push("/utf-8".to_string());
    if config.project.kind == OutputKind::Driver {
        args.push("/kernel".to_string());
    }
    if config.pch.enabled
        && let Some(header) = &config.pch.header
    {
        args.push(format!("/Yu\"{header}\""));
    }

    args.extend(charset_defines(comp.charset).iter().map(|s| s.to_string()));
    let mut defines = comp.defines.clone();
    defines.sort();
    args.extend(defines.iter().map(|d| format!("/D{d}")));

    for dir in &config.sources.include_dirs {
        args.push(format!("/I\"{}\"", root.join(dir).display()));
    }

    args
}

fn linker_args(config: &Configuration, output_path: &Path) -> Vec<String> {
    let link = &config.linker;
    let mut args = Vec::new();

    args.push(format!("/MACHINE:{}", config.project.architecture.machine()));
    args.push(format!("/SUBSYSTEM:{}", link.subsystem.name()));

    if link.security.aslr {
        args.push("/DYNAMICBASE".to_string());
    }
    if link.security.dep {
        args.push("/NXCOMPAT".to_string());
    }
    if link.security.cfg {
        args.push("/guard:cf".to_string());
    }

    if link.lto.expect_resolved("linker.lto").enabled() {
        args.push("/LTCG".to_string());
    }
    if link
        .strip_unreferenced
        .expect_resolved("linker.strip_unreferenced")
        .enabled()
    {
        args.push("/OPT:REF".to_string());
        args.push("/OPT:ICF".to_string());
    }

    match config.project.kind {
        OutputKind::Dll => args.push("/DLL".to_string()),
        OutputKind::Driver => args.push("/DRIVER".to_string()),
        OutputKind::Exe | OutputKind::Lib => {}
    }

    let entry = link.entry_point.as_deref().or_else(|| {
        (config.project.kind == OutputKind::Driver).then_some(config.driver.entry_point.as_str())
    });
    if let Some(entry) = entry {
        args.push(format!("/ENTRY:{entry}"));
    }

    if let Some(def) = &link.def_file {
        args.push(format!("/DEF:\"{}\"", def.display()));
    }
    if let Some(bytes) = link.stack_reserve {
        args.push(format!("/STACK:{bytes}"));
    }
    if let Some(bytes) = link.heap_reserve {
        args.push(format!("/HEAP:{bytes}"));
    }
    if link.map_file {
        args.push("/MAP".to_string());
    }
    if link.debug_info {
        args.push("/DEBUG".to_string());
    }

    // Link order is semantically significant: never reorder.
    args.extend(link.libraries.iter().cloned());
    for path in &link.library_paths {
        args.push(format!("/LIBPATH:\"{}\"", path.display()));
    }

    args.push(format!("/OUT:\"{}\"", output_path.display()));
    args
}

fn runtime_flag(runtime: RuntimeLinkage, profile: BuildProfile) -> &'static str {
    let debug = profile == BuildProfile::Debug;
    match runtime {
        RuntimeLinkage::Static if debug => "/MTd",
        RuntimeLinkage::Static => "/MT",
        RuntimeLinkage::Dynamic if debug => "/MDd",
        RuntimeLinkage::Dynamic => "/MD",
    }
}

fn optimization_flags(level: OptLevel) -> &'static [&'static str] {
    match level {
        OptLevel::None => &["/Od"],
        OptLevel::Size => &["/O1"],
        OptLevel::Speed => &["/O2"],
        OptLevel::Full => &["/O2", "/GL"],
    }
}

fn debug_flags(level: DebugInfo) -> &'static [&'static str] {
    match level {
        DebugInfo::None => &[],
        DebugInfo::Minimal => &["/Zi"],
        DebugInfo::Full => &["/Zi", "/RTC1"],
    }
}

fn charset_defines(charset: Charset) -> &'static [&'static str] {
    match charset {
        Charset::Unicode => &["/DUNICODE", "/D_UNICODE"],
        Charset::Multibyte => &["/D_MBCS"],
        Charset::None => &[],
    }
}
