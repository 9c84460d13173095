//! The override merger: combine defaults, the persisted file, and CLI
//! overrides into one fully-populated `Configuration`.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, so the full
//! merge is testable with synthetic inputs. Steps:
//!
//! 1. Reject unknown keys in the file (strict mode)
//! 2. Parse the file to a `toml::Table`
//! 3. Apply CLI overrides on top (replace or append per flag)
//! 4. Deserialize the merged table into the typed layer
//! 5. Let confique fill compiled defaults for everything still absent
//! 6. Fill derived identity fields (project name, output file name)
//!
//! Precedence is CLI > file > defaults, and every layer is sparse: a key the
//! file does not mention falls through to the default, while a key the file
//! sets to an explicit empty list stays an explicit empty list.

use std::path::{Path, PathBuf};

use confique::Config;
use toml::{Table, Value};

use crate::error::PlanError;
use crate::model::Configuration;
use crate::overrides::{self, CliOverrides};

/// All pre-loaded data needed to merge a configuration. No I/O happens here.
pub struct ResolveInput {
    /// The persisted config file, if one was found.
    pub file: Option<(PathBuf, String)>,
    /// Typed command-line overrides (highest priority).
    pub overrides: CliOverrides,
    /// Whether to reject unknown keys in the config file.
    pub strict: bool,
    /// Name of the project root directory, the fallback project name.
    pub project_dir_name: String,
}

impl ResolveInput {
    /// Input with no file and no overrides: resolves to pure defaults.
    pub fn empty(project_dir_name: &str) -> Self {
        ResolveInput {
            file: None,
            overrides: CliOverrides::default(),
            strict: true,
            project_dir_name: project_dir_name.to_string(),
        }
    }
}

/// Merge all layers into one fully-populated configuration.
///
/// Auto-capable fields may still hold `Auto` afterwards; profile resolution
/// is a separate phase.
pub fn resolve_configuration(input: ResolveInput) -> Result<Configuration, PlanError> {
    let mut merged = Table::new();

    if let Some((path, content)) = &input.file {
        if input.strict {
            reject_unknown_keys(content, path)?;
        }
        let table: Table = toml::from_str(content).map_err(|e| PlanError::Parse {
            path: path.clone(),
            source: e,
        })?;
        merged = deep_merge(merged, table);
    }

    merged = overrides::apply(merged, &input.overrides)?;

    let layer: <Configuration as Config>::Layer =
        Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| match &input.file {
                Some((path, _)) => PlanError::Parse {
                    path: path.clone(),
                    source: e,
                },
                None => PlanError::InvalidValue {
                    key: "<merged>".into(),
                    reason: e.to_string(),
                },
            })?;

    let mut config = Configuration::builder().preloaded(layer).load()?;
    fill_identity(&mut config, &input.project_dir_name);
    Ok(config)
}

/// Deep-merge `overlay` on top of `base`. Two tables under the same key merge
/// key-by-key; any other pairing is decided wholesale in the overlay's favor.
/// Explicit empty arrays are values like any other.
fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, incoming) in overlay {
        match (base.get_mut(&key), incoming) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                *existing = deep_merge(std::mem::take(existing), incoming);
            }
            (_, incoming) => {
                base.insert(key, incoming);
            }
        }
    }
    base
}

/// Fill `project.name` and `project.output_name` when no layer set them.
fn fill_identity(config: &mut Configuration, project_dir_name: &str) {
    if config.project.name.is_none() {
        config.project.name = Some(project_dir_name.to_string());
    }
    if config.project.output_name.is_none() {
        let name = config.project.resolved_name();
        let ext = config.project.kind.extension();
        config.project.output_name = Some(format!("{name}{ext}"));
    }
}

/// Reject config-file keys that match no field in the model.
///
/// Deserializes into the all-optional layer with `serde_ignored` capturing
/// every key the layer does not consume, and reports each with a best-effort
/// line number.
fn reject_unknown_keys(content: &str, path: &Path) -> Result<(), PlanError> {
    let mut unknown: Vec<String> = Vec::new();

    let deserializer = toml::Deserializer::new(content);
    let _layer: <Configuration as Config>::Layer =
        serde_ignored::deserialize(deserializer, |ignored| {
            unknown.push(ignored.to_string());
        })
        .map_err(|e| PlanError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    if unknown.is_empty() {
        return Ok(());
    }

    let errors: Vec<PlanError> = unknown
        .into_iter()
        .map(|key| {
            let line = locate_key(content, &key);
            PlanError::UnknownKey {
                key,
                path: path.to_path_buf(),
                line,
            }
        })
        .collect();

    Err(PlanError::UnknownKeys(errors))
}

/// Find the 1-indexed line of a dotted key in TOML source. The leaf name
/// alone is ambiguous (`enabled` exists in several sections), so the scan
/// follows `[section]` headers and only matches assignments whose enclosing
/// section equals the key's prefix. Quoted keys and inline tables are not
/// handled; 0 means the key could not be located.
fn locate_key(content: &str, dotted_key: &str) -> usize {
    let (wanted_section, leaf) = match dotted_key.rsplit_once('.') {
        Some((section, leaf)) => (section.to_string(), leaf),
        None => (String::new(), dotted_key),
    };

    let mut section = String::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if line.starts_with('[') && !line.starts_with("[[") {
            let header = line.trim_start_matches('[').trim_end_matches(']');
            section = header
                .split('.')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(".");
            continue;
        }

        if section == wanted_section
            && let Some(rest) = line.strip_prefix(leaf)
            && rest.trim_start().starts_with('=')
        {
            return index + 1;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arch, OutputKind, Standard, Subsystem};
    use crate::setting::Setting;

    fn with_file(content: &str) -> ResolveInput {
        ResolveInput {
            file: Some((PathBuf::from("vcplan.toml"), content.to_string())),
            ..ResolveInput::empty("demo")
        }
    }

    #[test]
    fn no_file_no_overrides_is_pure_defaults() {
        let config = resolve_configuration(ResolveInput::empty("demo")).unwrap();
        let mut baseline = Configuration::baseline();
        baseline.project.name = Some("demo".into());
        baseline.project.output_name = Some("demo.exe".into());
        assert_eq!(config, baseline);
    }

    #[test]
    fn empty_file_equals_no_file() {
        let with_empty = resolve_configuration(with_file("")).unwrap();
        let without = resolve_configuration(ResolveInput::empty("demo")).unwrap();
        assert_eq!(with_empty, without);
    }

    #[test]
    fn file_overrides_default() {
        let config =
            resolve_configuration(with_file("[compiler]\nstandard = \"c++23\"\n")).unwrap();
        assert_eq!(config.compiler.standard, Standard::Cpp23);
        // Untouched sibling keeps its default.
        assert_eq!(config.compiler.warnings.level, 4);
    }

    #[test]
    fn cli_overrides_file() {
        let input = ResolveInput {
            overrides: CliOverrides {
                arch: Some(Arch::Arm64),
                ..Default::default()
            },
            ..with_file("[project]\narchitecture = \"x86\"\n")
        };
        let config = resolve_configuration(input).unwrap();
        assert_eq!(config.project.architecture, Arch::Arm64);
    }

    #[test]
    fn cli_defines_append_to_file_defines() {
        let input = ResolveInput {
            overrides: CliOverrides {
                defines: vec!["TRACE".into()],
                ..Default::default()
            },
            ..with_file("[compiler]\ndefines = [\"VERSION=1\"]\n")
        };
        let config = resolve_configuration(input).unwrap();
        assert_eq!(config.compiler.defines, vec!["VERSION=1", "TRACE"]);
    }

    #[test]
    fn explicit_empty_list_is_preserved() {
        // `include_dirs = []` means the user cleared the list; it must not
        // fall back to the default ["src", "include"].
        let config =
            resolve_configuration(with_file("[sources]\ninclude_dirs = []\n")).unwrap();
        assert!(config.sources.include_dirs.is_empty());
        // An absent list still gets the default.
        assert_eq!(config.sources.source_dirs, vec![PathBuf::from("src")]);
    }

    #[test]
    fn nested_subsection_merges_sparsely() {
        let config = resolve_configuration(with_file(
            "[compiler.warnings]\nas_errors = true\n",
        ))
        .unwrap();
        assert!(config.compiler.warnings.as_errors);
        assert_eq!(config.compiler.warnings.level, 4);
    }

    #[test]
    fn name_defaults_to_directory_name() {
        let config = resolve_configuration(ResolveInput::empty("mygame")).unwrap();
        assert_eq!(config.project.name.as_deref(), Some("mygame"));
        assert_eq!(config.project.output_name.as_deref(), Some("mygame.exe"));
    }

    #[test]
    fn output_name_tracks_kind_extension() {
        let config = resolve_configuration(ResolveInput {
            file: Some((
                PathBuf::from("vcplan.toml"),
                "[project]\nkind = \"driver\"\n".into(),
            )),
            ..ResolveInput::empty("filter")
        })
        .unwrap();
        assert_eq!(config.project.kind, OutputKind::Driver);
        assert_eq!(config.project.output_name.as_deref(), Some("filter.sys"));
    }

    #[test]
    fn explicit_name_and_output_name_are_kept() {
        let config = resolve_configuration(with_file(
            "[project]\nname = \"engine\"\noutput_name = \"engine-v2.exe\"\n",
        ))
        .unwrap();
        assert_eq!(config.project.name.as_deref(), Some("engine"));
        assert_eq!(config.project.output_name.as_deref(), Some("engine-v2.exe"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = resolve_configuration(with_file("[project\nkind ="));
        assert!(matches!(result, Err(PlanError::Parse { .. })));
    }

    #[test]
    fn wrong_value_type_is_a_parse_error() {
        // List expected, scalar found.
        let result = resolve_configuration(with_file("[linker]\nlibraries = \"user32.lib\"\n"));
        assert!(matches!(result, Err(PlanError::Parse { .. })));
    }

    #[test]
    fn strict_rejects_unknown_key_with_line() {
        let result = resolve_configuration(with_file(
            "[compiler]\nstandard = \"c++20\"\noptimize = \"full\"\n",
        ));
        match result.unwrap_err() {
            PlanError::UnknownKeys(errors) => {
                assert_eq!(errors.len(), 1);
                match &errors[0] {
                    PlanError::UnknownKey { key, line, .. } => {
                        assert_eq!(key, "compiler.optimize");
                        assert_eq!(*line, 3);
                    }
                    other => panic!("expected UnknownKey, got {other:?}"),
                }
            }
            other => panic!("expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn lenient_mode_drops_unknown_keys() {
        let input = ResolveInput {
            strict: false,
            ..with_file("[compiler]\nstandard = \"c++23\"\noptimize = \"full\"\n")
        };
        let config = resolve_configuration(input).unwrap();
        assert_eq!(config.compiler.standard, Standard::Cpp23);
    }

    #[test]
    fn lenient_mode_still_errors_on_scalar_section_with_override() {
        // Without strict-mode rejection the malformed shape reaches the
        // override layer; it must come back as an error, never a panic.
        let input = ResolveInput {
            strict: false,
            overrides: CliOverrides {
                arch: Some(Arch::X64),
                ..Default::default()
            },
            ..with_file("project = \"hello\"\n")
        };
        let result = resolve_configuration(input);
        assert!(matches!(result, Err(PlanError::InvalidValue { .. })));
    }

    #[test]
    fn auto_fields_survive_merge_untouched() {
        let config = resolve_configuration(ResolveInput::empty("demo")).unwrap();
        assert!(config.compiler.optimization.is_auto());
        assert!(config.linker.lto.is_auto());
    }

    #[test]
    fn explicit_auto_in_file_equals_default_auto() {
        let config =
            resolve_configuration(with_file("[compiler]\noptimization = \"auto\"\n")).unwrap();
        assert!(config.compiler.optimization.is_auto());
    }

    #[test]
    fn concrete_setting_from_file() {
        let config =
            resolve_configuration(with_file("[linker]\nlto = \"off\"\nsubsystem = \"native\"\n"))
                .unwrap();
        assert_eq!(
            config.linker.lto,
            Setting::Value(crate::setting::Toggle::Off)
        );
        assert_eq!(config.linker.subsystem, Subsystem::Native);
    }

    #[test]
    fn locate_key_tracks_sections() {
        let content = "[compiler]\nstandard = \"c++20\"\n[compiler.warnings]\nlvl = 3\n";
        assert_eq!(locate_key(content, "compiler.warnings.lvl"), 4);
    }

    #[test]
    fn locate_key_top_level_not_confused_by_nested_same_name() {
        let content = "enabled = true\n[driver]\nenabled = true\n";
        assert_eq!(locate_key(content, "enabled"), 1);
    }

    #[test]
    fn deep_merge_overlay_scalar_wins() {
        let base: Table = "[project]\nkind = \"exe\"\narchitecture = \"x64\"\n"
            .parse()
            .unwrap();
        let overlay: Table = "[project]\nkind = \"dll\"\n".parse().unwrap();
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["project"]["kind"].as_str().unwrap(), "dll");
        assert_eq!(merged["project"]["architecture"].as_str().unwrap(), "x64");
    }
}
