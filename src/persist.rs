//! Writing configuration back to disk: the commented starter template for
//! `--init`, and full-document serialization for round trips.
//!
//! Serialized output is a complete document: every field appears with its
//! current value, including explicit empty lists, so re-reading the file and
//! re-merging reproduces the same configuration without depending on what the
//! compiled defaults happen to be.

use std::path::Path;

use crate::error::PlanError;
use crate::model::Configuration;

/// Generate the commented starter template from the model's doc comments.
pub fn generate_template() -> String {
    confique::toml::template::<Configuration>(confique::toml::FormatOptions::default())
}

/// Write the starter template to `path`, creating parent directories.
///
/// Refuses to overwrite: an existing file is user data.
pub fn write_template(path: &Path) -> Result<(), PlanError> {
    if path.exists() {
        return Err(PlanError::AlreadyInitialized {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PlanError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, generate_template()).map_err(|e| PlanError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serialize a configuration to a full TOML document.
pub fn to_document(config: &Configuration) -> Result<String, PlanError> {
    toml::to_string_pretty(config).map_err(|e| PlanError::InvalidValue {
        key: "<document>".into(),
        reason: e.to_string(),
    })
}

/// Serialize and write a configuration to `path`.
pub fn save(config: &Configuration, path: &Path) -> Result<(), PlanError> {
    let document = to_document(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PlanError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, document).map_err(|e| PlanError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::fixtures::test::config_from_toml;
    use crate::resolve::{ResolveInput, resolve_configuration};

    #[test]
    fn template_lists_every_section() {
        let template = generate_template();
        for section in [
            "[project]", "[compiler]", "[linker]", "[sources]", "[pch]", "[resources]", "[driver]",
        ] {
            assert!(template.contains(section), "missing {section}");
        }
    }

    #[test]
    fn template_carries_doc_comments() {
        let template = generate_template();
        assert!(template.contains('#'));
        assert!(template.contains("auto"));
    }

    #[test]
    fn write_template_creates_file_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("vcplan.toml");

        write_template(&path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[project]"));
    }

    #[test]
    fn write_template_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vcplan.toml");
        fs::write(&path, "# mine\n").unwrap();

        let result = write_template(&path);
        assert!(matches!(result, Err(PlanError::AlreadyInitialized { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");
    }

    #[test]
    fn document_round_trips_through_resolution() {
        let original = config_from_toml(
            "[project]\nkind = \"dll\"\n\
             [compiler]\ndefines = [\"TRACE\"]\noptimization = \"size\"\n\
             [linker]\nlibraries = []\n",
        );

        let document = to_document(&original).unwrap();
        let input = ResolveInput {
            file: Some((PathBuf::from("vcplan.toml"), document)),
            overrides: Default::default(),
            strict: true,
            project_dir_name: "demo".to_string(),
        };
        let reloaded = resolve_configuration(input).unwrap();

        assert_eq!(reloaded, original);
    }

    #[test]
    fn document_preserves_explicit_empty_lists() {
        let config = config_from_toml("[sources]\ninclude_dirs = []\n");
        let document = to_document(&config).unwrap();
        assert!(document.contains("include_dirs = []"));
    }

    #[test]
    fn document_spells_auto_for_unresolved_settings() {
        let config = config_from_toml("");
        let document = to_document(&config).unwrap();
        assert!(document.contains("optimization = \"auto\""));
        assert!(document.contains("lto = \"auto\""));
    }

    #[test]
    fn save_writes_reloadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vcplan.toml");
        let config = config_from_toml("[compiler]\nstandard = \"c++23\"\n");

        save(&config, &path).unwrap();
        let reread = config_from_toml(&fs::read_to_string(&path).unwrap());
        assert_eq!(reread, config);
    }
}
