//! Command-line overrides: the highest-precedence configuration layer.
//!
//! Overrides come pre-typed from the CLI parser rather than as loose strings,
//! and two merge behaviors exist: `--arch`, `--standard`, and `-o` replace
//! whatever the lower layers chose, while repeated `-D` definitions append to
//! the merged define list (a CLI define adds to the project's defines, it
//! does not wipe them).

use toml::{Table, Value};

use crate::error::PlanError;
use crate::model::{Arch, Standard};

/// Typed overrides collected from the command line. All fields optional;
/// `default()` is "no overrides".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// Preprocessor defines to append (`-D NAME[=VALUE]`, repeatable).
    pub defines: Vec<String>,
    /// Replace `project.architecture`.
    pub arch: Option<Arch>,
    /// Replace `compiler.standard`.
    pub standard: Option<Standard>,
    /// Replace `project.output_name`.
    pub output_name: Option<String>,
}

impl CliOverrides {
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
            && self.arch.is_none()
            && self.standard.is_none()
            && self.output_name.is_none()
    }
}

/// Apply CLI overrides on top of the merged file/defaults table.
///
/// Fails when the file layer put a scalar where the override's path expects
/// a table or an array (e.g. `project = "hello"` plus `--arch`). That shape
/// is malformed user input, not a caller bug, so it surfaces as an error
/// naming the conflicting key.
pub fn apply(mut merged: Table, overrides: &CliOverrides) -> Result<Table, PlanError> {
    if let Some(arch) = overrides.arch {
        set_nested(&mut merged, "project.architecture", Value::String(arch.to_string()))?;
    }
    if let Some(standard) = overrides.standard {
        set_nested(&mut merged, "compiler.standard", Value::String(standard.to_string()))?;
    }
    if let Some(name) = &overrides.output_name {
        set_nested(&mut merged, "project.output_name", Value::String(name.clone()))?;
    }
    if !overrides.defines.is_empty() {
        append_defines(&mut merged, &overrides.defines)?;
    }
    Ok(merged)
}

/// Set a dotted-key leaf, creating intermediate tables as needed.
fn set_nested(table: &mut Table, dotted_key: &str, value: Value) -> Result<(), PlanError> {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let mut current = table;

    for segment in &segments[..segments.len() - 1] {
        current = current
            .entry(*segment)
            .or_insert_with(|| Value::Table(Table::new()))
            .as_table_mut()
            .ok_or_else(|| PlanError::InvalidValue {
                key: dotted_key.to_string(),
                reason: format!("'{segment}' is not a table"),
            })?;
    }

    let leaf = segments.last().unwrap();
    current.insert(leaf.to_string(), value);
    Ok(())
}

/// Append CLI defines to `compiler.defines`, after whatever the file layer
/// contributed. An absent array means the file contributed nothing; the CLI
/// defines become the whole explicit list.
fn append_defines(table: &mut Table, defines: &[String]) -> Result<(), PlanError> {
    let compiler = table
        .entry("compiler")
        .or_insert_with(|| Value::Table(Table::new()))
        .as_table_mut()
        .ok_or_else(|| PlanError::InvalidValue {
            key: "compiler.defines".to_string(),
            reason: "'compiler' is not a table".to_string(),
        })?;

    let list = compiler
        .entry("defines")
        .or_insert_with(|| Value::Array(Vec::new()));
    let array = list.as_array_mut().ok_or_else(|| PlanError::InvalidValue {
        key: "compiler.defines".to_string(),
        reason: "expected an array".to_string(),
    })?;
    array.extend(defines.iter().map(|d| Value::String(d.clone())));
    Ok(())
}
