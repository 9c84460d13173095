//! Project-root discovery and config-file loading.
//!
//! The project root is the nearest ancestor of the starting directory that
//! contains either a `vcplan.toml` or a `src/` directory. The walk is
//! inclusive of the starting directory and stops at the first hit; when no
//! ancestor qualifies, the starting directory itself is the root (a fresh
//! project that has neither yet).
//!
//! Missing config files are not errors: a project with no `vcplan.toml`
//! resolves to pure defaults. Only actual I/O errors (permissions, etc.) are
//! propagated.

use std::path::{Path, PathBuf};

use crate::error::PlanError;

/// The persisted configuration file name, always at the project root.
pub const CONFIG_FILE_NAME: &str = "vcplan.toml";

/// Walk from `start` toward the filesystem root looking for a project root.
///
/// A directory qualifies if it contains `vcplan.toml` or a `src/`
/// subdirectory. Returns `start` itself when nothing qualifies.
pub fn find_project_root(start: &Path) -> PathBuf {
    let mut current = start;
    loop {
        if current.join(CONFIG_FILE_NAME).is_file() || current.join("src").is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return start.to_path_buf(),
        }
    }
}

/// The fallback project name: the root directory's file name.
pub fn project_dir_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Read `{root}/vcplan.toml` if it exists.
///
/// Returns `Ok(None)` when the file is absent; defaults apply. I/O errors
/// other than not-found are propagated.
pub fn load_config_file(root: &Path) -> Result<Option<(PathBuf, String)>, PlanError> {
    let path = root.join(CONFIG_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(Some((path, content))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PlanError::Io { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn root_is_dir_with_config_file() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("proj");
        let deep = project.join("tools").join("scripts");
        fs::create_dir_all(&deep).unwrap();
        fs::write(project.join(CONFIG_FILE_NAME), "").unwrap();

        assert_eq!(find_project_root(&deep), project);
    }

    #[test]
    fn root_is_dir_with_src() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("proj");
        let deep = project.join("docs");
        fs::create_dir_all(project.join("src")).unwrap();
        fs::create_dir_all(&deep).unwrap();

        assert_eq!(find_project_root(&deep), project);
    }

    #[test]
    fn nearest_marker_wins() {
        let dir = TempDir::new().unwrap();
        let outer = dir.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(inner.join("src")).unwrap();
        fs::write(outer.join(CONFIG_FILE_NAME), "").unwrap();

        assert_eq!(find_project_root(&inner), inner);
    }

    #[test]
    fn no_marker_falls_back_to_start() {
        let dir = TempDir::new().unwrap();
        let bare = dir.path().join("bare");
        fs::create_dir_all(&bare).unwrap();

        assert_eq!(find_project_root(&bare), bare);
    }

    #[test]
    fn start_dir_itself_qualifies() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();

        assert_eq!(find_project_root(dir.path()), dir.path());
    }

    #[test]
    fn missing_config_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_config_file(dir.path()).unwrap().is_none());
    }

    #[test]
    fn present_config_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[project]\nkind = \"dll\"\n",
        )
        .unwrap();

        let (path, content) = load_config_file(dir.path()).unwrap().unwrap();
        assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));
        assert!(content.contains("dll"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_config_file_is_an_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let result = load_config_file(dir.path());
        assert!(matches!(result, Err(PlanError::Io { .. })));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn dir_name_of_root() {
        assert_eq!(project_dir_name(Path::new("/work/demo")), "demo");
    }
}
