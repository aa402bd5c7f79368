use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Resolves commands to executables the way a shell would.
pub struct ExecutableResolver;

impl ExecutableResolver {
    /// Locate `command`, searching `PATH` unless it already names a path.
    pub fn resolve(command: &str) -> Option<PathBuf> {
        Self::resolve_in(command, env::var_os("PATH").as_deref())
    }

    /// Locate `command` against an explicit search path.
    pub fn resolve_in(command: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
        let command = command.trim();
        if command.is_empty() {
            return None;
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match which::which_in(command, search_path, cwd) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("Could not resolve {}: {}", command, e);
                None
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn write_script(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn finds_command_on_search_path() {
        let dir = tempdir().unwrap();
        let script = write_script(dir.path(), "brew", 0o755);
        let found = ExecutableResolver::resolve_in("brew", Some(dir.path().as_os_str()));
        assert_eq!(found, Some(script));
    }

    #[test]
    fn ignores_files_without_execute_bit() {
        let dir = tempdir().unwrap();
        write_script(dir.path(), "brew", 0o644);
        assert!(ExecutableResolver::resolve_in("brew", Some(dir.path().as_os_str())).is_none());
    }

    #[test]
    fn accepts_explicit_paths() {
        let dir = tempdir().unwrap();
        let script = write_script(dir.path(), "my-brew", 0o755);
        let found = ExecutableResolver::resolve_in(script.to_str().unwrap(), None);
        assert_eq!(found, Some(script));
    }

    #[test]
    fn rejects_empty_and_missing_commands() {
        let dir = tempdir().unwrap();
        assert!(ExecutableResolver::resolve_in("", Some(dir.path().as_os_str())).is_none());
        assert!(
            ExecutableResolver::resolve_in("definitely-not-here", Some(dir.path().as_os_str()))
                .is_none()
        );
    }
}
