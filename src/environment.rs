// environment.rs

use std::env;
use std::path::PathBuf;

use crate::error::ShellError;

/// Process-global state the builtins touch: the home directory and the
/// search path. The search path is kept twice so it can be put back on exit.
pub struct Environment {
    home: Option<PathBuf>,
    path_master: Option<String>,
    path_current: Option<String>,
}

impl Environment {
    pub fn new(home: Option<PathBuf>, search_path: Option<String>) -> Self {
        Self {
            home,
            path_current: search_path.clone(),
            path_master: search_path,
        }
    }

    /// Moves the process into the home directory, if there is one.
    pub fn enter_home(&self) {
        match &self.home {
            Some(home) => {
                if let Err(e) = env::set_current_dir(home) {
                    tracing::warn!("cannot enter home directory {}: {}", home.display(), e);
                }
            }
            None => tracing::warn!("HOME is not set; staying in the current directory"),
        }
    }

    /// `cd`: no target means home.
    pub fn change_dir(&self, target: Option<&str>) -> Result<(), ShellError> {
        let target: PathBuf = match target {
            Some(dir) => PathBuf::from(dir),
            None => self.home.clone().ok_or(ShellError::HomeNotSet)?,
        };
        env::set_current_dir(&target).map_err(|source| ShellError::ChangeDir {
            path: target.display().to_string(),
            source,
        })
    }

    pub fn current_dir(&self) -> Result<PathBuf, ShellError> {
        env::current_dir().map_err(ShellError::CurrentDir)
    }

    pub fn search_path(&self) -> Option<&str> {
        self.path_current.as_deref()
    }

    /// Replaces `PATH` for this process and every child spawned after it.
    pub fn set_search_path(&mut self, path: &str) {
        env::set_var("PATH", path);
        self.path_current = Some(path.to_string());
    }

    /// Puts the startup `PATH` back if `setpath` changed it.
    pub fn restore_search_path(&mut self) {
        if self.path_current == self.path_master {
            return;
        }
        match &self.path_master {
            Some(path) => env::set_var("PATH", path),
            None => env::remove_var("PATH"),
        }
        self.path_current = self.path_master.clone();
    }
}

/// Held by tests that change or read the process `PATH` or working directory.
#[cfg(test)]
pub(crate) fn lock_process_env() -> std::sync::MutexGuard<'static, ()> {
    static PROCESS_ENV: std::sync::Mutex<()> = std::sync::Mutex::new(());
    PROCESS_ENV.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cd_without_home_is_an_error() {
        let env = Environment::new(None, None);
        assert!(matches!(env.change_dir(None), Err(ShellError::HomeNotSet)));
    }

    #[test]
    fn cd_to_missing_directory_reports_path() {
        let env = Environment::new(None, None);
        let err = env.change_dir(Some("/definitely/not/a/dir")).unwrap_err();
        assert!(matches!(err, ShellError::ChangeDir { .. }));
        assert!(err.to_string().starts_with("cd: /definitely/not/a/dir: "));
    }

    #[test]
    fn pwd_in_removed_directory_names_the_builtin() {
        let _env = lock_process_env();
        let start = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let doomed = dir.path().join("gone");
        std::fs::create_dir(&doomed).unwrap();
        env::set_current_dir(&doomed).unwrap();
        std::fs::remove_dir(&doomed).unwrap();
        let result = Environment::new(None, None).current_dir();
        env::set_current_dir(start).unwrap();
        let err = result.unwrap_err();
        assert!(matches!(err, ShellError::CurrentDir(_)));
        assert!(err.to_string().starts_with("pwd: "), "{err}");
    }
}
