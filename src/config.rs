// config.rs

use std::path::PathBuf;

use crate::alias::ALIAS_MAX;
use crate::history::HISTORY_MAX;
use crate::store::Stores;

const HISTORY_FILE_NAME: &str = ".shell_history";
const ALIAS_FILE_NAME: &str = ".shell_aliases";

/// Startup settings, read once from the process environment.
#[derive(Clone, Debug)]
pub struct ShellConfig {
    pub home: Option<PathBuf>,
    pub search_path: Option<String>,
    pub stores: Stores,
    pub history_capacity: usize,
    pub alias_capacity: usize,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let home = non_empty("HOME").map(PathBuf::from);
        let store_path = |override_var: &str, file_name: &str| {
            non_empty(override_var)
                .map(PathBuf::from)
                .or_else(|| home.as_ref().map(|h| h.join(file_name)))
        };
        let stores = Stores {
            history_file: store_path("HISTFILE", HISTORY_FILE_NAME),
            alias_file: store_path("ALIASFILE", ALIAS_FILE_NAME),
        };
        if let Some(unsaved) = unsaved_tables(&stores) {
            tracing::warn!("HOME is not set; {} will not be saved", unsaved);
        }
        let history_capacity = match non_empty("HISTSIZE") {
            None => HISTORY_MAX,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!("ignoring invalid HISTSIZE {:?}", raw);
                    HISTORY_MAX
                }
            },
        };
        Self {
            search_path: lookup("PATH"),
            home,
            stores,
            history_capacity,
            alias_capacity: ALIAS_MAX,
        }
    }
}

/// Names the tables that have no store file.
fn unsaved_tables(stores: &Stores) -> Option<&'static str> {
    match (stores.alias_file.is_none(), stores.history_file.is_none()) {
        (true, true) => Some("aliases and history"),
        (true, false) => Some("aliases"),
        (false, true) => Some("history"),
        (false, false) => None,
    }
}
