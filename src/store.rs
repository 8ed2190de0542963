// store.rs

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::alias::AliasTable;
use crate::history::HistoryRing;
use crate::tokenizer::{split_words, DELIMITERS};

const ALIAS_KEYWORD: &str = "alias";

/// On-disk homes of the alias table and the history ring. Either may be
/// absent, in which case that table lives only for the session.
#[derive(Clone, Debug, Default)]
pub struct Stores {
    pub alias_file: Option<PathBuf>,
    pub history_file: Option<PathBuf>,
}

impl Stores {
    /// Fills both tables. Problems are logged, never returned.
    pub fn load(&self, aliases: &mut AliasTable, history: &mut HistoryRing) {
        if let Some(path) = &self.alias_file {
            match load_aliases(path, aliases) {
                Ok(n) => tracing::debug!("loaded {} aliases from {}", n, path.display()),
                Err(e) => tracing::warn!("{:#}", e),
            }
        }
        if let Some(path) = &self.history_file {
            match load_history(path, history) {
                Ok(n) => tracing::debug!("loaded {} history entries from {}", n, path.display()),
                Err(e) => tracing::warn!("{:#}", e),
            }
        }
    }

    pub fn save(&self, aliases: &AliasTable, history: &HistoryRing) {
        if let Some(path) = &self.alias_file {
            if let Err(e) = save_aliases(path, aliases) {
                tracing::warn!("{:#}", e);
            }
        }
        if let Some(path) = &self.history_file {
            if let Err(e) = save_history(path, history) {
                tracing::warn!("{:#}", e);
            }
        }
    }
}

/// `alias <key> <value words...>`
fn parse_alias_line(line: &str) -> Option<(String, String)> {
    let words = split_words(line);
    match words.as_slice() {
        [keyword, key, value @ ..] if keyword == ALIAS_KEYWORD && !value.is_empty() => {
            Some((key.clone(), value.join(" ")))
        }
        _ => None,
    }
}

/// `<sequence> <raw line>`; the raw line keeps its inner spacing.
fn parse_history_line(line: &str) -> Result<(u64, &str), String> {
    let (number, text) = line
        .split_once(DELIMITERS)
        .ok_or_else(|| "missing command text".to_string())?;
    let sequence: u64 = number
        .parse()
        .map_err(|_| format!("bad sequence number {:?}", number))?;
    if sequence == 0 || sequence == u64::MAX {
        return Err(format!("sequence number {} out of range", sequence));
    }
    if text.trim_matches(DELIMITERS).is_empty() {
        return Err("missing command text".to_string());
    }
    Ok((sequence, text))
}

fn open_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(BufReader::new(file).lines())
}

pub fn load_aliases(path: &Path, table: &mut AliasTable) -> Result<usize> {
    let mut loaded = 0;
    for (idx, line) in open_lines(path)?.enumerate() {
        let line = line.with_context(|| format!("cannot read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = parse_alias_line(&line) else {
            tracing::warn!("{}:{}: skipping malformed alias line", path.display(), idx + 1);
            continue;
        };
        match table.add(&key, &value) {
            Ok(_) => loaded += 1,
            Err(e) => tracing::warn!("{}:{}: {}", path.display(), idx + 1, e),
        }
    }
    Ok(loaded)
}

pub fn save_aliases(path: &Path, table: &AliasTable) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot write {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for entry in table.list() {
        writeln!(out, "{} {} {}", ALIAS_KEYWORD, entry.key, entry.value)?;
    }
    out.flush()
        .with_context(|| format!("cannot write {}", path.display()))
}

pub fn load_history(path: &Path, ring: &mut HistoryRing) -> Result<usize> {
    let mut loaded = 0;
    for (idx, line) in open_lines(path)?.enumerate() {
        let line = line.with_context(|| format!("cannot read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_history_line(&line) {
            Ok((sequence, text)) => {
                ring.restore(sequence, text);
                loaded += 1;
            }
            Err(reason) => {
                tracing::warn!("{}:{}: skipping history line: {}", path.display(), idx + 1, reason)
            }
        }
    }
    Ok(loaded)
}

pub fn save_history(path: &Path, ring: &HistoryRing) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot write {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for entry in ring.display() {
        writeln!(out, "{} {}", entry.sequence, entry.text)?;
    }
    out.flush()
        .with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasEntry;
    use crate::history::HistoryEntry;
    use pretty_assertions::assert_eq;

    #[test]
    fn alias_lines() {
        assert_eq!(
            parse_alias_line("alias ll ls  -l"),
            Some(("ll".to_string(), "ls -l".to_string()))
        );
        assert_eq!(parse_alias_line("alias ll"), None);
        assert_eq!(parse_alias_line("unalias ll ls"), None);
    }

    #[test]
    fn history_lines() {
        assert_eq!(parse_history_line("3 ls  -l"), Ok((3, "ls  -l")));
        assert!(parse_history_line("0 ls").is_err());
        assert!(parse_history_line("18446744073709551615 ls").is_err());
        assert!(parse_history_line("-2 ls").is_err());
        assert!(parse_history_line("x ls").is_err());
        assert!(parse_history_line("4").is_err());
        assert!(parse_history_line("4 ").is_err());
    }

    #[test]
    fn alias_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases");
        let mut table = AliasTable::new();
        table.add("ll", "ls -l").unwrap();
        table.add("g", "git status --short").unwrap();
        table.add("tmp", "x").unwrap();
        table.remove("tmp");
        save_aliases(&path, &table).unwrap();

        let mut reloaded = AliasTable::new();
        assert_eq!(load_aliases(&path, &mut reloaded).unwrap(), 2);
        let before: Vec<AliasEntry> = table.list().cloned().collect();
        let after: Vec<AliasEntry> = reloaded.list().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn malformed_alias_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases");
        std::fs::write(&path, "alias ok echo hi\nalias short\n\ngarbage line here\n").unwrap();
        let mut table = AliasTable::new();
        assert_eq!(load_aliases(&path, &mut table).unwrap(), 1);
        assert_eq!(table.get("ok"), Some("echo hi"));
    }

    #[test]
    fn history_round_trip_keeps_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        let mut ring = HistoryRing::with_capacity(3);
        for line in ["ls", "cd  /tmp", "!!", "pwd"] {
            ring.record(line);
        }
        save_history(&path, &ring).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "2 cd  /tmp\n3 !!\n4 pwd\n"
        );

        let mut reloaded = HistoryRing::with_capacity(3);
        assert_eq!(load_history(&path, &mut reloaded).unwrap(), 3);
        let before: Vec<HistoryEntry> = ring.display().into_iter().cloned().collect();
        let after: Vec<HistoryEntry> = reloaded.display().into_iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(reloaded.record("next"), 5);
    }

    #[test]
    fn bad_history_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        std::fs::write(&path, "1 ls\n0 zero\nabc def\n-4 neg\n9 pwd\n").unwrap();
        let mut ring = HistoryRing::new();
        assert_eq!(load_history(&path, &mut ring).unwrap(), 2);
        assert_eq!(ring.fetch(1), Some("ls"));
        assert_eq!(ring.fetch(9), Some("pwd"));
        assert_eq!(ring.last_count(), 9);
    }

    #[test]
    fn history_line_at_sequence_limit_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        std::fs::write(&path, "18446744073709551615 ls\n18446744073709551614 pwd\n").unwrap();
        let mut ring = HistoryRing::new();
        assert_eq!(load_history(&path, &mut ring).unwrap(), 1);
        assert_eq!(ring.fetch(u64::MAX), None);
        assert_eq!(ring.fetch(u64::MAX - 1), Some("pwd"));
        assert_eq!(ring.record("next"), u64::MAX);
        assert_eq!(ring.record("again"), u64::MAX);
    }

    #[test]
    fn missing_store_is_an_error_for_the_caller_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = AliasTable::new();
        assert!(load_aliases(&dir.path().join("nope"), &mut table).is_err());
        assert!(table.is_empty());
    }
}
