// history.rs

use itertools::Itertools;
use thiserror::Error;

use crate::tokenizer::DELIMITERS;

/// Default number of lines the ring keeps.
pub const HISTORY_MAX: usize = 20;

/// The literal that recalls the previous command.
pub const BANG_BANG: &str = "!!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub sequence: u64,
    pub text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("!!: no history")]
    NoHistory,
    #[error("!{0}: invalid history number")]
    InvalidNumber(String),
    #[error("!{0}: event no longer in history")]
    Evicted(u64),
    #[error("no valid historical command")]
    NoValidCommand,
}

/// A bang reference found at the start of an input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recall<'a> {
    /// `!!`
    Previous,
    /// `!<n>`, digits not yet validated.
    Numbered(&'a str),
}

impl<'a> Recall<'a> {
    /// Recognises `!!` (the whole line) or `!<digit>...` (the first token).
    /// Returns the reference and whatever follows the reference token.
    pub fn parse(line: &'a str) -> Option<(Recall<'a>, &'a str)> {
        let line = line.trim_matches(DELIMITERS);
        if line == BANG_BANG {
            return Some((Recall::Previous, ""));
        }
        let rest = line.strip_prefix('!')?;
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let (number, tail) = rest
            .split_once(DELIMITERS)
            .unwrap_or((rest, ""));
        Some((Recall::Numbered(number), tail))
    }
}

/// A line whose first word starts with `!`. `!!` never recalls one of these.
fn is_bang_line(text: &str) -> bool {
    text.trim_start_matches(DELIMITERS).starts_with('!')
}

fn is_bang_bang(text: &str) -> bool {
    text.trim_matches(DELIMITERS) == BANG_BANG
}

/// Sequence-numbered ring of input lines. Slot = sequence mod capacity, and
/// every write overwrites its slot. Entries remember their sequence so reads
/// past the eviction horizon come back empty instead of stale.
pub struct HistoryRing {
    slots: Vec<Option<HistoryEntry>>,
    next_seq: u64,
}

impl HistoryRing {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            next_seq: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot_of(&self, sequence: u64) -> usize {
        (sequence % self.slots.len() as u64) as usize
    }

    /// Stores `text` under the next sequence number and returns that number.
    pub fn record(&mut self, text: &str) -> u64 {
        let sequence = self.next_seq;
        self.next_seq = sequence.saturating_add(1);
        let slot = self.slot_of(sequence);
        self.slots[slot] = Some(HistoryEntry {
            sequence,
            text: text.to_string(),
        });
        sequence
    }

    /// Places a persisted entry under its original sequence number. A slot
    /// already holding a newer entry is left alone.
    pub fn restore(&mut self, sequence: u64, text: &str) {
        if sequence == 0 {
            return;
        }
        let slot = self.slot_of(sequence);
        let newer_resident = self.slots[slot]
            .as_ref()
            .is_some_and(|e| e.sequence > sequence);
        if !newer_resident {
            self.slots[slot] = Some(HistoryEntry {
                sequence,
                text: text.to_string(),
            });
        }
        self.next_seq = self.next_seq.max(sequence.saturating_add(1));
    }

    /// Total lines recorded so far.
    pub fn last_count(&self) -> u64 {
        self.next_seq - 1
    }

    pub fn fetch(&self, sequence: u64) -> Option<&str> {
        self.slots[self.slot_of(sequence)]
            .as_ref()
            .filter(|e| e.sequence == sequence)
            .map(|e| e.text.as_str())
    }

    /// `!!`: the newest resident line that is not itself a bang line.
    pub fn resolve_bang(&self) -> Result<&str, HistoryError> {
        let last = self.last_count();
        if last == 0 {
            return Err(HistoryError::NoHistory);
        }
        let oldest = last.saturating_sub(self.capacity() as u64 - 1).max(1);
        (oldest..=last)
            .rev()
            .filter_map(|seq| self.fetch(seq))
            .find(|text| !is_bang_line(text))
            .ok_or(HistoryError::NoValidCommand)
    }

    /// `!<n>`: entry `n`, stepping back past literal `!!` lines.
    pub fn resolve_numbered(&self, number: &str) -> Result<&str, HistoryError> {
        let invalid = || HistoryError::InvalidNumber(number.to_string());
        let requested: u64 = number.parse().map_err(|_| invalid())?;
        if requested == 0 || requested > self.last_count() {
            return Err(invalid());
        }
        let mut seq = requested;
        loop {
            match self.fetch(seq) {
                None if seq == requested => return Err(HistoryError::Evicted(requested)),
                None => return Err(HistoryError::NoValidCommand),
                Some(text) if is_bang_bang(text) => {
                    seq -= 1;
                    if seq == 0 {
                        return Err(HistoryError::NoValidCommand);
                    }
                }
                Some(text) => return Ok(text),
            }
        }
    }

    pub fn resolve(&self, recall: Recall<'_>) -> Result<&str, HistoryError> {
        match recall {
            Recall::Previous => self.resolve_bang(),
            Recall::Numbered(number) => self.resolve_numbered(number),
        }
    }

    /// Resident entries in ascending sequence order.
    pub fn display(&self) -> Vec<&HistoryEntry> {
        self.slots
            .iter()
            .flatten()
            .sorted_by_key(|e| e.sequence)
            .collect()
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}
