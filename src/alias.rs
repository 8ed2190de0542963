// alias.rs

use thiserror::Error;

/// Number of aliases the shell can hold at once.
pub const ALIAS_MAX: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasError {
    #[error("alias: maximum number of aliases ({capacity}) reached")]
    Full { capacity: usize },
}

/// What `AliasTable::add` did with the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Overwritten,
}

/// Fixed-capacity alias store. Removed entries leave an empty slot that the
/// next insertion reuses; entries never move.
pub struct AliasTable {
    slots: Vec<Option<AliasEntry>>,
    live: usize,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::with_capacity(ALIAS_MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            live: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn position(&self, key: &str) -> Option<usize> {
        if key.is_empty() {
            return None;
        }
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|e| e.key == key))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key)
            .and_then(|i| self.slots[i].as_ref())
            .map(|e| e.value.as_str())
    }

    /// Adds `key`, or replaces its value in place if it is already present.
    pub fn add(&mut self, key: &str, value: &str) -> Result<AddOutcome, AliasError> {
        if let Some(entry) = self.position(key).and_then(|i| self.slots[i].as_mut()) {
            entry.value = value.to_string();
            return Ok(AddOutcome::Overwritten);
        }
        let capacity = self.capacity();
        let free = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(AliasError::Full { capacity })?;
        *free = Some(AliasEntry {
            key: key.to_string(),
            value: value.to_string(),
        });
        self.live += 1;
        Ok(AddOutcome::Inserted)
    }

    /// Frees the slot holding `key`. Returns the removed entry.
    pub fn remove(&mut self, key: &str) -> Option<AliasEntry> {
        let removed = self.position(key).and_then(|i| self.slots[i].take());
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Live entries in slot order.
    pub fn list(&self) -> impl Iterator<Item = &AliasEntry> {
        self.slots.iter().flatten()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new()
    }
}
