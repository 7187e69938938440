use std::collections::HashMap;

/// Address of a scratch slot: the effect that owns it plus a slot name.
///
/// Namespacing by owner keeps two effects from colliding on the same slot name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScratchKey {
    pub owner: &'static str,
    pub slot: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScratchValue {
    Int(i64),
    Flag(bool),
    Counter(u32),
}

/// Typed per-combatant scratch storage for effects that keep state across turns.
///
/// Reading a slot with the wrong accessor yields the default for that accessor.
#[derive(Clone, Debug, Default)]
pub struct ScratchMap {
    entries: HashMap<ScratchKey, ScratchValue>,
}

impl ScratchMap {
    pub fn get(&self, owner: &'static str, slot: &'static str) -> Option<ScratchValue> {
        self.entries.get(&ScratchKey { owner, slot }).copied()
    }

    pub fn int(&self, owner: &'static str, slot: &'static str) -> i64 {
        match self.get(owner, slot) {
            Some(ScratchValue::Int(v)) => v,
            _ => 0,
        }
    }

    pub fn set_int(&mut self, owner: &'static str, slot: &'static str, value: i64) {
        self.entries
            .insert(ScratchKey { owner, slot }, ScratchValue::Int(value));
    }

    pub fn flag(&self, owner: &'static str, slot: &'static str) -> bool {
        matches!(self.get(owner, slot), Some(ScratchValue::Flag(true)))
    }

    pub fn set_flag(&mut self, owner: &'static str, slot: &'static str, value: bool) {
        self.entries
            .insert(ScratchKey { owner, slot }, ScratchValue::Flag(value));
    }

    pub fn counter(&self, owner: &'static str, slot: &'static str) -> u32 {
        match self.get(owner, slot) {
            Some(ScratchValue::Counter(v)) => v,
            _ => 0,
        }
    }

    pub fn set_counter(&mut self, owner: &'static str, slot: &'static str, value: u32) {
        self.entries
            .insert(ScratchKey { owner, slot }, ScratchValue::Counter(value));
    }

    /// Increments a counter and returns the new value.
    pub fn bump(&mut self, owner: &'static str, slot: &'static str) -> u32 {
        let next = self.counter(owner, slot).saturating_add(1);
        self.set_counter(owner, slot, next);
        next
    }

    pub fn remove(&mut self, owner: &'static str, slot: &'static str) -> Option<ScratchValue> {
        self.entries.remove(&ScratchKey { owner, slot })
    }

    pub fn clear_owner(&mut self, owner: &'static str) {
        self.entries.retain(|key, _| key.owner != owner);
    }

    /// Drops every slot whose owner `keep` rejects.
    pub fn retain_owners(&mut self, mut keep: impl FnMut(&'static str) -> bool) {
        self.entries.retain(|key, _| keep(key.owner));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_namespaced_by_owner() {
        let mut scratch = ScratchMap::default();
        scratch.set_counter("rage", "hits", 2);
        scratch.set_counter("fury_cutter", "hits", 5);

        assert_eq!(scratch.bump("rage", "hits"), 3);
        assert_eq!(scratch.counter("fury_cutter", "hits"), 5);

        scratch.clear_owner("rage");
        assert_eq!(scratch.counter("rage", "hits"), 0);
        assert_eq!(scratch.len(), 1);
    }

    #[test]
    fn mismatched_accessor_reads_default() {
        let mut scratch = ScratchMap::default();
        scratch.set_flag("charge", "ready", true);
        assert_eq!(scratch.int("charge", "ready"), 0);
        assert!(scratch.flag("charge", "ready"));
    }
}
