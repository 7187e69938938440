//! Id → constructor table for atomic effects.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::{Effect, EffectArgs, EffectBuildError, library};
use crate::env::EffectDescriptor;
use crate::state::{Combatant, EffectId, EffectLifetime};

/// Builds an effect from validated arguments.
pub type EffectFactory = fn(&EffectArgs<'_>) -> Result<Arc<dyn Effect>, EffectBuildError>;

#[derive(Clone, Copy)]
struct Entry {
    name: &'static str,
    factory: EffectFactory,
}

/// Registration table populated once at startup.
///
/// Content refers to effects only by numeric id, so adding an ability that
/// reuses a registered behavior with new arguments needs no code.
#[derive(Clone)]
pub struct EffectRegistry {
    entries: HashMap<EffectId, Entry>,
}

impl EffectRegistry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry holding every built-in effect.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        library::register_builtin(&mut registry);
        registry
    }

    /// Registers a factory. Returns the name previously bound to `id`, if any.
    pub fn register(
        &mut self,
        id: u32,
        name: &'static str,
        factory: EffectFactory,
    ) -> Option<&'static str> {
        self.entries
            .insert(EffectId(id), Entry { name, factory })
            .map(|previous| previous.name)
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn name(&self, id: EffectId) -> Option<&'static str> {
        self.entries.get(&id).map(|entry| entry.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the effect a descriptor names.
    pub fn try_build(
        &self,
        descriptor: &EffectDescriptor,
    ) -> Option<Result<Arc<dyn Effect>, EffectBuildError>> {
        let entry = self.entries.get(&descriptor.id)?;
        Some((entry.factory)(&EffectArgs::new(&descriptor.args)))
    }

    /// Builds the effect a descriptor names, logging and skipping unknown ids
    /// and invalid arguments.
    pub fn build(&self, descriptor: &EffectDescriptor) -> Option<Arc<dyn Effect>> {
        match self.try_build(descriptor) {
            Some(Ok(effect)) => Some(effect),
            Some(Err(error)) => {
                warn!(
                    target: "battle::registry",
                    id = descriptor.id.0,
                    name = self.name(descriptor.id).unwrap_or("?"),
                    args = ?descriptor.args,
                    %error,
                    "invalid effect arguments, skipped"
                );
                None
            }
            None => {
                warn!(
                    target: "battle::registry",
                    id = descriptor.id.0,
                    "unknown effect id, skipped"
                );
                None
            }
        }
    }

    /// Resolves a combatant's ability descriptors and attaches them for the
    /// rest of the battle. Returns how many attached.
    pub fn attach_abilities(&self, combatant: &mut Combatant, seq: &mut u64) -> usize {
        let effects: Vec<Arc<dyn Effect>> = combatant
            .abilities
            .iter()
            .filter_map(|descriptor| self.build(descriptor))
            .collect();
        let attached = effects.len();
        for effect in effects {
            combatant.attach(effect, *seq, EffectLifetime::Battle);
            *seq += 1;
        }
        attached
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl core::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::creature;

    #[test]
    fn builtin_table_is_populated() {
        let registry = EffectRegistry::with_builtin();
        assert!(registry.len() >= 150);
        assert_eq!(registry.name(EffectId(1)), Some("damage_boost"));
        assert_eq!(registry.name(EffectId(46)), Some("forced_miss"));
    }

    #[test]
    fn unknown_ids_and_bad_args_are_skipped() {
        let registry = EffectRegistry::with_builtin();
        let mut c = creature(1, 100, 50).with_abilities(vec![
            EffectDescriptor::new(1, &[20]),
            EffectDescriptor::new(9_999, &[]),
            EffectDescriptor::new(1, &[]),
            EffectDescriptor::new(94, &[1]),
        ]);
        let mut seq = 10;
        assert_eq!(registry.attach_abilities(&mut c, &mut seq), 2);
        assert_eq!(seq, 12);
        assert_eq!(c.effects().len(), 2);
        assert!(registry.build(&EffectDescriptor::new(9_999, &[])).is_none());
        assert!(matches!(
            registry.try_build(&EffectDescriptor::new(1, &[])),
            Some(Err(EffectBuildError::MissingArg { index: 0 }))
        ));
    }

    #[test]
    fn register_replaces_previous_binding() {
        let mut registry = EffectRegistry::empty();
        assert!(registry.is_empty());
        fn noop(_: &EffectArgs<'_>) -> Result<Arc<dyn Effect>, EffectBuildError> {
            Err(EffectBuildError::MissingArg { index: 0 })
        }
        assert_eq!(registry.register(500, "first", noop), None);
        assert_eq!(registry.register(500, "second", noop), Some("first"));
        assert_eq!(registry.name(EffectId(500)), Some("second"));
    }
}
