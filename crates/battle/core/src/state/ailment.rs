use bitflags::bitflags;
use strum::{Display, EnumIter, FromRepr, IntoStaticStr};

/// Persistent status conditions. A combatant carries at most one at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Ailment {
    Paralysis = 0,
    Poison = 1,
    Toxic = 2,
    Burn = 3,
    Freeze = 4,
    Sleep = 5,
    Fear = 6,
    Confusion = 7,
    Parasitized = 8,
    Petrify = 9,
}

impl Ailment {
    /// Ailments that skip the action outright.
    pub const fn blocks_action(self) -> bool {
        matches!(
            self,
            Ailment::Freeze | Ailment::Sleep | Ailment::Fear | Ailment::Petrify
        )
    }

    /// Ailments that deal damage at the end of each turn.
    pub const fn is_residual(self) -> bool {
        matches!(
            self,
            Ailment::Poison | Ailment::Toxic | Ailment::Burn | Ailment::Parasitized
        )
    }

    /// Residual damage as a fraction of max HP for the given elapsed turn count.
    pub fn residual_damage(self, max_hp: u32, elapsed: u8) -> u32 {
        let dmg = match self {
            Ailment::Poison | Ailment::Parasitized => max_hp / 8,
            Ailment::Burn => max_hp / 16,
            Ailment::Toxic => max_hp * (elapsed as u32 + 1) / 16,
            _ => 0,
        };
        if self.is_residual() { dmg.max(1) } else { 0 }
    }

    /// Bonus applied to capture odds, in percent.
    pub const fn capture_bonus_pct(self) -> u32 {
        match self {
            Ailment::Sleep | Ailment::Freeze | Ailment::Petrify => 200,
            Ailment::Paralysis | Ailment::Poison | Ailment::Toxic | Ailment::Burn => 150,
            _ => 100,
        }
    }
}

/// An active ailment with its remaining duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AilmentState {
    pub kind: Ailment,
    pub turns_left: u8,
    /// Turn-ends survived so far; drives escalating toxic damage.
    pub elapsed: u8,
}

bitflags! {
    /// Set of ailments, used for immunity wards.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AilmentSet: u16 {
        const PARALYSIS = 1 << 0;
        const POISON = 1 << 1;
        const TOXIC = 1 << 2;
        const BURN = 1 << 3;
        const FREEZE = 1 << 4;
        const SLEEP = 1 << 5;
        const FEAR = 1 << 6;
        const CONFUSION = 1 << 7;
        const PARASITIZED = 1 << 8;
        const PETRIFY = 1 << 9;
    }
}

impl From<Ailment> for AilmentSet {
    fn from(kind: Ailment) -> Self {
        AilmentSet::from_bits_truncate(1 << kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ailment_set_maps_each_kind_to_its_bit() {
        assert_eq!(AilmentSet::from(Ailment::Paralysis), AilmentSet::PARALYSIS);
        assert_eq!(AilmentSet::from(Ailment::Petrify), AilmentSet::PETRIFY);
        let ward = AilmentSet::POISON | AilmentSet::TOXIC;
        assert!(ward.contains(Ailment::Toxic.into()));
        assert!(!ward.contains(Ailment::Burn.into()));
    }

    #[test]
    fn toxic_damage_escalates() {
        assert_eq!(Ailment::Toxic.residual_damage(160, 0), 10);
        assert_eq!(Ailment::Toxic.residual_damage(160, 2), 30);
        assert_eq!(Ailment::Poison.residual_damage(4, 0), 1);
        assert_eq!(Ailment::Sleep.residual_damage(160, 0), 0);
    }
}
