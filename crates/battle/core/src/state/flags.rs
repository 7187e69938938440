use bitflags::bitflags;

bitflags! {
    /// Volatile conditions cleared when the combatant leaves the field.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct VolatileFlags: u16 {
        /// Cannot act for the rest of this turn.
        const FLINCHED = 1 << 0;
        /// Cannot switch out.
        const BOUND = 1 << 1;
        /// Spending this turn charging a two-turn skill.
        const CHARGING = 1 << 2;
        /// Must skip the next action.
        const RECHARGING = 1 << 3;
        /// Incoming attacks are blocked this turn.
        const PROTECTED = 1 << 4;
        /// Healing has no effect.
        const HEAL_BLOCKED = 1 << 5;
        /// Survives any hit this turn with at least 1 HP.
        const ENDURING = 1 << 6;

        /// Flags that only last for the turn they were set in.
        const ONE_TURN = Self::FLINCHED.bits() | Self::PROTECTED.bits() | Self::ENDURING.bits();
    }
}

bitflags! {
    /// Persistent immunities granted by passive effects.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Guards: u8 {
        /// Opponents cannot lower this combatant's stages.
        const STAGE_DROPS = 1 << 0;
        /// Cannot be made to flinch.
        const FLINCH = 1 << 1;
        /// Takes no recoil damage.
        const RECOIL = 1 << 2;
        /// Takes no residual ailment damage.
        const RESIDUAL = 1 << 3;
    }
}
