/// Battle rule constants and tunable parameters.
///
/// The associated constants are structural limits; the fields are balance knobs
/// loaded from `config.toml` by the content crate.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Base critical-hit chance in basis points (625 = 1/16).
    pub crit_base_bp: u32,
    /// Damage multiplier applied on a critical hit, in percent.
    pub crit_multiplier_pct: u32,
    /// Same-type attack bonus, in percent.
    pub stab_pct: u32,
    /// Lower bound of the random damage roll, in percent.
    pub damage_roll_min_pct: u32,
    /// Duration used when an effect inflicts an ailment without one.
    pub default_ailment_turns: u8,
    /// Chance that paralysis prevents acting.
    pub paralysis_skip_pct: u32,
    /// Chance that confusion turns the attack on the user.
    pub confusion_self_hit_pct: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_SKILLS: usize = 4;
    pub const MAX_PARTY: usize = 6;
    pub const MIN_STAGE: i8 = -6;
    pub const MAX_STAGE: i8 = 6;
    pub const MAX_LEVEL: u8 = 100;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CRIT_BASE_BP: u32 = 625;
    pub const DEFAULT_CRIT_MULTIPLIER_PCT: u32 = 150;
    pub const DEFAULT_STAB_PCT: u32 = 150;
    pub const DEFAULT_DAMAGE_ROLL_MIN_PCT: u32 = 85;
    pub const DEFAULT_AILMENT_TURNS: u8 = 3;
    pub const DEFAULT_PARALYSIS_SKIP_PCT: u32 = 25;
    pub const DEFAULT_CONFUSION_SELF_HIT_PCT: u32 = 33;

    pub fn new() -> Self {
        Self {
            crit_base_bp: Self::DEFAULT_CRIT_BASE_BP,
            crit_multiplier_pct: Self::DEFAULT_CRIT_MULTIPLIER_PCT,
            stab_pct: Self::DEFAULT_STAB_PCT,
            damage_roll_min_pct: Self::DEFAULT_DAMAGE_ROLL_MIN_PCT,
            default_ailment_turns: Self::DEFAULT_AILMENT_TURNS,
            paralysis_skip_pct: Self::DEFAULT_PARALYSIS_SKIP_PCT,
            confusion_self_hit_pct: Self::DEFAULT_CONFUSION_SELF_HIT_PCT,
        }
    }

    /// Rules with every random element pinned: no damage spread, no crits,
    /// no paralysis or confusion rolls. Useful for reproducing exact numbers.
    pub fn deterministic() -> Self {
        Self {
            crit_base_bp: 0,
            damage_roll_min_pct: 100,
            paralysis_skip_pct: 0,
            confusion_self_hit_pct: 0,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
