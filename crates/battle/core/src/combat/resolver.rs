//! Turn resolution.
//!
//! One call to [`TurnResolver::resolve_turn`] runs a whole round: turn-start
//! effects, ordering, each attack through the hit/crit/damage phases, turn-end
//! residuals and effects, and the terminal check. The resolver owns no state;
//! everything lives in the [`BattleState`] passed in.

use std::sync::Arc;

use tracing::{debug, info};

use super::formula::{self, DamageRolls};
use super::order::{self, Contender};
use super::{AttackReport, CommandError, TurnIntent, TurnReport};
use crate::effect::{
    ActionContext, AttackFlags, DamageCause, Effect, EffectPipeline, EffectRegistry, Modifiers,
    Notice, PreventReason, Role, Timing,
};
use crate::env::{BattleEnv, SkillCategory, SkillData};
use crate::state::{
    Ailment, BattlePhase, BattleState, CatchTime, Guards, LastHit, Side, StatKind, VolatileFlags,
};

/// A validated attack waiting for its turn.
struct Planned {
    skill: SkillData,
    effect: Option<Arc<dyn Effect>>,
    mods: Modifiers,
}

/// Stateless rules engine for one battle environment.
pub struct TurnResolver<'a> {
    env: BattleEnv<'a>,
    registry: &'a EffectRegistry,
}

impl<'a> TurnResolver<'a> {
    pub fn new(env: BattleEnv<'a>, registry: &'a EffectRegistry) -> Self {
        Self { env, registry }
    }

    pub fn env(&self) -> &BattleEnv<'a> {
        &self.env
    }

    // ========================================================================
    // Field entry
    // ========================================================================

    /// Attaches every party member's abilities and brings both leads in.
    pub fn start_battle(&self, state: &mut BattleState) -> Vec<Notice> {
        let (roster, seq) = state.roster_mut();
        let mut attached = 0;
        for combatant in roster {
            attached += self.registry.attach_abilities(combatant, seq);
        }
        info!(
            target: "battle::resolver",
            mode = ?state.mode,
            home = %state.active(Side::Home).name,
            away = %state.active(Side::Away).name,
            attached,
            "battle started"
        );

        let mut notices = self.enter(state, Side::Home);
        notices.extend(self.enter(state, Side::Away));
        notices
    }

    /// Runs battle-start effects for `side`'s active the first time it takes
    /// the field.
    pub fn enter(&self, state: &mut BattleState, side: Side) -> Vec<Notice> {
        let combatant = state.active_mut(side);
        if combatant.entered {
            return Vec::new();
        }
        combatant.entered = true;

        let turn = state.turn();
        let mut ctx = ActionContext::new(state.arena(side), side, self.env.rules(), turn);
        EffectPipeline::dispatch(&mut ctx, Timing::BattleStart, None);
        ctx.take_log()
    }

    /// Voluntary switch, applied before attacks resolve.
    pub fn switch(
        &self,
        state: &mut BattleState,
        side: Side,
        target: CatchTime,
    ) -> Result<Vec<Notice>, CommandError> {
        self.ensure_ongoing(state)?;
        state.side_mut(side).switch_to(target)?;
        Ok(self.entered(state, side, target))
    }

    /// Sends a replacement for a fainted active.
    pub fn replace_fainted(
        &self,
        state: &mut BattleState,
        side: Side,
        target: CatchTime,
    ) -> Result<Vec<Notice>, CommandError> {
        if state.is_finished() {
            return Err(CommandError::BattleFinished);
        }
        if !state.phase().awaits_switch(side) {
            return Err(CommandError::NotApplicable);
        }
        state.side_mut(side).switch_to(target)?;
        let notices = self.entered(state, side, target);
        state.settle();
        Ok(notices)
    }

    fn entered(&self, state: &mut BattleState, side: Side, catch_time: CatchTime) -> Vec<Notice> {
        debug!(target: "battle::resolver", %side, %catch_time, "combatant switched in");
        let mut notices = vec![Notice::Switched { side, catch_time }];
        notices.extend(self.enter(state, side));
        notices
    }

    /// NPC and boss sides send their next healthy creature on their own.
    fn auto_replace(&self, state: &mut BattleState, report: &mut TurnReport) {
        for side in Side::BOTH {
            if !state.phase().awaits_switch(side) || state.side(side).owner.is_player() {
                continue;
            }
            if let Some(catch_time) = state.side_mut(side).send_next() {
                let notices = self.entered(state, side, catch_time);
                report.notices.extend(notices);
            }
        }
        state.settle();
    }

    pub(super) fn ensure_ongoing(&self, state: &BattleState) -> Result<(), CommandError> {
        match state.phase() {
            BattlePhase::Ongoing => Ok(()),
            BattlePhase::AwaitingSwitch { .. } => Err(CommandError::AwaitingSwitch),
            BattlePhase::Finished(_) => Err(CommandError::BattleFinished),
        }
    }

    // ========================================================================
    // Turn
    // ========================================================================

    /// Validates both intents, then resolves one full turn.
    ///
    /// Nothing is mutated when validation fails.
    pub fn resolve_turn(
        &self,
        state: &mut BattleState,
        intents: [TurnIntent; 2],
    ) -> Result<TurnReport, CommandError> {
        self.ensure_ongoing(state)?;

        let mut planned: [Option<Planned>; 2] = [None, None];
        for side in Side::BOTH {
            let Some(id) = intents[side.index()].skill() else {
                continue;
            };
            let usable = state.active(side).skill(id).is_some_and(|slot| slot.is_usable());
            if !usable {
                return Err(CommandError::SkillUnavailable(id));
            }
            let skill = self
                .env
                .skill(id)
                .map_err(|_| CommandError::SkillUnavailable(id))?;
            planned[side.index()] = Some(Planned {
                effect: skill.effect.as_ref().and_then(|d| self.registry.build(d)),
                skill: skill.clone(),
                mods: Modifiers::default(),
            });
        }

        let turn = state.advance_turn();
        let mut report = TurnReport::new(turn);
        debug!(target: "battle::resolver", turn, ?intents, "turn started");

        self.neutral_phase(state, Timing::TurnStart, &mut report);
        let order = self.order(state, &mut planned, &mut report);

        for (index, side) in order.iter().copied().enumerate() {
            let standing = !state.active(side).is_fainted()
                && !state.active(side.opponent()).is_fainted();
            if !standing {
                continue;
            }
            if let Some(plan) = planned[side.index()].take() {
                let attack = self.attack(state, side, plan, index == 0, &mut report);
                report.attacks.push(attack);
                self.detect_faints(state, &mut report);
            }
        }

        self.turn_end(state, &mut report);
        state.settle();
        self.auto_replace(state, &mut report);
        report.phase = state.phase();

        if let Some(outcome) = state.outcome() {
            info!(target: "battle::resolver", turn, ?outcome, "battle decided");
        }
        Ok(report)
    }

    /// Turn-start and similar phases that belong to no attack.
    fn neutral_phase(&self, state: &mut BattleState, timing: Timing, report: &mut TurnReport) {
        let turn = state.turn();
        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, self.env.rules(), turn);
        EffectPipeline::dispatch(&mut ctx, timing, None);
        report.notices.extend(ctx.take_log());
    }

    /// Runs before-speed-check for each planned attacker and orders them.
    ///
    /// Attackers are visited in creature-key order, never side order, so the
    /// rng draws of chance-gated priority effects do not depend on which side
    /// each creature sits on.
    fn order(
        &self,
        state: &mut BattleState,
        planned: &mut [Option<Planned>; 2],
        report: &mut TurnReport,
    ) -> Vec<Side> {
        let turn = state.turn();
        let mut sides: Vec<Side> = Side::BOTH
            .into_iter()
            .filter(|side| planned[side.index()].is_some())
            .collect();
        sides.sort_by_key(|side| {
            let active = state.active(*side);
            (active.species, active.catch_time, active.level)
        });

        let mut contenders = Vec::with_capacity(2);
        for side in sides {
            let Some(plan) = planned[side.index()].as_mut() else {
                continue;
            };
            let mut ctx = ActionContext::new(state.arena(side), side, self.env.rules(), turn)
                .with_skill(plan.skill.clone());
            EffectPipeline::dispatch(&mut ctx, Timing::BeforeSpeedCheck, plan.effect.as_ref());
            plan.mods = ctx.mods.clone();
            report.notices.extend(ctx.take_log());

            let active = state.active(side);
            contenders.push(Contender {
                side,
                always_first: plan.mods.always_first,
                priority: i32::from(plan.skill.priority) + plan.mods.priority_delta,
                speed: active.effective_speed(),
                key: (active.species, active.catch_time, active.level),
            });
        }

        match contenders.as_slice() {
            [a, b] => order::order(*a, *b, state.rng_mut()).to_vec(),
            [only] => vec![only.side],
            _ => Vec::new(),
        }
    }

    // ========================================================================
    // Attack
    // ========================================================================

    fn attack(
        &self,
        state: &mut BattleState,
        side: Side,
        plan: Planned,
        moved_first: bool,
        report: &mut TurnReport,
    ) -> AttackReport {
        let defender_element = state.active(side.opponent()).element;
        let effectiveness = self.env.effectiveness(plan.skill.element, defender_element);
        let skill_id = plan.skill.id;
        let turn = state.turn();

        let mut ctx = ActionContext::new(state.arena(side), side, self.env.rules(), turn)
            .with_skill(plan.skill)
            .with_mods(plan.mods);
        ctx.moved_first = moved_first;
        ctx.effectiveness = effectiveness;

        self.run_attack(&mut ctx, plan.effect.as_ref());

        let attack = AttackReport {
            side,
            skill: skill_id,
            flags: ctx.flags,
            damage: ctx.dealt,
            effectiveness: ctx.effectiveness,
            moved_first,
        };
        debug!(
            target: "battle::resolver",
            %side,
            skill = %skill_id,
            damage = attack.damage,
            flags = ?attack.flags,
            "attack resolved"
        );
        report.notices.extend(ctx.take_log());
        attack
    }

    fn run_attack(&self, ctx: &mut ActionContext<'_>, effect: Option<&Arc<dyn Effect>>) {
        let side = ctx.attacker_side;
        let defender_side = side.opponent();

        if let Some(reason) = self.prevention(ctx) {
            ctx.flags.insert(AttackFlags::PREVENTED);
            ctx.notify(Notice::Prevented { side, reason });
            return;
        }

        let Some(skill_id) = ctx.skill_id() else {
            return;
        };
        if !ctx.attacker.consume_use(skill_id) {
            ctx.flags.insert(AttackFlags::PREVENTED);
            ctx.notify(Notice::Prevented {
                side,
                reason: PreventReason::NoUses,
            });
            return;
        }
        ctx.attacker.record_skill_use(skill_id);

        // ----- hit -----
        EffectPipeline::dispatch(ctx, Timing::BeforeHitCheck, effect);
        if ctx.flags.contains(AttackFlags::PREVENTED) {
            return;
        }
        if ctx.defender.flags.contains(VolatileFlags::PROTECTED) {
            ctx.flags.insert(AttackFlags::BLOCKED);
        }
        if ctx.flags.contains(AttackFlags::BLOCKED) {
            ctx.notify(Notice::Blocked {
                side: defender_side,
            });
            return;
        }

        if !self.roll_hit(ctx) {
            ctx.flags.insert(AttackFlags::MISS);
        }
        EffectPipeline::dispatch(ctx, Timing::AfterHitCheck, effect);
        if ctx.flags.contains(AttackFlags::MISS) {
            ctx.notify(Notice::Missed { side });
            return;
        }

        if ctx.category() == Some(SkillCategory::Status) {
            EffectPipeline::dispatch(ctx, Timing::AfterDamageApply, effect);
            return;
        }

        // ----- crit -----
        EffectPipeline::dispatch(ctx, Timing::BeforeCritCheck, effect);
        let crit = match ctx.mods.crit_override {
            Some(forced) => forced,
            None => {
                let bp = formula::crit_chance_bp(ctx.rules.crit_base_bp, ctx.mods.crit_rate_delta);
                ctx.roll_bp(bp)
            }
        };
        if crit {
            ctx.flags.insert(AttackFlags::CRIT);
            ctx.notify(Notice::Critical { side });
        }
        EffectPipeline::dispatch(ctx, Timing::AfterCritCheck, effect);

        // ----- damage -----
        EffectPipeline::dispatch(ctx, Timing::BeforeDamageCalc, effect);
        ctx.damage = self.compute_damage(ctx);
        EffectPipeline::dispatch(ctx, Timing::AfterDamageCalc, effect);
        if ctx.mods.instant_kill && ctx.effectiveness > 0 {
            ctx.damage = ctx.defender.hp();
        }

        let dealt = ctx.defender.take_damage(ctx.damage);
        ctx.dealt = dealt;
        if dealt > 0 {
            ctx.defender.last_hit = Some(LastHit {
                amount: dealt,
                category: ctx.category().unwrap_or(SkillCategory::Physical),
                turn: ctx.turn,
            });
            ctx.notify(Notice::Damaged {
                side: defender_side,
                amount: dealt,
                cause: DamageCause::Attack,
            });
        }
        EffectPipeline::dispatch(ctx, Timing::AfterDamageApply, effect);
    }

    /// Checks whether the attacker loses its action. Consumes the one-shot
    /// flags that caused it.
    fn prevention(&self, ctx: &mut ActionContext<'_>) -> Option<PreventReason> {
        let attacker = &mut *ctx.attacker;
        if attacker.flags.contains(VolatileFlags::RECHARGING) {
            attacker.flags.remove(VolatileFlags::RECHARGING);
            return Some(PreventReason::Recharge);
        }
        if attacker.flags.contains(VolatileFlags::FLINCHED) {
            return Some(PreventReason::Flinch);
        }

        let ailment = attacker.ailment().map(|state| state.kind)?;
        if ailment.blocks_action() {
            return Some(PreventReason::Ailment(ailment));
        }
        match ailment {
            Ailment::Paralysis if ctx.roll(ctx.rules.paralysis_skip_pct) => {
                Some(PreventReason::Ailment(Ailment::Paralysis))
            }
            Ailment::Confusion if ctx.roll(ctx.rules.confusion_self_hit_pct) => {
                let amount = (ctx.attacker.max_hp() / 8).max(1);
                ctx.deal_direct(Role::Attacker, amount, DamageCause::Confusion);
                Some(PreventReason::Ailment(Ailment::Confusion))
            }
            _ => None,
        }
    }

    fn roll_hit(&self, ctx: &mut ActionContext<'_>) -> bool {
        if let Some(chance) = ctx.mods.hit_rate_override {
            return ctx.roll(chance);
        }
        let Some(skill) = ctx.skill.as_ref() else {
            return false;
        };
        if ctx.mods.guaranteed_hit || skill.sure_hit {
            return true;
        }
        let mut stage = ctx.attacker.stage(StatKind::Accuracy);
        if ctx.mods.ignore_attacker_drops {
            stage = stage.max(0);
        }
        let chance = formula::hit_chance(skill.accuracy, stage, ctx.mods.hit_rate_delta);
        ctx.roll(chance)
    }

    fn compute_damage(&self, ctx: &mut ActionContext<'_>) -> u32 {
        let Some(skill) = ctx.skill.as_ref() else {
            return 0;
        };
        let (offense, defense) = match skill.category {
            SkillCategory::Special => (StatKind::SpAttack, StatKind::SpDefense),
            _ => (StatKind::Attack, StatKind::Defense),
        };
        let crit = ctx.is_crit();

        let mut attack_stage = ctx.attacker.stage(offense);
        if attack_stage < 0 && (crit || ctx.mods.ignore_attacker_drops) {
            attack_stage = 0;
        }
        let mut defense_stage = ctx.defender.stage(defense);
        if ctx.mods.ignore_defender_stages || (crit && defense_stage > 0) {
            defense_stage = 0;
        }

        let attack = ctx.attacker.effective_stat_with(offense, attack_stage);
        let defense = ctx.defender.effective_stat_with(defense, defense_stage);
        let base = formula::base_damage(ctx.attacker.level, skill.power, attack, defense);
        let same_element = ctx.attacker.element == skill.element;

        let roll = ctx.range(ctx.rules.damage_roll_min_pct.min(100), 100);
        let rolls = DamageRolls {
            same_element,
            effectiveness: ctx.effectiveness,
            critical: crit,
            roll,
        };
        ctx.mods.multiplied(formula::final_damage(base, rolls, ctx.rules))
    }

    // ========================================================================
    // Turn end
    // ========================================================================

    fn turn_end(&self, state: &mut BattleState, report: &mut TurnReport) {
        let turn = state.turn();
        let rules = self.env.rules();

        for side in Side::BOTH {
            let mut ctx = ActionContext::new(state.arena(side), side, rules, turn);
            Self::residual(&mut ctx);
            if let Some(ailment) = ctx.attacker.tick_ailment() {
                ctx.notify(Notice::AilmentCleared { side, ailment });
            }
            report.notices.extend(ctx.take_log());
        }
        self.detect_faints(state, report);

        self.neutral_phase(state, Timing::TurnEnd, report);
        for side in Side::BOTH {
            state.active_mut(side).clear_turn_flags();
        }
        self.detect_faints(state, report);
    }

    /// Ailment damage for the context's attacker. Parasitic drain heals the foe.
    fn residual(ctx: &mut ActionContext<'_>) {
        let owner = &*ctx.attacker;
        if owner.is_fainted() || owner.guards.contains(Guards::RESIDUAL) {
            return;
        }
        let Some(state) = owner.ailment().copied() else {
            return;
        };
        if !state.kind.is_residual() {
            return;
        }
        let amount = state.kind.residual_damage(owner.max_hp(), state.elapsed);
        let dealt = ctx.deal_direct(Role::Attacker, amount, DamageCause::Residual(state.kind));
        if state.kind == Ailment::Parasitized && dealt > 0 {
            ctx.heal(Role::Defender, dealt);
        }
    }

    /// Emits one fainted notice per creature that went down.
    fn detect_faints(&self, state: &BattleState, report: &mut TurnReport) {
        for side in Side::BOTH {
            let active = state.active(side);
            if !active.is_fainted() {
                continue;
            }
            let catch_time = active.catch_time;
            let reported = report.fainted().any(|(s, c)| s == side && c == catch_time);
            if !reported {
                debug!(target: "battle::resolver", %side, %catch_time, "combatant fainted");
                report.notices.push(Notice::Fainted { side, catch_time });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EffectDescriptor, SkillData};
    use crate::state::{
        BaseStats, BattleMode, BattleOutcome, BattleSide, Combatant, CreatureId, Element,
        SideOwner, SkillId, SkillSlot,
    };
    use crate::testing::{EMBER, GROWL, QUICK, TACKLE, TestCatalog, creature, rng, tackle};

    const RECOVER: SkillId = SkillId(10);
    const CRUSH: SkillId = SkillId(11);

    fn catalog() -> TestCatalog {
        TestCatalog::new()
            .with_skill(SkillData {
                id: RECOVER,
                name: "recover".into(),
                category: SkillCategory::Status,
                power: 0,
                sure_hit: true,
                effect: Some(EffectDescriptor::new(105, &[50])),
                ..tackle()
            })
            .with_skill(SkillData {
                id: CRUSH,
                name: "crush".into(),
                effect: Some(EffectDescriptor::new(25, &[50])),
                ..tackle()
            })
    }

    fn fighter(catch_time: u64, max_hp: u32, speed: u32, skills: &[SkillId]) -> Combatant {
        Combatant::new(
            CreatureId(1),
            CatchTime(catch_time),
            format!("mon-{catch_time}"),
            50,
            max_hp,
            BaseStats::new(50, 50, 50, 50, speed),
            Element::Normal,
        )
        .with_skills(skills.iter().map(|id| SkillSlot::new(*id, 10)))
    }

    fn battle(home: Vec<Combatant>, away: Vec<Combatant>, seed: u64) -> BattleState {
        let home = BattleSide::new(SideOwner::Npc { slot: 0 }, home).expect("home");
        let away = BattleSide::new(SideOwner::Npc { slot: 1 }, away).expect("away");
        BattleState::new(BattleMode::Npc, home, away, rng(seed))
    }

    fn duel(home: Combatant, away: Combatant) -> BattleState {
        battle(vec![home], vec![away], 11)
    }

    fn attack(skill: SkillId) -> TurnIntent {
        TurnIntent::Attack(skill)
    }

    #[test]
    fn full_accuracy_always_hits_and_evasion_always_misses() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);

        for seed in 0..16 {
            let mut state = battle(
                vec![fighter(1, 500, 60, &[TACKLE])],
                vec![fighter(2, 500, 40, &[TACKLE])],
                seed,
            );
            let report = resolver
                .resolve_turn(&mut state, [attack(TACKLE), TurnIntent::Idle])
                .expect("turn");
            assert!(!report.attacks[0].missed());
            assert!(report.attacks[0].damage > 0);
        }

        let evasion = registry
            .build(&EffectDescriptor::new(41, &[100]))
            .expect("evasion");
        for seed in 0..16 {
            let mut state = battle(
                vec![fighter(1, 500, 60, &[TACKLE])],
                vec![fighter(2, 500, 40, &[TACKLE])],
                seed,
            );
            state
                .active_mut(Side::Away)
                .attach(evasion.clone(), 0, crate::state::EffectLifetime::Battle);
            let report = resolver
                .resolve_turn(&mut state, [attack(TACKLE), TurnIntent::Idle])
                .expect("turn");
            assert!(report.attacks[0].missed());
            assert_eq!(state.active(Side::Away).hp(), 500);
        }
    }

    #[test]
    fn lethal_hit_clamps_to_zero_and_faints_once() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = duel(
            fighter(1, 100, 80, &[CRUSH]),
            fighter(2, 100, 20, &[TACKLE]).with_hp(10),
        );

        let report = resolver
            .resolve_turn(&mut state, [attack(CRUSH), attack(TACKLE)])
            .expect("turn");

        assert_eq!(state.active(Side::Away).hp(), 0);
        assert_eq!(report.fainted().count(), 1);
        assert_eq!(report.attacks.len(), 1);
        assert_eq!(report.attacks[0].damage, 10);
        assert_eq!(
            report.phase,
            BattlePhase::Finished(BattleOutcome::Winner(Side::Home))
        );
    }

    #[test]
    fn healing_clamps_to_max_hp() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = duel(
            fighter(1, 100, 80, &[RECOVER]).with_hp(50),
            fighter(2, 100, 20, &[RECOVER]),
        );

        resolver
            .resolve_turn(&mut state, [attack(RECOVER), TurnIntent::Idle])
            .expect("turn");
        assert_eq!(state.active(Side::Home).hp(), 100);

        resolver
            .resolve_turn(&mut state, [attack(RECOVER), TurnIntent::Idle])
            .expect("turn");
        assert_eq!(state.active(Side::Home).hp(), 100);
    }

    #[test]
    fn stages_never_leave_bounds() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = duel(fighter(1, 100, 80, &[GROWL]), fighter(2, 100, 20, &[GROWL]));

        for _ in 0..8 {
            resolver
                .resolve_turn(&mut state, [attack(GROWL), TurnIntent::Idle])
                .expect("turn");
        }
        assert_eq!(state.active(Side::Away).stage(StatKind::Attack), -6);
        assert_eq!(state.active(Side::Home).stage(StatKind::Attack), 0);
    }

    #[test]
    fn priority_beats_speed() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = duel(
            fighter(1, 300, 10, &[QUICK]),
            fighter(2, 300, 200, &[TACKLE]),
        );

        let report = resolver
            .resolve_turn(&mut state, [attack(QUICK), attack(TACKLE)])
            .expect("turn");
        assert_eq!(report.order(), vec![Side::Home, Side::Away]);
        assert!(report.attacks[0].moved_first);
    }

    #[test]
    fn speed_tie_ignores_side_assignment() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);

        for seed in 0..32 {
            let mut forward = battle(
                vec![fighter(1, 300, 50, &[TACKLE])],
                vec![fighter(2, 300, 50, &[TACKLE])],
                seed,
            );
            let mut swapped = battle(
                vec![fighter(2, 300, 50, &[TACKLE])],
                vec![fighter(1, 300, 50, &[TACKLE])],
                seed,
            );
            let a = resolver
                .resolve_turn(&mut forward, [attack(TACKLE), attack(TACKLE)])
                .expect("turn");
            let b = resolver
                .resolve_turn(&mut swapped, [attack(TACKLE), attack(TACKLE)])
                .expect("turn");

            let first = |state: &BattleState, report: &TurnReport| {
                state.active(report.attacks[0].side).catch_time
            };
            assert_eq!(first(&forward, &a), first(&swapped, &b), "seed {seed}");
        }
    }

    #[test]
    fn same_seed_replays_identically() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let run = || {
            let mut state = battle(
                vec![creature(1, 120, 40)],
                vec![creature(2, 120, 40)],
                99,
            );
            let mut log = Vec::new();
            while !state.is_finished() && state.turn() < 20 {
                let report = resolver
                    .resolve_turn(&mut state, [attack(TACKLE), attack(EMBER)])
                    .expect("turn");
                log.push(report.notices);
            }
            (log, state.active(Side::Home).hp(), state.active(Side::Away).hp())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn fainted_creature_never_acts_second() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = duel(
            fighter(1, 100, 10, &[TACKLE]).with_hp(1),
            fighter(2, 100, 90, &[TACKLE]),
        );

        let report = resolver
            .resolve_turn(&mut state, [attack(TACKLE), attack(TACKLE)])
            .expect("turn");
        assert_eq!(report.attacks.len(), 1);
        assert_eq!(report.attacks[0].side, Side::Away);
        assert_eq!(state.active(Side::Away).hp(), 100);
        assert_eq!(report.outcome(), Some(BattleOutcome::Winner(Side::Away)));
    }

    #[test]
    fn invalid_skill_leaves_state_untouched() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = duel(fighter(1, 100, 10, &[TACKLE]), fighter(2, 100, 90, &[TACKLE]));

        let err = resolver
            .resolve_turn(&mut state, [attack(TACKLE), attack(EMBER)])
            .expect_err("ember is not equipped");
        assert_eq!(err, CommandError::SkillUnavailable(EMBER));
        assert_eq!(state.turn(), 0);
        assert_eq!(state.active(Side::Home).skill(TACKLE).map(|s| s.uses), Some(10));
    }

    #[test]
    fn expired_effect_is_detached_after_absorbing_a_hit() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let away = fighter(2, 200, 10, &[TACKLE])
            .with_abilities(vec![EffectDescriptor::new(125, &[])]);
        let mut state = duel(fighter(1, 200, 90, &[TACKLE]), away);
        resolver.start_battle(&mut state);
        assert!(state.active(Side::Away).has_effect("disguise"));

        resolver
            .resolve_turn(&mut state, [attack(TACKLE), TurnIntent::Idle])
            .expect("turn");
        assert_eq!(state.active(Side::Away).hp(), 200);
        assert!(!state.active(Side::Away).has_effect("disguise"));

        resolver
            .resolve_turn(&mut state, [attack(TACKLE), TurnIntent::Idle])
            .expect("turn");
        assert!(state.active(Side::Away).hp() < 200);
    }

    #[test]
    fn unknown_ability_is_skipped() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let home = fighter(1, 100, 50, &[TACKLE]).with_abilities(vec![
            EffectDescriptor::new(9_999, &[]),
            EffectDescriptor::new(125, &[]),
        ]);
        let mut state = duel(home, fighter(2, 100, 50, &[TACKLE]));

        resolver.start_battle(&mut state);
        let names: Vec<_> = state
            .active(Side::Home)
            .effects()
            .iter()
            .map(|e| e.effect.name())
            .collect();
        assert_eq!(names, vec!["disguise"]);
    }

    #[test]
    fn stacked_forced_miss_misses_once() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let away = fighter(2, 100, 10, &[TACKLE]).with_abilities(vec![
            EffectDescriptor::new(46, &[100]),
            EffectDescriptor::new(46, &[100]),
        ]);
        let mut state = duel(fighter(1, 100, 90, &[TACKLE]), away);
        resolver.start_battle(&mut state);

        let report = resolver
            .resolve_turn(&mut state, [attack(TACKLE), TurnIntent::Idle])
            .expect("turn");
        let misses = report
            .notices
            .iter()
            .filter(|n| matches!(n, Notice::Missed { .. }))
            .count();
        assert_eq!(misses, 1);
        assert_eq!(state.active(Side::Away).hp(), 100);
    }

    #[test]
    fn npc_side_sends_next_after_faint() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = battle(
            vec![fighter(1, 100, 80, &[CRUSH])],
            vec![
                fighter(2, 100, 20, &[TACKLE]).with_hp(5),
                fighter(3, 100, 20, &[TACKLE]),
            ],
            5,
        );

        let report = resolver
            .resolve_turn(&mut state, [attack(CRUSH), attack(TACKLE)])
            .expect("turn");
        assert_eq!(report.phase, BattlePhase::Ongoing);
        assert_eq!(state.active(Side::Away).catch_time, CatchTime(3));
        assert!(report.notices.contains(&Notice::Switched {
            side: Side::Away,
            catch_time: CatchTime(3),
        }));
    }

    #[test]
    fn replacement_only_while_awaiting_switch() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = battle(
            vec![fighter(1, 100, 80, &[TACKLE]), fighter(3, 100, 80, &[TACKLE])],
            vec![fighter(2, 100, 20, &[TACKLE])],
            5,
        );
        state.side_mut(Side::Home).owner = SideOwner::Player(crate::state::PlayerId(1));

        assert_eq!(
            resolver.replace_fainted(&mut state, Side::Home, CatchTime(3)),
            Err(CommandError::NotApplicable)
        );

        state.active_mut(Side::Home).set_hp(0);
        assert!(state.settle().awaits_switch(Side::Home));
        assert_eq!(
            resolver.resolve_turn(&mut state, [attack(TACKLE), attack(TACKLE)]),
            Err(CommandError::AwaitingSwitch)
        );

        let notices = resolver
            .replace_fainted(&mut state, Side::Home, CatchTime(3))
            .expect("replacement");
        assert_eq!(
            notices[0],
            Notice::Switched {
                side: Side::Home,
                catch_time: CatchTime(3)
            }
        );
        assert_eq!(state.phase(), BattlePhase::Ongoing);
    }

    #[test]
    fn immune_matchup_deals_nothing() {
        let mut catalog = catalog();
        catalog.chart.insert((Element::Normal, Element::Normal), 0);
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let mut state = duel(fighter(1, 100, 80, &[TACKLE]), fighter(2, 100, 20, &[TACKLE]));

        let report = resolver
            .resolve_turn(&mut state, [attack(TACKLE), TurnIntent::Idle])
            .expect("turn");
        assert_eq!(report.attacks[0].damage, 0);
        assert_eq!(state.active(Side::Away).hp(), 100);
    }

    #[test]
    fn winning_blow_ends_the_phase_before_recoil() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let recoil = registry
            .build(&EffectDescriptor::new(133, &[100]))
            .expect("recoil");
        let mut state = duel(
            fighter(1, 100, 80, &[CRUSH]).with_hp(5),
            fighter(2, 100, 20, &[TACKLE]).with_hp(10),
        );
        state
            .active_mut(Side::Home)
            .attach(recoil, 0, crate::state::EffectLifetime::Battle);

        let report = resolver
            .resolve_turn(&mut state, [attack(CRUSH), TurnIntent::Idle])
            .expect("turn");
        assert_eq!(report.outcome(), Some(BattleOutcome::Winner(Side::Home)));
        assert_eq!(state.active(Side::Home).hp(), 5);
    }

    #[test]
    fn recoil_still_lands_while_the_foe_has_a_reserve() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let recoil = registry
            .build(&EffectDescriptor::new(133, &[100]))
            .expect("recoil");
        let mut state = battle(
            vec![fighter(1, 100, 80, &[CRUSH]).with_hp(50)],
            vec![
                fighter(2, 100, 20, &[TACKLE]).with_hp(10),
                fighter(3, 100, 20, &[TACKLE]),
            ],
            5,
        );
        state
            .active_mut(Side::Home)
            .attach(recoil, 0, crate::state::EffectLifetime::Battle);

        resolver
            .resolve_turn(&mut state, [attack(CRUSH), TurnIntent::Idle])
            .expect("turn");
        assert_eq!(state.active(Side::Home).hp(), 40);
        assert_eq!(state.active(Side::Away).catch_time, CatchTime(3));
    }

    #[test]
    fn chance_based_priority_ignores_side_assignment() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let quick_start = || vec![EffectDescriptor::new(66, &[50])];
        let slow = || fighter(1, 300, 10, &[TACKLE]).with_abilities(quick_start());
        let fast = || fighter(2, 300, 90, &[TACKLE]).with_abilities(quick_start());

        for seed in 0..64 {
            let mut forward = battle(vec![slow()], vec![fast()], seed);
            let mut swapped = battle(vec![fast()], vec![slow()], seed);
            resolver.start_battle(&mut forward);
            resolver.start_battle(&mut swapped);

            let a = resolver
                .resolve_turn(&mut forward, [attack(TACKLE), attack(TACKLE)])
                .expect("turn");
            let b = resolver
                .resolve_turn(&mut swapped, [attack(TACKLE), attack(TACKLE)])
                .expect("turn");

            let first = |state: &BattleState, report: &TurnReport| {
                state.active(report.attacks[0].side).catch_time
            };
            assert_eq!(first(&forward, &a), first(&swapped, &b), "seed {seed}");
        }
    }

    #[test]
    fn damage_multiplier_scales_the_formula_result() {
        let catalog = catalog();
        let registry = EffectRegistry::with_builtin();
        let resolver = TurnResolver::new(BattleEnv::new(&catalog), &registry);
        let hit = |boost: bool| {
            let mut home = fighter(1, 300, 80, &[TACKLE]);
            if boost {
                home = home.with_abilities(vec![EffectDescriptor::new(1, &[100])]);
            }
            let mut state = duel(home, fighter(2, 300, 20, &[TACKLE]));
            resolver.start_battle(&mut state);
            let report = resolver
                .resolve_turn(&mut state, [attack(TACKLE), TurnIntent::Idle])
                .expect("turn");
            report.attacks[0].damage
        };
        let plain = hit(false);
        assert!(plain > 0);
        assert_eq!(hit(true), plain * 2);
    }
}
