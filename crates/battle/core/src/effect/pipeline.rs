//! Timing dispatch.
//!
//! For a timing, the pipeline gathers every effect attached to either
//! combatant (plus the skill's own effect, owned by the attacker), orders them,
//! and applies each against the same context so later effects observe earlier
//! mutations.
//!
//! Ordering: higher `priority()` first, then registration sequence. Turn end
//! ignores priority and runs oldest registration first. The per-use skill
//! effect has no sequence and sorts after attached effects of equal priority.
//!
//! Battle start is dispatched with the entering combatant as attacker, and
//! only that combatant's effects run.
//!
//! A combatant that faints mid-phase stops contributing: its remaining effects
//! are skipped unless they declare [`Effect::wakes_fainted`]. Once a faint
//! leaves a side with nobody to send in, the battle is decided and only
//! `wakes_fainted` effects still run for the rest of the phase.

use std::sync::Arc;

use tracing::{debug, trace};

use super::{ActionContext, Applied, Effect, Role, Timing};

/// Counts from one dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub ran: usize,
    pub triggered: usize,
    pub expired: usize,
}

struct Scheduled {
    role: Role,
    seq: Option<u64>,
    priority: i32,
    effect: Arc<dyn Effect>,
}

impl Scheduled {
    fn order_key(&self) -> u64 {
        self.seq.unwrap_or(u64::MAX)
    }
}

/// Stateless timing dispatcher.
pub struct EffectPipeline;

impl EffectPipeline {
    pub fn dispatch(
        ctx: &mut ActionContext<'_>,
        timing: Timing,
        skill_effect: Option<&Arc<dyn Effect>>,
    ) -> Dispatch {
        let mut queue = Self::collect(ctx, timing, skill_effect);
        if queue.is_empty() {
            return Dispatch::default();
        }

        if timing == Timing::TurnEnd {
            queue.sort_by_key(Scheduled::order_key);
        } else {
            queue.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then_with(|| a.order_key().cmp(&b.order_key()))
            });
        }

        ctx.timing = timing;
        let mut summary = Dispatch::default();
        for scheduled in queue {
            let wakes = scheduled.effect.wakes_fainted();
            if ctx.is_decided() && !wakes {
                trace!(
                    target: "battle::pipeline",
                    effect = scheduled.effect.name(),
                    ?timing,
                    "battle decided, skipped"
                );
                continue;
            }
            if ctx.combatant(scheduled.role).is_fainted() && !wakes {
                trace!(
                    target: "battle::pipeline",
                    effect = scheduled.effect.name(),
                    ?timing,
                    "owner fainted, skipped"
                );
                continue;
            }

            ctx.role = scheduled.role;
            let applied = scheduled.effect.apply(ctx);
            summary.ran += 1;

            match applied {
                Applied::Idle => {}
                Applied::Triggered => summary.triggered += 1,
                Applied::Expired => {
                    summary.triggered += 1;
                    summary.expired += 1;
                    if let Some(seq) = scheduled.seq {
                        ctx.combatant_mut(scheduled.role).detach(seq);
                    }
                }
            }

            debug!(
                target: "battle::pipeline",
                effect = scheduled.effect.name(),
                ?timing,
                role = ?scheduled.role,
                ?applied,
                "effect applied"
            );
        }
        summary
    }

    fn collect(
        ctx: &ActionContext<'_>,
        timing: Timing,
        skill_effect: Option<&Arc<dyn Effect>>,
    ) -> Vec<Scheduled> {
        let listens = |effect: &Arc<dyn Effect>, role: Role| {
            effect.timings().contains(&timing)
                && (!timing.is_attack_phase() || effect.role().is_none_or(|r| r == role))
        };

        let roles: &[Role] = if timing == Timing::BattleStart {
            &[Role::Attacker]
        } else {
            &[Role::Attacker, Role::Defender]
        };

        let mut queue = Vec::new();
        for &role in roles {
            for attached in ctx.combatant(role).effects() {
                if listens(&attached.effect, role) {
                    queue.push(Scheduled {
                        role,
                        seq: Some(attached.seq),
                        priority: attached.effect.priority(),
                        effect: Arc::clone(&attached.effect),
                    });
                }
            }
        }
        if let Some(effect) = skill_effect
            && listens(effect, Role::Attacker)
        {
            queue.push(Scheduled {
                role: Role::Attacker,
                seq: None,
                priority: effect.priority(),
                effect: Arc::clone(effect),
            });
        }
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Modifiers, Notice};
    use crate::state::{EffectLifetime, Side};
    use crate::testing::{arena_state, arena_state_with_reserves, rules};

    struct Probe {
        name: &'static str,
        timings: &'static [Timing],
        priority: i32,
        outcome: Applied,
    }

    impl Effect for Probe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn timings(&self) -> &'static [Timing] {
            self.timings
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
            ctx.triggered(self.name);
            self.outcome
        }
    }

    fn probe(name: &'static str, timings: &'static [Timing], priority: i32) -> Arc<dyn Effect> {
        Arc::new(Probe {
            name,
            timings,
            priority,
            outcome: Applied::Triggered,
        })
    }

    fn fired(log: &[Notice]) -> Vec<&'static str> {
        log.iter()
            .filter_map(|n| match n {
                Notice::EffectTriggered { effect, .. } => Some(*effect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn orders_by_priority_then_sequence() {
        let mut state = arena_state();
        let cfg = rules();
        state
            .active_mut(Side::Home)
            .attach(probe("low", &[Timing::BeforeHitCheck], -1), 0, EffectLifetime::Battle);
        state
            .active_mut(Side::Away)
            .attach(probe("high", &[Timing::BeforeHitCheck], 5), 1, EffectLifetime::Battle);
        state
            .active_mut(Side::Home)
            .attach(probe("mid_b", &[Timing::BeforeHitCheck], 0), 3, EffectLifetime::Battle);
        state
            .active_mut(Side::Away)
            .attach(probe("mid_a", &[Timing::BeforeHitCheck], 0), 2, EffectLifetime::Battle);
        let skill = probe("skill", &[Timing::BeforeHitCheck], 0);

        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1)
            .with_mods(Modifiers::default());
        let summary = EffectPipeline::dispatch(&mut ctx, Timing::BeforeHitCheck, Some(&skill));

        assert_eq!(summary.ran, 5);
        assert_eq!(fired(ctx.log()), ["high", "mid_a", "mid_b", "skill", "low"]);
    }

    #[test]
    fn turn_end_runs_oldest_first() {
        let mut state = arena_state();
        let cfg = rules();
        state
            .active_mut(Side::Away)
            .attach(probe("newer", &[Timing::TurnEnd], 10), 7, EffectLifetime::Battle);
        state
            .active_mut(Side::Home)
            .attach(probe("older", &[Timing::TurnEnd], -10), 4, EffectLifetime::Battle);

        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1);
        EffectPipeline::dispatch(&mut ctx, Timing::TurnEnd, None);
        assert_eq!(fired(ctx.log()), ["older", "newer"]);
    }

    #[test]
    fn expired_effects_are_detached() {
        let mut state = arena_state();
        let cfg = rules();
        let once: Arc<dyn Effect> = Arc::new(Probe {
            name: "once",
            timings: &[Timing::TurnEnd],
            priority: 0,
            outcome: Applied::Expired,
        });
        state
            .active_mut(Side::Home)
            .attach(once, 0, EffectLifetime::Battle);

        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1);
        let summary = EffectPipeline::dispatch(&mut ctx, Timing::TurnEnd, None);
        assert_eq!(summary.expired, 1);
        drop(ctx);
        assert!(state.active(Side::Home).effects().is_empty());
    }

    #[test]
    fn fainted_owner_is_skipped() {
        let mut state = arena_state();
        let cfg = rules();
        state
            .active_mut(Side::Away)
            .attach(probe("ghost", &[Timing::AfterDamageApply], 0), 0, EffectLifetime::Battle);
        state.active_mut(Side::Away).take_damage(u32::MAX);

        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1);
        let summary = EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, None);
        assert_eq!(summary.ran, 0);
    }

    /// Knocks out the defender when it runs.
    struct Finisher;

    impl Effect for Finisher {
        fn name(&self) -> &'static str {
            "finisher"
        }
        fn timings(&self) -> &'static [Timing] {
            &[Timing::AfterDamageApply]
        }
        fn priority(&self) -> i32 {
            10
        }
        fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
            ctx.defender.take_damage(u32::MAX);
            ctx.triggered("finisher");
            Applied::Triggered
        }
    }

    #[test]
    fn decided_battle_stops_the_winner_too() {
        let mut state = arena_state();
        let cfg = rules();
        state
            .active_mut(Side::Home)
            .attach(Arc::new(Finisher), 0, EffectLifetime::Battle);
        state
            .active_mut(Side::Home)
            .attach(probe("after", &[Timing::AfterDamageApply], 0), 1, EffectLifetime::Battle);

        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1);
        assert!(!ctx.is_decided());
        let summary = EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, None);
        assert!(ctx.is_decided());
        assert_eq!(summary.ran, 1);
        assert_eq!(fired(ctx.log()), ["finisher"]);
    }

    #[test]
    fn faint_with_a_reserve_keeps_the_phase_running() {
        let mut state = arena_state_with_reserves();
        let cfg = rules();
        state
            .active_mut(Side::Home)
            .attach(Arc::new(Finisher), 0, EffectLifetime::Battle);
        state
            .active_mut(Side::Home)
            .attach(probe("after", &[Timing::AfterDamageApply], 0), 1, EffectLifetime::Battle);

        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1);
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, None);
        assert!(!ctx.is_decided());
        assert_eq!(fired(ctx.log()), ["finisher", "after"]);
    }
}
