//! PvE battle sessions.
//!
//! A [`BattleSession`] owns one battle between a player and an NPC party or a
//! boss. Each submission resolves a full round immediately: the opposing move
//! comes from the session's [`ActionProvider`], and everything that happened is
//! published on the event bus.
use std::sync::Arc;

use battle_core::{
    BattleAction, BattleId, BattleMode, BattleOutcome, BattleRng, BattleSide, BattleState, BossId,
    CatchTime, CommandError, CreatureSpec, ItemId, Notice, PlayerId, Side, SideOwner, SkillId,
    TurnReport, spawn_boss, spawn_creature,
};
use tracing::{debug, info, warn};

use crate::api::{ActionProvider, RandomSkillProvider, Result, StrongestSkillProvider};
use crate::context::BattleServices;
use crate::events::{BattleEvent, CombatantView, Event, OutcomeEvent, extract_events, notice_events};
use crate::rewards::{self, RewardPayload};

/// Builds the side for `player` from their stored party.
pub(crate) fn player_side(services: &BattleServices, player: PlayerId) -> Result<BattleSide> {
    let env = services.env();
    let party = services
        .party()
        .party(player)?
        .iter()
        .map(|owned| spawn_creature(&env, &owned.spec()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(BattleSide::new(SideOwner::Player(player), party)?)
}

/// Writes the HP of every creature on `side` back to its owner.
pub(crate) fn persist_side(services: &BattleServices, side: &BattleSide) {
    let Some(player) = side.owner.player() else {
        return;
    };
    let hp: Vec<(CatchTime, u32)> = side
        .party()
        .iter()
        .map(|c| (c.catch_time, c.hp()))
        .collect();
    if let Err(err) = services.party().persist_hp(player, &hp) {
        warn!(target: "battle::session", %player, error = %err, "failed to persist party hp");
    }
}

/// Publishes the opening events for a freshly started battle.
pub(crate) fn announce_start(
    services: &BattleServices,
    battle: BattleId,
    state: &BattleState,
    opening: &[Notice],
) {
    let players = Side::BOTH
        .iter()
        .filter_map(|side| state.side(*side).owner.player())
        .collect();
    let events = services.events();
    events.publish(Event::Outcome(OutcomeEvent::BattleStarted {
        battle,
        mode: state.mode,
        players,
    }));
    events.publish(Event::Battle(BattleEvent::BattleStarted {
        battle,
        mode: state.mode,
        home: CombatantView::from(state.active(Side::Home)),
        away: CombatantView::from(state.active(Side::Away)),
    }));
    events.publish_all(notice_events(battle, opening));
}

/// One player's battle against an NPC party or a boss.
pub struct BattleSession {
    id: BattleId,
    player: PlayerId,
    state: BattleState,
    opponent: Arc<dyn ActionProvider>,
    services: BattleServices,
    concluded: bool,
}

impl BattleSession {
    /// Starts a battle against the NPC party in encounter `slot`.
    ///
    /// Wild encounters may be captured; trainer parties may not.
    pub fn challenge_npc(services: &BattleServices, player: PlayerId, slot: u32) -> Result<Self> {
        let env = services.env();
        let encounter = env
            .encounter(slot)
            .map_err(|_| CommandError::UnknownEncounter(slot))?;
        let party = encounter
            .party
            .iter()
            .map(|member| {
                let spec = CreatureSpec::new(member.species, services.mint_catch_time(), member.level)
                    .with_skills(member.skills.clone());
                spawn_creature(&env, &spec)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let away = BattleSide::new(SideOwner::Npc { slot }, party)?.with_capturable(encounter.wild);

        let id = services.next_battle_id();
        let provider = Arc::new(RandomSkillProvider::seeded(
            services.config().seed_for(id).rotate_left(17),
        ));
        Self::create(services, id, player, BattleMode::Npc, away, provider)
    }

    /// Starts a battle against `boss`. Bosses always use their strongest skill.
    pub fn challenge_boss(services: &BattleServices, player: PlayerId, boss: BossId) -> Result<Self> {
        let env = services.env();
        env.boss(boss).map_err(|_| CommandError::UnknownBoss(boss))?;
        let combatant = spawn_boss(&env, boss, services.mint_catch_time())?;
        let away = BattleSide::new(SideOwner::Boss(boss), vec![combatant])?;

        let id = services.next_battle_id();
        let provider = Arc::new(StrongestSkillProvider::new(services.catalog_handle()));
        Self::create(services, id, player, BattleMode::Boss, away, provider)
    }

    fn create(
        services: &BattleServices,
        id: BattleId,
        player: PlayerId,
        mode: BattleMode,
        away: BattleSide,
        opponent: Arc<dyn ActionProvider>,
    ) -> Result<Self> {
        let home = player_side(services, player)?;
        let rng = BattleRng::new(services.config().seed_for(id));
        let mut state = BattleState::new(mode, home, away, rng);
        let opening = services.resolver().start_battle(&mut state);

        info!(target: "battle::session", battle = %id, %player, ?mode, "session created");
        announce_start(services, id, &state, &opening);

        Ok(Self {
            id,
            player,
            state,
            opponent,
            services: services.clone(),
            concluded: false,
        })
    }

    /// Replaces the opposing action source, e.g. with a scripted fixture.
    pub fn with_opponent(mut self, opponent: Arc<dyn ActionProvider>) -> Self {
        self.opponent = opponent;
        self
    }

    pub fn id(&self) -> BattleId {
        self.id
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    // ========================================================================
    // Submissions
    // ========================================================================

    pub async fn submit_skill(&mut self, skill: SkillId) -> Result<TurnReport> {
        self.submit(BattleAction::Skill(skill)).await
    }

    pub async fn submit_switch(&mut self, target: CatchTime) -> Result<TurnReport> {
        self.submit(BattleAction::Switch(target)).await
    }

    pub async fn submit_capture(&mut self, item: ItemId) -> Result<TurnReport> {
        self.submit(BattleAction::Capture(item)).await
    }

    pub async fn submit_item(&mut self, item: ItemId) -> Result<TurnReport> {
        self.submit(BattleAction::UseItem(item)).await
    }

    pub async fn submit_flee(&mut self) -> Result<TurnReport> {
        self.submit(BattleAction::Flee).await
    }

    /// Validates `action`, asks the opponent for its move, and resolves the
    /// round. A rejected action leaves the battle untouched.
    ///
    /// While the player must replace a fainted creature, only a switch is
    /// accepted and it applies on its own.
    pub async fn submit(&mut self, action: BattleAction) -> Result<TurnReport> {
        if self.state.is_finished() {
            return Err(CommandError::BattleFinished.into());
        }
        if self.state.phase().awaits_switch(Side::Home) {
            return self.replace_fainted(action);
        }
        self.services
            .resolver()
            .validate_action(&self.state, Side::Home, &action)?;

        let opponent = self.opponent_action().await?;

        if let BattleAction::UseItem(item) | BattleAction::Capture(item) = action
            && !self.services.party().consume_item(self.player, item)?
        {
            return Err(CommandError::ItemUnavailable(item).into());
        }

        let report = self
            .services
            .resolver()
            .resolve_round(&mut self.state, [Some(action), opponent])?;
        debug!(
            target: "battle::session",
            battle = %self.id,
            turn = report.turn,
            attacks = report.attacks.len(),
            "round resolved"
        );
        self.services
            .events()
            .publish_all(extract_events(self.id, &report));

        if self.state.is_finished() {
            self.conclude();
        }
        Ok(report)
    }

    fn replace_fainted(&mut self, action: BattleAction) -> Result<TurnReport> {
        let BattleAction::Switch(target) = action else {
            return Err(CommandError::AwaitingSwitch.into());
        };
        let notices = self
            .services
            .resolver()
            .replace_fainted(&mut self.state, Side::Home, target)?;
        self.services
            .events()
            .publish_all(notice_events(self.id, &notices));

        let mut report = TurnReport::new(self.state.turn());
        report.notices = notices;
        report.phase = self.state.phase();
        Ok(report)
    }

    /// The opponent's move, or idle if it has none or picks something invalid.
    async fn opponent_action(&self) -> Result<Option<BattleAction>> {
        let choice = self.opponent.choose(Side::Away, &self.state).await?;
        let Some(action) = choice else {
            return Ok(None);
        };
        match self
            .services
            .resolver()
            .validate_action(&self.state, Side::Away, &action)
        {
            Ok(()) => Ok(Some(action)),
            Err(err) => {
                warn!(
                    target: "battle::session",
                    battle = %self.id,
                    ?action,
                    error = %err,
                    "opponent chose an invalid action; idling"
                );
                Ok(None)
            }
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// The owner left: the battle is lost and torn down.
    pub fn on_owner_disconnect(&mut self) {
        if self.state.finish(BattleOutcome::Winner(Side::Away)) {
            info!(target: "battle::session", battle = %self.id, player = %self.player, "owner disconnected");
            self.services
                .events()
                .publish(Event::Battle(BattleEvent::RoundEnded {
                    battle: self.id,
                    turn: self.state.turn(),
                    phase: self.state.phase(),
                    winner: Some(Side::Away),
                }));
        }
        self.conclude();
    }

    /// Pays out, persists HP, and announces the result. Runs once.
    fn conclude(&mut self) {
        if self.concluded {
            return;
        }
        let Some(outcome) = self.state.outcome() else {
            return;
        };
        self.concluded = true;

        let rewards = rewards::compute_rewards(&self.services.env(), &mut self.state);
        if let Err(err) = self.grant(&rewards) {
            warn!(target: "battle::session", battle = %self.id, error = %err, "failed to grant rewards");
        }
        persist_side(&self.services, self.state.side(Side::Home));

        info!(
            target: "battle::session",
            battle = %self.id,
            player = %self.player,
            ?outcome,
            rounds = self.state.turn(),
            "session ended"
        );
        self.services
            .events()
            .publish(Event::Outcome(OutcomeEvent::BattleEnded {
                battle: self.id,
                outcome,
                rounds: self.state.turn(),
                rewards,
            }));
    }

    fn grant(&self, rewards: &RewardPayload) -> crate::party::Result<()> {
        let party = self.services.party();
        if rewards.exp > 0 {
            party.grant_exp(self.player, &rewards::participants(&self.state), rewards.exp)?;
        }
        for drop in &rewards.drops {
            party.grant_items(self.player, drop.item, drop.quantity)?;
        }
        if let Some(creature) = &rewards.captured {
            party.add_creature(self.player, creature.clone())?;
        }
        Ok(())
    }
}
