use super::{BossId, CatchTime, Combatant, PlayerId, Side, VolatileFlags};
use crate::combat::{CommandError, TargetIssue};
use crate::env::BattleRng;

/// Kind of opponent a battle is fought against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleMode {
    /// Wild or trainer NPC encounter.
    Npc,
    /// Scripted boss encounter; capture is not allowed.
    Boss,
    /// Two human players.
    Pvp,
}

impl BattleMode {
    pub const fn is_pve(self) -> bool {
        !matches!(self, BattleMode::Pvp)
    }
}

/// Who controls a side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SideOwner {
    Player(PlayerId),
    Npc { slot: u32 },
    Boss(BossId),
}

impl SideOwner {
    pub const fn player(&self) -> Option<PlayerId> {
        match self {
            SideOwner::Player(id) => Some(*id),
            _ => None,
        }
    }

    pub const fn is_player(&self) -> bool {
        matches!(self, SideOwner::Player(_))
    }
}

/// Terminal result of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    Winner(Side),
    /// Both sides ran out of healthy combatants in the same turn.
    Draw,
    /// The given side left the battle.
    Fled(Side),
    /// The given side captured the opposing creature.
    Captured(Side),
}

impl BattleOutcome {
    /// The side credited with the win, if any.
    pub const fn winner(&self) -> Option<Side> {
        match self {
            BattleOutcome::Winner(side) | BattleOutcome::Captured(side) => Some(*side),
            BattleOutcome::Fled(side) => Some(side.opponent()),
            BattleOutcome::Draw => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    /// Accepting actions for the next turn.
    Ongoing,
    /// One or both sides must send a replacement before the next turn.
    AwaitingSwitch { home: bool, away: bool },
    Finished(BattleOutcome),
}

impl BattlePhase {
    pub const fn awaits_switch(&self, side: Side) -> bool {
        match (self, side) {
            (BattlePhase::AwaitingSwitch { home, .. }, Side::Home) => *home,
            (BattlePhase::AwaitingSwitch { away, .. }, Side::Away) => *away,
            _ => false,
        }
    }
}

/// One participant: its owner and ordered party.
#[derive(Clone, Debug)]
pub struct BattleSide {
    pub owner: SideOwner,
    /// Whether the opposing side may capture this side's creatures.
    pub capturable: bool,
    party: Vec<Combatant>,
    active: usize,
}

impl BattleSide {
    /// Creates a side. The first non-fainted combatant leads.
    pub fn new(owner: SideOwner, party: Vec<Combatant>) -> Result<Self, CommandError> {
        let active = party
            .iter()
            .position(|c| !c.is_fainted())
            .ok_or(CommandError::NoHealthyCombatant)?;
        Ok(Self {
            owner,
            capturable: false,
            party,
            active,
        })
    }

    pub fn with_capturable(mut self, capturable: bool) -> Self {
        self.capturable = capturable;
        self
    }

    pub fn active(&self) -> &Combatant {
        &self.party[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Combatant {
        &mut self.party[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn party(&self) -> &[Combatant] {
        &self.party
    }

    pub fn party_mut(&mut self) -> &mut [Combatant] {
        &mut self.party
    }

    pub fn member(&self, catch_time: CatchTime) -> Option<&Combatant> {
        self.party.iter().find(|c| c.catch_time == catch_time)
    }

    pub fn member_mut(&mut self, catch_time: CatchTime) -> Option<&mut Combatant> {
        self.party.iter_mut().find(|c| c.catch_time == catch_time)
    }

    /// Index of the first healthy combatant that is not on the field.
    pub fn next_healthy(&self) -> Option<usize> {
        self.party
            .iter()
            .enumerate()
            .find(|(i, c)| *i != self.active && !c.is_fainted())
            .map(|(i, _)| i)
    }

    pub fn has_healthy_reserve(&self) -> bool {
        self.next_healthy().is_some()
    }

    pub fn is_wiped(&self) -> bool {
        self.party.iter().all(Combatant::is_fainted)
    }

    /// Puts `catch_time` on the field. The outgoing combatant is withdrawn.
    ///
    /// A forced replacement (active fainted) ignores binding.
    pub fn switch_to(&mut self, catch_time: CatchTime) -> Result<(), CommandError> {
        let index = self.check_switch(catch_time)?;
        self.party[self.active].withdraw();
        self.active = index;
        Ok(())
    }

    /// Validates a switch without performing it. Returns the target's index.
    pub fn check_switch(&self, catch_time: CatchTime) -> Result<usize, CommandError> {
        let index = self
            .party
            .iter()
            .position(|c| c.catch_time == catch_time)
            .ok_or(CommandError::InvalidTarget(catch_time, TargetIssue::NotOwned))?;
        if index == self.active {
            return Err(CommandError::InvalidTarget(catch_time, TargetIssue::AlreadyActive));
        }
        if self.party[index].is_fainted() {
            return Err(CommandError::InvalidTarget(catch_time, TargetIssue::Fainted));
        }
        let outgoing = &self.party[self.active];
        if !outgoing.is_fainted() && outgoing.flags.contains(VolatileFlags::BOUND) {
            return Err(CommandError::Trapped);
        }
        Ok(index)
    }

    /// Sends the next healthy combatant in party order.
    pub fn send_next(&mut self) -> Option<CatchTime> {
        let index = self.next_healthy()?;
        let catch_time = self.party[index].catch_time;
        self.party[self.active].withdraw();
        self.active = index;
        Some(catch_time)
    }

    /// Consumes the side and returns its party in order.
    pub fn into_party(self) -> Vec<Combatant> {
        self.party
    }
}

/// Split mutable view of a battle for running one action.
pub struct Arena<'a> {
    pub attacker: &'a mut Combatant,
    pub defender: &'a mut Combatant,
    /// Whether each side still has a healthy creature off the field,
    /// captured when the arena is split.
    pub attacker_reserve: bool,
    pub defender_reserve: bool,
    pub rng: &'a mut BattleRng,
    pub seq: &'a mut u64,
}

/// Full state of one battle.
#[derive(Clone, Debug)]
pub struct BattleState {
    pub mode: BattleMode,
    sides: [BattleSide; 2],
    turn: u32,
    phase: BattlePhase,
    rng: BattleRng,
    next_seq: u64,
}

impl BattleState {
    pub fn new(mode: BattleMode, home: BattleSide, away: BattleSide, rng: BattleRng) -> Self {
        Self {
            mode,
            sides: [home, away],
            turn: 0,
            phase: BattlePhase::Ongoing,
            rng,
            next_seq: 0,
        }
    }

    pub fn side(&self, side: Side) -> &BattleSide {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BattleSide {
        &mut self.sides[side.index()]
    }

    pub fn active(&self, side: Side) -> &Combatant {
        self.side(side).active()
    }

    pub fn active_mut(&mut self, side: Side) -> &mut Combatant {
        self.side_mut(side).active_mut()
    }

    /// Finds which side a player controls.
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|s| self.side(*s).owner.player() == Some(player))
    }

    /// Splits the state so `attacker` acts against the opposing active.
    pub fn arena(&mut self, attacker: Side) -> Arena<'_> {
        let [home, away] = &mut self.sides;
        let (attacker_side, defender_side) = match attacker {
            Side::Home => (home, away),
            Side::Away => (away, home),
        };
        Arena {
            attacker_reserve: attacker_side.has_healthy_reserve(),
            defender_reserve: defender_side.has_healthy_reserve(),
            attacker: attacker_side.active_mut(),
            defender: defender_side.active_mut(),
            rng: &mut self.rng,
            seq: &mut self.next_seq,
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn advance_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: BattlePhase) {
        if !self.is_finished() {
            self.phase = phase;
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, BattlePhase::Finished(_))
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            BattlePhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Marks the battle finished. The first recorded outcome wins.
    pub fn finish(&mut self, outcome: BattleOutcome) -> bool {
        if self.is_finished() {
            return false;
        }
        tracing::debug!(target: "battle::state", ?outcome, turn = self.turn, "battle finished");
        self.phase = BattlePhase::Finished(outcome);
        true
    }

    /// Every combatant of both parties, with the effect registration counter.
    pub fn roster_mut(&mut self) -> (impl Iterator<Item = &mut Combatant>, &mut u64) {
        let [home, away] = &mut self.sides;
        (
            home.party.iter_mut().chain(away.party.iter_mut()),
            &mut self.next_seq,
        )
    }

    pub fn rng_mut(&mut self) -> &mut BattleRng {
        &mut self.rng
    }

    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Derives the phase from fainted actives and remaining reserves.
    ///
    /// Returns the new phase. Does nothing once finished.
    pub fn settle(&mut self) -> BattlePhase {
        if self.is_finished() {
            return self.phase;
        }
        let down = |side: Side| self.active(side).is_fainted();
        let out = |side: Side| down(side) && !self.side(side).has_healthy_reserve();

        let (home_out, away_out) = (out(Side::Home), out(Side::Away));
        let phase = match (home_out, away_out) {
            (true, true) => BattlePhase::Finished(BattleOutcome::Draw),
            (true, false) => BattlePhase::Finished(BattleOutcome::Winner(Side::Away)),
            (false, true) => BattlePhase::Finished(BattleOutcome::Winner(Side::Home)),
            (false, false) if down(Side::Home) || down(Side::Away) => BattlePhase::AwaitingSwitch {
                home: down(Side::Home),
                away: down(Side::Away),
            },
            (false, false) => BattlePhase::Ongoing,
        };
        if let BattlePhase::Finished(outcome) = phase {
            self.finish(outcome);
        } else {
            self.phase = phase;
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{creature, rng};

    fn side(owner: SideOwner, hps: &[u32]) -> BattleSide {
        let party = hps
            .iter()
            .enumerate()
            .map(|(i, hp)| creature(i as u64 + 1, 100, 50).with_hp(*hp))
            .collect();
        BattleSide::new(owner, party).unwrap()
    }

    #[test]
    fn side_requires_a_healthy_member() {
        let party = vec![creature(1, 100, 50).with_hp(0)];
        assert_eq!(
            BattleSide::new(SideOwner::Npc { slot: 1 }, party).unwrap_err(),
            CommandError::NoHealthyCombatant
        );
    }

    #[test]
    fn first_healthy_member_leads() {
        let s = side(SideOwner::Npc { slot: 1 }, &[0, 40, 80]);
        assert_eq!(s.active().catch_time, CatchTime(2));
        assert_eq!(s.next_healthy(), Some(2));
    }

    #[test]
    fn switch_rules() {
        let mut s = side(SideOwner::Player(PlayerId(1)), &[100, 0, 100]);
        assert_eq!(
            s.switch_to(CatchTime(1)),
            Err(CommandError::InvalidTarget(CatchTime(1), TargetIssue::AlreadyActive))
        );
        assert_eq!(
            s.switch_to(CatchTime(2)),
            Err(CommandError::InvalidTarget(CatchTime(2), TargetIssue::Fainted))
        );
        assert_eq!(
            s.switch_to(CatchTime(9)),
            Err(CommandError::InvalidTarget(CatchTime(9), TargetIssue::NotOwned))
        );

        s.active_mut().flags.insert(VolatileFlags::BOUND);
        assert_eq!(s.switch_to(CatchTime(3)), Err(CommandError::Trapped));

        s.active_mut().flags.remove(VolatileFlags::BOUND);
        assert!(s.switch_to(CatchTime(3)).is_ok());
        assert_eq!(s.active().catch_time, CatchTime(3));
    }

    #[test]
    fn settle_detects_draw_and_pending_switch() {
        let home = side(SideOwner::Player(PlayerId(1)), &[0, 100]);
        let away = side(SideOwner::Npc { slot: 1 }, &[100]);
        let mut state = BattleState::new(BattleMode::Npc, home, away, rng(1));
        state.active_mut(Side::Home).take_damage(1_000);
        assert_eq!(
            state.settle(),
            BattlePhase::Finished(BattleOutcome::Winner(Side::Away))
        );

        let home = side(SideOwner::Player(PlayerId(1)), &[100, 100]);
        let away = side(SideOwner::Npc { slot: 1 }, &[100]);
        let mut state = BattleState::new(BattleMode::Npc, home, away, rng(1));
        state.active_mut(Side::Home).take_damage(1_000);
        assert_eq!(
            state.settle(),
            BattlePhase::AwaitingSwitch {
                home: true,
                away: false
            }
        );

        state.active_mut(Side::Away).take_damage(1_000);
        state.side_mut(Side::Home).party_mut()[1].take_damage(1_000);
        assert_eq!(state.settle(), BattlePhase::Finished(BattleOutcome::Draw));
        assert!(!state.finish(BattleOutcome::Fled(Side::Home)));
    }
}
