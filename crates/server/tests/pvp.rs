//! Two-player rooms: buffering, exactly-once resolution, forced switches,
//! disconnects and the invite flow that opens them.
mod common;

use std::sync::Arc;

use battle_core::{
    BattleAction, BattleId, BattleOutcome, BattlePhase, CatchTime, CommandError, Side,
};
use battle_server::{
    Event, InviteError, LobbyEvent, OutcomeEvent, OwnedCreature, PartyStore, PvpRoom,
    ServiceError, Submission, Topic,
};
use common::*;

/// Host (home) with creatures 1 and 2 against guest (away) with 3 and 4.
async fn open_room(h: &Harness) -> Arc<PvpRoom> {
    open_room_with(h, vec![starter(1, 20), starter(2, 20)]).await
}

async fn open_room_with(h: &Harness, host_party: Vec<OwnedCreature>) -> Arc<PvpRoom> {
    h.add_player(HOST, host_party, &[(ORB, 1), (POTION, 1)]);
    h.add_player(GUEST, vec![starter(3, 20), starter(4, 20)], &[]);
    h.orchestrator.invite(HOST, GUEST).await.expect("invite sent");
    h.orchestrator.accept(GUEST, HOST).await.expect("invite accepted");
    h.orchestrator.room(HOST).await.expect("host is in the room")
}

// ============================================================================
// Buffering
// ============================================================================

#[tokio::test]
async fn a_round_waits_for_both_sides() {
    let h = harness();
    let room = open_room(&h).await;
    assert_eq!(room.player(Side::Home), HOST);
    assert_eq!(room.side_of(GUEST), Some(Side::Away));

    let first = h
        .orchestrator
        .submit(HOST, BattleAction::Skill(TACKLE))
        .await
        .expect("buffered");
    assert_eq!(first, Submission::Pending);
    assert_eq!(room.pending_count().await, 1);
    assert_eq!(room.snapshot().await.turn(), 0);

    let err = h
        .orchestrator
        .submit(HOST, BattleAction::Skill(GROWL))
        .await
        .expect_err("one action per side and round");
    assert_eq!(command_error(err), CommandError::AlreadySubmitted);

    let second = h
        .orchestrator
        .submit(GUEST, BattleAction::Skill(TACKLE))
        .await
        .expect("round resolves");
    let report = second.report().expect("second submission resolves");
    assert_eq!(report.turn, 1);
    assert_eq!(report.attacks.len(), 2);
    assert_eq!(room.pending_count().await, 0);
    assert_eq!(room.snapshot().await.turn(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn simultaneous_submissions_resolve_exactly_once() {
    let h = harness();
    let room = open_room(&h).await;

    let home = tokio::spawn({
        let room = Arc::clone(&room);
        async move { room.submit(Side::Home, BattleAction::Skill(TACKLE)).await }
    });
    let away = tokio::spawn({
        let room = Arc::clone(&room);
        async move { room.submit(Side::Away, BattleAction::Skill(TACKLE)).await }
    });
    let results = [
        home.await.expect("home task").expect("home submit"),
        away.await.expect("away task").expect("away submit"),
    ];

    let resolved = results
        .iter()
        .filter(|submission| submission.report().is_some())
        .count();
    assert_eq!(resolved, 1);
    assert!(results.contains(&Submission::Pending));
    assert_eq!(room.pending_count().await, 0);
    assert_eq!(room.snapshot().await.turn(), 1);
}

#[tokio::test]
async fn switching_side_skips_its_attack_and_takes_the_hit() {
    let h = harness();
    let room = open_room(&h).await;

    h.orchestrator
        .submit(HOST, BattleAction::Switch(CatchTime(2)))
        .await
        .expect("switch buffered");
    let report = h
        .orchestrator
        .submit(GUEST, BattleAction::Skill(TACKLE))
        .await
        .expect("round resolves")
        .into_report()
        .expect("resolved");

    assert_eq!(report.order(), vec![Side::Away]);
    let state = room.snapshot().await;
    let home = state.side(Side::Home);
    assert_eq!(home.active().catch_time, CatchTime(2));
    assert!(home.active().hp() < home.active().max_hp());
    let benched = &home.party()[0];
    assert_eq!(benched.hp(), benched.max_hp());
}

#[tokio::test]
async fn capture_is_not_available_in_pvp() {
    let h = harness();
    let room = open_room(&h).await;

    let err = h
        .orchestrator
        .submit(HOST, BattleAction::Capture(ORB))
        .await
        .expect_err("players cannot capture each other");
    assert_eq!(command_error(err), CommandError::NotApplicable);
    assert_eq!(room.pending_count().await, 0);
}

#[tokio::test]
async fn items_are_spent_when_submitted() {
    let h = harness();
    let room = open_room(&h).await;

    let submission = h
        .orchestrator
        .submit(HOST, BattleAction::UseItem(POTION))
        .await
        .expect("item buffered");
    assert_eq!(submission, Submission::Pending);
    assert_eq!(
        h.party.item_count(HOST, POTION).expect("inventory"),
        0,
        "consumed before the round resolves"
    );
    assert_eq!(room.pending_count().await, 1);
}

#[tokio::test]
async fn double_switch_skips_attacks_but_still_ends_the_turn() {
    let h = harness();
    let room = open_room(&h).await;

    // poison the guest lead, then pull it out
    h.orchestrator
        .submit(HOST, BattleAction::Skill(TOXIN))
        .await
        .expect("buffered");
    h.orchestrator
        .submit(GUEST, BattleAction::Skill(GROWL))
        .await
        .expect("round one resolves");
    h.orchestrator
        .submit(HOST, BattleAction::Skill(GROWL))
        .await
        .expect("buffered");
    h.orchestrator
        .submit(GUEST, BattleAction::Switch(CatchTime(4)))
        .await
        .expect("round two resolves");

    let state = room.snapshot().await;
    let benched = |state: &battle_core::BattleState| {
        state
            .side(Side::Away)
            .party()
            .iter()
            .find(|c| c.catch_time == CatchTime(3))
            .map(|c| c.hp())
            .expect("creature 3 is in the away party")
    };
    let before = benched(&state);
    assert!(before < state.side(Side::Away).party()[0].max_hp());

    h.orchestrator
        .submit(HOST, BattleAction::Switch(CatchTime(2)))
        .await
        .expect("buffered");
    let report = h
        .orchestrator
        .submit(GUEST, BattleAction::Switch(CatchTime(3)))
        .await
        .expect("round three resolves")
        .into_report()
        .expect("resolved");

    assert!(report.attacks.is_empty());
    assert_eq!(report.turn, 3);
    assert_eq!(report.phase, BattlePhase::Ongoing);
    assert_eq!(room.pending_count().await, 0);

    let state = room.snapshot().await;
    assert_eq!(state.turn(), 3);
    assert_eq!(state.active(Side::Home).catch_time, CatchTime(2));
    assert_eq!(state.active(Side::Away).catch_time, CatchTime(3));
    assert!(state.active(Side::Away).hp() < before, "poison ticked at turn end");
    assert_eq!(state.active(Side::Home).hp(), state.active(Side::Home).max_hp());
}

// ============================================================================
// Forced switches and endings
// ============================================================================

#[tokio::test]
async fn only_the_fainted_side_acts_until_it_sends_a_replacement() {
    let h = harness();
    let room = open_room_with(&h, vec![starter(1, 20).with_hp(1), starter(2, 20)]).await;

    h.orchestrator
        .submit(HOST, BattleAction::Skill(GROWL))
        .await
        .expect("buffered");
    let report = h
        .orchestrator
        .submit(GUEST, BattleAction::Skill(TACKLE))
        .await
        .expect("round resolves")
        .into_report()
        .expect("resolved");
    assert_eq!(
        report.phase,
        BattlePhase::AwaitingSwitch {
            home: true,
            away: false
        }
    );

    let err = h
        .orchestrator
        .submit(GUEST, BattleAction::Skill(TACKLE))
        .await
        .expect_err("the host is choosing a replacement");
    assert_eq!(command_error(err), CommandError::OpponentSwitching);

    let err = h
        .orchestrator
        .submit(HOST, BattleAction::Skill(TACKLE))
        .await
        .expect_err("only a switch is accepted");
    assert_eq!(command_error(err), CommandError::AwaitingSwitch);

    let report = h
        .orchestrator
        .submit(HOST, BattleAction::Switch(CatchTime(2)))
        .await
        .expect("replacement enters")
        .into_report()
        .expect("applies immediately");
    assert_eq!(report.phase, BattlePhase::Ongoing);
    assert_eq!(room.pending_count().await, 0);
    assert_eq!(
        room.snapshot().await.active(Side::Home).catch_time,
        CatchTime(2)
    );
}

#[tokio::test]
async fn a_decided_round_releases_both_players() {
    let h = harness();
    let room = open_room_with(&h, vec![starter(1, 20).with_hp(1)]).await;
    let mut outcomes = h.services.events().subscribe(Topic::Outcome);

    h.orchestrator
        .submit(HOST, BattleAction::Skill(GROWL))
        .await
        .expect("buffered");
    let report = h
        .orchestrator
        .submit(GUEST, BattleAction::Skill(TACKLE))
        .await
        .expect("round resolves")
        .into_report()
        .expect("resolved");

    assert_eq!(report.outcome(), Some(BattleOutcome::Winner(Side::Away)));
    assert!(!h.orchestrator.in_battle(HOST).await);
    assert!(!h.orchestrator.in_battle(GUEST).await);

    let ended = drain(&mut outcomes).into_iter().find_map(|event| match event {
        Event::Outcome(OutcomeEvent::BattleEnded {
            battle, rewards, ..
        }) if battle == room.id() => Some(rewards),
        _ => None,
    });
    assert!(ended.expect("battle end announced").is_empty());
    assert_eq!(h.party.creatures(HOST).expect("collection")[0].hp, Some(0));
}

#[tokio::test]
async fn fleeing_forfeits_and_discards_the_buffer() {
    let h = harness();
    let room = open_room(&h).await;

    h.orchestrator
        .submit(GUEST, BattleAction::Skill(TACKLE))
        .await
        .expect("buffered");
    let report = h
        .orchestrator
        .submit(HOST, BattleAction::Flee)
        .await
        .expect("flee resolves")
        .into_report()
        .expect("resolved");

    assert_eq!(report.outcome(), Some(BattleOutcome::Fled(Side::Home)));
    assert!(report.attacks.is_empty());
    assert_eq!(room.pending_count().await, 0);
    assert!(!h.orchestrator.in_battle(GUEST).await);
}

#[tokio::test]
async fn disconnect_with_a_buffered_action_hands_the_win_over() {
    let h = harness();
    let room = open_room(&h).await;
    let host = h.orchestrator.connect(HOST);
    let guest = h.orchestrator.connect(GUEST);

    let submission = host.use_skill(TACKLE).await.expect("buffered");
    assert_eq!(submission, Submission::Pending);

    guest.close().await.expect("guest worker stops");

    assert!(room.is_finished().await);
    assert_eq!(room.pending_count().await, 0);
    assert_eq!(
        room.snapshot().await.outcome(),
        Some(BattleOutcome::Winner(Side::Home))
    );
    assert!(!h.orchestrator.in_battle(HOST).await);

    let err = host
        .use_skill(TACKLE)
        .await
        .expect_err("room was released");
    assert_eq!(command_error(err), CommandError::NoActiveBattle);
    host.close().await.expect("host worker stops");
}

// ============================================================================
// Invites
// ============================================================================

fn invite_error(err: ServiceError) -> InviteError {
    match err {
        ServiceError::Invite(err) => err,
        other => panic!("expected an invite error, got {other}"),
    }
}

#[tokio::test]
async fn invites_are_validated() {
    let h = harness();
    h.add_player(HOST, vec![starter(1, 20)], &[]);
    h.add_player(GUEST, vec![starter(2, 20)], &[]);
    h.add_player(OTHER, vec![starter(3, 20)], &[]);

    let err = h.orchestrator.invite(HOST, HOST).await.expect_err("self");
    assert_eq!(invite_error(err), InviteError::SelfInvite);

    h.orchestrator
        .challenge_npc(OTHER, WILD_SLOT)
        .await
        .expect("other is busy");
    let err = h.orchestrator.invite(HOST, OTHER).await.expect_err("busy");
    assert_eq!(invite_error(err), InviteError::TargetInBattle(OTHER));

    h.orchestrator.invite(HOST, GUEST).await.expect("first invite");
    let err = h.orchestrator.invite(HOST, GUEST).await.expect_err("twice");
    assert_eq!(
        invite_error(err),
        InviteError::AlreadyInvited {
            from: HOST,
            to: GUEST
        }
    );
}

#[tokio::test]
async fn every_invite_is_consumed_once() {
    let h = harness();
    h.add_player(HOST, vec![starter(1, 20)], &[]);
    h.add_player(GUEST, vec![starter(2, 20)], &[]);
    let not_found = InviteError::NotFound {
        from: HOST,
        to: GUEST,
    };

    h.orchestrator.invite(HOST, GUEST).await.expect("invite");
    h.orchestrator.decline(GUEST, HOST).await.expect("declined");
    let err = h.orchestrator.accept(GUEST, HOST).await.expect_err("gone");
    assert_eq!(invite_error(err), not_found);

    h.orchestrator.invite(HOST, GUEST).await.expect("invite again");
    h.orchestrator.cancel(HOST, GUEST).await.expect("cancelled");
    let err = h.orchestrator.decline(GUEST, HOST).await.expect_err("gone");
    assert_eq!(invite_error(err), not_found);

    h.orchestrator.invite(HOST, GUEST).await.expect("third invite");
    h.orchestrator.disconnect(HOST).await;
    let err = h.orchestrator.accept(GUEST, HOST).await.expect_err("dropped");
    assert_eq!(invite_error(err), not_found);
}

#[tokio::test]
async fn accepting_opens_a_room_and_leaves_any_pve_battle() {
    let h = harness();
    h.add_player(HOST, vec![starter(1, 20)], &[]);
    h.add_player(GUEST, vec![starter(2, 20)], &[]);
    let mut lobby = h.services.events().subscribe(Topic::Lobby);

    h.orchestrator.invite(HOST, GUEST).await.expect("invite");
    let pve = h
        .orchestrator
        .challenge_npc(GUEST, WILD_SLOT)
        .await
        .expect("guest wanders off");

    let battle = h.orchestrator.accept(GUEST, HOST).await.expect("accepted");
    assert_ne!(battle, pve);
    assert_eq!(h.orchestrator.active_battle(HOST).await, Some(battle));
    assert_eq!(h.orchestrator.active_battle(GUEST).await, Some(battle));

    let events = drain(&mut lobby);
    assert!(events.contains(&Event::Lobby(LobbyEvent::InviteSent {
        from: HOST,
        to: GUEST
    })));
    assert!(events.contains(&Event::Lobby(LobbyEvent::InviteAccepted {
        from: HOST,
        to: GUEST,
        battle
    })));
}

#[tokio::test]
async fn an_inviter_who_started_another_battle_cannot_be_joined() {
    let h = harness();
    h.add_player(HOST, vec![starter(1, 20)], &[]);
    h.add_player(GUEST, vec![starter(2, 20)], &[]);

    h.orchestrator.invite(HOST, GUEST).await.expect("invite");
    h.orchestrator
        .challenge_boss(HOST, BOSS)
        .await
        .expect("host is busy");

    let err = h.orchestrator.accept(GUEST, HOST).await.expect_err("busy");
    assert_eq!(invite_error(err), InviteError::TargetInBattle(HOST));
    assert!(!h.orchestrator.in_battle(GUEST).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_a_challenge_against_accept_never_drops_a_battle() {
    for _ in 0..32 {
        let h = harness();
        h.add_player(HOST, vec![starter(1, 20)], &[]);
        h.add_player(GUEST, vec![starter(2, 20)], &[]);
        let mut outcomes = h.services.events().subscribe(Topic::Outcome);
        h.orchestrator.invite(HOST, GUEST).await.expect("invite");

        let challenge = tokio::spawn({
            let orchestrator = Arc::clone(&h.orchestrator);
            async move { orchestrator.challenge_npc(HOST, WILD_SLOT).await }
        });
        let accept = tokio::spawn({
            let orchestrator = Arc::clone(&h.orchestrator);
            async move { orchestrator.accept(GUEST, HOST).await }
        });
        let started: Vec<BattleId> = [
            challenge.await.expect("challenge task"),
            accept.await.expect("accept task"),
        ]
        .into_iter()
        .filter_map(|result| result.ok())
        .collect();
        assert!(!started.is_empty(), "the challenge always starts");

        let active = h.orchestrator.active_battle(HOST).await;
        let ended: Vec<BattleId> = drain(&mut outcomes)
            .into_iter()
            .filter_map(|event| match event {
                Event::Outcome(OutcomeEvent::BattleEnded { battle, .. }) => Some(battle),
                _ => None,
            })
            .collect();
        for battle in started {
            assert!(
                active == Some(battle) || ended.contains(&battle),
                "battle {battle} vanished without ending"
            );
        }
    }
}
