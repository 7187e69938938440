//! Scripted PvE battles against the sample content, printing every event as
//! one JSON line on stdout.
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use battle_content::{Catalog, ContentFactory};
use battle_core::{
    BattleAction, BattlePhase, BattleState, BossId, CatchTime, CreatureId, EffectRegistry, ItemId,
    PlayerId, Side,
};
use battle_server::{
    BattleOrchestrator, BattleServices, Event, InMemoryPartyStore, OwnedCreature, PartyStore,
    PlayerHandle, ServerConfig, Topic,
};
use tokio::sync::broadcast;

const PLAYER: PlayerId = PlayerId(1);
const CAPTURE_ORB: ItemId = ItemId(1);
const POTION: ItemId = ItemId(3);
const WILD_SLOT: u32 = 1;
const BOSS: BossId = BossId(2);
const MAX_ROUNDS: usize = 100;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from_env();
    let catalog = match &config.content_dir {
        Some(dir) => ContentFactory::new(dir).load_catalog()?,
        None => Catalog::bundled()?,
    };
    let registry = EffectRegistry::with_builtin();
    catalog.report_unknown_effects(&registry);

    let party = Arc::new(InMemoryPartyStore::new());
    party.insert_player(
        PLAYER,
        vec![
            OwnedCreature::new(CreatureId(1), CatchTime(1), 14),
            OwnedCreature::new(CreatureId(3), CatchTime(2), 12),
            OwnedCreature::new(CreatureId(5), CatchTime(3), 12),
        ],
        [(CAPTURE_ORB, 5), (POTION, 3)],
    )?;

    let services = BattleServices::new(Arc::new(catalog), party.clone(), config)
        .with_registry(registry);
    let orchestrator = Arc::new(BattleOrchestrator::new(services));
    let connection = orchestrator.connect(PLAYER);

    let mut battle_rx = connection.subscribe(Topic::Battle);
    let mut outcome_rx = connection.subscribe(Topic::Outcome);

    connection.challenge_npc(WILD_SLOT).await?;
    play(&connection, party.as_ref(), &mut [&mut battle_rx, &mut outcome_rx]).await?;

    match connection.challenge_boss(BOSS).await {
        Ok(_) => play(&connection, party.as_ref(), &mut [&mut battle_rx, &mut outcome_rx]).await?,
        Err(err) => tracing::warn!(error = %err, "boss challenge refused"),
    }

    let collection = party.creatures(PLAYER)?;
    tracing::info!(creatures = collection.len(), "simulation finished");
    connection.close().await?;
    Ok(())
}

/// Plays the current battle to the end with a fixed policy.
async fn play(
    handle: &PlayerHandle,
    party: &dyn PartyStore,
    receivers: &mut [&mut broadcast::Receiver<Event>],
) -> Result<()> {
    for _ in 0..MAX_ROUNDS {
        drain(receivers)?;
        let state = match handle.query_state().await {
            Ok(state) => state,
            // The battle was released once decided.
            Err(_) => return drain(receivers),
        };
        let action = choose(&state, party)?;
        let submission = handle.submit(action).await?;
        if submission
            .report()
            .is_some_and(|report| report.outcome().is_some())
        {
            return drain(receivers);
        }
    }
    bail!("battle did not finish within {MAX_ROUNDS} rounds")
}

fn choose(state: &BattleState, party: &dyn PartyStore) -> Result<BattleAction> {
    let own = state.side(Side::Home);
    if let BattlePhase::AwaitingSwitch { home: true, .. } = state.phase() {
        let next = own
            .next_healthy()
            .and_then(|index| own.party().get(index))
            .context("no replacement available")?;
        return Ok(BattleAction::Switch(next.catch_time));
    }

    let active = own.active();
    let foe = state.active(Side::Away);
    let orbs = party.item_count(PLAYER, CAPTURE_ORB)?;
    if state.side(Side::Away).capturable && foe.hp_percent() <= 50 && orbs > 0 {
        return Ok(BattleAction::Capture(CAPTURE_ORB));
    }
    if active.hp_percent() <= 30 && party.item_count(PLAYER, POTION)? > 0 {
        return Ok(BattleAction::UseItem(POTION));
    }
    let skill = active
        .skills()
        .iter()
        .find(|slot| slot.is_usable())
        .context("active creature has no usable skill")?;
    Ok(BattleAction::Skill(skill.skill))
}

fn drain(receivers: &mut [&mut broadcast::Receiver<Event>]) -> Result<()> {
    for rx in receivers.iter_mut() {
        while let Ok(event) = rx.try_recv() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}
