//! End-to-end tests for single-pairing combat through the engine

use hexfront::combat::CombatWinner;
use hexfront::core::config::CombatConfig;
use hexfront::core::types::ArmyId;
use hexfront::engine::{CombatEngine, CombatEvent};
use hexfront::hex::HexCoord;
use hexfront::sim::SimWorld;
use hexfront::stats::{CavalryStance, Composition, StatsTable, UnitType};
use hexfront::terrain::Terrain;
use hexfront::world::WorldView;

fn new_engine() -> CombatEngine {
    CombatEngine::new(CombatConfig::default(), StatsTable::default())
}

fn comp(pairs: &[(UnitType, u32)]) -> Composition {
    Composition::from_pairs(pairs)
}

/// Step until idle, applying events back to the world; returns all events
fn run(engine: &mut CombatEngine, world: &mut SimWorld, max_ticks: u32) -> Vec<CombatEvent> {
    let mut all = Vec::new();
    let mut tick = 0u32;
    while !engine.is_idle() && tick < max_ticks {
        tick += 1;
        let events = engine.update(tick as f64 * 0.1, world);
        world.apply_events(&events);
        all.extend(events);
    }
    assert!(engine.is_idle(), "engine failed to settle in {} ticks", max_ticks);
    all
}

fn two_sided_world() -> (SimWorld, hexfront::core::types::OwnerId, hexfront::core::types::OwnerId)
{
    let mut world = SimWorld::new(Terrain::Plains);
    let red = world.add_owner();
    let blue = world.add_owner();
    world.set_hostile(red, blue);
    (world, red, blue)
}

#[test]
fn test_swordsmen_take_undefended_archer_camp() {
    // Five swordsmen against two archers on open ground, no entrenchment
    let (mut world, red, blue) = two_sided_world();
    let attacker = world.add_army(red, HexCoord::new(1, 0), comp(&[(UnitType::Swordsman, 5)]), 0.0);
    let defender = world.add_army(blue, HexCoord::new(0, 0), comp(&[(UnitType::Archer, 2)]), 0.0);

    let mut engine = new_engine();
    engine.start_combat(&world, attacker, defender, 0.0).unwrap();
    let events = run(&mut engine, &mut world, 10_000);

    let report = events
        .iter()
        .find_map(|e| match e {
            CombatEvent::CombatEnded { winner, report, .. } => Some((winner, report)),
            _ => None,
        })
        .expect("combat should have ended");

    assert_eq!(*report.0, CombatWinner::Attacker);
    let defender_report = &report.1.defender_armies[0];
    assert_eq!(defender_report.casualties.get(UnitType::Archer), 2);
    let attacker_report = &report.1.attacker_armies[0];
    assert!(attacker_report.casualties.total() < 5);
}

#[test]
fn test_phase_records_form_an_audit_trail() {
    let (mut world, red, blue) = two_sided_world();
    let attacker = world.add_army(red, HexCoord::new(1, 0), comp(&[(UnitType::Swordsman, 8)]), 0.0);
    let defender = world.add_army(
        blue,
        HexCoord::new(0, 0),
        comp(&[(UnitType::Spearman, 4), (UnitType::Archer, 3)]),
        0.0,
    );

    let mut engine = new_engine();
    engine.start_combat(&world, attacker, defender, 0.0).unwrap();
    let events = run(&mut engine, &mut world, 10_000);

    let records: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::PhaseCompleted { record, .. } => Some(record),
            _ => None,
        })
        .collect();

    // All three phases recorded, in order, with sane durations
    let indices: Vec<_> = records.iter().map(|r| r.phase.index()).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!((records[0].duration - 3.0).abs() < 0.11);
    for r in &records {
        assert!(r.duration >= 0.0);
    }

    // Phase casualties sum to the final casualty ledger
    let report = events
        .iter()
        .find_map(|e| match e {
            CombatEvent::CombatEnded { report, .. } => Some(report),
            _ => None,
        })
        .unwrap();
    for ty in UnitType::ALL {
        let from_phases: u32 = records.iter().map(|r| r.defender_casualties.get(ty)).sum();
        let from_report: u32 = report
            .defender_armies
            .iter()
            .map(|a| a.casualties.get(ty))
            .sum();
        assert_eq!(from_phases, from_report, "phase ledger mismatch for {:?}", ty);
    }
}

#[test]
fn test_conservation_holds_in_reports() {
    let (mut world, red, blue) = two_sided_world();
    let attacker = world.add_army(
        red,
        HexCoord::new(1, 0),
        comp(&[
            (UnitType::Swordsman, 12),
            (UnitType::Archer, 6),
            (UnitType::Lancer, 4),
        ]),
        0.0,
    );
    let defender = world.add_army(
        blue,
        HexCoord::new(0, 0),
        comp(&[
            (UnitType::Spearman, 10),
            (UnitType::Crossbowman, 5),
            (UnitType::Catapult, 2),
        ]),
        0.0,
    );

    let mut engine = new_engine();
    engine.start_combat(&world, attacker, defender, 0.0).unwrap();
    let events = run(&mut engine, &mut world, 20_000);

    let report = events
        .iter()
        .find_map(|e| match e {
            CombatEvent::CombatEnded { report, .. } => Some(report),
            _ => None,
        })
        .unwrap();

    for army in report
        .attacker_armies
        .iter()
        .chain(report.defender_armies.iter())
    {
        for ty in UnitType::ALL {
            assert_eq!(
                army.initial.get(ty),
                army.survivors.get(ty) + army.casualties.get(ty),
                "conservation violated for {:?}",
                ty
            );
        }
    }
}

#[test]
fn test_reserve_cavalry_deals_nothing_before_cleanup() {
    let (mut world, red, blue) = two_sided_world();
    let attacker = world.add_army(
        red,
        HexCoord::new(1, 0),
        comp(&[(UnitType::Swordsman, 6), (UnitType::Lancer, 4)]),
        0.0,
    );
    world.set_cavalry_stance(attacker, CavalryStance::Reserve);
    let defender = world.add_army(blue, HexCoord::new(0, 0), comp(&[(UnitType::Archer, 5)]), 0.0);

    let mut engine = new_engine();
    engine.start_combat(&world, attacker, defender, 0.0).unwrap();
    let events = run(&mut engine, &mut world, 10_000);

    // With swordsmen waiting for melee and the lancers in reserve, the
    // attacker side deals nothing at all during the ranged exchange
    let ranged_record = events
        .iter()
        .find_map(|e| match e {
            CombatEvent::PhaseCompleted { record, .. } if record.phase.index() == 0 => {
                Some(record)
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(ranged_record.attacker_damage, 0.0);
    assert!(ranged_record.defender_damage > 0.0);

    let report = events
        .iter()
        .find_map(|e| match e {
            CombatEvent::CombatEnded { report, .. } => Some(report),
            _ => None,
        })
        .unwrap();
    // The battle reaches cleanup (archers have no melee line), so the
    // lancers do strike eventually
    assert!(report.attacker_armies[0].damage_dealt > 0.0);
}

#[test]
fn test_entrenchment_blunts_the_assault() {
    let attack = |entrench: bool| -> u32 {
        let (mut world, red, blue) = two_sided_world();
        let attacker = world.add_army(
            red,
            HexCoord::new(1, 0),
            comp(&[(UnitType::Swordsman, 20)]),
            0.0,
        );
        let defender = world.add_army(
            blue,
            HexCoord::new(0, 0),
            comp(&[(UnitType::Spearman, 20)]),
            0.0,
        );
        if entrench {
            world.entrench(defender, 0.0, Vec::new());
        }
        let mut engine = new_engine();
        engine.start_combat(&world, attacker, defender, 0.0).unwrap();
        let events = run(&mut engine, &mut world, 20_000);
        let report = events
            .iter()
            .find_map(|e| match e {
                CombatEvent::CombatEnded { report, .. } => Some(report),
                _ => None,
            })
            .unwrap();
        report
            .defender_armies
            .iter()
            .map(|a| a.casualties.total())
            .sum()
    };

    let open_field = attack(false);
    let dug_in = attack(true);
    assert!(
        dug_in <= open_field,
        "entrenched defenders lost more ({}) than unentrenched ({})",
        dug_in,
        open_field
    );
}

#[test]
fn test_reinforcement_swings_the_battle() {
    let (mut world, red, blue) = two_sided_world();
    let attacker = world.add_army(
        red,
        HexCoord::new(1, 0),
        comp(&[(UnitType::Swordsman, 10)]),
        0.0,
    );
    let defender = world.add_army(
        blue,
        HexCoord::new(0, 0),
        comp(&[(UnitType::Swordsman, 10)]),
        0.0,
    );
    let relief = world.add_army(blue, HexCoord::new(0, 1), comp(&[(UnitType::Lancer, 6)]), 0.0);

    let mut engine = new_engine();
    let combat_id = engine.start_combat(&world, attacker, defender, 0.0).unwrap();

    // Fight for a while, then the relief column arrives on the defender side
    for tick in 1..=40 {
        let events = engine.update(tick as f64 * 0.1, &world);
        world.apply_events(&events);
    }
    engine
        .add_reinforcement(&world, combat_id, relief, 4.0)
        .unwrap();

    let mut all = Vec::new();
    let mut tick = 40u32;
    while !engine.is_idle() && tick < 20_000 {
        tick += 1;
        let events = engine.update(tick as f64 * 0.1, &world);
        world.apply_events(&events);
        all.extend(events);
    }

    assert!(all
        .iter()
        .any(|e| matches!(e, CombatEvent::ReinforcementJoined { army, .. } if *army == relief)));

    let (winner, report) = all
        .iter()
        .find_map(|e| match e {
            CombatEvent::CombatEnded { winner, report, .. } => Some((winner, report)),
            _ => None,
        })
        .unwrap();

    // Mirror-matched infantry plus a fresh cavalry charge: defenders hold
    assert_eq!(*winner, CombatWinner::Defender);
    assert_eq!(report.defender_armies.len(), 2);
    // Conservation across the merged side, reinforcement included
    for army in &report.defender_armies {
        for ty in UnitType::ALL {
            assert_eq!(
                army.initial.get(ty),
                army.survivors.get(ty) + army.casualties.get(ty)
            );
        }
    }
}

#[test]
fn test_draw_when_both_sides_annihilate() {
    // Perfectly mirrored armies grind each other to zero simultaneously
    let (mut world, red, blue) = two_sided_world();
    let attacker = world.add_army(
        red,
        HexCoord::new(1, 0),
        comp(&[(UnitType::Swordsman, 10)]),
        0.0,
    );
    let defender = world.add_army(
        blue,
        HexCoord::new(0, 0),
        comp(&[(UnitType::Swordsman, 10)]),
        0.0,
    );

    let mut engine = new_engine();
    engine.start_combat(&world, attacker, defender, 0.0).unwrap();
    let events = run(&mut engine, &mut world, 40_000);

    let winner = events
        .iter()
        .find_map(|e| match e {
            CombatEvent::CombatEnded { winner, .. } => Some(*winner),
            _ => None,
        })
        .unwrap();
    assert_eq!(winner, CombatWinner::Draw);

    let destroyed: Vec<ArmyId> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::ArmyDestroyed { army, .. } => Some(*army),
            _ => None,
        })
        .collect();
    assert!(destroyed.contains(&attacker));
    assert!(destroyed.contains(&defender));
    assert!(world.army(attacker).is_none());
    assert!(world.army(defender).is_none());
}
