use std::time::Duration;

use geometry_defense_core::{DefenseKind, Event, PlacementError, SimConfig, SimState};
use geometry_defense_simulation::Simulation;
use glam::Vec2;

const FRAME: Duration = Duration::from_millis(16);

fn frame(index: u64) -> Duration {
    FRAME * u32::try_from(index).expect("frame index fits in u32")
}

#[test]
fn heavy_defense_consumes_most_of_the_starting_purse() {
    let mut sim = Simulation::new(SimConfig::default()).expect("valid configuration");

    assert!(sim
        .place_defense(DefenseKind::Heavy, Vec2::new(120.0, 160.0))
        .is_ok());
    assert_eq!(sim.snapshot().currency, 30);

    assert_eq!(
        sim.place_defense(DefenseKind::Heavy, Vec2::new(400.0, 220.0)),
        Err(PlacementError::InsufficientFunds {
            cost: 120,
            available: 30,
        })
    );
    assert_eq!(sim.snapshot().currency, 30);
    assert_eq!(sim.snapshot().defenses.len(), 1);
}

#[test]
fn defenses_placed_mid_wave_join_the_fight() {
    let mut sim = Simulation::new(SimConfig::default()).expect("valid configuration");
    assert_eq!(sim.start_wave(), Ok(1));
    for index in 0..5 {
        let _ = sim.tick(frame(index));
    }
    assert_eq!(sim.state(), SimState::WaveInProgress);

    let defense = sim
        .place_defense(DefenseKind::Rapid, Vec2::new(120.0, 160.0))
        .expect("placement is allowed while a wave runs");
    assert_eq!(sim.state(), SimState::WaveInProgress);
    assert_eq!(sim.snapshot().currency, 100);

    let fired = (5..2_000).any(|index| {
        sim.tick(frame(index)).iter().any(|event| {
            matches!(event, Event::ProjectileFired { defense: shooter, .. } if *shooter == defense)
        })
    });
    assert!(fired, "defense placed mid-wave never fired");
}

#[test]
fn cleared_first_wave_pays_its_bonus() {
    let config = SimConfig {
        starting_currency: 2_000,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(config).expect("valid configuration");

    for row in [30.0, 130.0] {
        for column in [20.0, 60.0, 100.0, 140.0, 180.0, 220.0] {
            let _ = sim
                .place_defense(DefenseKind::Heavy, Vec2::new(column, row))
                .expect("battery placement");
        }
    }
    let purse = sim.snapshot().currency;
    assert_eq!(purse, 2_000 - 12 * 120);

    assert_eq!(sim.start_wave(), Ok(1));
    assert_eq!(sim.snapshot().queued_spawns, 11);

    // Each frame is long enough for every heavy to recharge.
    let interval = DefenseKind::Heavy.stats().fire_interval;
    let mut cleared = None;
    for index in 0..5_000u32 {
        let events = sim.tick(interval * index);
        if let Some(bonus) = events.iter().find_map(|event| match event {
            Event::WaveCleared { bonus, .. } => Some(*bonus),
            _ => None,
        }) {
            cleared = Some(bonus);
            break;
        }
    }

    assert_eq!(cleared, Some(20));
    let snapshot = sim.snapshot();
    assert!(sim.is_wave_complete());
    assert_eq!(snapshot.stats.leaks, 0);
    assert_eq!(snapshot.stats.kills, 11);
    assert_eq!(snapshot.lives, 20);
    assert_eq!(snapshot.wave_index, 1);
    assert_eq!(snapshot.state, SimState::Idle);
    let rewards = u32::try_from(snapshot.stats.score).expect("score fits in u32");
    assert_eq!(snapshot.currency, purse + rewards + 20);
}

#[test]
fn final_leak_ends_the_session() {
    let config = SimConfig {
        starting_lives: 1,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(config).expect("valid configuration");
    assert_eq!(sim.start_wave(), Ok(1));

    let mut ended_at = None;
    for index in 0..10_000 {
        let events = sim.tick(frame(index));
        if events
            .iter()
            .any(|event| matches!(event, Event::GameOver { .. }))
        {
            assert!(events.iter().any(|event| matches!(
                event,
                Event::HostileLeaked {
                    lives_remaining: 0,
                    ..
                }
            )));
            ended_at = Some(index);
            break;
        }
    }

    let ended_at = ended_at.expect("an unopposed hostile eventually leaks");
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.state, SimState::GameOver);
    assert_eq!(snapshot.lives, 0);
    assert_eq!(snapshot.stats.leaks, 1);

    for index in ended_at + 1..ended_at + 50 {
        assert!(sim.tick(frame(index)).is_empty());
        assert_eq!(sim.snapshot(), snapshot);
    }
}

#[test]
fn game_over_rejects_transactions_until_restart() {
    let config = SimConfig {
        starting_lives: 1,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(config).expect("valid configuration");
    let _ = sim.start_wave();
    let mut index = 0;
    while sim.state() != SimState::GameOver {
        let _ = sim.tick(frame(index));
        index += 1;
        assert!(index < 10_000, "session never ended");
    }

    assert_eq!(
        sim.place_defense(DefenseKind::Rapid, Vec2::new(120.0, 160.0)),
        Err(PlacementError::GameOver)
    );
    assert!(sim.start_wave().is_err());

    sim.restart();
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.state, SimState::Idle);
    assert_eq!(snapshot.lives, 1);
    assert_eq!(snapshot.currency, 150);
    assert_eq!(snapshot.wave_index, 0);
    assert!(snapshot.hostiles.is_empty());
    assert_eq!(sim.start_wave(), Ok(1));
}
