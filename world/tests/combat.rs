use std::time::Duration;

use geometry_defense_core::{
    Command, DefenseId, DefenseKind, Event, HostileId, HostileKind, SimConfig, SimState,
    SpawnOrder, SpawnSchedule,
};
use geometry_defense_world::{self as world, query, World};
use glam::Vec2;

fn crawling_wave(max_hp: u32, reward: u32) -> SpawnSchedule {
    SpawnSchedule::new(
        1,
        vec![SpawnOrder {
            kind: HostileKind::Regular,
            max_hp,
            speed: 0.01,
            reward,
        }],
    )
}

fn place(world: &mut World, kind: DefenseKind, position: Vec2) -> DefenseId {
    let mut events = Vec::new();
    world::place_defense(world, kind, position, &mut events).expect("placement succeeds")
}

fn fire(world: &mut World, defense: DefenseId, target: HostileId, at: Duration) {
    let aim = query::hostile_view(world)
        .iter()
        .find(|hostile| hostile.id == target)
        .map(|hostile| hostile.position)
        .expect("target on the lane");
    let mut events = Vec::new();
    world::apply(
        world,
        Command::FireProjectile {
            defense,
            target,
            aim,
            at,
        },
        &mut events,
    );
    assert!(
        matches!(events.as_slice(), [Event::ProjectileFired { .. }]),
        "fire request rejected: {events:?}"
    );
}

fn advance(world: &mut World, ticks: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        world::apply(
            world,
            Command::Advance {
                now: Duration::ZERO,
            },
            &mut events,
        );
    }
    events
}

#[test]
fn sniper_shots_whittle_a_hostile_down_and_credit_once() {
    let mut world = World::new(SimConfig::default()).expect("valid configuration");
    let first = place(&mut world, DefenseKind::Sniper, Vec2::new(0.0, 130.0));
    let second = place(&mut world, DefenseKind::Sniper, Vec2::new(0.0, 30.0));
    assert_eq!(query::currency(&world), 0);

    let mut events = Vec::new();
    let _ = world::start_wave(&mut world, crawling_wave(40, 12), &mut events)
        .expect("wave starts");
    let _ = advance(&mut world, 1);
    let target = HostileId::new(0);

    let interval = DefenseKind::Sniper.stats().fire_interval;
    let mut remaining = Vec::new();
    let mut log = Vec::new();

    fire(&mut world, first, target, Duration::ZERO);
    log.extend(advance(&mut world, 10));
    fire(&mut world, first, target, interval);
    log.extend(advance(&mut world, 10));
    fire(&mut world, first, target, interval * 2);
    fire(&mut world, second, target, interval * 2);
    log.extend(advance(&mut world, 10));

    for event in &log {
        if let Event::HostileDamaged { remaining_hp, .. } = event {
            remaining.push(*remaining_hp);
        }
    }
    assert_eq!(remaining, vec![22, 4, 0]);

    let kills = log
        .iter()
        .filter(|event| matches!(event, Event::HostileKilled { .. }))
        .count();
    let misses = log
        .iter()
        .filter(|event| matches!(event, Event::ProjectileMissed { .. }))
        .count();
    assert_eq!(kills, 1);
    assert_eq!(misses, 1);
    assert_eq!(query::currency(&world), 12);
    assert!(query::hostile_view(&world).is_empty());
    assert!(query::projectiles(&world).is_empty());

    let stats = query::stats(&world);
    assert_eq!(stats.shots_fired, 4);
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.kills, 1);
    assert_eq!(stats.score, 12);
}

#[test]
fn in_flight_projectiles_are_discarded_after_their_target_dies() {
    let mut world = World::new(SimConfig::default()).expect("valid configuration");
    let near = place(&mut world, DefenseKind::Rapid, Vec2::new(0.0, 110.0));
    let far = place(&mut world, DefenseKind::Rapid, Vec2::new(60.0, 150.0));

    let mut events = Vec::new();
    let _ = world::start_wave(&mut world, crawling_wave(6, 5), &mut events)
        .expect("wave starts");
    let _ = advance(&mut world, 1);
    let target = HostileId::new(0);

    fire(&mut world, near, target, Duration::ZERO);
    fire(&mut world, far, target, Duration::ZERO);
    let log = advance(&mut world, 20);

    assert_eq!(
        log.iter()
            .filter(|event| matches!(event, Event::HostileKilled { .. }))
            .count(),
        1
    );
    assert!(log
        .iter()
        .any(|event| matches!(event, Event::ProjectileMissed { .. })));
    assert!(query::projectiles(&world).is_empty());
    assert_eq!(query::currency(&world), 150 - 100 + 5);
}

#[test]
fn wave_settles_only_once_the_lane_is_empty() {
    let mut world = World::new(SimConfig::default()).expect("valid configuration");
    let sniper = place(&mut world, DefenseKind::Sniper, Vec2::new(0.0, 130.0));

    let mut events = Vec::new();
    let _ = world::start_wave(&mut world, crawling_wave(10, 3), &mut events)
        .expect("wave starts");
    let _ = advance(&mut world, 1);

    world::settle_wave(&mut world, &mut events);
    assert_eq!(query::state(&world), SimState::WaveInProgress);

    fire(&mut world, sniper, HostileId::new(0), Duration::ZERO);
    let _ = advance(&mut world, 10);
    assert!(query::is_wave_complete(&world));

    let mut events = Vec::new();
    world::apply(&mut world, Command::SettleWave, &mut events);
    assert_eq!(events, vec![Event::WaveCleared { wave: 1, bonus: 20 }]);
    assert_eq!(query::state(&world), SimState::Idle);
    assert_eq!(query::next_wave(&world), 2);
    assert_eq!(query::currency(&world), 150 - 75 + 3 + 20);
}
