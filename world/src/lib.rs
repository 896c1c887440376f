#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Geometry Defense.

use std::time::Duration;

use geometry_defense_core::{
    Command, ConfigError, DefenseId, DefenseKind, EconomyError, Event, HostileId, Lane,
    PlacementError, SessionStats, SimConfig, SimState, SpawnSchedule, WaveError, WELCOME_BANNER,
};
use glam::Vec2;

mod ledger;
mod motion;
mod store;
mod wave;

use ledger::Ledger;
use motion::{Resolution, TickScope};
use store::EntityStore;
use wave::WaveState;

/// Represents the authoritative Geometry Defense world state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    config: SimConfig,
    lane: Lane,
    store: EntityStore,
    ledger: Ledger,
    waves: WaveState,
    stats: SessionStats,
    state: SimState,
}

impl World {
    /// Creates a new world ready for placement, validating the configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let lane = config.build_lane()?;
        Ok(Self {
            banner: WELCOME_BANNER,
            ledger: Ledger::new(config.starting_currency, config.starting_lives),
            store: EntityStore::new(),
            waves: WaveState::default(),
            stats: SessionStats::default(),
            state: SimState::Idle,
            lane,
            config,
        })
    }

    fn placement_check(&self, kind: DefenseKind, position: Vec2) -> Result<(), PlacementError> {
        if self.state == SimState::GameOver {
            return Err(PlacementError::GameOver);
        }
        if !self.config.field.contains(position) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.lane.corridor_contains(position) {
            return Err(PlacementError::OnLane);
        }
        let spacing = self.config.defense_spacing;
        if self
            .store
            .defenses()
            .any(|defense| defense.position.distance(position) < spacing)
        {
            return Err(PlacementError::Occupied);
        }
        let cost = kind.cost();
        if !self.ledger.can_afford(cost) {
            return Err(PlacementError::InsufficientFunds {
                cost,
                available: self.ledger.currency(),
            });
        }
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceDefense { kind, position } => {
            let _ = place_defense(world, kind, position, out_events);
        }
        Command::StartWave { schedule } => {
            let _ = start_wave(world, schedule, out_events);
        }
        Command::FireProjectile {
            defense,
            target,
            aim,
            at,
        } => fire_projectile(world, defense, target, aim, at, out_events),
        Command::Advance { now } => advance(world, now, out_events),
        Command::SettleWave => settle_wave(world, out_events),
        Command::Restart => restart(world, out_events),
    }
}

/// Places a defense, charging its cost.
///
/// Validation happens before any mutation; a rejection leaves the world
/// untouched and is also broadcast as [`Event::PlacementRejected`].
pub fn place_defense(
    world: &mut World,
    kind: DefenseKind,
    position: Vec2,
    out_events: &mut Vec<Event>,
) -> Result<DefenseId, PlacementError> {
    let outcome = world.placement_check(kind, position).and_then(|()| {
        world
            .ledger
            .spend(kind.cost())
            .map_err(|EconomyError::InsufficientFunds { cost, available }| {
                PlacementError::InsufficientFunds { cost, available }
            })
    });

    match outcome {
        Ok(()) => {
            let defense = world.store.insert_defense(kind, position);
            tracing::debug!(
                defense = defense.get(),
                ?kind,
                x = position.x,
                y = position.y,
                "defense placed"
            );
            out_events.push(Event::DefensePlaced {
                defense,
                kind,
                position,
                cost: kind.cost(),
            });
            Ok(defense)
        }
        Err(reason) => {
            tracing::debug!(?kind, %reason, "placement rejected");
            out_events.push(Event::PlacementRejected {
                kind,
                position,
                reason,
            });
            Err(reason)
        }
    }
}

/// Activates the provided schedule as the next wave.
///
/// Rejected while a wave is still in progress, after the game ended, or when
/// an order could never advance along the lane.
pub fn start_wave(
    world: &mut World,
    schedule: SpawnSchedule,
    out_events: &mut Vec<Event>,
) -> Result<u32, WaveError> {
    let rejection = match (world.state, world.waves.active()) {
        (SimState::GameOver, _) => Some(WaveError::GameOver),
        (SimState::WaveInProgress, Some(wave)) => Some(WaveError::AlreadyInProgress { wave }),
        _ => schedule
            .orders()
            .iter()
            .position(|order| !(order.speed.is_finite() && order.speed > 0.0))
            .map(|index| WaveError::InvalidSpeed { index }),
    };

    if let Some(reason) = rejection {
        tracing::debug!(%reason, "wave start rejected");
        out_events.push(Event::WaveRejected { reason });
        return Err(reason);
    }

    let wave = schedule.wave();
    let hostiles = schedule.len();
    world.waves.begin(schedule);
    world.state = SimState::WaveInProgress;
    tracing::info!(wave, hostiles, "wave started");
    out_events.push(Event::WaveStarted { wave, hostiles });
    Ok(wave)
}

/// Launches a projectile from a ready defense.
///
/// Requests from unknown or cooling-down defenses, or against absent targets,
/// are ignored.
pub fn fire_projectile(
    world: &mut World,
    defense: DefenseId,
    target: HostileId,
    aim: Vec2,
    at: Duration,
    out_events: &mut Vec<Event>,
) {
    if world.state == SimState::GameOver || world.store.is_hostile_removed(target) {
        return;
    }

    let Some(shooter) = world.store.defense(defense).cloned() else {
        return;
    };
    if !shooter.snapshot().is_ready(at) {
        tracing::trace!(defense = defense.get(), "fire request before cooldown elapsed");
        return;
    }
    if let Some(stored) = world.store.defense_mut(defense) {
        stored.last_shot = Some(at);
    }

    let projectile = world.store.insert_projectile(&shooter, target, aim);
    world.stats.shots_fired = world.stats.shots_fired.saturating_add(1);
    tracing::trace!(
        projectile = projectile.get(),
        defense = defense.get(),
        target = target.get(),
        "projectile fired"
    );
    out_events.push(Event::ProjectileFired {
        projectile,
        defense,
        target,
    });
}

/// Runs the motion and collision phases of one tick.
///
/// Does nothing once the game is over.
pub fn advance(world: &mut World, now: Duration, out_events: &mut Vec<Event>) {
    if world.state == SimState::GameOver {
        return;
    }

    let resolution = motion::resolve(
        TickScope {
            store: &mut world.store,
            ledger: &mut world.ledger,
            waves: &mut world.waves,
            stats: &mut world.stats,
            lane: &world.lane,
            config: &world.config,
        },
        out_events,
    );

    if resolution == Resolution::LivesExhausted {
        let wave = world.waves.active();
        world.state = SimState::GameOver;
        tracing::info!(?wave, ?now, score = world.stats.score, "game over");
        out_events.push(Event::GameOver { wave });
    }
}

/// Credits the wave-clear bonus and returns to idle once the active wave is
/// complete.
pub fn settle_wave(world: &mut World, out_events: &mut Vec<Event>) {
    if world.state != SimState::WaveInProgress || !world.waves.is_complete(&world.store) {
        return;
    }

    let Some(wave) = world.waves.finish() else {
        return;
    };
    let bonus = wave.saturating_mul(world.config.wave_clear_bonus);
    world.ledger.credit(bonus);
    world.state = SimState::Idle;
    tracing::info!(wave, bonus, currency = world.ledger.currency(), "wave cleared");
    out_events.push(Event::WaveCleared { wave, bonus });
}

/// Clears every entity and restores the configured economy.
pub fn restart(world: &mut World, out_events: &mut Vec<Event>) {
    world.store.clear();
    world.waves.reset();
    world.ledger = Ledger::new(world.config.starting_currency, world.config.starting_lives);
    world.stats = SessionStats::default();
    world.state = SimState::Idle;
    tracing::info!("session restarted");
    out_events.push(Event::Restarted);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use geometry_defense_core::{
        DefenseKind, DefenseView, HostileView, Lane, PlacementError, ProjectileSnapshot,
        SessionStats, SimConfig, SimSnapshot, SimState,
    };
    use glam::Vec2;

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimConfig {
        &world.config
    }

    /// Lane followed by every hostile.
    #[must_use]
    pub fn lane(world: &World) -> &Lane {
        &world.lane
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(world: &World) -> SimState {
        world.state
    }

    /// Currency held.
    #[must_use]
    pub fn currency(world: &World) -> u32 {
        world.ledger.currency()
    }

    /// Lives left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.ledger.lives()
    }

    /// Reports whether the archetype's cost is covered.
    #[must_use]
    pub fn can_afford(world: &World, kind: DefenseKind) -> bool {
        world.ledger.can_afford(kind.cost())
    }

    /// Number of waves cleared since the last restart.
    #[must_use]
    pub fn wave_index(world: &World) -> u32 {
        world.waves.wave_index()
    }

    /// Number of the wave a start request would launch.
    #[must_use]
    pub fn next_wave(world: &World) -> u32 {
        world.waves.wave_index().saturating_add(1)
    }

    /// Number of the wave in progress, if any.
    #[must_use]
    pub fn active_wave(world: &World) -> Option<u32> {
        world.waves.active()
    }

    /// Reports whether the spawn queue is drained and no hostile remains.
    #[must_use]
    pub fn is_wave_complete(world: &World) -> bool {
        world.waves.is_complete(&world.store)
    }

    /// Reports whether a placement would currently succeed.
    pub fn preview_placement(
        world: &World,
        kind: DefenseKind,
        position: Vec2,
    ) -> Result<(), PlacementError> {
        world.placement_check(kind, position)
    }

    /// Captures a read-only view of the placed defenses.
    #[must_use]
    pub fn defense_view(world: &World) -> DefenseView {
        DefenseView::from_snapshots(
            world
                .store
                .defenses()
                .map(|defense| defense.snapshot())
                .collect(),
        )
    }

    /// Captures a read-only view of the hostiles on the lane.
    #[must_use]
    pub fn hostile_view(world: &World) -> HostileView {
        let length = world.lane.length();
        HostileView::from_snapshots(
            world
                .store
                .hostiles()
                .map(|hostile| hostile.snapshot(length))
                .collect(),
        )
    }

    /// Captures the projectiles in flight in identifier order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .store
            .projectiles()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Running totals for the session.
    #[must_use]
    pub fn stats(world: &World) -> SessionStats {
        world.stats
    }

    /// Captures everything a renderer needs for one frame.
    #[must_use]
    pub fn snapshot(world: &World) -> SimSnapshot {
        SimSnapshot {
            state: world.state,
            currency: world.ledger.currency(),
            lives: world.ledger.lives(),
            wave_index: world.waves.wave_index(),
            active_wave: world.waves.active(),
            queued_spawns: world.waves.queued(),
            defenses: defense_view(world).into_vec(),
            hostiles: hostile_view(world).into_vec(),
            projectiles: projectiles(world),
            stats: world.stats,
        }
    }
}
