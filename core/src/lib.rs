#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Geometry Defense engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands through its `apply` entry point, and then broadcasts [`Event`]
//! values describing what changed. Systems read immutable views such as
//! [`DefenseView`] and [`HostileView`] and respond exclusively with new
//! command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;
mod lane;

pub use config::{ConfigError, FieldConfig, LaneConfig, SimConfig};
pub use lane::Lane;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Geometry Defense.";

/// Lifecycle state of a play session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimState {
    /// No wave is active; defenses may be placed and a wave may be started.
    #[default]
    Idle,
    /// A wave is draining its spawn queue or still has hostiles on the lane.
    WaveInProgress,
    /// Lives ran out. Only a restart leaves this state.
    GameOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests construction of a defense at the provided position.
    PlaceDefense {
        /// Archetype to construct.
        kind: DefenseKind,
        /// Field position of the defense.
        position: Vec2,
    },
    /// Requests that the provided schedule becomes the active wave.
    StartWave {
        /// Spawn orders generated for the wave.
        schedule: SpawnSchedule,
    },
    /// Requests that a defense launches a projectile at a hostile.
    FireProjectile {
        /// Defense performing the shot.
        defense: DefenseId,
        /// Hostile being engaged.
        target: HostileId,
        /// Position of the hostile when the shot was aimed.
        aim: Vec2,
        /// Timestamp of the shot measured from session start.
        at: Duration,
    },
    /// Advances hostiles and projectiles by one fixed tick and resolves hits.
    Advance {
        /// Timestamp of the tick measured from session start.
        now: Duration,
    },
    /// Credits the wave-clear bonus if the active wave has completed.
    SettleWave,
    /// Clears every entity and resets the economy and wave progression.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a defense was constructed.
    DefensePlaced {
        /// Identifier assigned to the defense.
        defense: DefenseId,
        /// Archetype of the defense.
        kind: DefenseKind,
        /// Field position of the defense.
        position: Vec2,
        /// Currency deducted for the placement.
        cost: u32,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Archetype requested.
        kind: DefenseKind,
        /// Position requested.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that a wave became active.
    WaveStarted {
        /// Number of the wave, starting at one.
        wave: u32,
        /// Number of hostiles scheduled for the wave.
        hostiles: usize,
    },
    /// Reports that a wave could not be started.
    WaveRejected {
        /// Specific reason the start failed.
        reason: WaveError,
    },
    /// Confirms that a queued hostile entered the lane.
    HostileSpawned {
        /// Identifier assigned to the hostile.
        hostile: HostileId,
        /// Archetype of the hostile.
        kind: HostileKind,
    },
    /// Confirms that a defense fired.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Defense that fired.
        defense: DefenseId,
        /// Hostile engaged by the shot.
        target: HostileId,
    },
    /// Reports that a projectile struck a living hostile.
    HostileDamaged {
        /// Hostile that was struck.
        hostile: HostileId,
        /// Damage applied after flooring at zero hit points.
        damage: u32,
        /// Hit points left after the hit.
        remaining_hp: u32,
    },
    /// Reports that a projectile arrived after its target was gone.
    ProjectileMissed {
        /// Projectile that was discarded.
        projectile: ProjectileId,
        /// Hostile the projectile was chasing.
        target: HostileId,
    },
    /// Reports that a hostile was destroyed by defenses.
    HostileKilled {
        /// Hostile that was destroyed.
        hostile: HostileId,
        /// Currency credited for the kill.
        reward: u32,
    },
    /// Score delta destined for the external score aggregator.
    ScoreAwarded {
        /// Hostile whose destruction earned the score.
        hostile: HostileId,
        /// Score earned.
        delta: u32,
    },
    /// Reports that a hostile reached the end of the lane.
    HostileLeaked {
        /// Hostile that escaped.
        hostile: HostileId,
        /// Lives left after the penalty.
        lives_remaining: u32,
    },
    /// Announces that the active wave was cleared.
    WaveCleared {
        /// Number of the cleared wave.
        wave: u32,
        /// Currency credited as the wave-clear bonus.
        bonus: u32,
    },
    /// Announces that lives reached zero.
    GameOver {
        /// Number of the wave that was active when the session ended.
        wave: Option<u32>,
    },
    /// Confirms that the session was reset.
    Restarted,
}

/// Unique identifier assigned to a defense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenseId(u32);

impl DefenseId {
    /// Creates a new defense identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a hostile.
///
/// Identifiers are allocated in spawn order, so a smaller identifier always
/// belongs to an earlier-spawned hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostileId(u32);

impl HostileId {
    /// Creates a new hostile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Types of defenses that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefenseKind {
    /// Long range, slow firing, precise.
    Sniper,
    /// Short range, fast firing, light damage.
    Rapid,
    /// Medium range, very slow firing, heavy damage.
    Heavy,
}

impl DefenseKind {
    /// Every archetype in catalogue order.
    pub const ALL: [DefenseKind; 3] = [Self::Sniper, Self::Rapid, Self::Heavy];

    /// Combat and economy parameters of the archetype.
    #[must_use]
    pub const fn stats(self) -> DefenseStats {
        match self {
            Self::Sniper => DefenseStats {
                cost: 75,
                damage: 18,
                range: 180.0,
                fire_interval: Duration::from_millis(1200),
                projectile_speed: 14.0,
            },
            Self::Rapid => DefenseStats {
                cost: 50,
                damage: 6,
                range: 110.0,
                fire_interval: Duration::from_millis(300),
                projectile_speed: 10.0,
            },
            Self::Heavy => DefenseStats {
                cost: 120,
                damage: 45,
                range: 130.0,
                fire_interval: Duration::from_millis(2000),
                projectile_speed: 7.0,
            },
        }
    }

    /// Placement cost of the archetype.
    #[must_use]
    pub const fn cost(self) -> u32 {
        self.stats().cost
    }
}

/// Parameters shared by every defense of one archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefenseStats {
    /// Currency required to place the defense.
    pub cost: u32,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Targeting radius.
    pub range: f32,
    /// Minimum time between two shots.
    pub fire_interval: Duration,
    /// Distance travelled by a projectile per unit of tick length.
    pub projectile_speed: f32,
}

/// Types of hostiles produced by waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HostileKind {
    /// Balanced hit points and speed.
    Regular,
    /// Fragile but quick.
    Fast,
    /// Durable but slow.
    Tank,
}

/// Single entry of a wave's spawn schedule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnOrder {
    /// Archetype to spawn.
    pub kind: HostileKind,
    /// Hit points at spawn.
    pub max_hp: u32,
    /// Lane distance travelled per unit of tick length.
    ///
    /// Must be finite and positive; the world rejects schedules containing
    /// anything else, since a stalled entry would hold back the spawn queue.
    pub speed: f32,
    /// Currency credited when the hostile is killed.
    pub reward: u32,
}

/// Ordered hostiles generated for one wave.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnSchedule {
    wave: u32,
    orders: Vec<SpawnOrder>,
}

impl SpawnSchedule {
    /// Creates a schedule for the provided wave number.
    #[must_use]
    pub fn new(wave: u32, orders: Vec<SpawnOrder>) -> Self {
        Self { wave, orders }
    }

    /// Number of the wave, starting at one.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Spawn orders in release order.
    #[must_use]
    pub fn orders(&self) -> &[SpawnOrder] {
        &self.orders
    }

    /// Number of hostiles in the schedule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Reports whether the schedule is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Consumes the schedule, yielding its orders.
    #[must_use]
    pub fn into_orders(self) -> Vec<SpawnOrder> {
        self.orders
    }
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// Currency does not cover the archetype's cost.
    #[error("insufficient funds: placement costs {cost}, {available} available")]
    InsufficientFunds {
        /// Cost of the requested archetype.
        cost: u32,
        /// Currency held when the request was made.
        available: u32,
    },
    /// The position lies within the lane corridor.
    #[error("position lies on the lane")]
    OnLane,
    /// The position lies outside the playable field.
    #[error("position lies outside the field")]
    OutOfBounds,
    /// The position is too close to an existing defense.
    #[error("position overlaps an existing defense")]
    Occupied,
    /// The session ended; only a restart is accepted.
    #[error("the game is over")]
    GameOver,
}

/// Reasons a wave may not be started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveError {
    /// The previous wave has not completed yet.
    #[error("wave {wave} is still in progress")]
    AlreadyInProgress {
        /// Number of the active wave.
        wave: u32,
    },
    /// The session ended; only a restart is accepted.
    #[error("the game is over")]
    GameOver,
    /// A spawn order carries a speed that is not finite and positive.
    #[error("spawn order {index} has an invalid speed")]
    InvalidSpeed {
        /// Position of the offending order within the schedule.
        index: usize,
    },
}

/// Reasons an economy transaction may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum EconomyError {
    /// Currency does not cover the requested amount.
    #[error("insufficient funds: {cost} requested, {available} available")]
    InsufficientFunds {
        /// Amount requested.
        cost: u32,
        /// Currency held when the request was made.
        available: u32,
    },
}

/// Immutable representation of a single defense.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefenseSnapshot {
    /// Identifier allocated to the defense by the world.
    pub id: DefenseId,
    /// Archetype of the defense.
    pub kind: DefenseKind,
    /// Field position of the defense.
    pub position: Vec2,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Targeting radius.
    pub range: f32,
    /// Minimum time between two shots.
    pub fire_interval: Duration,
    /// Timestamp of the last shot, if the defense ever fired.
    pub last_shot: Option<Duration>,
}

impl DefenseSnapshot {
    /// Reports whether the defense may fire at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_shot {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.fire_interval && now >= last,
        }
    }
}

/// Read-only snapshot describing all defenses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DefenseView {
    snapshots: Vec<DefenseSnapshot>,
}

impl DefenseView {
    /// Creates a new defense view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenseSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenseSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured defenses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenseSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single hostile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileSnapshot {
    /// Identifier allocated to the hostile by the world.
    pub id: HostileId,
    /// Archetype of the hostile.
    pub kind: HostileKind,
    /// Field position derived from the lane progress.
    pub position: Vec2,
    /// Distance travelled along the lane.
    pub progress: f32,
    /// Lane distance left before the hostile leaks.
    pub remaining: f32,
    /// Current hit points.
    pub hp: u32,
    /// Hit points at spawn.
    pub max_hp: u32,
    /// Lane distance travelled per unit of tick length.
    pub speed: f32,
    /// Currency credited when the hostile is killed.
    pub reward: u32,
}

/// Read-only snapshot describing all hostiles on the lane.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HostileView {
    snapshots: Vec<HostileSnapshot>,
}

impl HostileView {
    /// Creates a new hostile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HostileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &HostileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured hostiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<HostileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Current field position.
    pub position: Vec2,
    /// Hostile being chased.
    pub target: HostileId,
    /// Last known position of the target.
    pub target_position: Vec2,
    /// Damage applied on hit.
    pub damage: u32,
    /// Archetype of the defense that fired, kept as a rendering hint.
    pub source: DefenseKind,
}

/// Running totals for the current session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionStats {
    /// Hostiles destroyed by defenses.
    pub kills: u32,
    /// Hostiles that reached the end of the lane.
    pub leaks: u32,
    /// Projectiles launched.
    pub shots_fired: u32,
    /// Projectiles that damaged a living hostile.
    pub hits: u32,
    /// Projectiles discarded because their target was gone.
    pub misses: u32,
    /// Accumulated score.
    pub score: u64,
}

/// Complete read-only picture of a session, consumed once per rendered frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Lifecycle state.
    pub state: SimState,
    /// Currency held.
    pub currency: u32,
    /// Lives left.
    pub lives: u32,
    /// Number of waves cleared since the last restart.
    pub wave_index: u32,
    /// Number of the wave in progress, if any.
    pub active_wave: Option<u32>,
    /// Spawn orders not yet released onto the lane.
    pub queued_spawns: usize,
    /// Placed defenses.
    pub defenses: Vec<DefenseSnapshot>,
    /// Hostiles on the lane.
    pub hostiles: Vec<HostileSnapshot>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Running totals.
    pub stats: SessionStats,
}
