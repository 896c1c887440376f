#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-driven facade that wires the world and the pure systems together.
//!
//! A [`Simulation`] owns every piece of session state. Each call to
//! [`Simulation::tick`] runs fire control, then the motion and collision
//! resolver, then the wave-completion check, and returns the events the tick
//! produced.

use std::time::Duration;

use geometry_defense_core::{
    Command, ConfigError, DefenseId, DefenseKind, Event, HostileId, PlacementError, SimConfig,
    SimSnapshot, SimState, WaveError,
};
use geometry_defense_system_fire_control::FireControl;
use geometry_defense_system_wave_director::WaveDirector;
use geometry_defense_world::{self as world, query, World};
use glam::Vec2;

/// Receives score deltas as kills are resolved.
pub trait ScoreSink {
    /// Called once per killed hostile with the score it awarded.
    fn record(&mut self, hostile: HostileId, delta: u32);
}

impl<F> ScoreSink for F
where
    F: FnMut(HostileId, u32),
{
    fn record(&mut self, hostile: HostileId, delta: u32) {
        self(hostile, delta);
    }
}

/// Complete Geometry Defense session.
#[derive(Clone, Debug)]
pub struct Simulation {
    world: World,
    fire_control: FireControl,
    director: WaveDirector,
    commands: Vec<Command>,
    pending: Vec<Event>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates an idle session from the provided configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let director = WaveDirector::new(config.seed);
        let world = World::new(config)?;
        Ok(Self {
            world,
            fire_control: FireControl::new(),
            director,
            commands: Vec::new(),
            pending: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Places a defense, charging its cost.
    ///
    /// The resulting event is delivered with the next tick.
    pub fn place_defense(
        &mut self,
        kind: DefenseKind,
        position: Vec2,
    ) -> Result<DefenseId, PlacementError> {
        world::place_defense(&mut self.world, kind, position, &mut self.pending)
    }

    /// Reports whether [`Simulation::place_defense`] would currently succeed.
    pub fn preview_placement(
        &self,
        kind: DefenseKind,
        position: Vec2,
    ) -> Result<(), PlacementError> {
        query::preview_placement(&self.world, kind, position)
    }

    /// Starts the next wave and returns its number.
    pub fn start_wave(&mut self) -> Result<u32, WaveError> {
        let schedule = self.director.start_wave(query::next_wave(&self.world));
        world::start_wave(&mut self.world, schedule, &mut self.pending)
    }

    /// Advances the session by one tick and returns the events it produced.
    ///
    /// Events raised by transactions since the previous tick lead the slice.
    /// Once the game is over a tick changes nothing.
    pub fn tick(&mut self, now: Duration) -> &[Event] {
        self.events.clear();
        self.events.append(&mut self.pending);

        let state = query::state(&self.world);
        if state == SimState::GameOver {
            return &self.events;
        }

        self.commands.clear();
        self.fire_control.handle(
            state,
            now,
            &query::defense_view(&self.world),
            &query::hostile_view(&self.world),
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        world::apply(&mut self.world, Command::Advance { now }, &mut self.events);
        world::apply(&mut self.world, Command::SettleWave, &mut self.events);

        if query::state(&self.world) == SimState::GameOver {
            tracing::debug!(?now, "tick ended the session");
        }

        &self.events
    }

    /// Ticks the session and forwards every score delta to `sink`.
    pub fn tick_reporting<S>(&mut self, now: Duration, sink: &mut S) -> &[Event]
    where
        S: ScoreSink + ?Sized,
    {
        let _ = self.tick(now);
        for event in &self.events {
            if let Event::ScoreAwarded { hostile, delta } = event {
                sink.record(*hostile, *delta);
            }
        }
        &self.events
    }

    /// Pure transition: returns the session one tick later alongside the
    /// events that tick produced, leaving `self` untouched.
    #[must_use]
    pub fn step(&self, now: Duration) -> (Self, Vec<Event>) {
        let mut next = self.clone();
        let events = next.tick(now).to_vec();
        (next, events)
    }

    /// Clears every entity and restores the configured economy.
    pub fn restart(&mut self) {
        self.commands.clear();
        world::restart(&mut self.world, &mut self.pending);
    }

    /// Captures everything a renderer needs for one frame.
    #[must_use]
    pub fn snapshot(&self) -> SimSnapshot {
        query::snapshot(&self.world)
    }

    /// Reports whether the spawn queue is drained and no hostile remains.
    #[must_use]
    pub fn is_wave_complete(&self) -> bool {
        query::is_wave_complete(&self.world)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SimState {
        query::state(&self.world)
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        query::config(&self.world)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}
