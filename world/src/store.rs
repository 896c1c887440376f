//! Stable-identifier storage for every simulated entity.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use geometry_defense_core::{
    DefenseId, DefenseKind, DefenseSnapshot, HostileId, HostileKind, HostileSnapshot,
    ProjectileId, ProjectileSnapshot, SpawnOrder,
};
use glam::Vec2;

/// Placed defense.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Defense {
    pub(crate) id: DefenseId,
    pub(crate) kind: DefenseKind,
    pub(crate) position: Vec2,
    pub(crate) damage: u32,
    pub(crate) range: f32,
    pub(crate) fire_interval: Duration,
    pub(crate) projectile_speed: f32,
    pub(crate) last_shot: Option<Duration>,
}

impl Defense {
    pub(crate) fn snapshot(&self) -> DefenseSnapshot {
        DefenseSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            damage: self.damage,
            range: self.range,
            fire_interval: self.fire_interval,
            last_shot: self.last_shot,
        }
    }
}

/// Hostile travelling along the lane.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Hostile {
    pub(crate) id: HostileId,
    pub(crate) kind: HostileKind,
    pub(crate) progress: f32,
    pub(crate) position: Vec2,
    pub(crate) hp: u32,
    pub(crate) max_hp: u32,
    pub(crate) speed: f32,
    pub(crate) reward: u32,
}

impl Hostile {
    pub(crate) fn snapshot(&self, lane_length: f32) -> HostileSnapshot {
        HostileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            progress: self.progress,
            remaining: (lane_length - self.progress).max(0.0),
            hp: self.hp,
            max_hp: self.max_hp,
            speed: self.speed,
            reward: self.reward,
        }
    }
}

/// Projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec2,
    pub(crate) target: HostileId,
    pub(crate) target_position: Vec2,
    pub(crate) damage: u32,
    pub(crate) speed: f32,
    pub(crate) source: DefenseKind,
}

impl Projectile {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            target_position: self.target_position,
            damage: self.damage,
            source: self.source,
        }
    }
}

/// Owns the three entity collections and the tick-scoped removal set.
///
/// Removals are deferred: `remove_*` only records the identifier, and the
/// entity stays visible to lookups until [`EntityStore::flush_removals`] runs at
/// the end of the tick. Phases that must treat a doomed entity as gone consult
/// [`EntityStore::is_hostile_removed`].
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct EntityStore {
    defenses: BTreeMap<DefenseId, Defense>,
    hostiles: BTreeMap<HostileId, Hostile>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_defense: u32,
    next_hostile: u32,
    next_projectile: u32,
    pending_hostiles: BTreeSet<HostileId>,
    pending_projectiles: BTreeSet<ProjectileId>,
}

impl EntityStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_defense(&mut self, kind: DefenseKind, position: Vec2) -> DefenseId {
        let id = DefenseId::new(self.next_defense);
        self.next_defense = self.next_defense.wrapping_add(1);
        let stats = kind.stats();
        let _ = self.defenses.insert(
            id,
            Defense {
                id,
                kind,
                position,
                damage: stats.damage,
                range: stats.range,
                fire_interval: stats.fire_interval,
                projectile_speed: stats.projectile_speed,
                last_shot: None,
            },
        );
        id
    }

    pub(crate) fn insert_hostile(&mut self, order: &SpawnOrder, position: Vec2) -> HostileId {
        let id = HostileId::new(self.next_hostile);
        self.next_hostile = self.next_hostile.wrapping_add(1);
        let _ = self.hostiles.insert(
            id,
            Hostile {
                id,
                kind: order.kind,
                progress: 0.0,
                position,
                hp: order.max_hp,
                max_hp: order.max_hp,
                speed: order.speed,
                reward: order.reward,
            },
        );
        id
    }

    pub(crate) fn insert_projectile(
        &mut self,
        defense: &Defense,
        target: HostileId,
        aim: Vec2,
    ) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        let _ = self.projectiles.insert(
            id,
            Projectile {
                id,
                position: defense.position,
                target,
                target_position: aim,
                damage: defense.damage,
                speed: defense.projectile_speed,
                source: defense.kind,
            },
        );
        id
    }

    pub(crate) fn defense(&self, id: DefenseId) -> Option<&Defense> {
        self.defenses.get(&id)
    }

    pub(crate) fn defense_mut(&mut self, id: DefenseId) -> Option<&mut Defense> {
        self.defenses.get_mut(&id)
    }

    pub(crate) fn hostile(&self, id: HostileId) -> Option<&Hostile> {
        self.hostiles.get(&id)
    }

    pub(crate) fn hostile_mut(&mut self, id: HostileId) -> Option<&mut Hostile> {
        self.hostiles.get_mut(&id)
    }

    pub(crate) fn defenses(&self) -> impl Iterator<Item = &Defense> {
        self.defenses.values()
    }

    pub(crate) fn hostiles(&self) -> impl Iterator<Item = &Hostile> {
        self.hostiles.values()
    }

    pub(crate) fn hostiles_mut(&mut self) -> impl Iterator<Item = &mut Hostile> {
        self.hostiles.values_mut()
    }

    pub(crate) fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub(crate) fn projectiles_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.projectiles.values_mut()
    }

    pub(crate) fn hostile_count(&self) -> usize {
        self.hostiles.len()
    }

    /// Schedules a hostile for removal at the end of the tick.
    ///
    /// Returns `true` only for the first request against a live hostile, so
    /// callers can attach one-time effects such as rewards to the result.
    pub(crate) fn remove_hostile(&mut self, id: HostileId) -> bool {
        if !self.hostiles.contains_key(&id) {
            return false;
        }
        self.pending_hostiles.insert(id)
    }

    /// Schedules a projectile for removal at the end of the tick.
    pub(crate) fn remove_projectile(&mut self, id: ProjectileId) {
        if self.projectiles.contains_key(&id) {
            let _ = self.pending_projectiles.insert(id);
        }
    }

    /// Reports whether the hostile is absent or already scheduled for removal.
    pub(crate) fn is_hostile_removed(&self, id: HostileId) -> bool {
        !self.hostiles.contains_key(&id) || self.pending_hostiles.contains(&id)
    }

    /// Applies every pending removal.
    pub(crate) fn flush_removals(&mut self) {
        for id in std::mem::take(&mut self.pending_hostiles) {
            let _ = self.hostiles.remove(&id);
        }
        for id in std::mem::take(&mut self.pending_projectiles) {
            let _ = self.projectiles.remove(&id);
        }
    }

    /// Drops every entity and restarts identifier allocation.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }
}
