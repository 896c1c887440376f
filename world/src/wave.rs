//! Wave progression and spawn queue draining.

use std::collections::VecDeque;

use geometry_defense_core::{HostileId, HostileKind, Lane, SpawnOrder, SpawnSchedule};

use crate::store::EntityStore;

/// Progress through the session's waves.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WaveState {
    cleared: u32,
    active: Option<u32>,
    queue: VecDeque<SpawnOrder>,
    last_released: Option<HostileId>,
}

impl WaveState {
    /// Number of waves cleared since the last restart.
    pub(crate) const fn wave_index(&self) -> u32 {
        self.cleared
    }

    pub(crate) const fn active(&self) -> Option<u32> {
        self.active
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn begin(&mut self, schedule: SpawnSchedule) {
        self.active = Some(schedule.wave());
        self.queue = schedule.into_orders().into();
        self.last_released = None;
    }

    /// A wave is complete once nothing is queued and the lane is empty.
    pub(crate) fn is_complete(&self, store: &EntityStore) -> bool {
        self.queue.is_empty() && store.hostile_count() == 0
    }

    /// Releases the next queued hostile once the previous entry has cleared
    /// `spawn_gap` of lane distance, or is already gone.
    pub(crate) fn release_next(
        &mut self,
        store: &mut EntityStore,
        lane: &Lane,
        spawn_gap: f32,
    ) -> Option<(HostileId, HostileKind)> {
        if self.queue.is_empty() {
            return None;
        }

        if let Some(previous) = self.last_released {
            if let Some(hostile) = store.hostile(previous) {
                if !store.is_hostile_removed(previous) && hostile.progress < spawn_gap {
                    return None;
                }
            }
        }

        let order = self.queue.pop_front()?;
        let id = store.insert_hostile(&order, lane.position_at(0.0));
        self.last_released = Some(id);
        Some((id, order.kind))
    }

    /// Closes the active wave and returns its number.
    pub(crate) fn finish(&mut self) -> Option<u32> {
        let wave = self.active.take()?;
        self.cleared = self.cleared.saturating_add(1);
        self.last_released = None;
        Some(wave)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
