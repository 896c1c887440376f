//! Motion and collision resolution for a single tick.
//!
//! The phases run in a fixed order: release and advance hostiles, resolve
//! leaks, advance projectiles, resolve hits, resolve kills, flush removals.
//! Every collection is walked in identifier order so two runs fed the same
//! inputs produce the same results.

use geometry_defense_core::{Event, HostileId, Lane, ProjectileId, SessionStats, SimConfig};
use glam::Vec2;

use crate::{ledger::Ledger, store::EntityStore, wave::WaveState};

/// Outcome of one resolver pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Lives remain; the session continues.
    Continue,
    /// A leak consumed the last life during this pass.
    LivesExhausted,
}

/// Mutable state borrowed by the resolver for the duration of one tick.
pub(crate) struct TickScope<'a> {
    pub(crate) store: &'a mut EntityStore,
    pub(crate) ledger: &'a mut Ledger,
    pub(crate) waves: &'a mut WaveState,
    pub(crate) stats: &'a mut SessionStats,
    pub(crate) lane: &'a Lane,
    pub(crate) config: &'a SimConfig,
}

/// Runs every motion and collision phase of one tick.
pub(crate) fn resolve(scope: TickScope<'_>, out_events: &mut Vec<Event>) -> Resolution {
    let TickScope {
        store,
        ledger,
        waves,
        stats,
        lane,
        config,
    } = scope;

    if let Some((hostile, kind)) = waves.release_next(store, lane, config.spawn_gap) {
        out_events.push(Event::HostileSpawned { hostile, kind });
    }

    advance_hostiles(store, lane, config.tick_length);

    if resolve_leaks(store, ledger, stats, lane, out_events) == Resolution::LivesExhausted {
        store.flush_removals();
        return Resolution::LivesExhausted;
    }

    advance_projectiles(store, config.tick_length);
    resolve_hits(store, stats, config.hit_radius, out_events);
    resolve_kills(store, ledger, stats, out_events);
    store.flush_removals();

    Resolution::Continue
}

fn advance_hostiles(store: &mut EntityStore, lane: &Lane, tick_length: f32) {
    for hostile in store.hostiles_mut() {
        hostile.progress += hostile.speed * tick_length;
        hostile.position = lane.position_at(hostile.progress);
    }
}

fn resolve_leaks(
    store: &mut EntityStore,
    ledger: &mut Ledger,
    stats: &mut SessionStats,
    lane: &Lane,
    out_events: &mut Vec<Event>,
) -> Resolution {
    let leaked: Vec<HostileId> = store
        .hostiles()
        .filter(|hostile| hostile.progress > lane.length())
        .map(|hostile| hostile.id)
        .collect();

    let mut resolution = Resolution::Continue;
    for hostile in leaked {
        if !store.remove_hostile(hostile) {
            continue;
        }

        let lives_remaining = ledger.lose_life();
        stats.leaks = stats.leaks.saturating_add(1);
        tracing::debug!(hostile = hostile.get(), lives_remaining, "hostile leaked");
        out_events.push(Event::HostileLeaked {
            hostile,
            lives_remaining,
        });

        if lives_remaining == 0 {
            resolution = Resolution::LivesExhausted;
        }
    }
    resolution
}

fn advance_projectiles(store: &mut EntityStore, tick_length: f32) {
    let homing: Vec<Option<Vec2>> = store
        .projectiles()
        .map(|projectile| {
            if store.is_hostile_removed(projectile.target) {
                return None;
            }
            store
                .hostile(projectile.target)
                .map(|hostile| hostile.position)
        })
        .collect();

    for (projectile, target) in store.projectiles_mut().zip(homing) {
        if let Some(position) = target {
            projectile.target_position = position;
        }

        let step = projectile.speed * tick_length;
        let offset = projectile.target_position - projectile.position;
        let distance = offset.length();
        if distance <= step {
            projectile.position = projectile.target_position;
        } else {
            projectile.position += offset / distance * step;
        }
    }
}

fn resolve_hits(
    store: &mut EntityStore,
    stats: &mut SessionStats,
    hit_radius: f32,
    out_events: &mut Vec<Event>,
) {
    let arrived: Vec<(ProjectileId, HostileId, u32)> = store
        .projectiles()
        .filter(|projectile| {
            projectile.position.distance(projectile.target_position) <= hit_radius
        })
        .map(|projectile| (projectile.id, projectile.target, projectile.damage))
        .collect();

    for (projectile, target, damage) in arrived {
        store.remove_projectile(projectile);

        let live = !store.is_hostile_removed(target);
        let struck = match store.hostile_mut(target) {
            Some(hostile) if live && hostile.hp > 0 => {
                let applied = damage.min(hostile.hp);
                hostile.hp -= applied;
                Some((applied, hostile.hp))
            }
            _ => None,
        };

        match struck {
            Some((applied, remaining_hp)) => {
                stats.hits = stats.hits.saturating_add(1);
                out_events.push(Event::HostileDamaged {
                    hostile: target,
                    damage: applied,
                    remaining_hp,
                });
            }
            None => {
                stats.misses = stats.misses.saturating_add(1);
                tracing::trace!(
                    projectile = projectile.get(),
                    target = target.get(),
                    "projectile missed"
                );
                out_events.push(Event::ProjectileMissed { projectile, target });
            }
        }
    }
}

fn resolve_kills(
    store: &mut EntityStore,
    ledger: &mut Ledger,
    stats: &mut SessionStats,
    out_events: &mut Vec<Event>,
) {
    let dead: Vec<(HostileId, u32)> = store
        .hostiles()
        .filter(|hostile| hostile.hp == 0)
        .map(|hostile| (hostile.id, hostile.reward))
        .collect();

    for (hostile, reward) in dead {
        if !store.remove_hostile(hostile) {
            continue;
        }

        ledger.credit(reward);
        stats.kills = stats.kills.saturating_add(1);
        stats.score = stats.score.saturating_add(u64::from(reward));
        out_events.push(Event::HostileKilled { hostile, reward });
        out_events.push(Event::ScoreAwarded {
            hostile,
            delta: reward,
        });
    }
}
