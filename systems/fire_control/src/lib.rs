#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects targets for ready defenses and requests shots.

use std::time::Duration;

use geometry_defense_core::{Command, DefenseId, DefenseView, HostileId, HostileView, SimState};
use glam::Vec2;

/// Fire control system that reuses scratch buffers to avoid repeated allocations.
#[derive(Clone, Debug, Default)]
pub struct FireControl {
    shooter_workspace: Vec<Shooter>,
    hostile_workspace: Vec<HostileCandidate>,
}

impl FireControl {
    /// Creates a new fire control system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one [`Command::FireProjectile`] per ready defense that has a
    /// hostile in range.
    ///
    /// Among hostiles within range the one closest to the exit wins; ties go
    /// to the earliest-spawned hostile. Nothing is emitted outside of
    /// [`SimState::WaveInProgress`].
    pub fn handle(
        &mut self,
        state: SimState,
        now: Duration,
        defenses: &DefenseView,
        hostiles: &HostileView,
        out: &mut Vec<Command>,
    ) {
        if state != SimState::WaveInProgress {
            return;
        }

        if defenses.is_empty() || hostiles.is_empty() {
            return;
        }

        self.prepare_shooter_workspace(defenses, now);
        if self.shooter_workspace.is_empty() {
            return;
        }

        self.prepare_hostile_workspace(hostiles);
        if self.hostile_workspace.is_empty() {
            return;
        }

        for shooter in &self.shooter_workspace {
            let range_sq = shooter.range * shooter.range;
            let mut best: Option<&HostileCandidate> = None;

            for candidate in &self.hostile_workspace {
                if shooter.position.distance_squared(candidate.position) > range_sq {
                    continue;
                }

                match best {
                    Some(existing) if !candidate.precedes(existing) => {}
                    _ => best = Some(candidate),
                }
            }

            if let Some(target) = best {
                out.push(Command::FireProjectile {
                    defense: shooter.id,
                    target: target.id,
                    aim: target.position,
                    at: now,
                });
            }
        }
    }

    fn prepare_shooter_workspace(&mut self, defenses: &DefenseView, now: Duration) {
        self.shooter_workspace.clear();
        self.shooter_workspace.reserve(defenses.len());

        for snapshot in defenses.iter() {
            if !snapshot.is_ready(now) || snapshot.range <= 0.0 {
                continue;
            }

            self.shooter_workspace.push(Shooter {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.range,
            });
        }
    }

    fn prepare_hostile_workspace(&mut self, hostiles: &HostileView) {
        self.hostile_workspace.clear();
        self.hostile_workspace.reserve(hostiles.len());

        for snapshot in hostiles.iter() {
            if snapshot.hp == 0 {
                continue;
            }

            self.hostile_workspace.push(HostileCandidate {
                id: snapshot.id,
                position: snapshot.position,
                remaining: snapshot.remaining,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Shooter {
    id: DefenseId,
    position: Vec2,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct HostileCandidate {
    id: HostileId,
    position: Vec2,
    remaining: f32,
}

impl HostileCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.remaining != other.remaining {
            return self.remaining < other.remaining;
        }

        self.id < other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry_defense_core::{DefenseKind, DefenseSnapshot, HostileKind, HostileSnapshot};

    fn defense(id: u32, position: Vec2, last_shot: Option<Duration>) -> DefenseSnapshot {
        let stats = DefenseKind::Rapid.stats();
        DefenseSnapshot {
            id: DefenseId::new(id),
            kind: DefenseKind::Rapid,
            position,
            damage: stats.damage,
            range: stats.range,
            fire_interval: stats.fire_interval,
            last_shot,
        }
    }

    fn hostile(id: u32, position: Vec2, remaining: f32) -> HostileSnapshot {
        HostileSnapshot {
            id: HostileId::new(id),
            kind: HostileKind::Regular,
            position,
            progress: 500.0 - remaining,
            remaining,
            hp: 40,
            max_hp: 40,
            speed: 1.2,
            reward: 12,
        }
    }

    fn run(
        defenses: Vec<DefenseSnapshot>,
        hostiles: Vec<HostileSnapshot>,
        now: Duration,
    ) -> Vec<Command> {
        let mut system = FireControl::new();
        let mut out = Vec::new();
        system.handle(
            SimState::WaveInProgress,
            now,
            &DefenseView::from_snapshots(defenses),
            &HostileView::from_snapshots(hostiles),
            &mut out,
        );
        out
    }

    #[test]
    fn fires_at_hostile_in_range() {
        let out = run(
            vec![defense(0, Vec2::ZERO, None)],
            vec![hostile(3, Vec2::new(50.0, 0.0), 200.0)],
            Duration::from_millis(40),
        );

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                defense: DefenseId::new(0),
                target: HostileId::new(3),
                aim: Vec2::new(50.0, 0.0),
                at: Duration::from_millis(40),
            }]
        );
    }

    #[test]
    fn hostile_outside_range_is_ignored() {
        let out = run(
            vec![defense(0, Vec2::ZERO, None)],
            vec![hostile(3, Vec2::new(111.0, 0.0), 200.0)],
            Duration::ZERO,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn boundary_of_range_is_inclusive() {
        let out = run(
            vec![defense(0, Vec2::ZERO, None)],
            vec![hostile(3, Vec2::new(0.0, 110.0), 200.0)],
            Duration::ZERO,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn hostile_closest_to_exit_is_preferred() {
        let out = run(
            vec![defense(0, Vec2::ZERO, None)],
            vec![
                hostile(1, Vec2::new(10.0, 0.0), 300.0),
                hostile(2, Vec2::new(90.0, 0.0), 120.0),
            ],
            Duration::ZERO,
        );
        assert!(matches!(
            out.as_slice(),
            [Command::FireProjectile { target, .. }] if *target == HostileId::new(2)
        ));
    }

    #[test]
    fn earliest_spawn_wins_ties() {
        let out = run(
            vec![defense(0, Vec2::ZERO, None)],
            vec![
                hostile(9, Vec2::new(10.0, 0.0), 150.0),
                hostile(4, Vec2::new(20.0, 0.0), 150.0),
            ],
            Duration::ZERO,
        );
        assert!(matches!(
            out.as_slice(),
            [Command::FireProjectile { target, .. }] if *target == HostileId::new(4)
        ));
    }

    #[test]
    fn cooling_down_defense_stays_silent() {
        let out = run(
            vec![defense(0, Vec2::ZERO, Some(Duration::from_millis(100)))],
            vec![hostile(1, Vec2::new(10.0, 0.0), 150.0)],
            Duration::from_millis(399),
        );
        assert!(out.is_empty());

        let out = run(
            vec![defense(0, Vec2::ZERO, Some(Duration::from_millis(100)))],
            vec![hostile(1, Vec2::new(10.0, 0.0), 150.0)],
            Duration::from_millis(400),
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn idle_and_game_over_emit_nothing() {
        let defenses = DefenseView::from_snapshots(vec![defense(0, Vec2::ZERO, None)]);
        let hostiles = HostileView::from_snapshots(vec![hostile(1, Vec2::new(5.0, 0.0), 10.0)]);
        let mut system = FireControl::new();

        for state in [SimState::Idle, SimState::GameOver] {
            let mut out = Vec::new();
            system.handle(state, Duration::ZERO, &defenses, &hostiles, &mut out);
            assert!(out.is_empty(), "{state:?} must not fire");
        }
    }

    #[test]
    fn each_defense_picks_independently() {
        let out = run(
            vec![
                defense(0, Vec2::ZERO, None),
                defense(1, Vec2::new(400.0, 0.0), None),
            ],
            vec![
                hostile(1, Vec2::new(20.0, 0.0), 380.0),
                hostile(2, Vec2::new(390.0, 0.0), 10.0),
            ],
            Duration::ZERO,
        );
        let pairs: Vec<_> = out
            .iter()
            .filter_map(|command| match command {
                Command::FireProjectile {
                    defense, target, ..
                } => Some((defense.get(), target.get())),
                _ => None,
            })
            .collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
    }
}
