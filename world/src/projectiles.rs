//! In-flight projectile tracking and collision resolution.
//!
//! Projectiles travel straight down the lane at a fixed speed and are
//! consumed by the first thing they hit: an armed gate line crossed during
//! the tick, or a live enemy within the hit radius. Whatever survives a
//! full lifetime without hitting anything evaporates.

use std::time::Duration;

use crowd_rush_core::{Event, LanePoint, ProjectileId, UnitId};

use crate::enemies::EnemyRegistry;
use crate::gates::{GateRegistry, HitOutcome};
use crate::Config;

#[derive(Clone, Copy, Debug)]
struct Projectile {
    #[allow(dead_code)]
    id: ProjectileId,
    position: LanePoint,
    remaining: Duration,
}

/// Board of projectiles in flight, advanced once per tick.
#[derive(Clone, Debug, Default)]
pub(crate) struct ProjectileBoard {
    entries: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileBoard {
    /// Launches a projectile from the unit's muzzle, reporting the shot.
    pub(crate) fn fire(
        &mut self,
        unit: UnitId,
        muzzle: LanePoint,
        config: &Config,
        out_events: &mut Vec<Event>,
    ) {
        let id = ProjectileId::new(self.next_id);
        self.next_id += 1;
        self.entries.push(Projectile {
            id,
            position: muzzle,
            remaining: config.projectile_lifetime,
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            unit,
        });
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.entries.len()
    }

    /// Moves every projectile forward and resolves first-hit collisions in
    /// identifier order.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        config: &Config,
        gates: &mut GateRegistry,
        enemies: &mut EnemyRegistry,
        out_events: &mut Vec<Event>,
    ) {
        let step = config.projectile_speed * dt.as_secs_f32();
        let mut survivors = Vec::with_capacity(self.entries.len());

        for mut projectile in self.entries.drain(..) {
            let previous_z = projectile.position.z();
            projectile.position = projectile.position.offset_by(0.0, step);
            projectile.remaining = projectile.remaining.saturating_sub(dt);

            if Self::resolve_gate_hit(projectile.position, previous_z, gates, out_events) {
                continue;
            }
            if Self::resolve_enemy_hit(projectile.position, config, enemies, out_events) {
                continue;
            }
            if projectile.remaining.is_zero() {
                continue;
            }
            survivors.push(projectile);
        }

        self.entries = survivors;
    }

    /// Consumes the projectile against the first armed gate whose line it
    /// crossed this tick.
    fn resolve_gate_hit(
        position: LanePoint,
        previous_z: f32,
        gates: &mut GateRegistry,
        out_events: &mut Vec<Event>,
    ) -> bool {
        for gate in gates.armed() {
            let crossed = previous_z < gate.line_z && gate.line_z <= position.z();
            if crossed && gate.span.contains(position.x()) {
                match gates.on_projectile_hit(gate.id, out_events) {
                    HitOutcome::Mutated | HitOutcome::Absorbed => return true,
                    HitOutcome::Ignored => {}
                }
            }
        }
        false
    }

    /// Consumes the projectile against the nearest live enemy inside the
    /// hit radius.
    fn resolve_enemy_hit(
        position: LanePoint,
        config: &Config,
        enemies: &mut EnemyRegistry,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let mut best: Option<(crowd_rush_core::EnemyId, f32)> = None;
        for (enemy, point) in enemies.alive_positions() {
            let distance = position.distance_to(point);
            if distance <= config.projectile_hit_radius
                && best.map_or(true, |(_, nearest)| distance < nearest)
            {
                best = Some((enemy, distance));
            }
        }

        match best {
            Some((enemy, _)) => {
                enemies.take_damage(enemy, config.projectile_damage, config, out_events)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectileBoard;
    use crate::enemies::EnemyRegistry;
    use crate::gates::GateRegistry;
    use crate::Config;
    use crowd_rush_core::{
        Event, GateOperator, GateSpan, GateSpec, LanePoint, PairId, UnitId, WaveId,
    };
    use std::time::Duration;

    fn tick() -> Duration {
        Duration::from_millis(100)
    }

    fn advance_until_clear(
        board: &mut ProjectileBoard,
        config: &Config,
        gates: &mut GateRegistry,
        enemies: &mut EnemyRegistry,
        out_events: &mut Vec<Event>,
    ) {
        for _ in 0..64 {
            if board.in_flight() == 0 {
                return;
            }
            board.advance(tick(), config, gates, enemies, out_events);
        }
        panic!("projectiles never cleared");
    }

    #[test]
    fn projectiles_expire_after_their_lifetime() {
        let config = Config::default();
        let mut board = ProjectileBoard::default();
        let mut gates = GateRegistry::default();
        let mut enemies = EnemyRegistry::default();
        let mut events = Vec::new();

        board.fire(UnitId::new(0), LanePoint::new(0.0, 0.0), &config, &mut events);
        assert_eq!(board.in_flight(), 1);

        let ticks = (config.projectile_lifetime.as_secs_f32() / tick().as_secs_f32()).ceil() as u32;
        for _ in 0..ticks {
            board.advance(tick(), &config, &mut gates, &mut enemies, &mut events);
        }
        assert_eq!(board.in_flight(), 0);
    }

    #[test]
    fn gate_crossing_consumes_the_projectile_and_mutates() {
        let config = Config::default();
        let mut board = ProjectileBoard::default();
        let mut gates = GateRegistry::default();
        let mut enemies = EnemyRegistry::default();
        let mut events = Vec::new();

        gates.spawn_pair(
            PairId::new(0),
            0.5,
            GateSpec {
                operator: GateOperator::Add,
                magnitude: 2,
                span: GateSpan::new(-12.0, -1.0),
            },
            GateSpec {
                operator: GateOperator::Subtract,
                magnitude: 3,
                span: GateSpan::new(1.0, 12.0),
            },
            &mut events,
        );

        events.clear();
        board.fire(UnitId::new(0), LanePoint::new(-6.0, 0.0), &config, &mut events);
        board.advance(tick(), &config, &mut gates, &mut enemies, &mut events);

        assert_eq!(board.in_flight(), 0);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::GateMutated {
                operator: GateOperator::Add,
                magnitude: 3,
                ..
            },
        )));
    }

    #[test]
    fn enemy_inside_hit_radius_takes_projectile_damage() {
        let config = Config::default();
        let mut board = ProjectileBoard::default();
        let mut gates = GateRegistry::default();
        let mut enemies = EnemyRegistry::default();
        let mut events = Vec::new();

        enemies.spawn_wave(WaveId::new(0), 0.6, 1, &config, &mut events);
        events.clear();

        board.fire(UnitId::new(0), LanePoint::new(0.0, 0.0), &config, &mut events);
        advance_until_clear(&mut board, &config, &mut gates, &mut enemies, &mut events);

        assert!(events.iter().any(|event| matches!(
            event,
            Event::EnemyDamaged { .. },
        )));
    }

    #[test]
    fn projectiles_pass_over_disabled_gates() {
        let config = Config::default();
        let mut board = ProjectileBoard::default();
        let mut gates = GateRegistry::default();
        let mut enemies = EnemyRegistry::default();
        let mut events = Vec::new();

        gates.spawn_pair(
            PairId::new(0),
            0.5,
            GateSpec {
                operator: GateOperator::Add,
                magnitude: 2,
                span: GateSpan::new(-12.0, -1.0),
            },
            GateSpec {
                operator: GateOperator::Multiply,
                magnitude: 2,
                span: GateSpan::new(1.0, 12.0),
            },
            &mut events,
        );
        // Trigger the right gate so the left one goes inert.
        let right = gates.snapshots()[1].id;
        let _ = gates.try_trigger(right, &mut events);

        events.clear();
        board.fire(UnitId::new(0), LanePoint::new(-6.0, 0.0), &config, &mut events);
        board.advance(tick(), &config, &mut gates, &mut enemies, &mut events);

        // No mutation, and the projectile keeps flying.
        assert!(events
            .iter()
            .all(|event| !matches!(event, Event::GateMutated { .. })));
        assert_eq!(board.in_flight(), 1);
    }
}
