#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behavior system: patrol, chase, and attack.
//!
//! The system keeps one agent per live enemy and reacts to world events
//! only; it never mutates state directly. Each tick an agent validates its
//! target, eases through the patrol/chase state machine, and answers with
//! movement and strike commands for the world to execute.
//!
//! All wandering comes from a per-agent linear congruential generator
//! seeded from the system seed and the enemy identifier, so replays with
//! the same seed reproduce the same patrol routes.

use std::time::Duration;

use crowd_rush_core::{
    Command, EnemyId, EnemySnapshot, EnemyView, Event, LaneBounds, LanePoint, UnitId, UnitView,
};

/// Distance at which a patrol waypoint counts as reached.
const WAYPOINT_TOLERANCE: f32 = 0.1;

const LCG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const LCG_INCREMENT: u64 = 1;

/// Behavior mode of a single agent.
#[derive(Clone, Copy, Debug, PartialEq)]
enum AiMode {
    /// Wandering laterally between seeded waypoints.
    Patrol {
        /// Lateral coordinate the agent is walking toward.
        waypoint_x: f32,
    },
    /// Closing on a crowd unit to bring it into strike range.
    Chase,
}

#[derive(Clone, Copy, Debug)]
struct AiAgent {
    enemy: EnemyId,
    mode: AiMode,
    target: Option<UnitId>,
    attack_timer: Duration,
    rng_state: u64,
}

impl AiAgent {
    fn new(enemy: EnemyId, seed: u64) -> Self {
        let spread = (u64::from(enemy.get()) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            enemy,
            mode: AiMode::Patrol { waypoint_x: 0.0 },
            target: None,
            attack_timer: Duration::ZERO,
            rng_state: seed ^ spread,
        }
    }

    fn next_waypoint(&mut self, lane: LaneBounds) -> f32 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        let unit = ((self.rng_state >> 33) as f32) / ((1u64 << 31) as f32);
        lane.left() + unit * lane.width()
    }
}

/// Patrol/chase/attack controller for every enemy in the simulation.
#[derive(Clone, Debug)]
pub struct EnemyAi {
    lane: LaneBounds,
    agents: Vec<AiAgent>,
    seed: u64,
}

impl EnemyAi {
    /// Creates the system with the lane the enemies wander inside.
    #[must_use]
    pub fn new(lane: LaneBounds, seed: u64) -> Self {
        Self {
            lane,
            agents: Vec::new(),
            seed,
        }
    }

    /// Consumes world events and emits movement and strike commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        units: &UnitView,
        out_commands: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::EnemySpawned { enemy, .. } => self.insert(*enemy),
                Event::EnemyDied { enemy } | Event::EnemyRemoved { enemy } => self.remove(*enemy),
                Event::LeaderChanged { .. } => {
                    // Targets anchored on the old leader are stale.
                    for agent in &mut self.agents {
                        agent.target = None;
                    }
                }
                Event::TimeAdvanced { dt } => self.step(*dt, enemies, units, out_commands),
                _ => {}
            }
        }
    }

    fn insert(&mut self, enemy: EnemyId) {
        if let Err(index) = self.agents.binary_search_by_key(&enemy, |agent| agent.enemy) {
            self.agents.insert(index, AiAgent::new(enemy, self.seed));
        }
    }

    fn remove(&mut self, enemy: EnemyId) {
        self.agents.retain(|agent| agent.enemy != enemy);
    }

    fn step(
        &mut self,
        dt: Duration,
        enemies: &EnemyView,
        units: &UnitView,
        out_commands: &mut Vec<Command>,
    ) {
        let lane = self.lane;
        for agent in &mut self.agents {
            let Some(snapshot) = enemies
                .iter()
                .find(|enemy| enemy.id == agent.enemy && enemy.alive)
            else {
                continue;
            };
            validate_target(agent, units);
            if agent.target.is_none() {
                agent.target = acquire_target(snapshot.position, units);
            }
            drive_agent(agent, snapshot, dt, lane, units, out_commands);
        }
    }
}

/// Drops a target that died or left the roster since the last tick.
fn validate_target(agent: &mut AiAgent, units: &UnitView) {
    if let Some(target) = agent.target {
        let valid = units
            .iter()
            .any(|unit| unit.id == target && !unit.dying);
        if !valid {
            agent.target = None;
        }
    }
}

/// Picks the crowd leader when it exists, otherwise the nearest live unit.
/// Ties break toward the lowest identifier because the view is id-sorted.
fn acquire_target(from: LanePoint, units: &UnitView) -> Option<UnitId> {
    if let Some(leader) = units.iter().find(|unit| unit.leader && !unit.dying) {
        return Some(leader.id);
    }

    let mut best: Option<(UnitId, f32)> = None;
    for unit in units.iter().filter(|unit| !unit.dying) {
        let distance = from.distance_to(unit.position);
        if best.map_or(true, |(_, nearest)| distance < nearest) {
            best = Some((unit.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

fn drive_agent(
    agent: &mut AiAgent,
    snapshot: &EnemySnapshot,
    dt: Duration,
    lane: LaneBounds,
    units: &UnitView,
    out_commands: &mut Vec<Command>,
) {
    let profile = snapshot.variant.profile();
    let seconds = dt.as_secs_f32();

    let target_position = agent.target.and_then(|target| {
        units
            .iter()
            .find(|unit| unit.id == target)
            .map(|unit| unit.position)
    });

    match target_position {
        Some(target) => {
            let distance = snapshot.position.distance_to(target);
            if distance < profile.chase_range {
                agent.mode = AiMode::Chase;
            }

            if agent.mode == AiMode::Chase {
                let dx = target.x() - snapshot.position.x();
                let dz = target.z() - snapshot.position.z();
                if distance > profile.stop_distance() {
                    let step = (profile.chase_speed * seconds).min(distance);
                    let scale = step / distance.max(f32::EPSILON);
                    let to = snapshot.position.offset_by(dx * scale, dz * scale);
                    out_commands.push(Command::MoveEnemy {
                        enemy: agent.enemy,
                        to,
                        heading: dx.atan2(dz),
                    });
                } else {
                    // Hold position but keep tracking the target's bearing.
                    out_commands.push(Command::MoveEnemy {
                        enemy: agent.enemy,
                        to: snapshot.position,
                        heading: dx.atan2(dz),
                    });
                }

                agent.attack_timer = agent.attack_timer.saturating_add(dt);
                if distance <= profile.attack_range && agent.attack_timer >= profile.attack_interval
                {
                    agent.attack_timer = Duration::ZERO;
                    out_commands.push(Command::EnemyStrike { enemy: agent.enemy });
                }
                return;
            }

            patrol(agent, snapshot, seconds, lane, out_commands);
        }
        None => {
            agent.mode = AiMode::Patrol {
                waypoint_x: match agent.mode {
                    AiMode::Patrol { waypoint_x } => waypoint_x,
                    AiMode::Chase => snapshot.position.x(),
                },
            };
            patrol(agent, snapshot, seconds, lane, out_commands);
        }
    }
}

/// Walks the agent laterally toward its waypoint, rolling a fresh one on
/// arrival.
fn patrol(
    agent: &mut AiAgent,
    snapshot: &EnemySnapshot,
    seconds: f32,
    lane: LaneBounds,
    out_commands: &mut Vec<Command>,
) {
    let profile = snapshot.variant.profile();
    let AiMode::Patrol { waypoint_x } = agent.mode else {
        return;
    };

    let mut waypoint = waypoint_x;
    if (snapshot.position.x() - waypoint).abs() <= WAYPOINT_TOLERANCE {
        waypoint = agent.next_waypoint(lane);
        agent.mode = AiMode::Patrol {
            waypoint_x: waypoint,
        };
    }

    let dx = waypoint - snapshot.position.x();
    let step = (profile.patrol_speed * seconds).min(dx.abs());
    if step <= 0.0 {
        return;
    }
    let to = snapshot.position.offset_by(dx.signum() * step, 0.0);
    out_commands.push(Command::MoveEnemy {
        enemy: agent.enemy,
        to,
        heading: dx.signum().atan2(0.0),
    });
}

#[cfg(test)]
mod tests {
    use super::EnemyAi;
    use crowd_rush_core::{
        Command, EnemyId, EnemySnapshot, EnemyVariant, EnemyView, Event, LaneBounds, LanePoint,
        UnitId, UnitSnapshot, UnitView,
    };
    use std::time::Duration;

    fn lane() -> LaneBounds {
        LaneBounds::symmetric(13.0)
    }

    fn enemy_at(id: u32, position: LanePoint) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            variant: EnemyVariant::Normal,
            position,
            heading: std::f32::consts::PI,
            health: 100.0,
            max_health: 100.0,
            alive: true,
            flashing: false,
        }
    }

    fn unit_at(id: u32, position: LanePoint, leader: bool) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            position,
            leader,
            dying: false,
            flash_remaining: Duration::ZERO,
        }
    }

    fn tick_events() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }]
    }

    #[test]
    fn spawned_enemies_patrol_inside_the_lane() {
        let mut ai = EnemyAi::new(lane(), 7);
        let enemy = enemy_at(0, LanePoint::new(0.0, 40.0));
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let units = UnitView::default();

        let mut commands = Vec::new();
        ai.handle(
            &[Event::EnemySpawned {
                enemy: enemy.id,
                variant: enemy.variant,
                position: enemy.position,
            }],
            &enemies,
            &units,
            &mut commands,
        );
        ai.handle(&tick_events(), &enemies, &units, &mut commands);

        match commands.as_slice() {
            [Command::MoveEnemy { enemy: id, to, .. }] => {
                assert_eq!(*id, enemy.id);
                assert!(to.x() >= lane().left() && to.x() <= lane().right());
                assert_eq!(to.z(), 40.0, "patrol never leaves the spawn line");
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn patrol_routes_replay_identically_for_the_same_seed() {
        let enemy = enemy_at(0, LanePoint::new(0.0, 40.0));
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let units = UnitView::default();
        let spawn = Event::EnemySpawned {
            enemy: enemy.id,
            variant: enemy.variant,
            position: enemy.position,
        };

        let run = |seed: u64| {
            let mut ai = EnemyAi::new(lane(), seed);
            let mut commands = Vec::new();
            ai.handle(&[spawn], &enemies, &units, &mut commands);
            for _ in 0..5 {
                ai.handle(&tick_events(), &enemies, &units, &mut commands);
            }
            commands
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn enemies_chase_the_leader_and_strike_in_range() {
        let mut ai = EnemyAi::new(lane(), 7);
        let mut enemy = enemy_at(0, LanePoint::new(0.0, 10.0));
        let units = UnitView::from_snapshots(vec![unit_at(0, LanePoint::new(0.0, 7.0), true)]);

        let mut commands = Vec::new();
        ai.handle(
            &[Event::EnemySpawned {
                enemy: enemy.id,
                variant: enemy.variant,
                position: enemy.position,
            }],
            &EnemyView::from_snapshots(vec![enemy]),
            &units,
            &mut commands,
        );

        // The target sits inside the chase range, so the agent closes to
        // its stop distance and strikes once the cooldown elapses.
        let mut struck = false;
        for _ in 0..20 {
            commands.clear();
            ai.handle(
                &tick_events(),
                &EnemyView::from_snapshots(vec![enemy]),
                &units,
                &mut commands,
            );
            for command in &commands {
                match command {
                    Command::MoveEnemy { to, .. } => {
                        enemy = EnemySnapshot { position: *to, ..enemy };
                    }
                    Command::EnemyStrike { enemy: id } => {
                        assert_eq!(*id, enemy.id);
                        struck = true;
                    }
                    other => panic!("unexpected command: {other:?}"),
                }
            }
            if struck {
                break;
            }
        }
        assert!(struck, "strike lands within the cooldown window");

        let profile = enemy.variant.profile();
        let distance = enemy.position.distance_to(LanePoint::new(0.0, 7.0));
        assert!(distance >= profile.stop_distance() - 0.05);
        assert!(distance <= profile.attack_range);
    }

    #[test]
    fn holding_agents_keep_facing_their_target() {
        let mut ai = EnemyAi::new(lane(), 7);
        let enemy = enemy_at(0, LanePoint::new(0.0, 10.0));
        let enemies = EnemyView::from_snapshots(vec![enemy]);

        let mut commands = Vec::new();
        ai.handle(
            &[Event::EnemySpawned {
                enemy: enemy.id,
                variant: enemy.variant,
                position: enemy.position,
            }],
            &enemies,
            &UnitView::from_snapshots(vec![unit_at(0, LanePoint::new(0.5, 9.5), true)]),
            &mut commands,
        );

        // The leader is already inside the stop distance: the agent stands
        // its ground and keeps its heading locked on the leader.
        commands.clear();
        ai.handle(
            &tick_events(),
            &enemies,
            &UnitView::from_snapshots(vec![unit_at(0, LanePoint::new(0.5, 9.5), true)]),
            &mut commands,
        );
        let heading_right = match commands.as_slice() {
            [Command::MoveEnemy { to, heading, .. }] => {
                assert_eq!(*to, enemy.position, "holding agents do not drift");
                *heading
            }
            other => panic!("unexpected commands: {other:?}"),
        };
        assert!((heading_right - 0.5f32.atan2(-0.5)).abs() < 1e-6);

        // The leader sidesteps; the heading follows without any movement.
        commands.clear();
        ai.handle(
            &tick_events(),
            &enemies,
            &UnitView::from_snapshots(vec![unit_at(0, LanePoint::new(-0.5, 9.5), true)]),
            &mut commands,
        );
        match commands.as_slice() {
            [Command::MoveEnemy { to, heading, .. }] => {
                assert_eq!(*to, enemy.position);
                assert!((heading - (-0.5f32).atan2(-0.5)).abs() < 1e-6);
                assert_ne!(*heading, heading_right);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn dead_targets_are_dropped_and_replaced() {
        let mut ai = EnemyAi::new(lane(), 7);
        let enemy = enemy_at(0, LanePoint::new(0.0, 10.0));
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let leader = unit_at(0, LanePoint::new(0.0, 8.0), true);
        let follower = unit_at(1, LanePoint::new(1.0, 8.0), false);

        let mut commands = Vec::new();
        ai.handle(
            &[Event::EnemySpawned {
                enemy: enemy.id,
                variant: enemy.variant,
                position: enemy.position,
            }],
            &enemies,
            &UnitView::from_snapshots(vec![leader, follower]),
            &mut commands,
        );
        ai.handle(
            &tick_events(),
            &enemies,
            &UnitView::from_snapshots(vec![leader, follower]),
            &mut commands,
        );

        // The leader starts dying; the agent re-acquires the follower and
        // keeps closing rather than stalling on the corpse.
        let dying_leader = UnitSnapshot {
            dying: true,
            ..leader
        };
        commands.clear();
        ai.handle(
            &tick_events(),
            &enemies,
            &UnitView::from_snapshots(vec![dying_leader, follower]),
            &mut commands,
        );
        match commands.first() {
            Some(Command::MoveEnemy { to, .. }) => {
                assert!(to.x() > 0.0, "moves toward the surviving follower");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn dead_enemies_stop_acting() {
        let mut ai = EnemyAi::new(lane(), 7);
        let enemy = enemy_at(0, LanePoint::new(0.0, 10.0));
        let enemies = EnemyView::from_snapshots(vec![enemy]);
        let units = UnitView::default();

        let mut commands = Vec::new();
        ai.handle(
            &[
                Event::EnemySpawned {
                    enemy: enemy.id,
                    variant: enemy.variant,
                    position: enemy.position,
                },
                Event::EnemyDied { enemy: enemy.id },
            ],
            &enemies,
            &units,
            &mut commands,
        );
        ai.handle(&tick_events(), &enemies, &units, &mut commands);
        assert!(commands.is_empty());
    }
}
