#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the Crowd Rush lane.
//!
//! The world owns the unit pool, gates, enemies, and projectiles. All
//! mutation flows through [`apply`], which executes one [`Command`] and
//! appends the resulting [`Event`]s for systems to react to. Reads go
//! through the [`query`] module, which hands out immutable snapshots.

use std::time::Duration;

use crowd_rush_core::{Command, EnemyId, Event, GateOperator, LaneBounds, LanePoint, UnitId};
use crowd_rush_formation::offset_for_rank;

mod cues;
mod enemies;
mod gates;
mod projectiles;
mod units;

use enemies::EnemyRegistry;
use gates::GateRegistry;
use projectiles::ProjectileBoard;
use units::UnitPool;

/// Tunable parameters of the simulation.
///
/// Every field has a sensible default; hosts override only what they need.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Total pool slots; the population can never exceed this.
    pub capacity: u32,
    /// Units activated when the world is created.
    pub starting_units: u32,
    /// World position the starting crowd forms around.
    pub spawn_point: LanePoint,
    /// Lateral walls every unit and enemy is clamped into.
    pub lane: LaneBounds,
    /// Leader forward speed in world units per second.
    pub leader_speed: f32,
    /// Exponential rate at which followers close on their formation slots.
    pub follow_rate: f32,
    /// Exponential rate at which the leader closes on its steer target.
    pub steer_rate: f32,
    /// Distance ahead of the leader within which enemies flip the crowd
    /// into combat.
    pub engage_radius: f32,
    /// Forward offset of the engagement probe from the leader.
    pub ahead_bias: f32,
    /// Length of the unit death playback before the slot is reclaimed.
    pub death_cue: Duration,
    /// Length of the spawn pop effect on freshly activated units.
    pub spawn_flash: Duration,
    /// Length of the damage flash on enemies that absorbed a hit.
    pub damage_flash: Duration,
    /// Time a dead enemy lingers before its state is dropped.
    pub corpse_linger: Duration,
    /// Length of the enemy strike flourish.
    pub strike_cue: Duration,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Health removed from an enemy per projectile hit.
    pub projectile_damage: f32,
    /// Time a projectile flies before evaporating.
    pub projectile_lifetime: Duration,
    /// Distance within which a projectile connects with an enemy.
    pub projectile_hit_radius: f32,
    /// Lateral spacing between enemies in a spawned wave row.
    pub enemy_spacing: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 100,
            starting_units: 1,
            spawn_point: LanePoint::new(0.0, 0.0),
            lane: LaneBounds::symmetric(13.0),
            leader_speed: 5.0,
            follow_rate: 10.0,
            steer_rate: 5.0,
            engage_radius: 7.0,
            ahead_bias: 0.5,
            death_cue: Duration::from_millis(1_000),
            spawn_flash: Duration::from_millis(200),
            damage_flash: Duration::from_millis(100),
            corpse_linger: Duration::from_millis(3_000),
            strike_cue: Duration::from_millis(500),
            projectile_speed: 10.0,
            projectile_damage: 10.0,
            projectile_lifetime: Duration::from_millis(1_000),
            projectile_hit_radius: 0.5,
            enemy_spacing: 2.0,
        }
    }
}

/// Authoritative state of the running simulation.
#[derive(Clone, Debug)]
pub struct World {
    config: Config,
    units: UnitPool,
    gates: GateRegistry,
    enemies: EnemyRegistry,
    projectiles: ProjectileBoard,
    engaged: bool,
    steer_target: Option<f32>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a world from the provided configuration and activates the
    /// starting crowd.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let mut units = UnitPool::new(config.capacity);
        units.seed(&config);
        Self {
            config,
            units,
            gates: GateRegistry::default(),
            enemies: EnemyRegistry::default(),
            projectiles: ProjectileBoard::default(),
            engaged: false,
            steer_target: None,
        }
    }

    /// Effective configuration of this world.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Executes a command against the world, appending resulting events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => tick(world, dt, out_events),
        Command::SteerLeader { x } => {
            world.steer_target = Some(world.config.lane.clamp_x(x));
        }
        Command::AddUnits { count } => {
            let config = world.config;
            world.units.grow(count, &config, out_events);
        }
        Command::RemoveUnits { count } => {
            let config = world.config;
            world.units.shrink(count, &config, out_events);
        }
        Command::MultiplyUnits { factor } => {
            if factor > 0 {
                multiply_units(world, factor, out_events);
            }
        }
        Command::DivideUnits { divisor } => {
            if divisor > 0 {
                divide_units(world, divisor, out_events);
            }
        }
        Command::FireProjectile { unit } => fire_projectile(world, unit, out_events),
        Command::SpawnGatePair {
            pair,
            line_z,
            left,
            right,
        } => world.gates.spawn_pair(pair, line_z, left, right, out_events),
        Command::SpawnEnemyWave {
            wave,
            line_z,
            count,
        } => {
            let config = world.config;
            world
                .enemies
                .spawn_wave(wave, line_z, count, &config, out_events);
        }
        Command::SpawnBoss { wave, line_z } => {
            world.enemies.spawn_boss(wave, line_z, out_events);
        }
        Command::MoveEnemy { enemy, to, heading } => {
            let clamped = LanePoint::new(world.config.lane.clamp_x(to.x()), to.z());
            world.enemies.set_position(enemy, clamped, heading);
        }
        Command::EnemyStrike { enemy } => enemy_strike(world, enemy, out_events),
    }
}

/// One fixed step of the simulation: timers, leader reconciliation and the
/// engagement scan, then movement, collisions, and gate arithmetic. The
/// scan runs before movement so that this tick's motion pause and this
/// tick's retarget commands read the fresh flag, not last tick's.
fn tick(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    out_events.push(Event::TimeAdvanced { dt });

    let config = world.config;
    world.units.advance(dt, out_events);
    world.units.ensure_leader(out_events);
    scan_engagement(world, out_events);
    world.units.stash_previous_positions();

    move_leader(world, dt);
    move_followers(world, dt);

    world.projectiles.advance(
        dt,
        &config,
        &mut world.gates,
        &mut world.enemies,
        out_events,
    );
    resolve_gate_crossings(world, out_events);

    world.enemies.advance(dt, out_events);
}

/// Advances the leader forward and eases it toward the steer target.
///
/// Forward motion pauses while the crowd is engaged; steering stays live so
/// the player can still reposition laterally mid-fight.
fn move_leader(world: &mut World, dt: Duration) {
    let Some(leader) = world.units.leader() else {
        return;
    };
    let Some(position) = world.units.position_of(leader) else {
        return;
    };

    let seconds = dt.as_secs_f32();
    let mut x = position.x();
    if let Some(target) = world.steer_target {
        let ease = (seconds * world.config.steer_rate).min(1.0);
        x += (target - x) * ease;
    }
    x = world.config.lane.clamp_x(x);

    let z = if world.engaged {
        position.z()
    } else {
        position.z() + world.config.leader_speed * seconds
    };

    world.units.set_position(leader, LanePoint::new(x, z));
}

/// Eases every follower toward its formation slot behind the leader.
fn move_followers(world: &mut World, dt: Duration) {
    let Some(leader) = world.units.leader() else {
        return;
    };
    let Some(anchor) = world.units.position_of(leader) else {
        return;
    };

    let ease = (dt.as_secs_f32() * world.config.follow_rate).min(1.0);
    let roster: Vec<UnitId> = world.units.roster().to_vec();
    for (rank, id) in roster.into_iter().enumerate() {
        if id == leader {
            continue;
        }
        let Some(current) = world.units.position_of(id) else {
            continue;
        };
        let offset = offset_for_rank(rank);
        let slot = LanePoint::new(
            world.config.lane.clamp_x(anchor.x() + offset.x),
            anchor.z() + offset.z,
        );
        let next = LanePoint::new(
            current.x() + (slot.x() - current.x()) * ease,
            current.z() + (slot.z() - current.z()) * ease,
        );
        world.units.set_position(id, next);
    }
}

/// Fires each armed gate whose trigger line a roster unit crossed this tick.
fn resolve_gate_crossings(world: &mut World, out_events: &mut Vec<Event>) {
    for gate in world.gates.armed() {
        let crossed = world.units.roster().iter().copied().any(|id| {
            let Some(position) = world.units.position_of(id) else {
                return false;
            };
            let previous = world.units.previous_z(id);
            previous < gate.line_z && gate.line_z <= position.z() && gate.span.contains(position.x())
        });
        if !crossed {
            continue;
        }

        let Some((pair, operator, magnitude)) = world.gates.try_trigger(gate.id, out_events)
        else {
            continue;
        };
        apply_gate_arithmetic(world, operator, magnitude, out_events);
        out_events.push(Event::GatePassed {
            pair,
            gate: gate.id,
            operator,
            magnitude,
            population: world.units.population(),
        });
    }
}

fn apply_gate_arithmetic(
    world: &mut World,
    operator: GateOperator,
    magnitude: u32,
    out_events: &mut Vec<Event>,
) {
    let config = world.config;
    match operator {
        GateOperator::Add => world.units.grow(magnitude, &config, out_events),
        GateOperator::Subtract => world.units.shrink(magnitude, &config, out_events),
        GateOperator::Multiply => multiply_units(world, magnitude.max(1), out_events),
        GateOperator::Divide => divide_units(world, magnitude.max(1), out_events),
    }
}

/// Grows the roster toward `population * factor`, capped at capacity.
fn multiply_units(world: &mut World, factor: u32, out_events: &mut Vec<Event>) {
    let config = world.config;
    let population = world.units.population();
    let target = population
        .saturating_mul(factor)
        .min(world.units.capacity());
    world
        .units
        .grow(target.saturating_sub(population), &config, out_events);
}

/// Shrinks the roster toward `population / divisor`, keeping one survivor.
fn divide_units(world: &mut World, divisor: u32, out_events: &mut Vec<Event>) {
    let config = world.config;
    let population = world.units.population();
    if population == 0 {
        return;
    }
    let target = (population / divisor).max(1);
    world
        .units
        .shrink(population.saturating_sub(target), &config, out_events);
}

/// Launches a projectile from a live unit; requests from dying or pooled
/// units are dropped because the muzzle no longer exists.
fn fire_projectile(world: &mut World, unit: UnitId, out_events: &mut Vec<Event>) {
    if !world.units.is_alive(unit) {
        return;
    }
    let Some(muzzle) = world.units.position_of(unit) else {
        return;
    };
    let config = world.config;
    world.projectiles.fire(unit, muzzle, &config, out_events);
}

/// Applies an enemy strike to the roster using the enemy's own profile.
fn enemy_strike(world: &mut World, enemy: EnemyId, out_events: &mut Vec<Event>) {
    if !world.enemies.is_alive(enemy) {
        return;
    }
    let Some(variant) = world.enemies.variant_of(enemy) else {
        return;
    };
    let config = world.config;
    let damage = variant.profile().damage_per_hit;
    world.enemies.mark_striking(enemy, &config);
    world.units.shrink(damage, &config, out_events);
    out_events.push(Event::EnemyStruck {
        enemy,
        damage,
        population: world.units.population(),
    });
}

/// Flips the engagement flag when a live enemy sits within the engage
/// radius of a probe point just ahead of the leader.
fn scan_engagement(world: &mut World, out_events: &mut Vec<Event>) {
    let engaged = match world.units.leader_position() {
        Some(leader) => {
            let probe = leader.offset_by(0.0, world.config.ahead_bias);
            world.enemies.alive_positions().into_iter().any(|(_, at)| {
                at.z() >= leader.z() && probe.distance_to(at) <= world.config.engage_radius
            })
        }
        None => false,
    };

    if engaged != world.engaged {
        world.engaged = engaged;
        out_events.push(Event::EngagementChanged { engaged });
    }
}

/// Read-only access to world state via immutable snapshots.
pub mod query {
    use crowd_rush_core::{
        EnemyView, GateView, LaneBounds, LanePoint, UnitId, UnitView, WELCOME_BANNER,
    };

    use super::World;

    /// Banner shown when the experience boots.
    #[must_use]
    pub fn welcome_banner() -> &'static str {
        WELCOME_BANNER
    }

    /// Current roster size.
    #[must_use]
    pub fn population(world: &World) -> u32 {
        world.units.population()
    }

    /// Total pool slots.
    #[must_use]
    pub fn capacity(world: &World) -> u32 {
        world.units.capacity()
    }

    /// Slots currently resting on the free list.
    #[must_use]
    pub fn pooled_count(world: &World) -> usize {
        world.units.pooled_count()
    }

    /// Current crowd leader, if the roster is non-empty.
    #[must_use]
    pub fn leader(world: &World) -> Option<UnitId> {
        world.units.leader()
    }

    /// World position of the crowd leader.
    #[must_use]
    pub fn leader_position(world: &World) -> Option<LanePoint> {
        world.units.leader_position()
    }

    /// Whether the crowd is currently engaged in combat.
    #[must_use]
    pub fn engaged(world: &World) -> bool {
        world.engaged
    }

    /// Lateral lane boundaries.
    #[must_use]
    pub fn lane(world: &World) -> LaneBounds {
        world.config.lane
    }

    /// Number of projectiles currently in flight.
    #[must_use]
    pub fn projectiles_in_flight(world: &World) -> usize {
        world.projectiles.in_flight()
    }

    /// Snapshot of all active and dying units.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.snapshots())
    }

    /// Snapshot of all enemies, corpses included.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.snapshots())
    }

    /// Snapshot of all gates in the lane.
    #[must_use]
    pub fn gate_view(world: &World) -> GateView {
        GateView::from_snapshots(world.gates.snapshots())
    }
}
