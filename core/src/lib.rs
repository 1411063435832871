#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crowd Rush engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Crowd Rush simulation core.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the crowd leader steer toward the provided lateral
    /// coordinate, clamped to the lane bounds.
    SteerLeader {
        /// Desired lateral position for the leader.
        x: f32,
    },
    /// Grows the active roster by up to `count` units, capped at capacity.
    AddUnits {
        /// Number of units requested; the remainder is silently dropped
        /// when the pool runs dry.
        count: u32,
    },
    /// Shrinks the active roster by up to `count` units from the tail.
    RemoveUnits {
        /// Number of units requested; clamped to the current roster size.
        count: u32,
    },
    /// Multiplies the roster size by `factor`, capped at capacity.
    MultiplyUnits {
        /// Growth factor applied to the current roster size.
        factor: u32,
    },
    /// Divides the roster size by `divisor` using floor division, keeping
    /// at least one survivor. Divisors of zero are ignored.
    DivideUnits {
        /// Divisor applied to the current roster size.
        divisor: u32,
    },
    /// Requests that the identified unit fire one projectile forward.
    FireProjectile {
        /// Unit that owns the projectile.
        unit: UnitId,
    },
    /// Spawns a mutually exclusive gate pair across the lane.
    SpawnGatePair {
        /// Identifier of the pair, allocated by the wave director.
        pair: PairId,
        /// Travel-axis coordinate of the pair's trigger line.
        line_z: f32,
        /// Gate occupying the left half of the lane.
        left: GateSpec,
        /// Gate occupying the right half of the lane.
        right: GateSpec,
    },
    /// Spawns a row of normal enemies behind a gate pair.
    SpawnEnemyWave {
        /// Identifier of the wave, allocated by the wave director.
        wave: WaveId,
        /// Travel-axis coordinate the row is centered on.
        line_z: f32,
        /// Number of enemies in the wave.
        count: u32,
    },
    /// Spawns a single boss-class enemy behind the final gate pair.
    SpawnBoss {
        /// Identifier of the wave the boss stands in for.
        wave: WaveId,
        /// Travel-axis coordinate the boss spawns at.
        line_z: f32,
    },
    /// Moves an enemy to a new position with the provided facing.
    MoveEnemy {
        /// Enemy to reposition.
        enemy: EnemyId,
        /// Destination position for this tick.
        to: LanePoint,
        /// Facing angle in radians around the vertical axis.
        heading: f32,
    },
    /// Applies an enemy's melee strike to the crowd.
    EnemyStrike {
        /// Enemy performing the strike; damage comes from its profile.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports the outcome of a roster growth request.
    UnitsSpawned {
        /// Number of units originally requested.
        requested: u32,
        /// Number of units actually activated from the pool.
        spawned: u32,
        /// Roster size after the operation.
        population: u32,
    },
    /// Announces that a unit left the roster and began its death sequence.
    UnitDeathStarted {
        /// Unit entering the death sequence.
        unit: UnitId,
        /// Roster size after the removal.
        population: u32,
    },
    /// Confirms that a dying unit finished its death playback and returned
    /// to the pool for reuse.
    UnitReclaimed {
        /// Unit whose slot rejoined the free list.
        unit: UnitId,
    },
    /// Announces that the identity of the crowd leader changed.
    LeaderChanged {
        /// New leader, or `None` when the roster is empty.
        leader: Option<UnitId>,
    },
    /// Announces a transition of the combat-engagement flag.
    EngagementChanged {
        /// Whether a live enemy is currently ahead of the leader.
        engaged: bool,
    },
    /// Confirms that a projectile left a unit's muzzle.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Unit that fired it.
        unit: UnitId,
    },
    /// Reports that a projectile impact mutated an armed gate.
    GateMutated {
        /// Gate that absorbed the hit.
        gate: GateId,
        /// Operator after the mutation.
        operator: GateOperator,
        /// Magnitude after the mutation.
        magnitude: u32,
    },
    /// Confirms that a gate pair materialized in the lane.
    GatePairSpawned {
        /// Pair identifier assigned by the wave director.
        pair: PairId,
        /// Gate occupying the left half of the lane.
        left: GateId,
        /// Gate occupying the right half of the lane.
        right: GateId,
    },
    /// Announces that the crowd passed through a gate and its arithmetic
    /// was applied to the roster.
    GatePassed {
        /// Pair the triggered gate belongs to.
        pair: PairId,
        /// Gate that fired.
        gate: GateId,
        /// Operator applied to the roster.
        operator: GateOperator,
        /// Magnitude applied to the roster.
        magnitude: u32,
        /// Roster size after the arithmetic was applied.
        population: u32,
    },
    /// Announces that a gate was permanently disabled by its sibling.
    GateDisabled {
        /// Gate that became inert.
        gate: GateId,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Variant selecting the enemy's parameter profile.
        variant: EnemyVariant,
        /// World position the enemy spawned at.
        position: LanePoint,
    },
    /// Reports that an enemy absorbed projectile damage.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health remaining after the hit.
        remaining: f32,
    },
    /// Reports that an enemy's strike removed units from the roster.
    EnemyStruck {
        /// Enemy that performed the strike.
        enemy: EnemyId,
        /// Units removed by the strike.
        damage: u32,
        /// Roster size after the strike.
        population: u32,
    },
    /// Announces that an enemy's health reached zero.
    EnemyDied {
        /// Enemy that died; its corpse lingers before removal.
        enemy: EnemyId,
    },
    /// Confirms that an enemy corpse was removed from the simulation.
    EnemyRemoved {
        /// Enemy whose state was dropped.
        enemy: EnemyId,
    },
    /// Confirms that an enemy wave finished spawning.
    WaveSpawned {
        /// Wave identifier assigned by the wave director.
        wave: WaveId,
        /// Number of enemies that materialized.
        size: u32,
    },
}

/// Unique identifier assigned to a crowd unit.
///
/// Unit identifiers double as pool slot handles: a reclaimed slot reuses
/// the same identifier for the next activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
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

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
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

/// Unique identifier assigned to a gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateId(u32);

impl GateId {
    /// Creates a new gate identifier with the provided numeric value.
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

/// Identifier of a mutually exclusive gate pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(u32);

impl PairId {
    /// Creates a new pair identifier with the provided numeric value.
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

/// Identifier of an enemy wave spawned behind a gate pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveId(u32);

impl WaveId {
    /// Creates a new wave identifier with the provided numeric value.
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

/// Unique identifier assigned to an in-flight projectile.
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

/// World position expressed as a lateral offset and a travel-axis offset.
///
/// The crowd travels along increasing `z`; `x` spans the lane from the left
/// wall to the right wall.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanePoint {
    x: f32,
    z: f32,
}

impl LanePoint {
    /// Creates a new lane point from lateral and travel coordinates.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Lateral coordinate across the lane.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Travel-axis coordinate along the lane.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: LanePoint) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Returns the point translated by the provided deltas.
    #[must_use]
    pub fn offset_by(self, dx: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }
}

/// Lateral boundaries of the lane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneBounds {
    left: f32,
    right: f32,
}

impl LaneBounds {
    /// Creates validated lane bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLaneBounds`] when `left` is not
    /// strictly less than `right` or either bound is non-finite.
    pub fn new(left: f32, right: f32) -> Result<Self, ConfigError> {
        if !left.is_finite() || !right.is_finite() || left >= right {
            return Err(ConfigError::InvalidLaneBounds { left, right });
        }
        Ok(Self { left, right })
    }

    /// Creates bounds symmetric about the lane midline.
    ///
    /// Half-widths that are non-finite or at most zero fall back to a
    /// one-unit half-width so the lane always has interior.
    #[must_use]
    pub fn symmetric(half_width: f32) -> Self {
        let half = if half_width.is_finite() && half_width > 0.0 {
            half_width
        } else {
            1.0
        };
        Self {
            left: -half,
            right: half,
        }
    }

    /// Left wall coordinate.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }

    /// Right wall coordinate.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.right
    }

    /// Total lane width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Clamps a lateral coordinate into the lane.
    #[must_use]
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(self.left, self.right)
    }
}

/// Arithmetic operator carried by a gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateOperator {
    /// Adds the magnitude to the roster size.
    Add,
    /// Removes the magnitude from the roster tail.
    Subtract,
    /// Multiplies the roster size by the magnitude.
    Multiply,
    /// Divides the roster size by the magnitude using floor division.
    Divide,
}

impl GateOperator {
    /// Symbol used when labelling the gate for presentation.
    #[must_use]
    pub const fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => 'x',
            Self::Divide => '/',
        }
    }
}

/// Operator and magnitude of a gate as requested by the wave director.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateSpec {
    /// Arithmetic operator the gate applies when passed.
    pub operator: GateOperator,
    /// Positive magnitude the operator is applied with.
    pub magnitude: u32,
    /// Lateral span the gate's trigger volume covers.
    pub span: GateSpan,
}

/// Lateral extent of a gate's trigger volume.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateSpan {
    left: f32,
    right: f32,
}

impl GateSpan {
    /// Creates a new span from its left and right edges.
    #[must_use]
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Left edge of the span.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }

    /// Right edge of the span.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.right
    }

    /// Reports whether a lateral coordinate falls inside the span.
    #[must_use]
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }
}

/// Lifecycle state of a gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatePhase {
    /// The gate accepts projectile mutations and roster entry.
    Armed,
    /// The gate applied its arithmetic; terminal and idempotent.
    Triggered,
    /// The sibling fired first; the gate is inert but stays visible.
    Disabled,
}

/// Tagged variant selecting an enemy's parameter profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyVariant {
    /// Standard wave enemy.
    Normal,
    /// Boss-class enemy spawned singly behind the final gate pair.
    Boss,
}

impl EnemyVariant {
    /// Returns the parameter profile for the variant.
    ///
    /// The variants share one behavior template; only these numbers differ.
    #[must_use]
    pub const fn profile(&self) -> EnemyProfile {
        match self {
            Self::Normal => EnemyProfile {
                max_health: 100.0,
                damage_per_hit: 1,
                attack_range: 1.5,
                attack_interval: Duration::from_millis(1_000),
                chase_range: 50.0,
                chase_speed: 3.0,
                patrol_speed: 3.0,
                stop_buffer: 0.25,
            },
            Self::Boss => EnemyProfile {
                max_health: 500.0,
                damage_per_hit: 10,
                attack_range: 2.5,
                attack_interval: Duration::from_millis(2_000),
                chase_range: 50.0,
                chase_speed: 3.0,
                patrol_speed: 3.0,
                stop_buffer: 0.25,
            },
        }
    }
}

/// Capability record shared by the enemy behavior template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProfile {
    /// Health the enemy spawns with.
    pub max_health: f32,
    /// Units removed from the roster per successful strike.
    pub damage_per_hit: u32,
    /// Distance at which strikes connect.
    pub attack_range: f32,
    /// Cooldown between successive strikes.
    pub attack_interval: Duration,
    /// Distance at which a valid target activates the chase.
    pub chase_range: f32,
    /// Movement speed while chasing, in world units per second.
    pub chase_speed: f32,
    /// Movement speed while patrolling, in world units per second.
    pub patrol_speed: f32,
    /// Margin subtracted from the attack range so strikes connect without
    /// jitter at the stop distance.
    pub stop_buffer: f32,
}

impl EnemyProfile {
    /// Distance at which a chasing enemy holds position.
    #[must_use]
    pub fn stop_distance(&self) -> f32 {
        (self.attack_range - self.stop_buffer).max(0.05)
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Pool slot handle of the unit.
    pub id: UnitId,
    /// World position of the unit.
    pub position: LanePoint,
    /// Whether this unit currently leads the formation.
    pub leader: bool,
    /// Whether the unit is playing its death sequence.
    pub dying: bool,
    /// Remaining duration of the spawn pop effect, if any.
    pub flash_remaining: Duration,
}

/// Read-only snapshot describing all active units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated by the world for the enemy.
    pub id: EnemyId,
    /// Variant selecting the enemy's parameter profile.
    pub variant: EnemyVariant,
    /// World position of the enemy.
    pub position: LanePoint,
    /// Facing angle in radians around the vertical axis.
    pub heading: f32,
    /// Current health.
    pub health: f32,
    /// Health the enemy spawned with.
    pub max_health: f32,
    /// Whether the enemy is still alive; corpses report `false`.
    pub alive: bool,
    /// Whether the damage flash effect is currently active.
    pub flashing: bool,
}

/// Read-only snapshot describing all enemies in the simulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single gate's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateSnapshot {
    /// Identifier allocated by the world for the gate.
    pub id: GateId,
    /// Pair the gate belongs to.
    pub pair: PairId,
    /// The other gate of the pair.
    pub sibling: GateId,
    /// Current arithmetic operator.
    pub operator: GateOperator,
    /// Current magnitude.
    pub magnitude: u32,
    /// Lifecycle state of the gate.
    pub phase: GatePhase,
    /// Lateral span of the trigger volume.
    pub span: GateSpan,
    /// Travel-axis coordinate of the trigger line.
    pub line_z: f32,
}

/// Read-only snapshot describing all gates in the lane.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GateView {
    snapshots: Vec<GateSnapshot>,
}

impl GateView {
    /// Creates a new gate view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<GateSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured gate snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &GateSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<GateSnapshot> {
        self.snapshots
    }
}

/// Configuration mistakes detected while constructing simulation components.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Lane boundaries were unset or inverted.
    #[error("lane bounds are invalid: left {left} must be less than right {right}")]
    InvalidLaneBounds {
        /// Offending left bound.
        left: f32,
        /// Offending right bound.
        right: f32,
    },
    /// A magnitude range was configured with `min` above `max`.
    #[error("magnitude range is empty: min {min} exceeds max {max}")]
    EmptyMagnitudeRange {
        /// Offending lower bound.
        min: u32,
        /// Offending upper bound.
        max: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, EnemyId, EnemyVariant, GateId, GateOperator, GatePhase, GateSpan, LaneBounds,
        LanePoint, PairId, UnitId, WaveId,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&UnitId::new(7));
        assert_round_trip(&EnemyId::new(11));
        assert_round_trip(&GateId::new(3));
        assert_round_trip(&PairId::new(2));
        assert_round_trip(&WaveId::new(5));
    }

    #[test]
    fn gate_operator_round_trips_through_bincode() {
        assert_round_trip(&GateOperator::Divide);
        assert_round_trip(&GatePhase::Disabled);
    }

    #[test]
    fn lane_bounds_reject_inverted_walls() {
        assert_eq!(
            LaneBounds::new(13.0, -13.0),
            Err(ConfigError::InvalidLaneBounds {
                left: 13.0,
                right: -13.0,
            }),
        );
    }

    #[test]
    fn lane_bounds_clamp_lateral_coordinates() {
        let bounds = LaneBounds::new(-13.0, 13.0).expect("bounds");
        assert_eq!(bounds.clamp_x(-20.0), -13.0);
        assert_eq!(bounds.clamp_x(20.0), 13.0);
        assert_eq!(bounds.clamp_x(4.5), 4.5);
        assert_eq!(bounds.width(), 26.0);
    }

    #[test]
    fn symmetric_bounds_reject_degenerate_half_widths() {
        let bounds = LaneBounds::symmetric(13.0);
        assert_eq!(bounds.left(), -13.0);
        assert_eq!(bounds.right(), 13.0);

        let fallback = LaneBounds::symmetric(0.0);
        assert_eq!(fallback.left(), -1.0);
        assert_eq!(fallback.right(), 1.0);
    }

    #[test]
    fn lane_point_distance_matches_expectation() {
        let a = LanePoint::new(0.0, 0.0);
        let b = LanePoint::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn gate_span_contains_its_edges() {
        let span = GateSpan::new(-12.0, -1.0);
        assert!(span.contains(-12.0));
        assert!(span.contains(-1.0));
        assert!(!span.contains(0.0));
    }

    #[test]
    fn boss_profile_differs_only_in_combat_parameters() {
        let normal = EnemyVariant::Normal.profile();
        let boss = EnemyVariant::Boss.profile();
        assert!(boss.damage_per_hit > normal.damage_per_hit);
        assert!(boss.attack_range > normal.attack_range);
        assert!(boss.attack_interval > normal.attack_interval);
        assert_eq!(boss.chase_speed, normal.chase_speed);
        assert_eq!(boss.patrol_speed, normal.patrol_speed);
    }

    #[test]
    fn stop_distance_sits_inside_attack_range() {
        let profile = EnemyVariant::Normal.profile();
        assert!(profile.stop_distance() < profile.attack_range);
        assert!(profile.stop_distance() > 0.0);
    }

    #[test]
    fn operator_symbols_match_labels() {
        assert_eq!(GateOperator::Add.symbol(), '+');
        assert_eq!(GateOperator::Subtract.symbol(), '-');
        assert_eq!(GateOperator::Multiply.symbol(), 'x');
        assert_eq!(GateOperator::Divide.symbol(), '/');
    }
}
