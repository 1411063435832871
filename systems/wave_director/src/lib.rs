#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level direction: gate pair selection, difficulty pacing, and enemy
//! wave sizing.
//!
//! The director owns no world state. It watches the event stream for gate
//! passes, keeps a running population estimate, and answers with spawn
//! commands for the next gate pair and its escorting enemy wave. All
//! randomness is drawn from per-pair ChaCha streams whose seeds are
//! derived by hashing the global seed with the pair identifier and a
//! purpose label, so a replay with the same seed spawns an identical
//! level regardless of tick timing.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crowd_rush_core::{
    Command, ConfigError, Event, GateOperator, GateSpan, GateSpec, LaneBounds, PairId, WaveId,
};

/// Tunable pacing parameters of the director.
#[derive(Clone, Copy, Debug)]
pub struct WaveConfig {
    /// Number of gate pairs in the level; the last one guards the boss.
    pub total_pairs: u32,
    /// Travel-axis coordinate of the first gate pair.
    pub first_line_z: f32,
    /// Distance between successive gate pairs.
    pub pair_spacing: f32,
    /// Distance behind a gate pair at which its enemy wave stands.
    pub wave_offset: f32,
    /// Lateral walls the gate spans are laid out inside.
    pub lane: LaneBounds,
    /// Clearance kept between a gate span and the lane wall.
    pub wall_margin: f32,
    /// Total lateral gap between the two gates of a pair.
    pub center_gap: f32,
    /// Inclusive magnitude range for Add gates.
    pub add_range: (u32, u32),
    /// Inclusive Subtract magnitude range offered at the bottom of the
    /// population domain.
    pub subtract_low_range: (u32, u32),
    /// Inclusive Subtract magnitude range offered at the top of the
    /// population domain.
    pub subtract_high_range: (u32, u32),
    /// Inclusive magnitude range for Divide gates.
    pub divide_range: (u32, u32),
    /// Population band across which the Subtract magnitude scales.
    pub population_domain: (u32, u32),
    /// Population above which only punishing operator pairs are offered.
    pub pressure_population: u32,
    /// Scale applied to the population-derived wave size term.
    pub wave_factor: f32,
    /// Extra enemies added per gate pair already passed.
    pub wave_bonus: u32,
    /// Upper bound on a single wave's size.
    pub wave_cap: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            total_pairs: 10,
            first_line_z: 20.0,
            pair_spacing: 20.0,
            wave_offset: 8.0,
            lane: LaneBounds::symmetric(13.0),
            wall_margin: 1.0,
            center_gap: 1.0,
            add_range: (1, 5),
            subtract_low_range: (1, 3),
            subtract_high_range: (7, 10),
            divide_range: (2, 4),
            population_domain: (1, 50),
            pressure_population: 50,
            wave_factor: 1.0,
            wave_bonus: 1,
            wave_cap: 20,
        }
    }
}

/// Unordered operator pairs offered outside the pressure regime.
const OPEN_CHOICES: [(GateOperator, GateOperator); 6] = [
    (GateOperator::Add, GateOperator::Subtract),
    (GateOperator::Add, GateOperator::Multiply),
    (GateOperator::Add, GateOperator::Divide),
    (GateOperator::Subtract, GateOperator::Multiply),
    (GateOperator::Subtract, GateOperator::Divide),
    (GateOperator::Multiply, GateOperator::Divide),
];

/// Operator pairs offered while the population exceeds the pressure
/// threshold; every choice bleeds the crowd.
const PRESSURE_CHOICES: [(GateOperator, GateOperator); 3] = [
    (GateOperator::Subtract, GateOperator::Divide),
    (GateOperator::Subtract, GateOperator::Subtract),
    (GateOperator::Subtract, GateOperator::Multiply),
];

/// Index below which a pair always offers at least one Add gate, so an
/// early wrong choice cannot strand a tiny crowd.
const GENTLE_PAIRS: u32 = 2;

/// Event-driven level director.
#[derive(Clone, Debug)]
pub struct WaveDirector {
    config: WaveConfig,
    seed: u64,
    next_pair: u32,
    gates_passed: u32,
    population: u32,
    finished: bool,
}

impl WaveDirector {
    /// Creates a director after validating the configured ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyMagnitudeRange`] when any magnitude
    /// range or the population domain is inverted.
    pub fn new(config: WaveConfig, seed: u64) -> Result<Self, ConfigError> {
        for (min, max) in [
            config.add_range,
            config.subtract_low_range,
            config.subtract_high_range,
            config.divide_range,
            config.population_domain,
        ] {
            if min > max {
                return Err(ConfigError::EmptyMagnitudeRange { min, max });
            }
        }
        Ok(Self {
            config,
            seed,
            next_pair: 0,
            gates_passed: 0,
            population: 0,
            finished: false,
        })
    }

    /// Number of gate pairs spawned so far.
    #[must_use]
    pub fn pairs_spawned(&self) -> u32 {
        self.next_pair
    }

    /// Whether the final pair has been passed.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Spawns the opening gate pair and its wave.
    pub fn spawn_opening(&mut self, population: u32, out_commands: &mut Vec<Command>) {
        self.population = population;
        self.spawn_next(out_commands);
    }

    /// Consumes world events, spawning the next band when the live pair is
    /// passed.
    pub fn handle(&mut self, events: &[Event], out_commands: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::UnitsSpawned { population, .. }
                | Event::UnitDeathStarted { population, .. }
                | Event::EnemyStruck { population, .. } => self.population = *population,
                Event::GatePassed {
                    pair, population, ..
                } => {
                    self.population = *population;
                    // Stale passes can arrive if a lingering pair fires out
                    // of order; only the live pair advances the level.
                    if self.next_pair > 0 && pair.get() == self.next_pair - 1 {
                        self.gates_passed += 1;
                        self.spawn_next(out_commands);
                    }
                }
                _ => {}
            }
        }
    }

    fn spawn_next(&mut self, out_commands: &mut Vec<Command>) {
        if self.next_pair >= self.config.total_pairs {
            self.finished = true;
            return;
        }

        let index = self.next_pair;
        self.next_pair += 1;
        let pair = PairId::new(index);
        let line_z = self.config.first_line_z + index as f32 * self.config.pair_spacing;

        let (left, right) = self.roll_pair(pair);
        out_commands.push(Command::SpawnGatePair {
            pair,
            line_z,
            left,
            right,
        });

        let wave = WaveId::new(index);
        let wave_z = line_z + self.config.wave_offset;
        if index + 1 == self.config.total_pairs {
            out_commands.push(Command::SpawnBoss {
                wave,
                line_z: wave_z,
            });
        } else {
            out_commands.push(Command::SpawnEnemyWave {
                wave,
                line_z: wave_z,
                count: self.wave_size(),
            });
        }
    }

    /// Draws the operator pair and magnitudes for one gate pair.
    fn roll_pair(&self, pair: PairId) -> (GateSpec, GateSpec) {
        let mut rng = self.pair_rng(pair, b"gate-pair");

        let (first, second) = if self.population > self.config.pressure_population {
            PRESSURE_CHOICES[rng.gen_range(0..PRESSURE_CHOICES.len())]
        } else if pair.get() < GENTLE_PAIRS {
            OPEN_CHOICES[rng.gen_range(0..3)]
        } else {
            OPEN_CHOICES[rng.gen_range(0..OPEN_CHOICES.len())]
        };

        let first_magnitude = self.roll_magnitude(first, &mut rng);
        let mut second_magnitude = self.roll_magnitude(second, &mut rng);
        if first == GateOperator::Subtract
            && second == GateOperator::Subtract
            && second_magnitude == first_magnitude
        {
            // A same-valued Subtract pair is no choice at all.
            let (min, max) = self.subtract_bounds();
            second_magnitude = if first_magnitude < max {
                first_magnitude + 1
            } else if first_magnitude > min {
                first_magnitude - 1
            } else {
                first_magnitude + 1
            };
        }

        let (left_span, right_span) = self.spans();
        let a = GateSpec {
            operator: first,
            magnitude: first_magnitude,
            span: left_span,
        };
        let b = GateSpec {
            operator: second,
            magnitude: second_magnitude,
            span: right_span,
        };
        if rng.gen_bool(0.5) {
            (
                GateSpec { span: left_span, ..b },
                GateSpec {
                    span: right_span,
                    ..a
                },
            )
        } else {
            (a, b)
        }
    }

    fn roll_magnitude(&self, operator: GateOperator, rng: &mut ChaCha8Rng) -> u32 {
        match operator {
            GateOperator::Add => {
                let (min, max) = self.config.add_range;
                rng.gen_range(min..=max)
            }
            GateOperator::Subtract => {
                let (min, max) = self.subtract_bounds();
                rng.gen_range(min..=max)
            }
            // Multiply gates never roll; they always double.
            GateOperator::Multiply => 2,
            GateOperator::Divide => {
                let (min, max) = self.config.divide_range;
                rng.gen_range(min..=max)
            }
        }
    }

    /// Interpolates the Subtract range between its low- and high-population
    /// bounds, so the sting stays proportional: a full crowd draws from the
    /// top band, a struggling one from the bottom.
    fn subtract_bounds(&self) -> (u32, u32) {
        let (d0, d1) = self.config.population_domain;
        let (low_min, low_max) = self.config.subtract_low_range;
        let (high_min, high_max) = self.config.subtract_high_range;
        if d1 <= d0 {
            return (low_min, low_max);
        }
        let t = (self.population.saturating_sub(d0) as f32 / (d1 - d0) as f32).clamp(0.0, 1.0);
        let lerp = |a: u32, b: u32| (a as f32 + t * (b as f32 - a as f32)).round() as u32;
        let min = lerp(low_min, high_min);
        (min, lerp(low_max, high_max).max(min))
    }

    fn spans(&self) -> (GateSpan, GateSpan) {
        let lane = self.config.lane;
        let half_gap = self.config.center_gap / 2.0;
        (
            GateSpan::new(lane.left() + self.config.wall_margin, -half_gap),
            GateSpan::new(half_gap, lane.right() - self.config.wall_margin),
        )
    }

    /// Wave size grows with the population and with progress through the
    /// level, clamped into `1..=cap`.
    fn wave_size(&self) -> u32 {
        let base = (self.population as f32 / 10.0 * self.config.wave_factor).floor() as u32;
        (base + self.gates_passed * self.config.wave_bonus).clamp(1, self.wave_cap())
    }

    fn wave_cap(&self) -> u32 {
        self.config.wave_cap.max(1)
    }

    /// Derives an independent ChaCha stream for one pair and purpose.
    fn pair_rng(&self, pair: PairId, label: &[u8]) -> ChaCha8Rng {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(pair.get().to_le_bytes());
        hasher.update(label);
        ChaCha8Rng::from_seed(hasher.finalize().into())
    }
}
