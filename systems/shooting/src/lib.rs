#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Crowd fire control: a shared cadence that volleys one projectile per
//! live unit.
//!
//! The system accumulates simulated time from the event stream and emits
//! one fire request per unit each time the interval elapses. Dropped
//! fractions carry over, so a coarse tick rate does not slow the rate of
//! fire. Requests for units that died since the snapshot are discarded by
//! the world, which keeps this system stateless about the roster.

use std::time::Duration;

use crowd_rush_core::{Command, Event, UnitView};

/// Emits synchronized fire requests for the whole crowd.
#[derive(Clone, Copy, Debug)]
pub struct Shooting {
    interval: Duration,
    accumulator: Duration,
}

impl Shooting {
    /// Creates the system with the delay between volleys.
    ///
    /// A zero interval is bumped to one millisecond so the accumulator
    /// always drains.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes world events and emits fire requests for elapsed volleys.
    pub fn handle(&mut self, events: &[Event], units: &UnitView, out_commands: &mut Vec<Command>) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            for unit in units.iter().filter(|unit| !unit.dying) {
                out_commands.push(Command::FireProjectile { unit: unit.id });
            }
        }
    }
}
