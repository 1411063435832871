//! Authoritative gate state management.
//!
//! A gate is a stateful arithmetic puzzle node. It spawns `Armed`, absorbs
//! projectile mutations while armed, and reaches exactly one of two
//! absorbing terminal states: `Triggered` (the crowd passed through it) or
//! `Disabled` (its sibling fired first). Terminal states ignore all further
//! stimulus.

use crowd_rush_core::{
    Event, GateId, GateOperator, GatePhase, GateSnapshot, GateSpan, GateSpec, PairId,
};

#[derive(Clone, Copy, Debug)]
pub(crate) struct GateState {
    pub(crate) id: GateId,
    pub(crate) pair: PairId,
    pub(crate) sibling: GateId,
    pub(crate) operator: GateOperator,
    pub(crate) magnitude: u32,
    pub(crate) phase: GatePhase,
    pub(crate) span: GateSpan,
    pub(crate) line_z: f32,
}

/// Outcome of a projectile impact against a gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HitOutcome {
    /// The gate mutated its operator or magnitude.
    Mutated,
    /// The gate stopped the projectile without a numeric effect.
    Absorbed,
    /// The gate's interaction surface is gone; the projectile flies on.
    Ignored,
}

/// Registry that stores gates and manages identifier allocation.
#[derive(Clone, Debug, Default)]
pub(crate) struct GateRegistry {
    entries: Vec<GateState>,
    next_id: u32,
}

impl GateRegistry {
    fn allocate(&mut self) -> GateId {
        let id = GateId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Materializes a reciprocal gate pair, clamping magnitudes to one.
    pub(crate) fn spawn_pair(
        &mut self,
        pair: PairId,
        line_z: f32,
        left: GateSpec,
        right: GateSpec,
        out_events: &mut Vec<Event>,
    ) {
        let left_id = self.allocate();
        let right_id = self.allocate();

        self.entries.push(GateState {
            id: left_id,
            pair,
            sibling: right_id,
            operator: left.operator,
            magnitude: left.magnitude.max(1),
            phase: GatePhase::Armed,
            span: left.span,
            line_z,
        });
        self.entries.push(GateState {
            id: right_id,
            pair,
            sibling: left_id,
            operator: right.operator,
            magnitude: right.magnitude.max(1),
            phase: GatePhase::Armed,
            span: right.span,
            line_z,
        });

        out_events.push(Event::GatePairSpawned {
            pair,
            left: left_id,
            right: right_id,
        });
    }

    fn entry_mut(&mut self, gate: GateId) -> Option<&mut GateState> {
        self.entries.iter_mut().find(|entry| entry.id == gate)
    }

    /// Applies a projectile impact to the gate.
    ///
    /// Additive gates grow by one per hit. Subtractive gates shrink toward
    /// one and then flip to `Add 1` so the crowd can never be offered a
    /// zero or negative gate. Multiply and Divide gates stop the projectile
    /// but are immune to mutation.
    pub(crate) fn on_projectile_hit(
        &mut self,
        gate: GateId,
        out_events: &mut Vec<Event>,
    ) -> HitOutcome {
        let Some(entry) = self.entry_mut(gate) else {
            return HitOutcome::Ignored;
        };
        if entry.phase != GatePhase::Armed {
            return HitOutcome::Ignored;
        }

        match entry.operator {
            GateOperator::Add => entry.magnitude += 1,
            GateOperator::Subtract => {
                if entry.magnitude > 1 {
                    entry.magnitude -= 1;
                } else {
                    entry.operator = GateOperator::Add;
                    entry.magnitude = 1;
                }
            }
            GateOperator::Multiply | GateOperator::Divide => return HitOutcome::Absorbed,
        }

        out_events.push(Event::GateMutated {
            gate: entry.id,
            operator: entry.operator,
            magnitude: entry.magnitude,
        });
        HitOutcome::Mutated
    }

    /// Transitions an armed gate to `Triggered` and its sibling to
    /// `Disabled`, returning the arithmetic to apply to the roster.
    ///
    /// Returns `None` when the gate already reached a terminal state, which
    /// makes re-entry during the same pass a harmless no-op.
    pub(crate) fn try_trigger(
        &mut self,
        gate: GateId,
        out_events: &mut Vec<Event>,
    ) -> Option<(PairId, GateOperator, u32)> {
        let (pair, sibling, operator, magnitude) = {
            let entry = self.entry_mut(gate)?;
            if entry.phase != GatePhase::Armed {
                return None;
            }
            entry.phase = GatePhase::Triggered;
            (entry.pair, entry.sibling, entry.operator, entry.magnitude)
        };

        if let Some(other) = self.entry_mut(sibling) {
            if other.phase == GatePhase::Armed {
                other.phase = GatePhase::Disabled;
                out_events.push(Event::GateDisabled { gate: sibling });
            }
        }

        Some((pair, operator, magnitude))
    }

    /// Armed gates in identifier order, for deterministic crossing checks.
    pub(crate) fn armed(&self) -> Vec<GateState> {
        self.entries
            .iter()
            .copied()
            .filter(|entry| entry.phase == GatePhase::Armed)
            .collect()
    }

    pub(crate) fn snapshots(&self) -> Vec<GateSnapshot> {
        self.entries
            .iter()
            .map(|entry| GateSnapshot {
                id: entry.id,
                pair: entry.pair,
                sibling: entry.sibling,
                operator: entry.operator,
                magnitude: entry.magnitude,
                phase: entry.phase,
                span: entry.span,
                line_z: entry.line_z,
            })
            .collect()
    }
}
