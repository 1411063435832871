//! Pooled unit storage, roster bookkeeping, and the unit death sequence.

use std::collections::VecDeque;
use std::time::Duration;

use crowd_rush_core::{Event, LanePoint, UnitId, UnitSnapshot};
use crowd_rush_formation::offset_for_rank;

use crate::cues::{CueName, CueTrack};
use crate::Config;

/// Normalized playback progress at which a death cue counts as finished.
const DEATH_COMPLETE: f32 = 0.99;

/// Lifecycle phase of a pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UnitPhase {
    /// Slot rests on the free list.
    Pooled,
    /// Unit is active and counts toward the population.
    Alive,
    /// Unit plays its death sequence; no longer part of the roster.
    Dying,
}

/// Resumable step function advanced once per tick until playback finishes.
#[derive(Clone, Copy, Debug)]
enum DeathPhase {
    /// Waiting for the animation surface to enter the death state.
    WaitingForState,
    /// Waiting for the death state to report completion.
    WaitingForCompletion,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct UnitSlot {
    pub(crate) id: UnitId,
    pub(crate) phase: UnitPhase,
    pub(crate) position: LanePoint,
    pub(crate) previous_z: f32,
    pub(crate) flash: Duration,
    death: Option<DeathPhase>,
    cue: CueTrack,
}

impl UnitSlot {
    fn pooled(id: UnitId) -> Self {
        Self {
            id,
            phase: UnitPhase::Pooled,
            position: LanePoint::new(0.0, 0.0),
            previous_z: 0.0,
            flash: Duration::ZERO,
            death: None,
            cue: CueTrack::default(),
        }
    }
}

/// Arena of unit slots cycling between the free list and the active roster.
#[derive(Clone, Debug)]
pub(crate) struct UnitPool {
    slots: Vec<UnitSlot>,
    free: VecDeque<usize>,
    roster: Vec<UnitId>,
    dying: Vec<UnitId>,
    leader: Option<UnitId>,
}

impl UnitPool {
    /// Creates a pool with every slot inactive on the free list.
    pub(crate) fn new(capacity: u32) -> Self {
        let capacity = capacity.max(1) as usize;
        let slots = (0..capacity)
            .map(|index| UnitSlot::pooled(UnitId::new(index as u32)))
            .collect();
        Self {
            slots,
            free: (0..capacity).collect(),
            roster: Vec::with_capacity(capacity),
            dying: Vec::new(),
            leader: None,
        }
    }

    /// Activates the starting crowd without broadcasting events.
    pub(crate) fn seed(&mut self, config: &Config) {
        let Some(index) = self.free.pop_front() else {
            return;
        };
        let first = {
            let slot = &mut self.slots[index];
            slot.phase = UnitPhase::Alive;
            slot.position = config.spawn_point;
            slot.previous_z = config.spawn_point.z();
            slot.flash = config.spawn_flash;
            slot.id
        };
        self.roster.push(first);
        self.leader = Some(first);

        let extra = config.starting_units.saturating_sub(1);
        let mut sink = Vec::new();
        self.grow(extra, config, &mut sink);
    }

    pub(crate) fn population(&self) -> u32 {
        self.roster.len() as u32
    }

    pub(crate) fn pooled_count(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    pub(crate) fn roster(&self) -> &[UnitId] {
        &self.roster
    }

    pub(crate) fn leader(&self) -> Option<UnitId> {
        self.leader
    }

    pub(crate) fn leader_position(&self) -> Option<LanePoint> {
        self.leader.map(|id| self.slots[id.get() as usize].position)
    }

    pub(crate) fn is_alive(&self, id: UnitId) -> bool {
        self.slots
            .get(id.get() as usize)
            .map_or(false, |slot| slot.phase == UnitPhase::Alive)
    }

    pub(crate) fn position_of(&self, id: UnitId) -> Option<LanePoint> {
        let slot = self.slots.get(id.get() as usize)?;
        if slot.phase == UnitPhase::Pooled {
            None
        } else {
            Some(slot.position)
        }
    }

    pub(crate) fn set_position(&mut self, id: UnitId, position: LanePoint) {
        if let Some(slot) = self.slots.get_mut(id.get() as usize) {
            slot.position = position;
        }
    }

    /// Records every unit's travel coordinate before this tick's movement so
    /// gate-crossing checks can detect the transition.
    pub(crate) fn stash_previous_positions(&mut self) {
        for slot in &mut self.slots {
            slot.previous_z = slot.position.z();
        }
    }

    pub(crate) fn previous_z(&self, id: UnitId) -> f32 {
        self.slots[id.get() as usize].previous_z
    }

    /// Grows the roster by up to `requested` units, reporting the outcome.
    ///
    /// Spawn requests are silently dropped once the pool runs dry or when no
    /// leader exists to anchor the formation.
    pub(crate) fn grow(&mut self, requested: u32, config: &Config, out_events: &mut Vec<Event>) {
        self.ensure_leader(out_events);
        let Some(leader_position) = self.leader_position() else {
            out_events.push(Event::UnitsSpawned {
                requested,
                spawned: 0,
                population: self.population(),
            });
            return;
        };

        let mut spawned = 0;
        for _ in 0..requested {
            let Some(index) = self.free.pop_front() else {
                break;
            };
            let rank = self.roster.len();
            let offset = offset_for_rank(rank);
            let x = config.lane.clamp_x(leader_position.x() + offset.x);
            let position = LanePoint::new(x, leader_position.z() + offset.z);

            let id = {
                let slot = &mut self.slots[index];
                slot.phase = UnitPhase::Alive;
                slot.position = position;
                slot.previous_z = position.z();
                slot.flash = config.spawn_flash;
                slot.death = None;
                slot.cue.rebind();
                slot.id
            };
            self.roster.push(id);
            spawned += 1;
        }

        out_events.push(Event::UnitsSpawned {
            requested,
            spawned,
            population: self.population(),
        });
    }

    /// Removes up to `count` units from the roster tail, handing each to the
    /// death sequence rather than deleting it synchronously.
    pub(crate) fn shrink(&mut self, count: u32, config: &Config, out_events: &mut Vec<Event>) {
        let to_remove = count.min(self.population());
        for _ in 0..to_remove {
            let Some(id) = self.roster.pop() else {
                break;
            };
            if self.leader == Some(id) {
                self.leader = None;
            }
            self.start_death(id, config);
            out_events.push(Event::UnitDeathStarted {
                unit: id,
                population: self.population(),
            });
        }
        self.ensure_leader(out_events);
    }

    fn start_death(&mut self, id: UnitId, config: &Config) {
        let slot = &mut self.slots[id.get() as usize];
        if slot.phase != UnitPhase::Alive {
            return;
        }
        slot.phase = UnitPhase::Dying;
        slot.death = Some(DeathPhase::WaitingForState);
        slot.cue.trigger(CueName::Death, config.death_cue);
        self.dying.push(id);
    }

    /// Promotes the first eligible roster entry when the current leader is
    /// gone, firing a leader-changed event only on an identity change.
    pub(crate) fn ensure_leader(&mut self, out_events: &mut Vec<Event>) {
        if let Some(id) = self.leader {
            if self.is_alive(id) {
                return;
            }
        }

        let next = self
            .roster
            .iter()
            .copied()
            .find(|id| self.is_alive(*id));
        self.set_leader(next, out_events);
    }

    fn set_leader(&mut self, next: Option<UnitId>, out_events: &mut Vec<Event>) {
        if self.leader == next {
            return;
        }
        self.leader = next;
        out_events.push(Event::LeaderChanged { leader: next });
    }

    /// Advances flash timers, cue playback, and death sequences by one tick.
    pub(crate) fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for slot in &mut self.slots {
            if slot.phase == UnitPhase::Pooled {
                continue;
            }
            slot.flash = slot.flash.saturating_sub(dt);
            slot.cue.advance(dt);
        }

        let mut reclaimed: Vec<UnitId> = Vec::new();
        for index in 0..self.dying.len() {
            let id = self.dying[index];
            let slot = &mut self.slots[id.get() as usize];
            let Some(phase) = slot.death else {
                continue;
            };
            match phase {
                DeathPhase::WaitingForState => {
                    if slot.cue.state() == Some(CueName::Death) {
                        slot.death = Some(DeathPhase::WaitingForCompletion);
                    }
                }
                DeathPhase::WaitingForCompletion => {
                    if slot.cue.state() == Some(CueName::Death)
                        && slot.cue.normalized() >= DEATH_COMPLETE
                    {
                        reclaimed.push(id);
                    }
                }
            }
        }

        for id in reclaimed {
            self.reclaim(id);
            out_events.push(Event::UnitReclaimed { unit: id });
        }
    }

    /// Returns a slot to the free list and resets it for pooled reuse.
    fn reclaim(&mut self, id: UnitId) {
        let index = id.get() as usize;
        let slot = &mut self.slots[index];
        slot.phase = UnitPhase::Pooled;
        slot.death = None;
        slot.flash = Duration::ZERO;
        slot.cue.rebind();
        self.dying.retain(|dying| *dying != id);
        self.free.push_back(index);
    }

    pub(crate) fn snapshots(&self) -> Vec<UnitSnapshot> {
        self.slots
            .iter()
            .filter(|slot| slot.phase != UnitPhase::Pooled)
            .map(|slot| UnitSnapshot {
                id: slot.id,
                position: slot.position,
                leader: self.leader == Some(slot.id),
                dying: slot.phase == UnitPhase::Dying,
                flash_remaining: slot.flash,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{UnitPhase, UnitPool};
    use crate::Config;
    use crowd_rush_core::Event;

    fn seeded_pool(capacity: u32, starting: u32) -> (UnitPool, Config) {
        let config = Config {
            capacity,
            starting_units: starting,
            ..Config::default()
        };
        let mut pool = UnitPool::new(capacity);
        pool.seed(&config);
        (pool, config)
    }

    #[test]
    fn seeding_places_leader_at_spawn_point() {
        let (pool, config) = seeded_pool(8, 3);
        assert_eq!(pool.population(), 3);
        assert_eq!(pool.leader(), Some(pool.roster()[0]));
        assert_eq!(pool.leader_position(), Some(config.spawn_point));
    }

    #[test]
    fn growth_is_capped_by_pool_exhaustion() {
        let (mut pool, config) = seeded_pool(3, 1);
        let mut events = Vec::new();
        pool.grow(5, &config, &mut events);

        assert_eq!(pool.population(), 3);
        assert_eq!(pool.pooled_count(), 0);
        assert!(matches!(
            events.as_slice(),
            [Event::UnitsSpawned {
                requested: 5,
                spawned: 2,
                population: 3,
            }],
        ));
    }

    #[test]
    fn shrink_removes_from_tail_and_reconciles_leader() {
        let (mut pool, config) = seeded_pool(8, 4);
        let leader = pool.leader().expect("leader");
        let mut events = Vec::new();
        pool.shrink(2, &config, &mut events);

        assert_eq!(pool.population(), 2);
        assert_eq!(pool.leader(), Some(leader), "tail removal keeps leader");
        let death_starts = events
            .iter()
            .filter(|event| matches!(event, Event::UnitDeathStarted { .. }))
            .count();
        assert_eq!(death_starts, 2);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::LeaderChanged { .. })),
            "no-op reconciliation must not fire leader-changed",
        );
    }

    #[test]
    fn dying_units_hold_their_slots_until_reclaimed() {
        let (mut pool, config) = seeded_pool(4, 4);
        let mut events = Vec::new();
        pool.shrink(2, &config, &mut events);
        assert_eq!(pool.pooled_count(), 0, "dying units still occupy slots");

        events.clear();
        pool.grow(2, &config, &mut events);
        assert!(matches!(
            events.as_slice(),
            [Event::UnitsSpawned { spawned: 0, .. }],
        ));

        // Death cue runs to completion and both slots return to the pool.
        events.clear();
        pool.advance(config.death_cue, &mut events);
        pool.advance(config.death_cue, &mut events);
        let reclaimed = events
            .iter()
            .filter(|event| matches!(event, Event::UnitReclaimed { .. }))
            .count();
        assert_eq!(reclaimed, 2);
        assert_eq!(pool.pooled_count(), 2);
    }

    #[test]
    fn reclaimed_slots_reset_for_reuse() {
        let (mut pool, config) = seeded_pool(2, 2);
        let mut events = Vec::new();
        pool.shrink(1, &config, &mut events);
        pool.advance(config.death_cue, &mut events);
        pool.advance(config.death_cue, &mut events);

        events.clear();
        pool.grow(1, &config, &mut events);
        assert_eq!(pool.population(), 2);
        let revived = pool.roster()[1];
        assert_eq!(pool.slots[revived.get() as usize].phase, UnitPhase::Alive);
    }

    #[test]
    fn leader_changed_fires_only_on_identity_change() {
        let (mut pool, config) = seeded_pool(8, 3);
        let mut events = Vec::new();

        // Removing followers never touches the leader.
        pool.shrink(1, &config, &mut events);
        pool.ensure_leader(&mut events);
        pool.ensure_leader(&mut events);
        let changes = events
            .iter()
            .filter(|event| matches!(event, Event::LeaderChanged { .. }))
            .count();
        assert_eq!(changes, 0);

        // Draining the roster drops the leader to None exactly once.
        events.clear();
        pool.shrink(2, &config, &mut events);
        let transitions: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::LeaderChanged { leader } => Some(*leader),
                _ => None,
            })
            .collect();
        assert_eq!(transitions, vec![None]);
    }
}
