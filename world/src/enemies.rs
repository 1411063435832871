//! Authoritative enemy state: spawning, damage, death, and corpse cleanup.

use std::time::Duration;

use crowd_rush_core::{EnemyId, EnemySnapshot, EnemyVariant, Event, LanePoint, WaveId};

use crate::cues::{CueName, CueTrack};
use crate::Config;

#[derive(Clone, Copy, Debug)]
struct EnemyState {
    id: EnemyId,
    variant: EnemyVariant,
    position: LanePoint,
    heading: f32,
    health: f32,
    alive: bool,
    flash: Duration,
    corpse: Option<Duration>,
    cue: CueTrack,
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Clone, Debug, Default)]
pub(crate) struct EnemyRegistry {
    entries: Vec<EnemyState>,
    next_id: u32,
}

impl EnemyRegistry {
    fn spawn_one(
        &mut self,
        variant: EnemyVariant,
        position: LanePoint,
        out_events: &mut Vec<Event>,
    ) {
        let id = EnemyId::new(self.next_id);
        self.next_id += 1;
        self.entries.push(EnemyState {
            id,
            variant,
            position,
            // Enemies face backward down the lane toward the approaching crowd.
            heading: std::f32::consts::PI,
            health: variant.profile().max_health,
            alive: true,
            flash: Duration::ZERO,
            corpse: None,
            cue: CueTrack::default(),
        });
        out_events.push(Event::EnemySpawned {
            enemy: id,
            variant,
            position,
        });
    }

    /// Spawns a row of normal enemies centered on the lane midline.
    pub(crate) fn spawn_wave(
        &mut self,
        wave: WaveId,
        line_z: f32,
        count: u32,
        config: &Config,
        out_events: &mut Vec<Event>,
    ) {
        let half = (count.saturating_sub(1)) as f32 / 2.0;
        for index in 0..count {
            let offset = (index as f32 - half) * config.enemy_spacing;
            let x = config.lane.clamp_x(offset);
            self.spawn_one(EnemyVariant::Normal, LanePoint::new(x, line_z), out_events);
        }
        out_events.push(Event::WaveSpawned { wave, size: count });
    }

    /// Spawns a single boss on the lane midline.
    pub(crate) fn spawn_boss(&mut self, wave: WaveId, line_z: f32, out_events: &mut Vec<Event>) {
        self.spawn_one(EnemyVariant::Boss, LanePoint::new(0.0, line_z), out_events);
        out_events.push(Event::WaveSpawned { wave, size: 1 });
    }

    fn entry_mut(&mut self, enemy: EnemyId) -> Option<&mut EnemyState> {
        self.entries.iter_mut().find(|entry| entry.id == enemy)
    }

    pub(crate) fn is_alive(&self, enemy: EnemyId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.id == enemy && entry.alive)
    }

    pub(crate) fn variant_of(&self, enemy: EnemyId) -> Option<EnemyVariant> {
        self.entries
            .iter()
            .find(|entry| entry.id == enemy)
            .map(|entry| entry.variant)
    }

    /// Positions of live enemies in identifier order.
    pub(crate) fn alive_positions(&self) -> Vec<(EnemyId, LanePoint)> {
        self.entries
            .iter()
            .filter(|entry| entry.alive)
            .map(|entry| (entry.id, entry.position))
            .collect()
    }

    /// Repositions a live enemy; corpses stay where they fell.
    pub(crate) fn set_position(&mut self, enemy: EnemyId, to: LanePoint, heading: f32) {
        if let Some(entry) = self.entry_mut(enemy) {
            if entry.alive {
                entry.position = to;
                entry.heading = heading;
            }
        }
    }

    /// Applies projectile damage to a live enemy.
    ///
    /// Dead enemies absorb nothing, so a burst of hits landing on the same
    /// tick cannot kill twice.
    pub(crate) fn take_damage(
        &mut self,
        enemy: EnemyId,
        amount: f32,
        config: &Config,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let corpse_linger = config.corpse_linger;
        let damage_flash = config.damage_flash;
        let Some(entry) = self.entry_mut(enemy) else {
            return false;
        };
        if !entry.alive {
            return false;
        }

        entry.health = (entry.health - amount).max(0.0);
        entry.flash = damage_flash;
        out_events.push(Event::EnemyDamaged {
            enemy,
            remaining: entry.health,
        });

        if entry.health <= 0.0 {
            entry.alive = false;
            entry.corpse = Some(corpse_linger);
            entry.cue.trigger(CueName::Dead, corpse_linger);
            out_events.push(Event::EnemyDied { enemy });
        }
        true
    }

    /// Starts the strike flourish on a live enemy.
    pub(crate) fn mark_striking(&mut self, enemy: EnemyId, config: &Config) {
        let strike_cue = config.strike_cue;
        if let Some(entry) = self.entry_mut(enemy) {
            if entry.alive {
                entry.cue.trigger(CueName::Attacking, strike_cue);
            }
        }
    }

    /// Advances flash timers, cue playback, and corpse linger by one tick,
    /// dropping corpses whose linger expired.
    pub(crate) fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for entry in &mut self.entries {
            entry.flash = entry.flash.saturating_sub(dt);
            entry.cue.advance(dt);
            if let Some(linger) = entry.corpse.as_mut() {
                *linger = linger.saturating_sub(dt);
            }
        }

        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].corpse == Some(Duration::ZERO) {
                let removed = self.entries.remove(index);
                out_events.push(Event::EnemyRemoved { enemy: removed.id });
            } else {
                index += 1;
            }
        }
    }

    pub(crate) fn snapshots(&self) -> Vec<EnemySnapshot> {
        self.entries
            .iter()
            .map(|entry| EnemySnapshot {
                id: entry.id,
                variant: entry.variant,
                position: entry.position,
                heading: entry.heading,
                health: entry.health,
                max_health: entry.variant.profile().max_health,
                alive: entry.alive,
                flashing: !entry.flash.is_zero(),
            })
            .collect()
    }
}
