//! Minimal animation-cue surface backing cooperative wait-for-condition
//! sequences.
//!
//! The host environment owns real animation playback; the simulation only
//! needs to trigger a named cue and later observe which state is active and
//! how far along it is. This board models that contract with fixed clip
//! durations so death sequences and strike flourishes stay deterministic.

use std::time::Duration;

/// Named animation cues the simulation can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CueName {
    /// Unit death playback.
    Death,
    /// Enemy melee strike flourish.
    Attacking,
    /// Enemy death playback.
    Dead,
}

#[derive(Clone, Copy, Debug)]
struct CuePlayback {
    name: CueName,
    elapsed: Duration,
    duration: Duration,
}

/// Per-instance cue playback track.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CueTrack {
    active: Option<CuePlayback>,
}

impl CueTrack {
    /// Starts the named cue, replacing any playback already in flight.
    pub(crate) fn trigger(&mut self, name: CueName, duration: Duration) {
        self.active = Some(CuePlayback {
            name,
            elapsed: Duration::ZERO,
            duration,
        });
    }

    /// Advances the active playback by the elapsed tick time.
    pub(crate) fn advance(&mut self, dt: Duration) {
        if let Some(playback) = self.active.as_mut() {
            playback.elapsed = playback.elapsed.saturating_add(dt);
        }
    }

    /// Name of the currently active state, if any.
    pub(crate) fn state(&self) -> Option<CueName> {
        self.active.map(|playback| playback.name)
    }

    /// Normalized progress of the active playback in `0.0..=1.0`.
    ///
    /// Reports zero when no cue is active; a finished cue holds at one the
    /// way an animator rests in its terminal state.
    pub(crate) fn normalized(&self) -> f32 {
        let Some(playback) = self.active else {
            return 0.0;
        };

        if playback.duration.is_zero() {
            return 1.0;
        }

        (playback.elapsed.as_secs_f32() / playback.duration.as_secs_f32()).min(1.0)
    }

    /// Clears the track for pooled reuse.
    pub(crate) fn rebind(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{CueName, CueTrack};
    use std::time::Duration;

    #[test]
    fn idle_track_reports_no_state() {
        let track = CueTrack::default();
        assert_eq!(track.state(), None);
        assert_eq!(track.normalized(), 0.0);
    }

    #[test]
    fn playback_progress_is_clamped() {
        let mut track = CueTrack::default();
        track.trigger(CueName::Death, Duration::from_secs(1));
        track.advance(Duration::from_millis(500));
        assert_eq!(track.state(), Some(CueName::Death));
        assert!((track.normalized() - 0.5).abs() < 1e-3);

        track.advance(Duration::from_secs(5));
        assert_eq!(track.normalized(), 1.0);
    }

    #[test]
    fn rebind_clears_playback() {
        let mut track = CueTrack::default();
        track.trigger(CueName::Dead, Duration::from_secs(1));
        track.rebind();
        assert_eq!(track.state(), None);
    }

    #[test]
    fn zero_length_cue_completes_immediately() {
        let mut track = CueTrack::default();
        track.trigger(CueName::Attacking, Duration::ZERO);
        assert_eq!(track.normalized(), 1.0);
    }
}
