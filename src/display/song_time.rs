//! Song progress readout (elapsed / remaining time).

use super::ThrottledProjection;
use crate::models::settings::DisplayConfig;

/// Live playback position as seen by the HUD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SongClock {
    /// Position in the song, in song milliseconds.
    pub time_ms: f64,
    /// Song length, in song milliseconds.
    pub length_ms: f64,
    /// Playback rate (1.0 = normal, 1.5 = 1.5x).
    pub rate: f64,
}

impl SongClock {
    fn effective_rate(&self) -> f64 {
        if self.rate > 0.0 { self.rate } else { 1.0 }
    }

    /// Wall-clock time played so far, never negative.
    pub fn elapsed_ms(&self) -> f64 {
        (self.time_ms / self.effective_rate()).max(0.0)
    }

    /// Wall-clock length of the whole song.
    pub fn total_ms(&self) -> f64 {
        (self.length_ms / self.effective_rate()).max(0.0)
    }

    /// Wall-clock time left. Clamped to zero when the clock runs past the end.
    pub fn remaining_ms(&self) -> f64 {
        (self.total_ms() - self.elapsed_ms()).max(0.0)
    }

    /// Progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let total = self.total_ms();
        if total > 0.0 {
            (self.elapsed_ms() / total).clamp(0.0, 1.0) as f32
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongTimeReadout {
    /// `mm:ss`
    pub elapsed: String,
    /// `-mm:ss`
    pub remaining: String,
    pub progress: f32,
}

pub fn format_time(ms: f64) -> String {
    let total_seconds = (ms / 1000.0).max(0.0) as u64;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

pub fn project_song_time(clock: &SongClock) -> SongTimeReadout {
    SongTimeReadout {
        elapsed: format_time(clock.elapsed_ms()),
        remaining: format!("-{}", format_time(clock.remaining_ms())),
        progress: clock.progress(),
    }
}

pub type SongTimeProjection =
    ThrottledProjection<SongClock, SongTimeReadout, fn(&SongClock) -> SongTimeReadout>;

pub fn song_time_projection(config: &DisplayConfig) -> SongTimeProjection {
    ThrottledProjection::new(
        config.projection_interval_ms,
        project_song_time as fn(&SongClock) -> SongTimeReadout,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(time_ms: f64, length_ms: f64, rate: f64) -> SongClock {
        SongClock {
            time_ms,
            length_ms,
            rate,
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(61_999.0), "01:01");
        assert_eq!(format_time(-500.0), "00:00");
        assert_eq!(format_time(3_725_000.0), "62:05");
    }

    #[test]
    fn test_rate_scaled_readout() {
        let readout = project_song_time(&clock(90_000.0, 180_000.0, 1.5));
        assert_eq!(readout.elapsed, "01:00");
        assert_eq!(readout.remaining, "-01:00");
        assert!((readout.progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_overshoot_clamps_remaining() {
        let readout = project_song_time(&clock(200_000.0, 180_000.0, 1.0));
        assert_eq!(readout.remaining, "-00:00");
        assert_eq!(readout.progress, 1.0);
    }

    #[test]
    fn test_lead_in_shows_zero() {
        let readout = project_song_time(&clock(-2_000.0, 60_000.0, 1.0));
        assert_eq!(readout.elapsed, "00:00");
        assert_eq!(readout.remaining, "-01:00");
        assert_eq!(readout.progress, 0.0);
    }

    #[test]
    fn test_projection_updates_once_per_second() {
        let mut projection = song_time_projection(&DisplayConfig::default());

        let (first, recomputed) = projection.maybe_project(0.0, &clock(0.0, 60_000.0, 1.0));
        assert!(recomputed);
        assert_eq!(first.elapsed, "00:00");

        let (same, recomputed) = projection.maybe_project(900.0, &clock(5_000.0, 60_000.0, 1.0));
        assert!(!recomputed);
        assert_eq!(same.elapsed, "00:00");

        let (next, recomputed) = projection.maybe_project(1000.0, &clock(5_000.0, 60_000.0, 1.0));
        assert!(recomputed);
        assert_eq!(next.elapsed, "00:05");
    }
}
