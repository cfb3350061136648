/// Maps timestamps from the host (e.g. a display's frame callback) to simulation time,
/// with support for pausing and resuming.
///
/// Simulation time only passes while the clock is playing. After a stop and restart
/// it continues from where it was stopped, so the frame bounds it produces
/// are always increasing and can be passed straight to
/// [`Physics::advance`][crate::physics::Physics::advance].
///
/// All times are in seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaybackClock {
    /// Host time at which simulation time 0 happened (or would have, given pauses).
    start_time: f64,
    /// Host time at which the clock was last stopped.
    stop_time: Option<f64>,
    /// Simulation time rendered up to.
    render_time: f64,
    playing: bool,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or resume playback at the given host time. Does nothing if already playing.
    pub fn start(&mut self, host_time: f64) {
        if self.playing {
            return;
        }
        self.start_time = host_time - self.render_time;
        self.stop_time = None;
        self.playing = true;
        log::debug!("Playback started at sim time {}", self.render_time);
    }

    /// Pause playback. Simulation time stays at the last produced frame.
    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        self.stop_time = Some(self.start_time + self.render_time);
        self.playing = false;
        log::debug!("Playback stopped at sim time {}", self.render_time);
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Simulation time that has been handed out in frames so far.
    #[inline]
    pub fn render_time(&self) -> f64 {
        self.render_time
    }

    /// Simulation time corresponding to a host time.
    /// Times after the clock was stopped map to the time it was stopped at.
    pub fn sim_time_at(&self, host_time: f64) -> f64 {
        match self.stop_time {
            Some(stop) if host_time > stop => self.render_time,
            _ if !self.playing => self.render_time,
            _ => host_time - self.start_time,
        }
    }

    /// Host time corresponding to a simulation time, e.g. for scheduling a sound
    /// to play exactly when a collision happened.
    pub fn host_time_at(&self, sim_time: f64) -> f64 {
        let host_time = self.start_time + sim_time;
        match self.stop_time {
            Some(stop) if host_time > stop => stop,
            _ => host_time,
        }
    }

    /// Produce the simulation interval for a frame rendered at `host_time`.
    ///
    /// Returns `None` if the clock isn't playing or no time has passed
    /// since the previous frame, in which case nothing needs to be simulated.
    pub fn frame(&mut self, host_time: f64) -> Option<(f64, f64)> {
        if !self.playing {
            return None;
        }
        let t0 = self.render_time;
        let t1 = host_time - self.start_time;
        if t1 <= t0 {
            return None;
        }
        self.render_time = t1;
        Some((t0, t1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_follow_host_time() {
        let mut clock = PlaybackClock::new();
        assert_eq!(clock.frame(1.0), None);

        clock.start(10.0);
        assert!(clock.is_playing());
        assert_eq!(clock.frame(10.5), Some((0.0, 0.5)));
        assert_eq!(clock.frame(11.0), Some((0.5, 1.0)));
        // stale or repeated timestamps produce nothing
        assert_eq!(clock.frame(11.0), None);
        assert_eq!(clock.frame(10.8), None);
        assert_eq!(clock.sim_time_at(12.0), 2.0);
        assert_eq!(clock.host_time_at(0.25), 10.25);
    }

    #[test]
    fn pause_and_resume() {
        let mut clock = PlaybackClock::new();
        clock.start(0.0);
        assert_eq!(clock.frame(2.0), Some((0.0, 2.0)));
        clock.stop();
        assert!(!clock.is_playing());
        assert_eq!(clock.frame(3.0), None);
        assert_eq!(clock.sim_time_at(5.0), 2.0);
        assert_eq!(clock.host_time_at(3.0), 2.0);

        // resuming much later continues from the stopped time
        clock.start(100.0);
        assert_eq!(clock.frame(101.0), Some((2.0, 3.0)));
        assert_eq!(clock.host_time_at(2.5), 100.5);

        // starting twice doesn't reset anything
        clock.start(200.0);
        assert_eq!(clock.frame(102.0), Some((3.0, 4.0)));
    }
}
