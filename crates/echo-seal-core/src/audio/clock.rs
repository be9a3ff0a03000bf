use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

/// Period of one clock tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Whole-second elapsed counter for one recording.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordingClock {
    elapsed_secs: u64,
}

impl RecordingClock {
    /// A clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one second and return the new elapsed value.
    pub fn tick(&mut self) -> u64 {
        self.elapsed_secs += 1;
        self.elapsed_secs
    }

    /// Seconds counted so far.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Back to zero for a new recording.
    pub fn reset(&mut self) {
        self.elapsed_secs = 0;
    }
}

/// Format elapsed seconds as `MM:SS`.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Background ticker feeding a fresh [`RecordingClock`].
///
/// Runs independently of frame pacing; dropping the task discards the clock.
pub struct ClockTask {
    handle: JoinHandle<()>,
}

impl ClockTask {
    /// Tick every `period`, passing the elapsed count to `on_tick`.
    ///
    /// The first tick fires one full period after spawning. `on_tick`
    /// returns `false` to stop the clock.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(u64) -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut clock = RecordingClock::new();
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !on_tick(clock.tick()) {
                    break;
                }
            }
        });

        Self { handle }
    }
}

impl Drop for ClockTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
