use serde::{Deserialize, Serialize};

/// Elapsed-seconds counter driven by external ticks.
///
/// The stored value is unbounded; clamping for fixed-width display is up to
/// the presentation layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    elapsed_secs: u32,
    running: bool,
}

impl Clock {
    pub const fn new() -> Self {
        Self {
            elapsed_secs: 0,
            running: false,
        }
    }

    pub const fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("Clock started at {}s", self.elapsed_secs);
            self.running = true;
        }
    }

    /// Keeps the elapsed time so the final value stays readable.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Clock stopped at {}s", self.elapsed_secs);
            self.running = false;
        }
    }

    /// Advances one second, ignored while stopped.
    pub fn tick(&mut self) {
        if self.running {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
