use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning passed into the engine at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ticks per second; the frame interval is `1000ms / frame_rate`
    pub frame_rate: u32,
    /// Number of fruit kept on the board
    pub fruit_count: usize,
    /// Displayed score added for each fruit eaten
    pub points_per_fruit: u32,
    /// Seed for fruit placement. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: 2,
            fruit_count: 2,
            points_per_fruit: 1,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Highest accepted frame rate; anything above would truncate the interval to zero.
    pub const MAX_FRAME_RATE: u32 = 1000;

    /// Same defaults with a fixed fruit placement seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Minimum spacing between two executed ticks
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.frame_rate.max(1)))
    }

    /// How often the driver wakes up to attempt a tick
    pub fn poll_interval(&self) -> Duration {
        self.frame_interval() / 10
    }

    /// Check that all values are usable.
    ///
    /// Returns `Err(String)` describing the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_rate == 0 {
            return Err("frame_rate must be at least 1".to_string());
        }

        if self.frame_rate > Self::MAX_FRAME_RATE {
            return Err(format!(
                "frame_rate must be at most {}, got {}",
                Self::MAX_FRAME_RATE,
                self.frame_rate
            ));
        }

        if self.fruit_count == 0 {
            return Err("fruit_count must be at least 1".to_string());
        }

        if self.points_per_fruit == 0 {
            return Err("points_per_fruit must be at least 1".to_string());
        }

        Ok(())
    }
}
