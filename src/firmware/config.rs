#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    clock::{
        button::{LONG_HOLD_THRESHOLD, SHORT_PRESS_LIMIT},
        tempo::DEFAULT_HALF_PERIOD_MS,
    },
    events::queue::{DEFAULT_CAPACITY, DEFAULT_RESERVE},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("timer period `{0}` must be at least 1 ms")]
    ZeroPeriod(&'static str),

    #[error("event queue capacity must be at least 1")]
    ZeroCapacity,

    #[error("critical reserve ({reserve}) must be smaller than the queue capacity ({capacity})")]
    ReserveTooLarge { reserve: usize, capacity: usize },

    #[error("short press limit ({short}) must be below the long hold threshold ({hold})")]
    PressThresholds { short: u16, hold: u16 },
}

/// Firmware timing and sizing. All periods in milliseconds; button
/// thresholds in button-poll ticks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Internal clock half-period before the knob is first read
    pub initial_half_period_ms: u32,
    pub button_poll_ms: u32,
    pub knob_poll_ms: u32,
    pub grid_poll_ms: u32,
    pub grid_refresh_ms: u32,
    pub short_press_limit: u16,
    pub long_hold_threshold: u16,
    /// Slots per event queue lane
    pub queue_capacity: usize,
    /// Slots per lane kept free for clock edges
    pub queue_reserve: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            initial_half_period_ms: DEFAULT_HALF_PERIOD_MS,
            button_poll_ms: 50,
            knob_poll_ms: 100,
            grid_poll_ms: 20,
            grid_refresh_ms: 30,
            short_press_limit: SHORT_PRESS_LIMIT,
            long_hold_threshold: LONG_HOLD_THRESHOLD,
            queue_capacity: DEFAULT_CAPACITY,
            queue_reserve: DEFAULT_RESERVE,
        }
    }

    pub fn initial_half_period_ms(mut self, ms: u32) -> Self {
        self.initial_half_period_ms = ms;
        self
    }

    pub fn button_poll_ms(mut self, ms: u32) -> Self {
        self.button_poll_ms = ms;
        self
    }

    pub fn knob_poll_ms(mut self, ms: u32) -> Self {
        self.knob_poll_ms = ms;
        self
    }

    pub fn grid_poll_ms(mut self, ms: u32) -> Self {
        self.grid_poll_ms = ms;
        self
    }

    pub fn grid_refresh_ms(mut self, ms: u32) -> Self {
        self.grid_refresh_ms = ms;
        self
    }

    pub fn press_thresholds(mut self, short_press_limit: u16, long_hold_threshold: u16) -> Self {
        self.short_press_limit = short_press_limit;
        self.long_hold_threshold = long_hold_threshold;
        self
    }

    pub fn queue(mut self, capacity: usize, reserve: usize) -> Self {
        self.queue_capacity = capacity;
        self.queue_reserve = reserve;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("initial_half_period_ms", self.initial_half_period_ms),
            ("button_poll_ms", self.button_poll_ms),
            ("knob_poll_ms", self.knob_poll_ms),
            ("grid_poll_ms", self.grid_poll_ms),
            ("grid_refresh_ms", self.grid_refresh_ms),
        ];
        if let Some(&(name, _)) = periods.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::ZeroPeriod(name));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.queue_reserve >= self.queue_capacity {
            return Err(ConfigError::ReserveTooLarge {
                reserve: self.queue_reserve,
                capacity: self.queue_capacity,
            });
        }
        if self.short_press_limit >= self.long_hold_threshold {
            return Err(ConfigError::PressThresholds {
                short: self.short_press_limit,
                hold: self.long_hold_threshold,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            Config::default().knob_poll_ms(0).validate(),
            Err(ConfigError::ZeroPeriod("knob_poll_ms"))
        );
        assert_eq!(
            Config::default().queue(0, 0).validate(),
            Err(ConfigError::ZeroCapacity)
        );
        assert_eq!(
            Config::default().queue(4, 4).validate(),
            Err(ConfigError::ReserveTooLarge {
                reserve: 4,
                capacity: 4
            })
        );
        assert!(matches!(
            Config::default().press_thresholds(20, 10).validate(),
            Err(ConfigError::PressThresholds { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{ "knob_poll_ms": 250 }"#).unwrap();
        assert_eq!(config.knob_poll_ms, 250);
        assert_eq!(config.button_poll_ms, 50);
    }
}
