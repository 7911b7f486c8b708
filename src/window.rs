//! Daily time window (minutes since midnight).

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayWindow {
    /// Start of the day, minutes since midnight.
    pub start: u32,
    /// End of the day, minutes since midnight.
    pub end: u32,
}

impl DayWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Parse a pair of `"HH:MM"` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: parse_clock(start)?,
            end: parse_clock(end)?,
        })
    }

    /// Budget for travel and visits. An inverted window has no budget.
    pub fn length(&self) -> f64 {
        f64::from(self.end.saturating_sub(self.start))
    }
}

impl Default for DayWindow {
    fn default() -> Self {
        // 09:00 - 19:00
        Self::new(9 * 60, 19 * 60)
    }
}

/// Parse `"HH:MM"` into minutes since midnight. Out-of-range parts are
/// clamped (hours to 0..=23, minutes to 0..=59) rather than rejected, and
/// a trailing seconds part (`"HH:MM:SS"`) is ignored.
pub fn parse_clock(value: &str) -> Result<u32> {
    let invalid = || PlannerError::InvalidTime(value.to_string());

    let mut parts = value.trim().split(':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let hours: i64 = hours.trim().parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.trim().parse().map_err(|_| invalid())?;

    let total = hours.clamp(0, 23) * 60 + minutes.clamp(0, 59);
    u32::try_from(total).map_err(|_| invalid())
}
