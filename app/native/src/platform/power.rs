//! Battery-saver detection.

use starship_battery::units::ratio::percent;
use starship_battery::{Manager, State};

use super::PlatformError;

/// Source of the "battery saver" flag polled by the power watcher.
pub trait PowerSource: Send {
    /// Returns `true` while the machine should save power.
    ///
    /// # Errors
    ///
    /// Returns an error if the power state cannot be read.
    fn battery_saver_active(&self) -> Result<bool, PlatformError>;
}

/// [`PowerSource`] reading the first system battery.
///
/// Battery saver is considered active while discharging. With a non-zero
/// `threshold` it additionally requires the charge to be at or below that
/// percentage. Machines without a battery never enter battery saver.
#[derive(Debug, Clone, Copy)]
pub struct BatteryPower {
    threshold: u8,
}

impl BatteryPower {
    #[must_use]
    pub const fn new(threshold: u8) -> Self { Self { threshold } }
}

impl PowerSource for BatteryPower {
    fn battery_saver_active(&self) -> Result<bool, PlatformError> {
        let manager = Manager::new()
            .map_err(|e| PlatformError::Battery(format!("Manager init failed: {e}")))?;
        let mut batteries = manager
            .batteries()
            .map_err(|e| PlatformError::Battery(format!("Failed to list batteries: {e}")))?;

        let Some(battery) = batteries.next() else {
            return Ok(false);
        };
        let battery =
            battery.map_err(|e| PlatformError::Battery(format!("Failed to read battery: {e}")))?;

        Ok(is_battery_saver(
            battery.state(),
            battery.state_of_charge().get::<percent>(),
            self.threshold,
        ))
    }
}

/// Decides battery saver from a raw battery reading.
#[must_use]
pub fn is_battery_saver(state: State, charge_percent: f32, threshold: u8) -> bool {
    if !matches!(state, State::Discharging) {
        return false;
    }

    threshold == 0 || charge_percent <= f32::from(threshold)
}
