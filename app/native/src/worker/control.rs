//! Control signals for the poll worker.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Messages the supervisor and watchers send to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// User pause.
    Pause,
    /// Clear the user pause.
    Resume,
    /// Flip the user pause.
    Toggle,
    /// Battery saver turned on or off.
    SetBatterySaver(bool),
    /// Stop so the supervisor can rebuild everything from fresh settings.
    Restart,
    /// Stop for good.
    Quit,
}

impl Control {
    /// Short name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Toggle => "toggle",
            Self::SetBatterySaver(true) => "battery-saver-on",
            Self::SetBatterySaver(false) => "battery-saver-off",
            Self::Restart => "restart",
            Self::Quit => "quit",
        }
    }
}

impl FromStr for Control {
    type Err = String;

    /// Parses a console command.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "toggle" => Ok(Self::Toggle),
            "restart" => Ok(Self::Restart),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!(
                "unknown command '{other}' (expected pause, resume, toggle, restart or quit)"
            )),
        }
    }
}

/// Effective pause state, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PauseState {
    Enabled,
    Paused,
    BatterySaver,
}

impl fmt::Display for PauseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Enabled => "enabled",
            Self::Paused => "paused",
            Self::BatterySaver => "paused (battery saver)",
        };
        f.write_str(label)
    }
}

/// How a control message changed the pause state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    EnteredPause,
    LeftPause,
}

/// The two independent pause conditions. The worker is paused while either
/// one holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseFlags {
    user: bool,
    battery_saver: bool,
}

impl PauseFlags {
    #[must_use]
    pub const fn new(user: bool) -> Self { Self { user, battery_saver: false } }

    #[must_use]
    pub const fn is_paused(self) -> bool { self.user || self.battery_saver }

    /// The user pause wins when both conditions hold.
    #[must_use]
    pub const fn state(self) -> PauseState {
        if self.user {
            PauseState::Paused
        } else if self.battery_saver {
            PauseState::BatterySaver
        } else {
            PauseState::Enabled
        }
    }

    /// Updates the flags. `Restart` and `Quit` leave them alone.
    pub fn apply(&mut self, control: Control) -> Transition {
        let was_paused = self.is_paused();

        match control {
            Control::Pause => self.user = true,
            Control::Resume => self.user = false,
            Control::Toggle => self.user = !self.user,
            Control::SetBatterySaver(active) => self.battery_saver = active,
            Control::Restart | Control::Quit => {}
        }

        match (was_paused, self.is_paused()) {
            (false, true) => Transition::EnteredPause,
            (true, false) => Transition::LeftPause,
            _ => Transition::Unchanged,
        }
    }
}
