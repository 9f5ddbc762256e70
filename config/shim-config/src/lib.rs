use bincode::{Decode, Encode};
use shim_proc_macros::{ConfigDisplay, EnumAll, EnumDisplay, EnumFromStr};

/// How the host L button drives the arcade service switch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode, EnumDisplay, EnumFromStr, EnumAll,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(shim_proc_macros::CustomValueEnum))]
pub enum ServiceSwitchMode {
    /// Each press flips the switch; the arcade sees a latching switch
    #[default]
    Toggle,
    /// The switch is closed only while the button is held
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, ConfigDisplay)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShimConfig {
    /// Overwrite the arcade program's analog calibration block every frame
    pub force_analog_calibration: bool,
    /// D-pad directions pin the analog channels to their rails
    pub dpad_overrides_analog: bool,
    pub service_switch: ServiceSwitchMode,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            force_analog_calibration: true,
            dpad_overrides_analog: true,
            service_switch: ServiceSwitchMode::default(),
        }
    }
}

/// Host controller buttons, as reported in the host's digital bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, EnumAll)]
pub enum HostButton {
    Up,
    Right,
    Down,
    Left,
    A,
    B,
    X,
    Y,
    Back,
    Start,
    L,
}

impl HostButton {
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u16 {
        match self {
            Self::Up => 1 << 0,
            Self::Right => 1 << 1,
            Self::Down => 1 << 2,
            Self::Left => 1 << 3,
            Self::A => 1 << 4,
            Self::B => 1 << 5,
            Self::X => 1 << 6,
            Self::Y => 1 << 7,
            Self::Back => 1 << 8,
            Self::Start => 1 << 9,
            Self::L => 1 << 10,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_pressed(self, buttons: u16) -> bool {
        buttons & self.mask() != 0
    }
}

/// Switches in the arcade's active-low digital input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub enum ArcadeSwitch {
    LeftCoin,
    RightCoin,
    Start1,
    Start2,
    AuxCoin,
    Throw,
    Service,
}

impl ArcadeSwitch {
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::LeftCoin => 0,
            Self::RightCoin => 1,
            Self::Start1 => 2,
            Self::Start2 => 3,
            Self::AuxCoin => 4,
            Self::Throw => 5,
            Self::Service => 7,
        }
    }
}
