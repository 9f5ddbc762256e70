//! Host controller to arcade control panel remapping

use crate::memory::{ANALOG_CALIBRATION_ADDRESS, ANALOG_CHANNELS, ArcadeMemory};
use bincode::{Decode, Encode};
use shim_common::frontend::HostInputState;
use shim_config::{ArcadeSwitch, HostButton, ServiceSwitchMode, ShimConfig};

const DIGITAL_MAPPING: [(HostButton, ArcadeSwitch); 6] = [
    (HostButton::A, ArcadeSwitch::Throw),
    (HostButton::B, ArcadeSwitch::AuxCoin),
    (HostButton::X, ArcadeSwitch::LeftCoin),
    (HostButton::Y, ArcadeSwitch::RightCoin),
    (HostButton::Back, ArcadeSwitch::Start2),
    (HostButton::Start, ArcadeSwitch::Start1),
];

const SERVICE_BUTTON: HostButton = HostButton::L;

// Channels 0 and 2 are not wired to the stick
const NEUTRAL_ANALOG: [u8; ANALOG_CHANNELS] = [0x7F, 0x7F, 0x80, 0x80];

const VERTICAL_CHANNEL: usize = 1;
const HORIZONTAL_CHANNEL: usize = 3;

const ANALOG_READ_IDLE: u16 = 0xFF7F;

// Min/max pairs for both stick axes: the full converter range
const FORCED_CALIBRATION: [u16; 4] = [0x0000, 0x00FF, 0x0000, 0x00FF];

/// Control panel state as seen by the arcade program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct ArcadeInputs {
    /// Active-low switch byte
    pub digital: u8,
    pub analog: [u8; ANALOG_CHANNELS],
}

impl Default for ArcadeInputs {
    fn default() -> Self {
        Self { digital: 0xFF, analog: NEUTRAL_ANALOG }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct InputState {
    buttons_down: u16,
    buttons_toggled: u16,
}

/// Convert a signed stick reading to the converter scale: centered at 0x7F, with the axis
/// direction inverted.
fn stick_to_channel(reading: i8) -> u8 {
    (0x7F - i16::from(reading)) as u8
}

impl InputState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remap one host poll into arcade control state, updating the edge-triggered toggles.
    pub fn sample(&mut self, host: HostInputState, config: &ShimConfig) -> ArcadeInputs {
        let buttons = host.buttons;
        let pressed = buttons & !self.buttons_down;
        self.buttons_down = buttons;
        self.buttons_toggled ^= pressed;

        let mut digital = 0xFF_u8;
        for (button, switch) in DIGITAL_MAPPING {
            if button.is_pressed(buttons) {
                digital &= !(1 << switch.bit());
            }
        }

        let service_closed = match config.service_switch {
            ServiceSwitchMode::Toggle => SERVICE_BUTTON.is_pressed(self.buttons_toggled),
            ServiceSwitchMode::Hold => SERVICE_BUTTON.is_pressed(buttons),
        };
        if service_closed {
            digital &= !(1 << ArcadeSwitch::Service.bit());
        }

        // Digital directions pin a channel to one of its rails
        let rail = |high: HostButton, low: HostButton| {
            if !config.dpad_overrides_analog {
                None
            } else if high.is_pressed(buttons) {
                Some(0xFF)
            } else if low.is_pressed(buttons) {
                Some(0x00)
            } else {
                None
            }
        };

        let mut analog = NEUTRAL_ANALOG;
        analog[HORIZONTAL_CHANNEL] = rail(HostButton::Left, HostButton::Right)
            .unwrap_or_else(|| stick_to_channel(host.axis_h));
        analog[VERTICAL_CHANNEL] = rail(HostButton::Up, HostButton::Down)
            .unwrap_or_else(|| stick_to_channel(host.axis_v));

        ArcadeInputs { digital, analog }
    }

    /// Write remapped inputs into the arcade's input latches.
    ///
    /// The analog converter latch answers whichever channel conversions were requested since the
    /// last frame, clearing the request strobes; if several were requested the highest channel
    /// wins.
    pub fn publish(inputs: ArcadeInputs, arcade: &mut ArcadeMemory, config: &ShimConfig) {
        arcade.digital_read = inputs.digital.into();

        arcade.analog_read = ANALOG_READ_IDLE;
        for (select, &value) in arcade.analog_select.iter_mut().zip(&inputs.analog) {
            if *select != 0 {
                *select = 0;
                arcade.analog_read = 0xFF00 | u16::from(value);
            }
        }

        if config.force_analog_calibration {
            let start = ANALOG_CALIBRATION_ADDRESS >> 1;
            arcade.program_ram[start..start + FORCED_CALIBRATION.len()]
                .copy_from_slice(&FORCED_CALIBRATION);
        }
    }

    pub fn update(
        &mut self,
        host: HostInputState,
        config: &ShimConfig,
        arcade: &mut ArcadeMemory,
    ) -> ArcadeInputs {
        let inputs = self.sample(host, config);
        Self::publish(inputs, arcade, config);
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn host(buttons: &[HostButton]) -> HostInputState {
        HostInputState {
            buttons: buttons.iter().fold(0, |acc, button| acc | button.mask()),
            ..HostInputState::default()
        }
    }

    #[test]
    fn idle_controller() {
        let mut state = InputState::new();
        let inputs = state.sample(HostInputState::default(), &ShimConfig::default());
        assert_eq!(inputs, ArcadeInputs { digital: 0xFF, analog: [0x7F, 0x7F, 0x80, 0x7F] });
    }

    #[test]
    fn digital_switches_are_active_low() {
        let mut state = InputState::new();
        let config = ShimConfig::default();

        let cases = [
            (HostButton::A, 5),
            (HostButton::B, 4),
            (HostButton::X, 0),
            (HostButton::Y, 1),
            (HostButton::Back, 3),
            (HostButton::Start, 2),
        ];
        for (button, bit) in cases {
            let inputs = state.sample(host(&[button]), &config);
            assert_eq!(inputs.digital, !(1 << bit), "{button:?}");
        }

        let inputs = state.sample(host(&[HostButton::A, HostButton::Start]), &config);
        assert_eq!(inputs.digital, !((1 << 5) | (1 << 2)));
    }

    #[test]
    fn service_toggles_on_rising_edge() {
        let mut state = InputState::new();
        let config = ShimConfig::default();
        let service_open = |inputs: ArcadeInputs| inputs.digital & 0x80 != 0;

        assert!(service_open(state.sample(host(&[]), &config)));
        assert!(!service_open(state.sample(host(&[HostButton::L]), &config)));
        // Held: stays toggled, no further edge
        assert!(!service_open(state.sample(host(&[HostButton::L]), &config)));
        assert!(!service_open(state.sample(host(&[]), &config)));
        // Second press toggles back
        assert!(service_open(state.sample(host(&[HostButton::L]), &config)));
        assert!(service_open(state.sample(host(&[]), &config)));
    }

    #[test]
    fn service_hold_mode_follows_level() {
        let mut state = InputState::new();
        let config = ShimConfig { service_switch: ServiceSwitchMode::Hold, ..ShimConfig::default() };

        assert_eq!(state.sample(host(&[HostButton::L]), &config).digital, 0x7F);
        assert_eq!(state.sample(host(&[HostButton::L]), &config).digital, 0x7F);
        assert_eq!(state.sample(host(&[]), &config).digital, 0xFF);
    }

    #[test]
    fn proportional_axes_are_inverted_around_7f() {
        let mut state = InputState::new();
        let config = ShimConfig::default();

        for (reading, expected) in [(0, 0x7F), (1, 0x7E), (-1, 0x80), (127, 0x00), (-128, 0xFF)] {
            let inputs =
                state.sample(HostInputState { buttons: 0, axis_h: reading, axis_v: reading }, &config);
            assert_eq!(inputs.analog[HORIZONTAL_CHANNEL], expected, "h {reading}");
            assert_eq!(inputs.analog[VERTICAL_CHANNEL], expected, "v {reading}");
        }
    }

    #[test]
    fn dpad_pins_axes_to_rails() {
        let mut state = InputState::new();
        let config = ShimConfig::default();
        let with_stick = |buttons: &[HostButton]| HostInputState { axis_h: 40, axis_v: -40, ..host(buttons) };

        let inputs = state.sample(with_stick(&[HostButton::Left, HostButton::Up]), &config);
        assert_eq!(inputs.analog, [0x7F, 0xFF, 0x80, 0xFF]);

        let inputs = state.sample(with_stick(&[HostButton::Right, HostButton::Down]), &config);
        assert_eq!(inputs.analog, [0x7F, 0x00, 0x80, 0x00]);

        // Left beats right, up beats down
        let all = [HostButton::Left, HostButton::Right, HostButton::Up, HostButton::Down];
        let inputs = state.sample(with_stick(&all), &config);
        assert_eq!(inputs.analog, [0x7F, 0xFF, 0x80, 0xFF]);

        let config = ShimConfig { dpad_overrides_analog: false, ..config };
        let inputs = state.sample(with_stick(&[HostButton::Left, HostButton::Up]), &config);
        assert_eq!(inputs.analog, [0x7F, 0x7F + 40, 0x80, 0x7F - 40]);
    }

    #[test]
    fn publish_answers_requested_channels() {
        let mut arcade = ArcadeMemory::new();
        let config = ShimConfig::default();
        let inputs = ArcadeInputs { digital: 0xDF, analog: [0x11, 0x22, 0x33, 0x44] };

        InputState::publish(inputs, &mut arcade, &config);
        assert_eq!(arcade.digital_read, 0x00DF);
        assert_eq!(arcade.analog_read, 0xFF7F);

        arcade.analog_select = [0, 1, 0, 0];
        InputState::publish(inputs, &mut arcade, &config);
        assert_eq!(arcade.analog_read, 0xFF22);
        assert_eq!(arcade.analog_select, [0; 4]);

        arcade.analog_select = [1, 0, 0, 1];
        InputState::publish(inputs, &mut arcade, &config);
        assert_eq!(arcade.analog_read, 0xFF44);
        assert_eq!(arcade.analog_select, [0; 4]);
    }

    #[test]
    fn calibration_is_forced_every_frame() {
        let mut arcade = ArcadeMemory::new();
        let start = ANALOG_CALIBRATION_ADDRESS >> 1;
        arcade.program_ram[start..start + 4].copy_from_slice(&[0x40, 0x90, 0x38, 0xA0]);

        let mut state = InputState::new();
        state.update(HostInputState::default(), &ShimConfig::default(), &mut arcade);
        assert_eq!(&arcade.program_ram[start..start + 4], &[0x0000, 0x00FF, 0x0000, 0x00FF]);

        arcade.program_ram[start..start + 4].copy_from_slice(&[0x40, 0x90, 0x38, 0xA0]);
        let config = ShimConfig { force_analog_calibration: false, ..ShimConfig::default() };
        state.update(HostInputState::default(), &config, &mut arcade);
        assert_eq!(&arcade.program_ram[start..start + 4], &[0x40, 0x90, 0x38, 0xA0]);
    }
}
