//! Module Exports
//!
//! This file exports the motor control layer of the boat.
//!
//! - `h_bridge`: the two-motor H-bridge driver with overdrive sequencing.
//!
//! It also defines `BoatCommand`, the JSON command set, and `BoatController`,
//! which dispatches commands to the driver.

/// Module for the H-bridge motor driver.
pub mod h_bridge;

use embedded_hal::{delay::DelayNs, digital::OutputPin, pwm::SetDutyCycle};
use serde::{Deserialize, Serialize};

pub use h_bridge::{BridgeError, HBridge, Motor, MotorState};

use crate::utils::math::{
    drive::DriverConfig,
    mixing::{JoystickMixer, MixerConfig, MixingAlgorithm},
};

/// Boat command variants.
///
/// Serialized as JSON with tag `"bc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "bc", rename_all = "snake_case")] // bc = boat command
pub enum BoatCommand {
    /// One drive tick with left/right speeds in percent.
    Drive { l: i8, r: i8 },
    /// Joystick axes in ±100, mixed into left/right speeds.
    Joystick { x: i8, y: i8 },
    /// Immediate stop of both motors.
    Stop,
    /// Set the duty floor (0..=255).
    MinimumDuty { v: u8 },
    /// Set the longest overdrive delay in milliseconds.
    OverBoost { ms: u8 },
    /// Replace both driver tunables at once.
    Configure { c: DriverConfig },
    /// Select the mixing algorithm and optionally its threshold angle.
    Mixing { m: MixingAlgorithm, a: Option<u8> },
}

impl BoatCommand {
    /// Decode a command from its JSON form, e.g. `{"bc":"drive","l":50,"r":-20}`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Owns the H-bridge driver and the joystick mixer feeding it.
pub struct BoatController<PWM, DIR, DELAY> {
    pub bridge: HBridge<PWM, DIR, DELAY>,
    mixer: JoystickMixer,
}

impl<PWM, DIR, DELAY, PwmE, PinE> BoatController<PWM, DIR, DELAY>
where
    PWM: SetDutyCycle<Error = PwmE>,
    DIR: OutputPin<Error = PinE>,
    DELAY: DelayNs,
    PwmE: core::fmt::Debug,
    PinE: core::fmt::Debug,
{
    pub fn new(
        bridge: HBridge<PWM, DIR, DELAY>,
        mixer: Option<MixerConfig>,
    ) -> Self {
        BoatController {
            bridge,
            mixer: JoystickMixer::new(mixer.unwrap_or_default()),
        }
    }

    /// Build a controller straight from the four motor outputs.
    pub fn from_outputs(
        left_pwm: PWM,
        left_direction: DIR,
        right_pwm: PWM,
        right_direction: DIR,
        delay: DELAY,
        driver: Option<DriverConfig>,
        mixer: Option<MixerConfig>,
    ) -> Self {
        let bridge = HBridge::with_config(
            left_pwm,
            left_direction,
            right_pwm,
            right_direction,
            delay,
            driver.unwrap_or_default(),
        );
        Self::new(bridge, mixer)
    }

    pub fn mixer(&self) -> &JoystickMixer {
        &self.mixer
    }

    /// Execute a `BoatCommand`, blocking until any resulting drive tick completed.
    pub fn execute_command(
        &mut self,
        command: BoatCommand,
    ) -> Result<(), BridgeError<PwmE, PinE>> {
        match command {
            BoatCommand::Drive { l, r } => self.bridge.drive(l, r),
            BoatCommand::Joystick { x, y } => {
                let (l, r) = self.mixer.convert(x, y);
                tracing::debug!(x, y, l, r, "joystick mixed");
                self.bridge.drive(l, r)
            }
            BoatCommand::Stop => self.bridge.stop(),
            BoatCommand::MinimumDuty { v } => {
                self.bridge.set_minimum_duty(v);
                Ok(())
            }
            BoatCommand::OverBoost { ms } => {
                self.bridge.set_over_boost_delay_limit(ms);
                Ok(())
            }
            BoatCommand::Configure { c } => {
                self.bridge.set_config(c);
                Ok(())
            }
            BoatCommand::Mixing { m, a } => {
                self.mixer.set_algorithm(m);
                if let Some(angle) = a {
                    self.mixer.set_threshold_angle(angle);
                }
                tracing::info!(config = ?self.mixer.config(), "mixing updated");
                Ok(())
            }
        }
    }
}
