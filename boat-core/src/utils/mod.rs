//! Utility re-exports for the boat drive.
//!
//! - `controllers`: the H-bridge driver and the command dispatcher
//! - `math`: speed mapping, overdrive delay and joystick mixing

pub mod controllers;
pub mod math;

pub use controllers::{BoatCommand, BoatController, HBridge};
pub use math::drive::DriverConfig;
pub use math::mixing::{JoystickMixer, MixerConfig, MixingAlgorithm};
