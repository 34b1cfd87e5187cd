//! Joystick to differential-drive mixing.
//!
//! The joystick position is converted to polar form and the angle selects how
//! much of the magnitude goes to each motor. Pushing straight up drives both
//! motors forward, straight down drives both in reverse.
//!
//! # Example
//! ```rust
//! use boat_core::utils::math::mixing::{JoystickMixer, MixerConfig};
//! let mixer = JoystickMixer::new(MixerConfig::default());
//! assert_eq!(mixer.convert(0, 100), (100, 100));
//! ```

use core::f32::consts::PI;

use libm;
use serde::{Deserialize, Serialize};

use super::drive::{map_range, SPEED_LIMIT};

/// How the joystick angle is split between the two motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixingAlgorithm {
    /// Two linear segments split at 90°.
    Simple,
    /// Four linear segments around a threshold angle, with a pivot zone near
    /// the horizontal axis.
    Smooth,
}

/// Mixer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerConfig {
    pub algorithm: MixingAlgorithm,
    /// Threshold angle in degrees (0..=90) used by [`MixingAlgorithm::Smooth`].
    pub threshold_angle: u8,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            algorithm: MixingAlgorithm::Smooth,
            threshold_angle: 45,
        }
    }
}

/// Converts joystick axes (±100) into `(left, right)` speed percentages.
#[derive(Debug, Clone, Copy)]
pub struct JoystickMixer {
    config: MixerConfig,
}

impl JoystickMixer {
    pub fn new(config: MixerConfig) -> Self {
        let mut mixer = Self { config };
        mixer.set_threshold_angle(config.threshold_angle);
        mixer
    }

    pub fn config(&self) -> MixerConfig {
        self.config
    }

    pub fn set_algorithm(
        &mut self,
        algorithm: MixingAlgorithm,
    ) {
        self.config.algorithm = algorithm;
    }

    /// Set the smooth-mode threshold angle, capped at 90°.
    pub fn set_threshold_angle(
        &mut self,
        angle: u8,
    ) {
        self.config.threshold_angle = angle.min(90);
    }

    /// Convert joystick axes into left/right speeds in `[-100, 100]`.
    pub fn convert(
        &self,
        x: i8,
        y: i8,
    ) -> (i8, i8) {
        let (angle, magnitude) = Self::to_polar(x, y);
        self.polar_to_motors(angle, magnitude)
    }

    /// Joystick position as `(angle in whole degrees, magnitude capped at 100)`.
    ///
    /// The angle is in `[-180, 180]`, 0° pointing along +X, increasing CCW.
    pub fn to_polar(
        x: i8,
        y: i8,
    ) -> (i32, i32) {
        let (xf, yf) = (f32::from(x), f32::from(y));
        let angle = libm::roundf(libm::atan2f(yf, xf) * 180.0 / PI) as i32;
        let magnitude = libm::roundf(libm::sqrtf(xf * xf + yf * yf)) as i32;
        (angle, magnitude.min(i32::from(SPEED_LIMIT)))
    }

    fn polar_to_motors(
        &self,
        angle: i32,
        magnitude: i32,
    ) -> (i8, i8) {
        // Lower half plane mirrors onto the upper half with both motors reversed.
        let (angle, magnitude) = if angle < 0 {
            (-angle, -magnitude)
        } else {
            (angle, magnitude)
        };

        let (left, right) = match self.config.algorithm {
            MixingAlgorithm::Simple => Self::simple(angle),
            MixingAlgorithm::Smooth => self.smooth(angle),
        };

        (
            (left * magnitude / 100) as i8,
            (right * magnitude / 100) as i8,
        )
    }

    fn simple(angle: i32) -> (i32, i32) {
        if angle < 90 {
            (100, map_range(angle, 0, 90, 0, 100))
        } else if angle < 180 {
            (map_range(angle, 90, 180, 100, 0), 100)
        } else {
            (0, 0)
        }
    }

    fn smooth(
        &self,
        angle: i32,
    ) -> (i32, i32) {
        let t = i32::from(self.config.threshold_angle);
        if angle > 180 - t {
            (0, map_range(angle, 180 - t, 180, 100, 0))
        } else if angle > 90 {
            (map_range(angle, 90, 180 - t, 100, 0), 100)
        } else if angle > 90 - t {
            (100, map_range(angle, 90 - t, 90, 0, 100))
        } else {
            (map_range(angle, 0, 90 - t, 0, 100), 0)
        }
    }
}

impl Default for JoystickMixer {
    fn default() -> Self {
        Self::new(MixerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> JoystickMixer {
        JoystickMixer::new(MixerConfig {
            algorithm: MixingAlgorithm::Simple,
            threshold_angle: 45,
        })
    }

    #[test]
    fn test_to_polar() {
        assert_eq!(JoystickMixer::to_polar(100, 0), (0, 100));
        assert_eq!(JoystickMixer::to_polar(0, 100), (90, 100));
        assert_eq!(JoystickMixer::to_polar(0, -50), (-90, 50));
        // diagonal is capped
        assert_eq!(JoystickMixer::to_polar(100, 100), (45, 100));
    }

    #[test]
    fn test_centered_stick_is_still() {
        assert_eq!(JoystickMixer::default().convert(0, 0), (0, 0));
        assert_eq!(simple().convert(0, 0), (0, 0));
    }

    #[test]
    fn test_straight_ahead_and_back() {
        for mixer in [JoystickMixer::default(), simple()] {
            assert_eq!(mixer.convert(0, 100), (100, 100));
            assert_eq!(mixer.convert(0, -100), (-100, -100));
            assert_eq!(mixer.convert(0, 50), (50, 50));
        }
    }

    #[test]
    fn test_simple_turns() {
        let mixer = simple();
        // hard right: left motor only
        assert_eq!(mixer.convert(100, 0), (100, 0));
        // diagonal up-left: right full, left half
        assert_eq!(mixer.convert(-100, 100), (50, 100));
    }

    #[test]
    fn test_smooth_segments_at_default_threshold() {
        let mixer = JoystickMixer::default();
        assert_eq!(mixer.convert(100, 0), (0, 0));
        assert_eq!(mixer.convert(100, 100), (100, 0));
        assert_eq!(mixer.convert(-100, 100), (0, 100));
    }

    #[test]
    fn test_smooth_is_continuous_for_other_thresholds() {
        let mut mixer = JoystickMixer::default();
        mixer.set_threshold_angle(30);
        // Both neighbouring segments meet at the breakpoints.
        assert_eq!(mixer.smooth(60), (100, 0));
        assert_eq!(mixer.smooth(61).0, 100);
        assert_eq!(mixer.smooth(90), (100, 100));
        assert_eq!(mixer.smooth(150), (0, 100));
        assert_eq!(mixer.smooth(180), (0, 0));
    }

    #[test]
    fn test_threshold_is_capped() {
        let mut mixer = JoystickMixer::default();
        mixer.set_threshold_angle(200);
        assert_eq!(mixer.config().threshold_angle, 90);
    }
}
