//! Speed-to-duty mapping and overdrive delay computation for one motor.
//!
//! These are the pure stages of a drive tick. [`speed_to_drive`] turns a signed
//! percentage into a PWM duty and direction, and [`overdrive_delay`] decides how
//! long a motor must be held at full drive before its final duty is applied.
//!
//! # Example
//! ```rust
//! use boat_core::utils::math::drive::{speed_to_drive, MotorDrive};
//! let (speed, drive) = speed_to_drive(120, 127);
//! assert_eq!(speed, 100);
//! assert_eq!(drive, MotorDrive { duty: 255, forward: true });
//! ```

use serde::{Deserialize, Serialize};

/// Lowest and highest accepted speed request (percent).
pub const SPEED_LIMIT: i8 = 100;
/// Full-scale duty on the 0..=255 scale.
pub const MAX_DUTY: u8 = 255;

/// Target hardware state of one motor before any safety delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorDrive {
    /// Drive strength, 0 (off) to 255 (full power), independent of direction.
    pub duty: u8,
    /// `true` when turning forward.
    pub forward: bool,
}

impl MotorDrive {
    /// A motor that is off.
    pub const STOPPED: Self = Self {
        duty: 0,
        forward: true,
    };
}

impl Default for MotorDrive {
    fn default() -> Self {
        Self::STOPPED
    }
}

/// Tunables of the H-bridge driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Duty floor for any nonzero speed; below it the motor stalls.
    pub minimum_duty: u8,
    /// Longest overdrive delay in milliseconds, applied at the duty floor.
    pub over_boost_delay_limit: u8,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            minimum_duty: 127,
            over_boost_delay_limit: 100,
        }
    }
}

/// Linearly re-map `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Integer arithmetic truncating toward zero; the result is not clamped, so
/// values outside the input domain extrapolate. Either domain may be reversed.
/// A zero-width input domain maps everything to `out_min`.
pub fn map_range(
    x: i32,
    in_min: i32,
    in_max: i32,
    out_min: i32,
    out_max: i32,
) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Clamp a signed speed request into `[-100, 100]`.
pub fn clamp_speed(speed: i8) -> i8 {
    speed.clamp(-SPEED_LIMIT, SPEED_LIMIT)
}

/// Convert a signed speed request into a duty and direction.
///
/// Returns the clamped speed alongside the drive. Speed 0 always yields duty 0;
/// any other speed lands in `[minimum_duty, 255]`.
pub fn speed_to_drive(
    speed: i8,
    minimum_duty: u8,
) -> (i8, MotorDrive) {
    let speed = clamp_speed(speed);
    let forward = speed >= 0;
    let magnitude = i32::from(speed.unsigned_abs());

    let duty = if magnitude == 0 {
        0
    } else {
        map_range(
            magnitude,
            0,
            i32::from(SPEED_LIMIT),
            i32::from(minimum_duty),
            i32::from(MAX_DUTY),
        )
        .clamp(0, i32::from(MAX_DUTY)) as u8
    };

    (speed, MotorDrive { duty, forward })
}

/// Compute the overdrive delay (ms) for a motor moving from `previous` to `target`.
///
/// A delay is only needed when the motor restarts from a stop or reverses.
/// Targets at the duty floor get the full `over_boost_delay_limit`; the delay
/// falls linearly as the target rises above the floor and reaches 0 near twice
/// the floor. This curve is a tuning heuristic rather than a motor model.
pub fn overdrive_delay(
    target: MotorDrive,
    previous: MotorDrive,
    config: &DriverConfig,
) -> u16 {
    if target.duty == 0 {
        return 0;
    }
    if target.forward == previous.forward && previous.duty != 0 {
        return 0;
    }

    // A target below the floor cannot come out of `speed_to_drive`; treat it as the floor.
    let above_floor = target.duty.saturating_sub(config.minimum_duty);
    let limit = i32::from(config.over_boost_delay_limit);
    map_range(
        i32::from(above_floor),
        i32::from(config.minimum_duty),
        0,
        0,
        limit,
    )
    .clamp(0, limit) as u16
}
