//! Math utilities for the boat drive.
//!
//! - `drive`: speed-to-duty mapping and overdrive delay for one motor
//! - `mixing`: joystick to differential-drive conversion

pub mod drive;
pub mod mixing;
