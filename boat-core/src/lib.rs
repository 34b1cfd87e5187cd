//! H-bridge drive core for a two-motor RC boat on no-std embedded platforms.
//!
//! For a host-side simulation, see the `mock-boat` binary in `boat-app/`.
#![no_std]

pub mod utils;
