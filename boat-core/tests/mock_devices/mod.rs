//! Recording test doubles for the H-bridge outputs.
//!
//! Every PWM write, direction change and wait lands in one shared log so tests
//! can assert the exact interleaving across both motors.
#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use boat_core::utils::controllers::{HBridge, Motor};
use boat_core::utils::DriverConfig;
use embedded_hal::{delay::DelayNs, digital, pwm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// PWM level written, on the 0..=255 scale.
    Pwm(Motor, u16),
    /// Direction output driven; `true` is high (reverse).
    Dir(Motor, bool),
    /// Blocking wait in milliseconds.
    Wait(u32),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub struct RecordingPwm {
    motor: Motor,
    log: Log,
    /// Reject writes of this duty instead of recording them.
    fail_at: Option<u16>,
}

impl pwm::ErrorType for RecordingPwm {
    type Error = pwm::ErrorKind;
}

impl pwm::SetDutyCycle for RecordingPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if self.fail_at == Some(duty) {
            return Err(pwm::ErrorKind::Other);
        }
        self.log.borrow_mut().push(Event::Pwm(self.motor, duty));
        Ok(())
    }
}

pub struct RecordingPin {
    motor: Motor,
    log: Log,
    fail: bool,
}

impl digital::ErrorType for RecordingPin {
    type Error = digital::ErrorKind;
}

impl digital::OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true)
    }
}

impl RecordingPin {
    fn record(&mut self, high: bool) -> Result<(), digital::ErrorKind> {
        if self.fail {
            return Err(digital::ErrorKind::Other);
        }
        self.log.borrow_mut().push(Event::Dir(self.motor, high));
        Ok(())
    }
}

pub struct RecordingDelay {
    log: Log,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::Wait(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::Wait(ms));
    }
}

pub type RecordingBridge = HBridge<RecordingPwm, RecordingPin, RecordingDelay>;

pub fn pwm(motor: Motor, log: &Log) -> RecordingPwm {
    RecordingPwm {
        motor,
        log: log.clone(),
        fail_at: None,
    }
}

/// PWM output that fails whenever `duty` is written.
pub fn pwm_failing_at(motor: Motor, duty: u16, log: &Log) -> RecordingPwm {
    RecordingPwm {
        motor,
        log: log.clone(),
        fail_at: Some(duty),
    }
}

pub fn pin(motor: Motor, log: &Log) -> RecordingPin {
    RecordingPin {
        motor,
        log: log.clone(),
        fail: false,
    }
}

pub fn failing_pin(motor: Motor, log: &Log) -> RecordingPin {
    RecordingPin {
        motor,
        log: log.clone(),
        fail: true,
    }
}

pub fn delay(log: &Log) -> RecordingDelay {
    RecordingDelay { log: log.clone() }
}

/// Driver over recording outputs with the given tunables.
pub fn bridge(config: DriverConfig) -> (RecordingBridge, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let bridge = HBridge::with_config(
        pwm(Motor::Left, &log),
        pin(Motor::Left, &log),
        pwm(Motor::Right, &log),
        pin(Motor::Right, &log),
        delay(&log),
        config,
    );
    (bridge, log)
}

/// Drain the log, returning everything recorded so far.
pub fn take(log: &Log) -> Vec<Event> {
    log.borrow_mut().drain(..).collect()
}

/// Total blocking time in a recorded sequence.
pub fn waited(events: &[Event]) -> u32 {
    events
        .iter()
        .map(|e| match e {
            Event::Wait(ms) => *ms,
            _ => 0,
        })
        .sum()
}
