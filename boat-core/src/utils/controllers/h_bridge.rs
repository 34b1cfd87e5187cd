//! Two-motor H-bridge driver.
//!
//! Each motor is wired to one PWM input and one direction input. The direction
//! input is high while reversing, and the PWM level is inverted in that case so
//! the effective drive strength is always the requested duty.
//!
//! A drive tick maps both speed requests to duties, derives an overdrive delay
//! per motor from the last applied state, then writes the outputs in a single
//! blocking sequence: both motors first go to full drive in their new
//! direction, and each one receives its final duty once its own delay elapsed.

use embedded_hal::{
    delay::DelayNs,
    digital::{OutputPin, PinState},
    pwm::SetDutyCycle,
};

use crate::utils::math::drive::{
    overdrive_delay, speed_to_drive, DriverConfig, MotorDrive, MAX_DUTY,
};

/// Motor index into the driver's per-motor arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    Left = 0,
    Right = 1,
}

impl Motor {
    pub const ALL: [Motor; 2] = [Motor::Left, Motor::Right];

    fn index(self) -> usize {
        self as usize
    }
}

/// Errors surfaced by the PWM or direction outputs.
#[derive(Debug)]
pub enum BridgeError<PwmE, PinE> {
    Pwm(PwmE),
    Direction(PinE),
}

impl<PwmE: core::fmt::Debug, PinE: core::fmt::Debug> core::fmt::Display
    for BridgeError<PwmE, PinE>
{
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            BridgeError::Pwm(e) => write!(f, "PWM output failed: {:?}", e),
            BridgeError::Direction(e) => write!(f, "direction output failed: {:?}", e),
        }
    }
}

/// Last state written to one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorState {
    /// Duty and direction physically applied at the end of the last tick.
    pub applied: MotorDrive,
    /// Clamped speed request of the last tick.
    pub speed: i8,
}

/// Driver for the left and right motors of the boat.
pub struct HBridge<PWM, DIR, DELAY> {
    pwm: [PWM; 2],
    direction: [DIR; 2],
    delay: DELAY,
    config: DriverConfig,
    state: [MotorState; 2],
}

impl<PWM, DIR, DELAY, PwmE, PinE> HBridge<PWM, DIR, DELAY>
where
    PWM: SetDutyCycle<Error = PwmE>,
    DIR: OutputPin<Error = PinE>,
    DELAY: DelayNs,
    PwmE: core::fmt::Debug,
    PinE: core::fmt::Debug,
{
    /// Create a driver with the default tunables. No output is written.
    pub fn new(
        left_pwm: PWM,
        left_direction: DIR,
        right_pwm: PWM,
        right_direction: DIR,
        delay: DELAY,
    ) -> Self {
        Self::with_config(
            left_pwm,
            left_direction,
            right_pwm,
            right_direction,
            delay,
            DriverConfig::default(),
        )
    }

    pub fn with_config(
        left_pwm: PWM,
        left_direction: DIR,
        right_pwm: PWM,
        right_direction: DIR,
        delay: DELAY,
        config: DriverConfig,
    ) -> Self {
        HBridge {
            pwm: [left_pwm, right_pwm],
            direction: [left_direction, right_direction],
            delay,
            config,
            state: [MotorState::default(); 2],
        }
    }

    pub fn config(&self) -> DriverConfig {
        self.config
    }

    pub fn set_config(
        &mut self,
        config: DriverConfig,
    ) {
        tracing::info!(?config, "driver configuration updated");
        self.config = config;
    }

    /// Set the duty floor used for any nonzero speed. Takes effect on the next tick.
    pub fn set_minimum_duty(
        &mut self,
        minimum_duty: u8,
    ) {
        tracing::info!(minimum_duty, "minimum duty updated");
        self.config.minimum_duty = minimum_duty;
    }

    /// Set the longest overdrive delay in milliseconds. Takes effect on the next tick.
    pub fn set_over_boost_delay_limit(
        &mut self,
        limit_ms: u8,
    ) {
        tracing::info!(limit_ms, "over boost delay limit updated");
        self.config.over_boost_delay_limit = limit_ms;
    }

    /// Last applied state of `motor`.
    pub fn state(
        &self,
        motor: Motor,
    ) -> MotorState {
        self.state[motor.index()]
    }

    /// Run one drive tick with signed speeds in percent.
    ///
    /// Speeds outside `[-100, 100]` are clamped. Blocks for at most the
    /// configured over boost delay limit and returns once both final duties
    /// have been written. If a write fails the tick is abandoned and both
    /// motors are stopped as far as the outputs allow.
    pub fn drive(
        &mut self,
        left: i8,
        right: i8,
    ) -> Result<(), BridgeError<PwmE, PinE>> {
        let mut speeds = [0i8; 2];
        let mut targets = [MotorDrive::STOPPED; 2];
        let mut delays = [0u16; 2];

        for (motor, requested) in Motor::ALL.into_iter().zip([left, right]) {
            let i = motor.index();
            let (speed, target) = speed_to_drive(requested, self.config.minimum_duty);
            speeds[i] = speed;
            targets[i] = target;
            delays[i] = overdrive_delay(target, self.state[i].applied, &self.config);
        }

        tracing::debug!(?speeds, ?targets, ?delays, "drive tick");

        if let Err(e) = self.apply_drive(&targets, delays) {
            tracing::error!("drive sequence aborted: {}", e);
            // A motor may be left at its interim full drive; bring both down.
            if let Err(halt) = self.stop() {
                tracing::warn!("halt after aborted drive incomplete: {}", halt);
            }
            return Err(e);
        }

        for motor in Motor::ALL {
            let i = motor.index();
            self.state[i] = MotorState {
                applied: targets[i],
                speed: speeds[i],
            };
        }
        Ok(())
    }

    /// Zero both PWM outputs and pull both direction outputs low, without delay.
    ///
    /// Every output is written even if an earlier one fails; the first error is
    /// returned. Only motors whose outputs were all written are recorded as stopped.
    pub fn stop(&mut self) -> Result<(), BridgeError<PwmE, PinE>> {
        tracing::info!("stopping both motors");
        let mut first_error = None;
        for motor in Motor::ALL {
            match self.zero_outputs(motor) {
                Ok(()) => self.state[motor.index()] = MotorState::default(),
                Err(e) => {
                    tracing::error!(?motor, "stop failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn zero_outputs(
        &mut self,
        motor: Motor,
    ) -> Result<(), BridgeError<PwmE, PinE>> {
        let i = motor.index();
        let pwm = self.pwm[i]
            .set_duty_cycle_fully_off()
            .map_err(BridgeError::Pwm);
        let direction = self.direction[i]
            .set_low()
            .map_err(BridgeError::Direction);
        pwm.and(direction)
    }

    /// Write both motors' outputs, staggering the final duties by their delays.
    ///
    /// The motor with the shorter delay (left on ties) gets its final duty once
    /// its own delay elapsed; the other follows after the remaining difference,
    /// so the whole sequence blocks for the longer of the two delays.
    fn apply_drive(
        &mut self,
        targets: &[MotorDrive; 2],
        delays: [u16; 2],
    ) -> Result<(), BridgeError<PwmE, PinE>> {
        for motor in Motor::ALL {
            self.write_interim(motor, targets[motor.index()])?;
        }

        let (first, second) = if delays[Motor::Left.index()] <= delays[Motor::Right.index()] {
            (Motor::Left, Motor::Right)
        } else {
            (Motor::Right, Motor::Left)
        };
        let shorter = delays[first.index()];
        let overlap = delays[second.index()] - shorter;

        self.wait_ms(shorter);
        self.write_final(first, targets[first.index()])?;
        self.wait_ms(overlap);
        self.write_final(second, targets[second.index()])?;
        Ok(())
    }

    /// Set the new direction and saturate the PWM toward it.
    fn write_interim(
        &mut self,
        motor: Motor,
        target: MotorDrive,
    ) -> Result<(), BridgeError<PwmE, PinE>> {
        let i = motor.index();
        self.direction[i]
            .set_state(PinState::from(!target.forward))
            .map_err(BridgeError::Direction)?;
        let level = if target.forward { MAX_DUTY } else { 0 };
        tracing::trace!(?motor, forward = target.forward, level, "interim drive");
        self.write_pwm(motor, level)
    }

    fn write_final(
        &mut self,
        motor: Motor,
        target: MotorDrive,
    ) -> Result<(), BridgeError<PwmE, PinE>> {
        let level = if target.forward {
            target.duty
        } else {
            MAX_DUTY - target.duty
        };
        tracing::trace!(?motor, duty = target.duty, level, "final drive");
        self.write_pwm(motor, level)
    }

    fn write_pwm(
        &mut self,
        motor: Motor,
        level: u8,
    ) -> Result<(), BridgeError<PwmE, PinE>> {
        self.pwm[motor.index()]
            .set_duty_cycle_fraction(u16::from(level), u16::from(MAX_DUTY))
            .map_err(BridgeError::Pwm)
    }

    fn wait_ms(
        &mut self,
        ms: u16,
    ) {
        if ms > 0 {
            tracing::trace!(ms, "holding overdrive");
            self.delay.delay_ms(u32::from(ms));
        }
    }
}
