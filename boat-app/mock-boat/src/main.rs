use std::{
    convert::Infallible,
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

use boat_core::utils::{BoatCommand, BoatController, DriverConfig, MixerConfig, MixingAlgorithm};
use clap::{Parser, ValueEnum};
use embedded_hal::{digital, pwm};
use embedded_hal_mock::eh1::delay::StdSleep;
use tracing::{error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Script of JSON commands, one per line (defaults to stdin)
    #[clap(long)]
    script: Option<PathBuf>,
    /// Duty floor for any nonzero speed (0-255)
    #[clap(long, default_value_t = 127)]
    minimum_duty: u8,
    /// Longest overdrive delay in milliseconds
    #[clap(long, default_value_t = 100)]
    over_boost_ms: u8,
    /// Joystick mixing algorithm
    #[clap(long, value_enum, default_value_t = Mixing::Smooth)]
    mixing: Mixing,
    /// Threshold angle of the smooth mixing, in degrees
    #[clap(long, default_value_t = 45)]
    threshold_angle: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mixing {
    Simple,
    Smooth,
}

impl From<Mixing> for MixingAlgorithm {
    fn from(m: Mixing) -> Self {
        match m {
            Mixing::Simple => MixingAlgorithm::Simple,
            Mixing::Smooth => MixingAlgorithm::Smooth,
        }
    }
}

/// PWM output that logs every duty written.
struct ConsolePwm(&'static str);

impl pwm::ErrorType for ConsolePwm {
    type Error = Infallible;
}

impl pwm::SetDutyCycle for ConsolePwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        info!("{} PWM: {}", self.0, duty);
        Ok(())
    }
}

/// Direction output that logs every level written.
struct ConsolePin(&'static str);

impl digital::ErrorType for ConsolePin {
    type Error = Infallible;
}

impl digital::OutputPin for ConsolePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        info!("{} DIR: low (forward)", self.0);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        info!("{} DIR: high (reverse)", self.0);
        Ok(())
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();

    let driver = DriverConfig {
        minimum_duty: opts.minimum_duty,
        over_boost_delay_limit: opts.over_boost_ms,
    };
    let mixer = MixerConfig {
        algorithm: opts.mixing.into(),
        threshold_angle: opts.threshold_angle,
    };
    let mut boat = BoatController::from_outputs(
        ConsolePwm("left"),
        ConsolePin("left"),
        ConsolePwm("right"),
        ConsolePin("right"),
        StdSleep::new(),
        Some(driver),
        Some(mixer),
    );

    let input: Box<dyn BufRead> = match &opts.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    info!(?driver, ?mixer, "boat ready, waiting for commands");
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match BoatCommand::from_json(line) {
            Ok(cmd) => {
                info!("Received command: {:?}", cmd);
                if let Err(e) = boat.execute_command(cmd) {
                    error!("command failed: {}", e);
                }
            }
            Err(e) => warn!(?e, line, "invalid command format"),
        }
    }

    info!("input closed");
    if let Err(e) = boat.execute_command(BoatCommand::Stop) {
        error!("final stop failed: {}", e);
    }
    Ok(())
}
