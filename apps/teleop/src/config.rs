use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::{
    error::TeleopError,
    protocol::{CONTROL_CHANNEL, MODULE_NAME},
};
use teleop_core::StepSizes;

pub const DEFAULT_CONFIG_FILE: &str = "teleop.toml";
const ENV_PREFIX: &str = "TELEOP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Udp,
    Log,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub channel: String,
    pub module_name: String,
    pub input_interval_ms: u64,
    pub publish_interval_ms: u64,
    pub speed_delta: f64,
    pub steering_delta: f64,
    pub brake_delta: f64,
    pub transport: TransportKind,
    pub udp_bind: String,
    pub udp_target: String,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        let steps = StepSizes::default();
        Self {
            channel: CONTROL_CHANNEL.into(),
            module_name: MODULE_NAME.into(),
            input_interval_ms: 50,
            publish_interval_ms: 100,
            speed_delta: steps.speed,
            steering_delta: steps.steering,
            brake_delta: steps.brake,
            transport: TransportKind::Udp,
            udp_bind: "0.0.0.0:0".into(),
            udp_target: "127.0.0.1:7400".into(),
            log_file: "teleop.log".into(),
            log_filter: "info".into(),
        }
    }
}

/// Command-line values that win over the file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub transport: Option<TransportKind>,
    pub udp_target: Option<String>,
    pub channel: Option<String>,
    pub input_interval_ms: Option<u64>,
    pub publish_interval_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// Defaults, then the config file (optional unless named explicitly), then
/// `TELEOP__*` environment variables, then command-line overrides.
pub fn load_settings(path: Option<&Path>, overrides: Overrides) -> anyhow::Result<Settings> {
    let file_source = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let mut settings: Settings = config::Config::builder()
        .add_source(file_source)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .context("failed to read teleop configuration")?
        .try_deserialize()
        .context("failed to parse teleop configuration")?;

    apply_overrides(&mut settings, overrides);
    settings.validate()?;
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, overrides: Overrides) {
    if let Some(v) = overrides.transport {
        settings.transport = v;
    }
    if let Some(v) = overrides.udp_target {
        settings.udp_target = v;
    }
    if let Some(v) = overrides.channel {
        settings.channel = v;
    }
    if let Some(v) = overrides.input_interval_ms {
        settings.input_interval_ms = v;
    }
    if let Some(v) = overrides.publish_interval_ms {
        settings.publish_interval_ms = v;
    }
    if let Some(v) = overrides.log_file {
        settings.log_file = v;
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), TeleopError> {
        if self.channel.trim().is_empty() {
            return Err(TeleopError::invalid_setting("channel", "must not be empty"));
        }
        if self.input_interval_ms == 0 {
            return Err(TeleopError::invalid_setting(
                "input_interval_ms",
                "must be greater than zero",
            ));
        }
        if self.publish_interval_ms == 0 {
            return Err(TeleopError::invalid_setting(
                "publish_interval_ms",
                "must be greater than zero",
            ));
        }
        for (key, delta) in [
            ("speed_delta", self.speed_delta),
            ("steering_delta", self.steering_delta),
            ("brake_delta", self.brake_delta),
        ] {
            if !delta.is_finite() || delta <= 0.0 {
                return Err(TeleopError::invalid_setting(
                    key,
                    format!("must be a positive number, got {delta}"),
                ));
            }
        }
        if self.transport == TransportKind::Udp {
            self.udp_bind_addr()?;
            self.udp_target_addr()?;
        }
        Ok(())
    }

    pub fn steps(&self) -> StepSizes {
        StepSizes {
            speed: self.speed_delta,
            steering: self.steering_delta,
            brake: self.brake_delta,
        }
    }

    pub fn input_period(&self) -> Duration {
        Duration::from_millis(self.input_interval_ms)
    }

    pub fn publish_period(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }

    pub fn udp_bind_addr(&self) -> Result<SocketAddr, TeleopError> {
        parse_addr("udp_bind", &self.udp_bind)
    }

    pub fn udp_target_addr(&self) -> Result<SocketAddr, TeleopError> {
        parse_addr("udp_target", &self.udp_target)
    }
}

fn parse_addr(key: &'static str, raw: &str) -> Result<SocketAddr, TeleopError> {
    raw.trim()
        .parse()
        .map_err(|err| TeleopError::invalid_setting(key, format!("`{raw}`: {err}")))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
