use eyre::{bail, Report, WrapErr};
use lvserial::{DeviceAddress, DEFAULT_BAUD_RATE, RESPONSE_TIMEOUT};
use serde_derive::Deserialize;
use std::fs::read_to_string;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "lvcontrol.toml";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path of the serial port the servo is attached to.
    pub port: String,
    pub baud_rate: u32,
    pub device_id: u8,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_owned(),
            baud_rate: DEFAULT_BAUD_RATE,
            device_id: 0,
            timeout_ms: RESPONSE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Config {
    /// Reads the config from `lvcontrol.toml` in the current directory, or falls back to the
    /// defaults if there isn't one.
    pub fn from_default_file() -> Result<Config, Report> {
        match read_to_string(CONFIG_FILENAME) {
            Ok(config_file) => Config::parse(&config_file),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e).wrap_err_with(|| format!("Reading {}", CONFIG_FILENAME)),
        }
    }

    pub fn read(filename: &Path) -> Result<Config, Report> {
        let config_file = read_to_string(filename)
            .wrap_err_with(|| format!("Reading {}", filename.display()))?;
        Config::parse(&config_file).wrap_err_with(|| format!("Parsing {}", filename.display()))
    }

    fn parse(config_file: &str) -> Result<Config, Report> {
        let config: Config = toml::from_str(config_file)?;
        config.device()?;
        if config.timeout_ms == 0 {
            bail!("timeout_ms must be at least 1");
        }
        Ok(config)
    }

    pub fn device(&self) -> Result<DeviceAddress, Report> {
        match DeviceAddress::new(self.device_id) {
            Some(device) => Ok(device),
            None => bail!(
                "device_id {} is out of range, must be at most {}",
                self.device_id,
                DeviceAddress::MAX
            ),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
