use std::{
    fs::File,
    io::{Error, ErrorKind, Read},
    path::Path,
};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Logger configuration used by the tools.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub level_filter: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { level_filter: LevelFilter::Info }
    }
}

/// Interpreter settings. Use [`VmConfigBuilder`] to build one from code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Sleep between two polls of a blocking wait.
    pub sound_wait_quantum_ms: u32,
    /// Demo build: the stack change opcode uses the demo stack mapping.
    pub demo: bool,
    /// Bracket every run with the drawing-time simulation toggle.
    pub drawing_time_simulation: bool,
    pub logger: LoggerConfig,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            sound_wait_quantum_ms: 10,
            demo: false,
            drawing_time_simulation: true,
            logger: LoggerConfig::default(),
        }
    }
}

pub struct VmConfigBuilder {
    config: VmConfig,
}

impl Default for VmConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VmConfigBuilder {
    pub fn new() -> Self {
        Self { config: Default::default() }
    }

    pub fn with_sound_wait_quantum_ms(mut self, ms: u32) -> Self {
        self.config.sound_wait_quantum_ms = ms;
        self
    }

    pub fn with_demo(mut self, demo: bool) -> Self {
        self.config.demo = demo;
        self
    }

    pub fn with_drawing_time_simulation(mut self, enable: bool) -> Self {
        self.config.drawing_time_simulation = enable;
        self
    }

    pub fn with_logger_config(mut self, logger: LoggerConfig) -> Self {
        self.config.logger = logger;
        self
    }

    /// Retrieves the configuration built
    pub fn get(self) -> VmConfig {
        self.config
    }
}

pub struct VmConfigReader;

impl VmConfigReader {
    pub fn read(path: &Path) -> Result<VmConfig, Error> {
        if !path.exists() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("config file {} not found", path.display()),
            ));
        }
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::read_slice(&buffer)
    }

    pub fn read_slice(bytes: &[u8]) -> Result<VmConfig, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::new(ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VmConfig::default();
        assert_eq!(config.sound_wait_quantum_ms, 10);
        assert!(config.drawing_time_simulation);
        assert!(!config.demo);
    }

    #[test]
    fn builder() {
        let config = VmConfigBuilder::new()
            .with_demo(true)
            .with_sound_wait_quantum_ms(5)
            .with_logger_config(LoggerConfig { level_filter: LevelFilter::Debug })
            .get();
        assert!(config.demo);
        assert_eq!(config.sound_wait_quantum_ms, 5);
        assert_eq!(config.logger.level_filter, LevelFilter::Debug);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = VmConfigReader::read_slice(br#"{ "demo": true }"#).unwrap();
        assert!(config.demo);
        assert_eq!(config.sound_wait_quantum_ms, 10);

        let err = VmConfigReader::read_slice(b"{ nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn missing_file() {
        let err = VmConfigReader::read(Path::new("/nonexistent/mohawk-vm.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
