//! Configuration system for the harness.
//!
//! This module defines all configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Socket ports, poll-interval bounds, memory banks and run limits.
//! 2. **Structures:** Hierarchical config for peripheral I/O, the checker, memory layout,
//!    the run itself, and commit tracing.
//! 3. **Loading:** JSON deserialization where every field is optional.
//!
//! Use `Config::default()` for the stock MR3 platform, or `Config::from_file` for a JSON
//! override.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::ConfigError;
use crate::model::MemoryLayout;

/// Default configuration constants for the harness.
mod defaults {
    /// TCP port for the console UART service.
    pub const CONSOLE_PORT: u16 = 2000;

    /// TCP port for the debug requester service.
    pub const DEBUG_PORT: u16 = 2001;

    /// Listen on every interface.
    pub const BIND_ADDRESS: &str = "0.0.0.0";

    /// Longest poll interval, in cycles between socket polls.
    ///
    /// An idle harness settles here, costing one syscall per this many cycles.
    pub const POLL_INTERVAL_MAX: u32 = 10_000;

    /// Shortest poll interval, reached under sustained socket traffic.
    pub const POLL_INTERVAL_MIN: u32 = 100;

    /// Amount the interval moves by after two polls agree.
    pub const POLL_INTERVAL_STEP: u32 = 100;

    /// Base file name for state saves; later saves get `.1`, `.2`, ...
    pub const SAVE_PATH: &str = "sim_dump.bin";
}

/// Source of the timebase value mirrored into the reference interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TimerSource {
    /// Replicate the memory-stage result into both timebase halves.
    ///
    /// The model's TB field runs one or two cycles ahead of the value an `mftb` observes
    /// at commit, so the committed result is the only value that lines up. This makes
    /// timer reads self-validating; mismatches on them are reported as low-confidence.
    #[default]
    MemoryResult,
    /// Read the model's TB field directly. Exact only if the model has no TB skew.
    Register,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use mrsim_core::config::Config;
///
/// let json = r#"{ "io": { "console_port": 3000 }, "checker": { "enabled": true } }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.io.console_port, 3000);
/// assert_eq!(config.io.debug_port, 2001);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Peripheral socket settings.
    #[serde(default)]
    pub io: IoConfig,
    /// Co-simulation checker settings.
    #[serde(default)]
    pub checker: CheckerConfig,
    /// Modelled memory banks.
    #[serde(default)]
    pub memory: MemoryLayout,
    /// Run control (limits, save/restore, start-up overrides).
    #[serde(default)]
    pub run: RunConfig,
    /// Optional per-commit tracing.
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Config {
    /// Parses a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

/// Socket services and poll pacing.
#[derive(Debug, Clone, Deserialize)]
pub struct IoConfig {
    /// Address the listening sockets bind to.
    #[serde(default = "IoConfig::default_bind_address")]
    pub bind_address: String,

    /// Console UART TCP port (0 picks an ephemeral port).
    #[serde(default = "IoConfig::default_console_port")]
    pub console_port: u16,

    /// Debug requester TCP port (0 picks an ephemeral port).
    #[serde(default = "IoConfig::default_debug_port")]
    pub debug_port: u16,

    /// Upper bound (and starting value) of the poll interval.
    #[serde(default = "IoConfig::default_poll_interval_max")]
    pub poll_interval_max: u32,

    /// Lower bound of the poll interval.
    #[serde(default = "IoConfig::default_poll_interval_min")]
    pub poll_interval_min: u32,

    /// Poll interval adjustment step.
    #[serde(default = "IoConfig::default_poll_interval_step")]
    pub poll_interval_step: u32,

    /// Echo console transmit bytes to the host's stdout as well as the socket.
    #[serde(default = "IoConfig::default_echo_console")]
    pub echo_console: bool,
}

impl IoConfig {
    fn default_bind_address() -> String {
        defaults::BIND_ADDRESS.to_string()
    }

    fn default_console_port() -> u16 {
        defaults::CONSOLE_PORT
    }

    fn default_debug_port() -> u16 {
        defaults::DEBUG_PORT
    }

    fn default_poll_interval_max() -> u32 {
        defaults::POLL_INTERVAL_MAX
    }

    fn default_poll_interval_min() -> u32 {
        defaults::POLL_INTERVAL_MIN
    }

    fn default_poll_interval_step() -> u32 {
        defaults::POLL_INTERVAL_STEP
    }

    fn default_echo_console() -> bool {
        true
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            bind_address: Self::default_bind_address(),
            console_port: defaults::CONSOLE_PORT,
            debug_port: defaults::DEBUG_PORT,
            poll_interval_max: defaults::POLL_INTERVAL_MAX,
            poll_interval_min: defaults::POLL_INTERVAL_MIN,
            poll_interval_step: defaults::POLL_INTERVAL_STEP,
            echo_console: true,
        }
    }
}

/// Co-simulation checker settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckerConfig {
    /// Run the checker every cycle.
    #[serde(default)]
    pub enabled: bool,

    /// Log-enable mask handed to the reference interpreter.
    #[serde(default)]
    pub log_flags: u32,

    /// Where the mirrored timebase value comes from.
    #[serde(default)]
    pub timer_source: TimerSource,
}

/// Run control.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Stop after this many cycles.
    #[serde(default = "RunConfig::default_cycle_limit")]
    pub cycle_limit: u64,

    /// Base path for state saves.
    #[serde(default = "RunConfig::default_save_path")]
    pub save_path: PathBuf,

    /// Save state when the run ends.
    #[serde(default)]
    pub save_at_exit: bool,

    /// Architectural snapshot applied after reset, before the first cycle.
    #[serde(default)]
    pub restore_path: Option<PathBuf>,

    /// Bytes fed to the console receiver before any socket input.
    #[serde(default)]
    pub initial_string: String,

    /// Overrides the reset program counter.
    #[serde(default)]
    pub override_pc: Option<u32>,

    /// DIP switch value presented on the GPIO inputs.
    #[serde(default)]
    pub dip_switches: Option<u32>,
}

impl RunConfig {
    fn default_cycle_limit() -> u64 {
        u64::MAX
    }

    fn default_save_path() -> PathBuf {
        PathBuf::from(defaults::SAVE_PATH)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cycle_limit: u64::MAX,
            save_path: Self::default_save_path(),
            save_at_exit: false,
            restore_path: None,
            initial_string: String::new(),
            override_pc: None,
            dip_switches: None,
        }
    }
}

/// Per-commit tracing, printed from the main loop.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TraceConfig {
    /// Print the redirect target whenever the memory stage resolves a new PC.
    #[serde(default)]
    pub branches: bool,

    /// Print syscall number and arguments whenever a `sc` commits.
    #[serde(default)]
    pub syscalls: bool,
}
