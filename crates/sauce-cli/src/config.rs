//! CLI configuration (SPEC_FULL.md §2 ambient stack): device selection,
//! buffer-size overrides, descriptor directory, and control-plane
//! addresses, populated via `clap` with environment-variable fallbacks for
//! default paths, matching the teacher's `MetricsManager::default_log_path`
//! convention of checking an env var before falling back to `dirs`.

use std::path::PathBuf;

use clap::Parser;

fn default_descriptor_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SAUCE_DESCRIPTOR_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("./descriptors")
}

fn default_log_path() -> PathBuf {
    if let Ok(path) = std::env::var("SAUCE_LOG_FILE") {
        return PathBuf::from(path);
    }
    let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.join("sauce").join("engine.jsonl")
}

/// Boots the sauce engine: opens an output device, loads generator
/// descriptors, and starts the OSC-style control-plane listener (spec
/// §6.3 boot order).
#[derive(Parser, Debug)]
#[command(name = "sauce-engine-cli", version, about)]
pub struct Config {
    /// Output device name; defaults to the OS default output device.
    #[arg(long)]
    pub device: Option<String>,

    /// Audio block size in frames (spec §5: 64-512 typical).
    #[arg(long, default_value_t = 256)]
    pub block_size: usize,

    /// Directory of generator descriptor JSON files (spec §6.2, §6.4).
    #[arg(long, default_value_os_t = default_descriptor_dir())]
    pub descriptor_dir: PathBuf,

    /// Local address the control-plane receiver binds (spec §6.1).
    #[arg(long, default_value = "127.0.0.1:7812")]
    pub control_bind: String,

    /// Peer address telemetry/heartbeat pings are sent to (spec §4.6).
    #[arg(long, default_value = "127.0.0.1:7813")]
    pub control_peer: String,

    /// Path to the structured log file; falls back to the platform data
    /// directory (or `SAUCE_LOG_FILE`) when unset.
    #[arg(long, default_value_os_t = default_log_path())]
    pub log_file: PathBuf,

    /// List available output devices and exit.
    #[arg(long)]
    pub list_devices: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse_with_no_args() {
        let config = Config::parse_from(["sauce-engine-cli"]);
        assert_eq!(config.block_size, 256);
        assert_eq!(config.control_bind, "127.0.0.1:7812");
        assert!(!config.list_devices);
    }

    #[test]
    fn test_overrides_are_honoured() {
        let config = Config::parse_from(["sauce-engine-cli", "--block-size", "512", "--device", "Speakers"]);
        assert_eq!(config.block_size, 512);
        assert_eq!(config.device.as_deref(), Some("Speakers"));
    }
}
