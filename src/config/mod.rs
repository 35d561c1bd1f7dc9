use crate::{Error, Result};
use std::path::Path;

pub mod loader;

pub const DEFAULT_COLS: u8 = 20;
pub const DEFAULT_ROWS: u8 = 4;
pub const DEFAULT_HEADER: &str = "HAPPY CSLM CHRISTMAS";
pub const DEFAULT_QUEUE_URL: &str =
    "https://sqs.eu-west-2.amazonaws.com/567919078991/xmasjumper";
pub const DEFAULT_HOLD_SECS: u64 = 60;
pub const DEFAULT_WINDOW_SECS: u64 = 15;
pub const DEFAULT_BACKOFF_SECS: u64 = 5;
pub const DEFAULT_STARTUP_INFO_SECS: u64 = 60;
pub const DEFAULT_STATS_FILE: &str = "stats.json";
pub const DEFAULT_MESSAGES_FILE: &str = "messages";
pub const DEFAULT_LIGHT_SCRIPT: &str = "neopixel1.py";
pub const DEFAULT_PCF8574_ADDR: Pcf8574Addr = Pcf8574Addr::Auto;
const CONFIG_DIR_NAME: &str = ".xmaslcd";
const CONFIG_FILE_NAME: &str = "config.toml";

/// PCF8574 addressing: probe the known candidates in order, or pin one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pcf8574Addr {
    Auto,
    Addr(u8),
}

impl std::str::FromStr for Pcf8574Addr {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_pcf_addr(s)
    }
}

/// User-supplied settings loaded from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cols: u8,
    pub rows: u8,
    pub header: String,
    pub queue_url: String,
    pub hold_secs: u64,
    pub window_secs: u64,
    pub backoff_secs: u64,
    pub startup_info_secs: u64,
    pub stats_file: String,
    pub messages_file: String,
    pub light_script: String,
    pub pcf8574_addr: Pcf8574Addr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            header: DEFAULT_HEADER.to_string(),
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            hold_secs: DEFAULT_HOLD_SECS,
            window_secs: DEFAULT_WINDOW_SECS,
            backoff_secs: DEFAULT_BACKOFF_SECS,
            startup_info_secs: DEFAULT_STARTUP_INFO_SECS,
            stats_file: DEFAULT_STATS_FILE.to_string(),
            messages_file: DEFAULT_MESSAGES_FILE.to_string(),
            light_script: DEFAULT_LIGHT_SCRIPT.to_string(),
            pcf8574_addr: DEFAULT_PCF8574_ADDR,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        loader::load_or_default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        loader::load_from_path(path)
    }

    pub fn save(&self) -> Result<()> {
        loader::save(self)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        loader::save_to_path(self, path)
    }
}

pub(crate) fn validate(config: &Config) -> Result<()> {
    if config.cols == 0 {
        return Err(Error::InvalidArgs("cols must be at least 1".into()));
    }
    if config.rows == 0 || config.rows > 4 {
        return Err(Error::InvalidArgs("rows must be between 1 and 4".into()));
    }
    if config.hold_secs == 0 {
        return Err(Error::InvalidArgs("hold_secs must be at least 1".into()));
    }
    if config.window_secs == 0 {
        return Err(Error::InvalidArgs("window_secs must be at least 1".into()));
    }
    Ok(())
}

fn parse_pcf_addr(raw: &str) -> std::result::Result<Pcf8574Addr, String> {
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(Pcf8574Addr::Auto);
    }
    let cleaned = raw.trim_start_matches("0x");
    let value = u8::from_str_radix(cleaned, 16)
        .or_else(|_| raw.parse::<u8>())
        .map_err(|_| "expected 'auto' or a hex/decimal address (e.g., 0x27)".to_string())?;
    Ok(Pcf8574Addr::Addr(value))
}

fn format_pcf_addr(addr: &Pcf8574Addr) -> String {
    match addr {
        Pcf8574Addr::Auto => "\"auto\"".into(),
        Pcf8574Addr::Addr(a) => format!("{a:#04x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs,
        path::PathBuf,
        time::{SystemTime, UNIX_EPOCH},
    };

    fn temp_path(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("xmaslcd_test_{name}_{stamp}"))
    }

    #[test]
    fn loads_default_when_missing() {
        let path = temp_path("missing");
        let cfg = Config::load_from_path(&path).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parses_valid_config() {
        let path = temp_path("parse");
        let contents = r#"
            cols = 16
            rows = 2
            header = "MERRY EVERYTHING"
            queue_url = "https://sqs.us-east-1.amazonaws.com/1/q"
            hold_secs = 30
            window_secs = 10
            backoff_secs = 2
            startup_info_secs = 5
            stats_file = "/var/lib/xmaslcd/stats.json"
            messages_file = "/var/log/xmaslcd/messages"
            light_script = "/opt/neopixel1.py"
            pcf8574_addr = "0x3F"
        "#;
        fs::write(&path, contents).unwrap();
        let cfg = Config::load_from_path(&path).unwrap();
        assert_eq!(cfg.cols, 16);
        assert_eq!(cfg.rows, 2);
        assert_eq!(cfg.header, "MERRY EVERYTHING");
        assert_eq!(cfg.queue_url, "https://sqs.us-east-1.amazonaws.com/1/q");
        assert_eq!(cfg.hold_secs, 30);
        assert_eq!(cfg.window_secs, 10);
        assert_eq!(cfg.backoff_secs, 2);
        assert_eq!(cfg.startup_info_secs, 5);
        assert_eq!(cfg.stats_file, "/var/lib/xmaslcd/stats.json");
        assert_eq!(cfg.messages_file, "/var/log/xmaslcd/messages");
        assert_eq!(cfg.light_script, "/opt/neopixel1.py");
        assert_eq!(cfg.pcf8574_addr, Pcf8574Addr::Addr(0x3F));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_unknown_key() {
        let path = temp_path("unknown");
        fs::write(&path, "nope = 1").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(format!("{err}").contains("unknown config key"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_zero_rows() {
        let path = temp_path("zero_rows");
        fs::write(&path, "rows = 0").unwrap();
        assert!(Config::load_from_path(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn saves_and_loads_round_trip() {
        let path = temp_path("roundtrip");
        let cfg = Config {
            cols: 20,
            rows: 4,
            header: "HO HO HO".into(),
            queue_url: "https://sqs.eu-west-1.amazonaws.com/2/q".into(),
            hold_secs: 45,
            window_secs: 20,
            backoff_secs: 5,
            startup_info_secs: 0,
            stats_file: "stats.json".into(),
            messages_file: "messages".into(),
            light_script: "neopixel1.py".into(),
            pcf8574_addr: Pcf8574Addr::Addr(0x27),
        };
        cfg.save_to_path(&path).unwrap();
        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(cfg, loaded);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn pcf_addr_parses_auto_hex_and_decimal() {
        assert_eq!("auto".parse::<Pcf8574Addr>().unwrap(), Pcf8574Addr::Auto);
        assert_eq!("0x27".parse::<Pcf8574Addr>().unwrap(), Pcf8574Addr::Addr(0x27));
        assert_eq!("39".parse::<Pcf8574Addr>().unwrap(), Pcf8574Addr::Addr(0x39));
        assert!("bogus".parse::<Pcf8574Addr>().is_err());
    }
}
