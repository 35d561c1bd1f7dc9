use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Error, Result};

use super::{Config, CONFIG_DIR_NAME, CONFIG_FILE_NAME};

pub fn load_or_default() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        let cfg = Config::default();
        cfg.save_to_path(&path)?;
        super::validate(&cfg)?;
        return Ok(cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        super::validate(&cfg)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(path)?;
    parse(&raw)
}

pub fn save(config: &Config) -> Result<()> {
    let path = config_path()?;
    save_to_path(config, &path)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = format!(
        "# xmaslcd config\n\
cols = {}\n\
rows = {}\n\
header = \"{}\"\n\
queue_url = \"{}\"\n\
hold_secs = {}\n\
window_secs = {}\n\
backoff_secs = {}\n\
startup_info_secs = {}\n\
stats_file = \"{}\"\n\
messages_file = \"{}\"\n\
light_script = \"{}\"\n\
pcf8574_addr = {}\n",
        config.cols,
        config.rows,
        config.header,
        config.queue_url,
        config.hold_secs,
        config.window_secs,
        config.backoff_secs,
        config.startup_info_secs,
        config.stats_file,
        config.messages_file,
        config.light_script,
        super::format_pcf_addr(&config.pcf8574_addr),
    );
    fs::write(path, contents)?;
    Ok(())
}

pub fn parse(raw: &str) -> Result<Config> {
    let mut cfg = Config::default();

    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed.split_once('=').ok_or_else(|| {
            Error::InvalidArgs(format!("invalid config line {}: '{}'", idx + 1, line))
        })?;

        let key = key.trim();
        let value = value.trim().trim_matches('"');
        match key {
            "cols" => cfg.cols = parse_number(value, "cols", idx)?,
            "rows" => cfg.rows = parse_number(value, "rows", idx)?,
            "header" => cfg.header = value.to_string(),
            "queue_url" => cfg.queue_url = value.to_string(),
            "hold_secs" => cfg.hold_secs = parse_number(value, "hold_secs", idx)?,
            "window_secs" => cfg.window_secs = parse_number(value, "window_secs", idx)?,
            "backoff_secs" => cfg.backoff_secs = parse_number(value, "backoff_secs", idx)?,
            "startup_info_secs" => {
                cfg.startup_info_secs = parse_number(value, "startup_info_secs", idx)?;
            }
            "stats_file" => cfg.stats_file = value.to_string(),
            "messages_file" => cfg.messages_file = value.to_string(),
            "light_script" => cfg.light_script = value.to_string(),
            "pcf8574_addr" => {
                cfg.pcf8574_addr = value.parse().map_err(|e: String| {
                    Error::InvalidArgs(format!("invalid pcf8574_addr on line {}: {e}", idx + 1))
                })?;
            }
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown config key '{other}' on line {}",
                    idx + 1
                )));
            }
        }
    }

    super::validate(&cfg)?;
    Ok(cfg)
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str, idx: usize) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidArgs(format!("invalid {key} value on line {}", idx + 1)))
}

fn config_path() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidArgs("HOME not set; cannot locate config directory".into()))?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
