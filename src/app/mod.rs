use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::{
    cli::{RunMode, RunOptions},
    config::{Config, Pcf8574Addr},
    display::{lcd::Lcd, screen::Screen},
    host,
    lights::LightEffect,
    queue::SqsQueue,
    stats::Stats,
    Result,
};

mod countdown_loop;
mod lifecycle;
mod logger;
mod poller;
mod session;

use countdown_loop::run_countdown_loop;
pub use logger::{LogLevel, Logger};
pub use poller::PollerExit;
use poller::Poller;
use session::MessageSession;

/// Merged settings for one daemon run: config file values with CLI
/// overrides applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
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
    pub poll_mode: bool,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_sources(Config::default(), RunOptions::default())
    }
}

impl AppConfig {
    pub fn from_sources(config: Config, opts: RunOptions) -> Self {
        Self {
            cols: config.cols,
            rows: config.rows,
            header: config.header,
            queue_url: opts.queue_url.unwrap_or(config.queue_url),
            hold_secs: config.hold_secs,
            window_secs: config.window_secs,
            backoff_secs: config.backoff_secs,
            startup_info_secs: config.startup_info_secs,
            stats_file: config.stats_file,
            messages_file: config.messages_file,
            light_script: config.light_script,
            pcf8574_addr: opts.pcf8574_addr.unwrap_or(config.pcf8574_addr),
            poll_mode: matches!(opts.mode, RunMode::Poll),
            log_level: opts
                .log_level
                .as_deref()
                .and_then(|s| LogLevel::from_str(s).ok())
                .unwrap_or_default(),
            log_file: opts.log_file,
        }
    }
}

pub struct App {
    config: AppConfig,
    logger: Logger,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let logger = Logger::new(config.log_level, config.log_file.clone());
        Self { config, logger }
    }

    pub fn from_options(opts: RunOptions) -> Result<Self> {
        let cfg_file = Config::load_or_default()?;
        let merged = AppConfig::from_sources(cfg_file, opts);
        Ok(Self::new(merged))
    }

    /// Entry point for the daemon. The only fatal failure is an unusable
    /// display; everything else degrades to the local countdown loop.
    pub fn run(&self) -> Result<()> {
        let config = &self.config;

        let lcd = Lcd::new(config.cols, config.rows, config.pcf8574_addr.clone())?;
        let mut screen = Screen::new(lcd);
        let running = lifecycle::create_shutdown_flag()?;
        let mut lights = LightEffect::new(resolve_light_script(&config.light_script));

        let mut stats = match Stats::load(Path::new(&config.stats_file)) {
            Ok(stats) => stats,
            Err(err) => {
                self.logger.warn(format!("failed to load stats: {err}"));
                Stats::default()
            }
        };

        self.logger.info(format!(
            "daemon start (cols={}, rows={}, mode={})",
            config.cols,
            config.rows,
            if config.poll_mode { "poll" } else { "local" }
        ));
        screen.backlight_on();

        let tick = Duration::from_secs(1);

        // One-off startup screen with the Wi-Fi SSID and IP address.
        if config.startup_info_secs > 0 && running.load(std::sync::atomic::Ordering::SeqCst) {
            let info = format!("WIFI: {} IP: {}", host::wifi_ssid(), host::ip_address());
            let mut session = MessageSession {
                screen: &mut screen,
                lights: &mut lights,
                header: &config.header,
                logger: &self.logger,
                tick,
            };
            session.show(&info, config.startup_info_secs, &running);
        }

        if config.poll_mode {
            match SqsQueue::connect(&config.queue_url, config.hold_secs) {
                Ok(mut queue) => {
                    self.logger
                        .info(format!("polling queue: {}", config.queue_url));
                    let mut poller = Poller {
                        screen: &mut screen,
                        queue: &mut queue,
                        lights: &mut lights,
                        stats: &mut stats,
                        config,
                        logger: &self.logger,
                        tick,
                        probe_network: host::network_available,
                    };
                    match poller.run(&running) {
                        PollerExit::Shutdown => {}
                        PollerExit::Offline => {
                            self.logger
                                .info("falling back to local countdown (offline)");
                            run_countdown_loop(&mut screen, &config.header, tick, &running);
                        }
                        PollerExit::QueueFailed(detail) => {
                            self.logger.info(format!(
                                "falling back to local countdown after queue failure: {detail}"
                            ));
                            run_countdown_loop(&mut screen, &config.header, tick, &running);
                        }
                    }
                }
                Err(err) => {
                    self.logger.warn(format!(
                        "failed to set up queue client: {err}; falling back to local countdown"
                    ));
                    run_countdown_loop(&mut screen, &config.header, tick, &running);
                }
            }
        } else {
            run_countdown_loop(&mut screen, &config.header, tick, &running);
        }

        lifecycle::teardown(&mut screen, &mut lights, &self.logger);
        self.logger.info("daemon exiting");
        Ok(())
    }
}

/// Relative script paths resolve next to the binary, mirroring how the
/// effect script is deployed alongside it.
fn resolve_light_script(script: &str) -> PathBuf {
    let path = PathBuf::from(script);
    if path.is_absolute() {
        return path;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&path)))
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_merges_cli_overrides() {
        let cfg_file = Config::default();
        let opts = RunOptions {
            mode: RunMode::Poll,
            queue_url: Some("https://sqs.us-east-1.amazonaws.com/5/q".into()),
            pcf8574_addr: Some(Pcf8574Addr::Addr(0x3F)),
            log_level: Some("debug".into()),
            log_file: None,
        };
        let merged = AppConfig::from_sources(cfg_file, opts);
        assert!(merged.poll_mode);
        assert_eq!(merged.queue_url, "https://sqs.us-east-1.amazonaws.com/5/q");
        assert_eq!(merged.pcf8574_addr, Pcf8574Addr::Addr(0x3F));
        assert_eq!(merged.log_level, LogLevel::Debug);
    }

    #[test]
    fn config_prefers_file_values_when_cli_missing() {
        let cfg_file = Config {
            header: "FILE HEADER".into(),
            queue_url: "https://sqs.eu-west-1.amazonaws.com/8/q".into(),
            ..Config::default()
        };
        let merged = AppConfig::from_sources(cfg_file.clone(), RunOptions::default());
        assert!(!merged.poll_mode);
        assert_eq!(merged.header, cfg_file.header);
        assert_eq!(merged.queue_url, cfg_file.queue_url);
        assert_eq!(merged.pcf8574_addr, cfg_file.pcf8574_addr);
    }

    #[test]
    fn absolute_light_script_is_used_verbatim() {
        let path = resolve_light_script("/opt/neopixel1.py");
        assert_eq!(path, PathBuf::from("/opt/neopixel1.py"));
    }

    #[test]
    fn relative_light_script_resolves_beside_the_binary() {
        let path = resolve_light_script("neopixel1.py");
        assert!(path.ends_with("neopixel1.py"));
        assert!(path.is_absolute() || path == PathBuf::from("neopixel1.py"));
    }
}
