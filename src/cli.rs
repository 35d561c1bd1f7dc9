use crate::{config::Pcf8574Addr, Error, Result};

/// How the daemon should run: local-only countdown, or queue polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Local,
    Poll,
}

/// Options for a run; values are `None` when not provided on the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub mode: RunMode,
    pub queue_url: Option<String>,
    pub pcf8574_addr: Option<Pcf8574Addr>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

/// Parsed command-line intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunOptions),
    ShowHelp,
    ShowVersion,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut opts = RunOptions::default();
        let mut positionals_seen = 0usize;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::ShowHelp),
                "--version" | "-V" => return Ok(Command::ShowVersion),
                "--queue-url" => {
                    opts.queue_url = Some(take_value(arg, &mut iter)?);
                }
                "--pcf8574-addr" => {
                    let raw = take_value(arg, &mut iter)?;
                    opts.pcf8574_addr = Some(raw.parse().map_err(Error::InvalidArgs)?);
                }
                "--log-level" => {
                    opts.log_level = Some(take_value(arg, &mut iter)?);
                }
                "--log-file" => {
                    opts.log_file = Some(take_value(arg, &mut iter)?);
                }
                flag if flag.starts_with('-') => {
                    return Err(Error::InvalidArgs(format!(
                        "unknown flag '{flag}', try --help"
                    )));
                }
                positional => {
                    match positionals_seen {
                        // First positional selects the mode. Anything that
                        // does not look like a poll request runs local-only.
                        0 => opts.mode = mode_from_arg(positional),
                        // Second positional overrides the queue URL.
                        1 => opts.queue_url = Some(positional.to_string()),
                        _ => {
                            return Err(Error::InvalidArgs(format!(
                                "unexpected argument '{positional}', try --help"
                            )));
                        }
                    }
                    positionals_seen += 1;
                }
            }
        }

        Ok(Command::Run(opts))
    }

    pub fn help() -> &'static str {
        concat!(
            "xmaslcd - Christmas countdown LCD daemon\n",
            "\n",
            "USAGE:\n",
            "  xmaslcd [MODE] [QUEUE_URL] [OPTIONS]\n",
            "  xmaslcd --help\n",
            "  xmaslcd --version\n",
            "\n",
            "MODE:\n",
            "  sq | sqs | poll   Poll the message queue and display incoming\n",
            "                    messages (any prefix match, case-insensitive).\n",
            "                    Without a mode the countdown runs local-only.\n",
            "\n",
            "OPTIONS:\n",
            "  --queue-url <url>       Override the queue URL\n",
            "  --pcf8574-addr <addr>   LCD backpack address: 'auto' or e.g. 0x27\n",
            "  --log-level <level>     error|warn|info|debug|trace (default: info)\n",
            "  --log-file <path>       Also append log output to a file\n",
            "  -h, --help              Show this help\n",
            "  -V, --version           Show version\n",
        )
    }

    pub fn print_help() {
        println!("{}", Self::help());
    }
}

fn mode_from_arg(arg: &str) -> RunMode {
    let lower = arg.to_ascii_lowercase();
    if lower.starts_with("sq") || lower.starts_with("poll") {
        RunMode::Poll
    } else {
        RunMode::Local
    }
}

fn take_value(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| Error::InvalidArgs(format!("expected a value after {flag}")))
}
