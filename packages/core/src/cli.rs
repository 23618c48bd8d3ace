use std::ffi::OsStr;
use std::net::SocketAddr;
use std::sync::OnceLock;

use clap::{Args, Parser};
use regex::Regex;

use crate::level::Level;

pub const LOG_LEVEL_FLAG: &str = "log-level";

/// The `--log-level` flag, for hosts to flatten into their own parser.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Minimum enabled logging level. debug|info|warn|error|dpanic|panic|fatal
    #[arg(long = "log-level", value_name = "LEVEL", default_value_t = Level::Info)]
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(name = "logkit", no_binary_name = true, disable_help_flag = true)]
struct LevelOnly {
    #[command(flatten)]
    log: LogArgs,
}

fn flag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"-{1,2}log-level(?:\s+|\s*=\s*)(\w+)").expect("log-level pattern is valid")
    })
}

/// Finds the first `log-level` flag in `args` (program name excluded).
///
/// Accepts `--log-level=X`, `--log-level X` and the single-dash forms.
/// Returns `Ok(None)` when no flag is present and a clap error when the value
/// is not a known level. Arguments that are not valid UTF-8 are scanned
/// lossily.
pub fn scan_log_level<I, S>(args: I) -> Result<Option<Level>, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let joined = args
        .into_iter()
        .map(|arg| arg.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");

    let Some(captures) = flag_pattern().captures(&joined) else {
        return Ok(None);
    };
    let value = &captures[1];

    let parsed = LevelOnly::try_parse_from([format!("--{}={}", LOG_LEVEL_FLAG, value)])?;
    Ok(Some(parsed.log.log_level))
}

/// Command-line arguments of the `logkit` binary.
#[derive(Debug, Parser)]
#[command(
    name = "logkit",
    version,
    about = "Structured JSON logger with a runtime level endpoint"
)]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    /// Address the admin HTTP server binds to
    #[arg(long)]
    pub admin_addr: Option<SocketAddr>,

    /// Panic on dpanic-level entries
    #[arg(long)]
    pub development: bool,
}
