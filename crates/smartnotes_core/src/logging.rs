//! Logging bootstrap.
//!
//! # Responsibility
//! - Install the `flexi_logger` backend behind the `log` facade once per process.
//! - Route records to rotating files under a directory, or to stderr.
//!
//! # Invariants
//! - Repeating init with the same level and target is a no-op.
//! - A later init asking for another level or target is refused.
//! - Log lines carry metadata only, never note titles or content.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "smartnotes";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEPT_LOG_FILES: usize = 5;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

/// Where log records end up.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    /// Rotating files; always an absolute path.
    Directory(PathBuf),
}

impl LogTarget {
    /// Relative directories are resolved against the working directory.
    fn resolve(log_dir: Option<&str>) -> Result<Self, String> {
        let Some(raw) = log_dir.map(str::trim) else {
            return Ok(Self::Stderr);
        };
        if raw.is_empty() {
            return Err("log directory cannot be empty".to_string());
        }

        let path = Path::new(raw);
        if path.is_absolute() {
            return Ok(Self::Directory(path.to_path_buf()));
        }
        let cwd = std::env::current_dir()
            .map_err(|err| format!("cannot resolve log directory `{raw}`: {err}"))?;
        Ok(Self::Directory(cwd.join(path)))
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

struct ActiveLogger {
    level: LevelFilter,
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts logging at `level`, into `log_dir` when given, stderr otherwise.
///
/// # Errors
/// - `level` is not one of off/error/warn/info/debug/trace.
/// - `log_dir` is empty or cannot be created.
/// - Logging is already active with another level or target.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let level = parse_level(level)?;
    let target = LogTarget::resolve(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| {
        let handle = start_backend(level, &target)?;
        info!(
            "event=logging_init module=logging status=ok level={} target={} version={}",
            level.as_str().to_ascii_lowercase(),
            target,
            env!("CARGO_PKG_VERSION")
        );
        Ok::<_, String>(ActiveLogger {
            level,
            target: target.clone(),
            _handle: handle,
        })
    })?;

    if active.level != level || active.target != target {
        return Err(format!(
            "logging already active at level `{}` to {}; refusing to switch to `{}` to {}",
            active.level, active.target, level, target
        ));
    }
    Ok(())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.trim().parse::<LevelFilter>().map_err(|_| {
        format!("unsupported log level `{raw}`; expected off|error|warn|info|debug|trace")
    })
}

fn start_backend(level: LevelFilter, target: &LogTarget) -> Result<LoggerHandle, String> {
    let logger = Logger::with(LogSpecification::builder().default(level).build());

    let logger = match target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEPT_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}
