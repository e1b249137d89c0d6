use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use crate::get_create_scriptorium_dir;

const KEEP_ROTATED_LOGS: usize = 5;

/// Log levels representing increasing verbosity.
///
/// Setting a level enables that level and all less verbose levels below it:
///
/// - **Silent (0)**: No logging output
/// - **Error (1)**: Only error messages
/// - **Warn (2)**: Warning and error messages
/// - **Info (3)**: Informational, warning, and error messages (default)
/// - **Debug (4)**: All messages, including the per-row skip notices of the loaders
///
/// The level can be set via the `LOG_LEVEL` environment variable or at runtime
/// using `set_log_level()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    /// Parse a log level from a string (case insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Some(Level::Silent),
            "error" => Some(Level::Error),
            "warn" => Some(Level::Warn),
            "info" => Some(Level::Info),
            "debug" => Some(Level::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silent => "Silent",
            Level::Error => "Error",
            Level::Warn => "Warn",
            Level::Info => "Info",
            Level::Debug => "Debug",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Level::Silent => "",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Rotates log files, keeping only the last 5 rotated logs next to `log.txt`.
fn rotate_log_files(log_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match log_file.try_exists() {
        Ok(true) => {}
        // Nothing to rotate, or no permission to look.
        Ok(false) | Err(_) => return Ok(()),
    }

    let modified = std::fs::metadata(log_file)?.modified()?;
    let datetime: DateTime<Local> = modified.into();
    let timestamp = datetime.format("%Y-%m-%dT%H-%M-%S");

    let parent = log_file.parent().ok_or("No parent directory")?;
    std::fs::rename(log_file, parent.join(format!("log.{}.txt", timestamp)))?;

    let mut rotated: Vec<PathBuf> = std::fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with("log.") && name.ends_with(".txt") && name != "log.txt")
        })
        .collect();

    // Timestamped names sort chronologically.
    rotated.sort();

    if rotated.len() > KEEP_ROTATED_LOGS {
        for file in &rotated[0..rotated.len() - KEEP_ROTATED_LOGS] {
            if let Err(e) = std::fs::remove_file(file) {
                eprintln!("Failed to remove old log file {:?}: {}", file, e);
            }
        }
    }

    Ok(())
}

pub struct Logger {
    log_file: PathBuf,
    disable_log: bool,
    enable_print_log: bool,
    level: Mutex<Level>,
}

impl Logger {
    /// Logger writing to `log.txt` in the application directory.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let app_dir = get_create_scriptorium_dir()
            .map_err(|e| format!("Failed to get scriptorium dir: {}", e))?;
        Logger::in_dir(&app_dir)
    }

    /// Logger writing to `log.txt` in `dir`, rotating a previous log first.
    pub fn in_dir(dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(dir)?;
        let log_file = dir.join("log.txt");

        if let Err(e) = rotate_log_files(&log_file) {
            eprintln!("Failed to rotate log files: {}", e);
        }

        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::parse(&v))
            .unwrap_or(Level::Info);

        Ok(Logger {
            log_file,
            disable_log: env_flag("DISABLE_LOG"),
            enable_print_log: env_flag("ENABLE_PRINT_LOG"),
            level: Mutex::new(level),
        })
    }

    fn disabled() -> Self {
        Logger {
            log_file: PathBuf::new(),
            disable_log: true,
            enable_print_log: false,
            level: Mutex::new(Level::Info),
        }
    }

    pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        Ok(())
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    fn write_to_file(&self, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.disable_log {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
        file.write_all(format!("[{}] {}\n", timestamp, message).as_bytes())?;

        Ok(())
    }

    /// Log `msg` at `level` if the current level enables it.
    pub fn log(&self, level: Level, msg: &str) {
        if level == Level::Silent || *self.level.lock() < level {
            return;
        }

        if self.enable_print_log {
            match level {
                Level::Error => tracing::error!("{}", msg),
                Level::Warn => tracing::warn!("{}", msg),
                Level::Info => tracing::info!("{}", msg),
                Level::Debug => tracing::debug!("{}", msg),
                Level::Silent => {}
            }
        }

        if let Err(e) = self.write_to_file(&format!("{}: {}", level.tag(), msg)) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }

    pub fn get_level(&self) -> Level {
        *self.level.lock()
    }

    pub fn set_level(&self, new_level: Level) {
        *self.level.lock() = new_level;
    }
}

pub static LOGGER: OnceLock<Logger> = OnceLock::new();
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

fn with_logger<F, R>(f: F) -> R
where
    F: FnOnce(&Logger) -> R,
{
    TRACING_INITIALIZED.get_or_init(|| {
        if let Err(e) = Logger::init_tracing() {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });

    let logger = LOGGER.get_or_init(|| match Logger::new() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            Logger::disabled()
        }
    });

    f(logger)
}

pub fn info(msg: &str) {
    with_logger(|logger| logger.log(Level::Info, msg));
}

pub fn warn(msg: &str) {
    with_logger(|logger| logger.log(Level::Warn, msg));
}

pub fn error(msg: &str) {
    with_logger(|logger| logger.log(Level::Error, msg));
}

pub fn debug(msg: &str) {
    with_logger(|logger| logger.log(Level::Debug, msg));
}

pub fn get_log_level() -> Level {
    with_logger(|logger| logger.get_level())
}

pub fn set_log_level(level: Level) {
    with_logger(|logger| logger.set_level(level));
}

/// Set the log level from a string. Returns false if the string is not a valid level.
pub fn set_log_level_str(level_str: &str) -> bool {
    match Level::parse(level_str) {
        Some(level) => {
            set_log_level(level);
            true
        }
        None => false,
    }
}

/// Runs `f` and logs how long it took at debug level, e.g. for index builds.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    debug(&format!("{} took {}", label, format_duration(start.elapsed())));
    value
}

/// "00:01:05.250"
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, duration.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse_and_order() {
        assert_eq!(Level::parse("DEBUG"), Some(Level::Debug));
        assert_eq!(Level::parse(" warn "), Some(Level::Warn));
        assert_eq!(Level::parse("verbose"), None);
        assert!(Level::Silent < Level::Error);
        assert!(Level::Info < Level::Debug);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(65_250)), "00:01:05.250");
        assert_eq!(format_duration(Duration::from_secs(3600)), "01:00:00.000");
    }

    #[test]
    fn test_level_filtering_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::in_dir(dir.path()).unwrap();
        logger.set_level(Level::Warn);

        logger.log(Level::Info, "hidden");
        logger.log(Level::Warn, "shown");
        logger.log(Level::Error, "also shown");

        // DISABLE_LOG may be set in the environment running the tests.
        if env_flag("DISABLE_LOG") {
            return;
        }
        let text = std::fs::read_to_string(logger.log_file()).unwrap();
        assert!(!text.contains("hidden"));
        assert!(text.contains("WARN: shown"));
        assert!(text.contains("ERROR: also shown"));
    }

    #[test]
    fn test_rotation_keeps_last_five() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..7 {
            std::fs::write(dir.path().join(format!("log.2020-01-0{}T00-00-00.txt", i + 1)), "old").unwrap();
        }
        std::fs::write(dir.path().join("log.txt"), "current").unwrap();

        rotate_log_files(&dir.path().join("log.txt")).unwrap();

        let rotated: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("log."))
            .collect();
        assert_eq!(rotated.len(), KEEP_ROTATED_LOGS);
        assert!(!dir.path().join("log.txt").exists());
    }
}
