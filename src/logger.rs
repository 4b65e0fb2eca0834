use chrono::{DateTime, Utc};
use colored::*;
use log::kv::{Key, Source};
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::OpenAIClientSettings;

const REQUEST_ID_KEY: &str = "request_id";
const DURATION_KEY: &str = "duration_ms";

static CLIENT_LOGGER: Lazy<ClientLogger> = Lazy::new(ClientLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

/// Installs the logger as the `log` backend. Only the first call installs it;
/// later calls only swap the configuration.
pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let level = config.min_level.to_level_filter();
    CLIENT_LOGGER.update_config(config)?;

    if log::set_logger(&*CLIENT_LOGGER).is_err() {
        log::debug!("Logger already installed, configuration updated");
    }

    log::set_max_level(level);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }

    pub fn from_log_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub file: String,
    pub line: u32,
    pub request_id: Option<String>,
    pub duration_ms: Option<u64>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String, module: String, file: String, line: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            message,
            module,
            file,
            line,
            request_id: None,
            duration_ms: None,
        }
    }

    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis() as u64);
        self
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_file_location: bool,
    pub show_module: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_file_path: Option<String>,
    pub custom_prefix: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_file_location: false,
            show_module: true,
            include_timestamp: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_file_path: None,
            custom_prefix: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file_path = Some(path.to_string());
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.custom_prefix = Some(prefix.into());
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_colors: true,
            show_emojis: true,
            show_file_location: true,
            ..Default::default()
        }
    }
}

pub struct ClientLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl ClientLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    fn update_config(&self, new_config: LoggerConfig) -> Result<(), String> {
        let file = match &new_config.log_file_path {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path, e))?,
            ),
            None => None,
        };

        if let Ok(mut log_file) = self.log_file.lock() {
            *log_file = file;
        }
        if let Ok(mut config) = self.config.lock() {
            *config = new_config;
        }
        Ok(())
    }

    fn format_line(entry: &LogEntry, config: &LoggerConfig) -> String {
        let colors = config.show_colors;
        let mut output = String::new();

        if let Some(prefix) = &config.custom_prefix {
            if colors {
                output.push_str(&format!("[{}] ", prefix.bright_white().bold()));
            } else {
                output.push_str(&format!("[{}] ", prefix));
            }
        }

        if config.include_timestamp {
            let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
            if colors {
                output.push_str(&format!("{} ", timestamp.bright_black()));
            } else {
                output.push_str(&format!("{} ", timestamp));
            }
        }

        let level = if config.show_emojis {
            format!("{} {}", entry.level.emoji(), entry.level.as_str())
        } else {
            entry.level.as_str().to_string()
        };
        if colors {
            output.push_str(&format!("[{}] ", level.color(entry.level.color()).bold()));
        } else {
            output.push_str(&format!("[{}] ", level));
        }

        if config.show_module && !entry.module.is_empty() {
            if colors {
                output.push_str(&format!("{}: ", entry.module.bright_blue()));
            } else {
                output.push_str(&format!("{}: ", entry.module));
            }
        }

        output.push_str(&entry.message);

        if let Some(request_id) = &entry.request_id {
            output.push_str(&format!(" [req:{}]", request_id));
        }

        if let Some(duration) = entry.duration_ms {
            if colors {
                output.push_str(&format!(" [{}ms]", duration.to_string().bright_magenta()));
            } else {
                output.push_str(&format!(" [{}ms]", duration));
            }
        }

        if config.show_file_location {
            let location = format!("{}:{}", entry.file, entry.line);
            if colors {
                output.push_str(&format!(" ({})", location.bright_black()));
            } else {
                output.push_str(&format!(" ({})", location));
            }
        }

        output
    }

    fn render(entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            serde_json::to_string(entry).unwrap_or_default()
        } else {
            Self::format_line(entry, config)
        }
    }

    fn entry_for(record: &Record) -> LogEntry {
        let mut entry = LogEntry::new(
            LogLevel::from_log_level(record.level()),
            record.args().to_string(),
            record.module_path().unwrap_or("unknown").to_string(),
            record.file().unwrap_or("unknown").to_string(),
            record.line().unwrap_or(0),
        );

        let fields = record.key_values();
        if let Some(request_id) = fields.get(Key::from(REQUEST_ID_KEY)) {
            entry = entry.with_request_id(request_id.to_string());
        }
        if let Some(ms) = fields.get(Key::from(DURATION_KEY)).and_then(|v| v.to_u64()) {
            entry = entry.with_duration(Duration::from_millis(ms));
        }
        entry
    }
}

impl log::Log for ClientLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level.to_level_filter(),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = Self::entry_for(record);
        let Ok(config) = self.config.lock() else {
            return;
        };

        println!("{}", Self::render(&entry, &config));

        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                // Files never get ANSI escapes.
                let plain = LoggerConfig {
                    show_colors: false,
                    ..config.clone()
                };
                let _ = writeln!(file, "{}", Self::render(&entry, &plain));
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Measures one request. `stop()` marks it completed; a timer dropped
/// without `stop()` (error return or cancelled future) is logged as such.
pub struct Timer {
    start: Instant,
    name: String,
    request_id: String,
    stopped: bool,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        let request_id = Uuid::new_v4().simple().to_string();
        log::debug!(request_id = request_id.as_str(); "⏱️  {} started", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
            request_id,
            stopped: false,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        log::info!(
            request_id = self.request_id.as_str(),
            duration_ms = self.elapsed_ms();
            "⏱️  {} completed",
            self.name
        );
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        log::warn!(
            request_id = self.request_id.as_str(),
            duration_ms = self.elapsed_ms();
            "⏱️  {} ended without completing",
            self.name
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_client_info(settings: &OpenAIClientSettings) {
    log::info!("⚙️  OpenAI client configured:");
    log::info!("   Base URL: {}", settings.base_url());
    log::info!("   Timeout: {}s", settings.timeout.as_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Error.emoji(), "❌");
        assert_eq!(LogLevel::Debug.color(), Color::Blue);
        assert_eq!(LogLevel::from_log_level(Level::Warn), LogLevel::Warn);
        assert!(LogLevel::Trace < LogLevel::Error);
    }

    #[test]
    fn test_logger_config() {
        let config = LoggerConfig::development();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.show_colors);

        let prod_config = LoggerConfig::production();
        assert!(!prod_config.show_colors);
        assert!(prod_config.output_json);
    }

    #[test]
    fn test_plain_line_format() {
        let config = LoggerConfig {
            show_colors: false,
            show_emojis: false,
            include_timestamp: false,
            ..Default::default()
        };
        let entry = LogEntry::new(
            LogLevel::Info,
            "POST /images/generations".into(),
            "openai_client::openai".into(),
            "src/openai/mod.rs".into(),
            10,
        )
        .with_request_id("abc".into())
        .with_duration(Duration::from_millis(42));

        assert_eq!(
            ClientLogger::format_line(&entry, &config),
            "[INFO] openai_client::openai: POST /images/generations [req:abc] [42ms]"
        );
    }

    #[test]
    fn test_json_entry() {
        let config = LoggerConfig::production();
        let entry = LogEntry::new(
            LogLevel::Warn,
            "no images".into(),
            "m".into(),
            "f.rs".into(),
            1,
        );
        let value: serde_json::Value =
            serde_json::from_str(&ClientLogger::render(&entry, &config)).unwrap();
        assert_eq!(value["level"], "Warn");
        assert_eq!(value["message"], "no images");
    }

    // Installs the global logger; the only test that does.
    #[test]
    fn test_timer_fields_reach_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.log");
        let config = LoggerConfig::production().with_file_output(path.to_str().unwrap());
        assert!(init_with_config(config).is_ok());

        let mut finished = timer("images/generations");
        let finished_id = finished.request_id().to_string();
        finished.stop();

        let abandoned = timer("embeddings");
        let abandoned_id = abandoned.request_id().to_string();
        drop(abandoned);
        log::logger().flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        let entries: Vec<serde_json::Value> = contents
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        let timed = |id: &str| {
            entries
                .iter()
                .find(|e| e["request_id"] == id && e["duration_ms"].is_u64())
                .cloned()
        };

        let completed = timed(&finished_id).expect("completed line");
        assert_eq!(completed["level"], "Info");
        assert!(completed["message"].as_str().unwrap().contains("completed"));

        let ended = timed(&abandoned_id).expect("abandoned line");
        assert_eq!(ended["level"], "Warn");
        assert!(ended["message"]
            .as_str()
            .unwrap()
            .contains("ended without completing"));

        assert!(init().is_ok());
    }

    #[test]
    fn test_timer_stops_once() {
        let mut timer = timer("test");
        assert_eq!(timer.request_id().len(), 32);
        timer.stop();
        timer.stop();
        assert!(timer.stopped);
    }
}
