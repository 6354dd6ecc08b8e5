//! Платформенный сток: системный журнал операционной системы.
//! Недоступность журнала при создании — мягкий сигнал для обнаружения.

use std::error::Error;

use crate::config::Config;
use crate::error::SinkError;
use crate::level::{category_level, LogLevel};
use crate::sink::{short_name, LogSink};

/// Префикс ключей конфигурации платформенного стока.
pub const PLATFORM_PREFIX: &str = "logbridge.platform.";

#[cfg(target_os = "linux")]
mod backend {
    use std::process;
    use std::sync::Mutex;

    use syslog::{Facility, Formatter3164, LoggerBackend};

    use crate::error::SinkError;
    use crate::level::LogLevel;

    pub struct SystemLogger {
        // API syslog требует &mut self на каждую запись.
        writer: Mutex<syslog::Logger<LoggerBackend, Formatter3164>>,
    }

    impl SystemLogger {
        pub fn connect(process_name: &str) -> Result<SystemLogger, SinkError> {
            let formatter = Formatter3164 {
                facility: Facility::LOG_USER,
                hostname: None,
                process: process_name.to_string(),
                pid: process::id(),
            };
            match syslog::unix(formatter) {
                Ok(writer) => Ok(SystemLogger {
                    writer: Mutex::new(writer),
                }),
                Err(e) => Err(SinkError::Unavailable(format!(
                    "syslog connection failed: {}",
                    e
                ))),
            }
        }

        pub fn write(&self, level: LogLevel, message: &str) {
            let mut writer = self.writer.lock().unwrap();
            let _ = match level {
                LogLevel::All | LogLevel::Trace | LogLevel::Debug => writer.debug(message),
                LogLevel::Info => writer.info(message),
                LogLevel::Warn => writer.warning(message),
                _ => writer.err(message),
            };
        }
    }
}

#[cfg(target_os = "windows")]
mod backend {
    use winlog_rs::{EventKind, EventLogWriter};

    use crate::error::SinkError;
    use crate::level::LogLevel;

    pub struct SystemLogger {
        writer: EventLogWriter,
    }

    impl SystemLogger {
        pub fn connect(process_name: &str) -> Result<SystemLogger, SinkError> {
            match EventLogWriter::register(process_name) {
                Some(writer) => Ok(SystemLogger { writer }),
                None => Err(SinkError::Unavailable(
                    "event log source registration failed".to_string(),
                )),
            }
        }

        pub fn write(&self, level: LogLevel, message: &str) {
            let kind = match level {
                LogLevel::All | LogLevel::Trace | LogLevel::Debug | LogLevel::Info => {
                    EventKind::Info
                }
                LogLevel::Warn => EventKind::Warning,
                _ => EventKind::Error,
            };
            let _ = self.writer.report(kind, message);
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod backend {
    use crate::error::SinkError;
    use crate::level::LogLevel;

    pub struct SystemLogger;

    impl SystemLogger {
        pub fn connect(_process_name: &str) -> Result<SystemLogger, SinkError> {
            Err(SinkError::Unavailable(
                "no system log sink on this target".to_string(),
            ))
        }

        pub fn write(&self, _level: LogLevel, _message: &str) {}
    }
}

pub struct PlatformSink {
    level: LogLevel,
    logger: backend::SystemLogger,
}

impl PlatformSink {
    /// Зарегистрированный конструктор (см. реестр).
    pub(crate) fn create(name: &str, config: &Config) -> Result<Box<dyn LogSink>, SinkError> {
        Ok(Box::new(PlatformSink::new(name, config)?))
    }

    pub fn new(name: &str, config: &Config) -> Result<PlatformSink, SinkError> {
        let show_short_tag =
            config.resolve_bool(&format!("{}showShortTag", PLATFORM_PREFIX), false);
        let tag = if show_short_tag {
            short_name(name)
        } else {
            name
        };
        let logger = backend::SystemLogger::connect(tag)?;
        let level = category_level(PLATFORM_PREFIX, name, |key| config.resolve(key))
            .unwrap_or(LogLevel::Info);
        Ok(PlatformSink { level, logger })
    }

    fn is_level_enabled(&self, level: LogLevel) -> bool {
        self.level.enables(level)
    }

    fn log(&self, level: LogLevel, message: &str, cause: Option<&(dyn Error + 'static)>) {
        if !self.is_level_enabled(level) {
            return;
        }
        let text = match cause {
            Some(cause) => format!("{} <{}>", message, cause),
            None => message.to_string(),
        };
        self.logger.write(level, &text);
    }
}

impl LogSink for PlatformSink {
    fn is_trace_enabled(&self) -> bool {
        self.is_level_enabled(LogLevel::Trace)
    }
    fn is_debug_enabled(&self) -> bool {
        self.is_level_enabled(LogLevel::Debug)
    }
    fn is_info_enabled(&self) -> bool {
        self.is_level_enabled(LogLevel::Info)
    }
    fn is_warn_enabled(&self) -> bool {
        self.is_level_enabled(LogLevel::Warn)
    }
    fn is_error_enabled(&self) -> bool {
        self.is_level_enabled(LogLevel::Error)
    }
    fn is_fatal_enabled(&self) -> bool {
        self.is_level_enabled(LogLevel::Fatal)
    }

    fn trace(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.log(LogLevel::Trace, message, cause);
    }
    fn debug(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.log(LogLevel::Debug, message, cause);
    }
    fn info(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.log(LogLevel::Info, message, cause);
    }
    fn warn(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.log(LogLevel::Warn, message, cause);
    }
    fn error(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.log(LogLevel::Error, message, cause);
    }
    fn fatal(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.log(LogLevel::Fatal, message, cause);
    }
}
