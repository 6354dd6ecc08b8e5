//! Фасад Logger: тонкая обёртка над стоком плюс макросы с форматом.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::factory::LogFactory;
use crate::level::LogLevel;
use crate::sink::LogSink;

/// Именованный логгер. Дешёв в клонировании, делит сток с фабрикой.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

/// Логгер из общефабричного синглтона.
pub fn get_logger(name: &str) -> Result<Logger, ConfigError> {
    LogFactory::global().logger(name)
}

/// Логгер, именованный по типу вызывающего кода.
pub fn get_logger_for<T: ?Sized>() -> Result<Logger, ConfigError> {
    get_logger(std::any::type_name::<T>())
}

impl Logger {
    pub(crate) fn new(sink: Arc<dyn LogSink>) -> Logger {
        Logger { sink }
    }

    /// Единая точка записи: форматирование откладывается до проверки
    /// уровня, выключенная запись ничего не стоит.
    pub fn log(
        &self,
        level: LogLevel,
        args: fmt::Arguments<'_>,
        cause: Option<&(dyn Error + 'static)>,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        let message = fmt::format(args);
        match level {
            LogLevel::Trace => self.sink.trace(&message, cause),
            LogLevel::Debug => self.sink.debug(&message, cause),
            LogLevel::Info => self.sink.info(&message, cause),
            LogLevel::Warn => self.sink.warn(&message, cause),
            LogLevel::Error => self.sink.error(&message, cause),
            LogLevel::Fatal => self.sink.fatal(&message, cause),
            LogLevel::All | LogLevel::Off => {}
        }
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Trace => self.sink.is_trace_enabled(),
            LogLevel::Debug => self.sink.is_debug_enabled(),
            LogLevel::Info => self.sink.is_info_enabled(),
            LogLevel::Warn => self.sink.is_warn_enabled(),
            LogLevel::Error => self.sink.is_error_enabled(),
            LogLevel::Fatal => self.sink.is_fatal_enabled(),
            LogLevel::All | LogLevel::Off => false,
        }
    }

    pub fn is_trace_enabled(&self) -> bool {
        self.sink.is_trace_enabled()
    }
    pub fn is_debug_enabled(&self) -> bool {
        self.sink.is_debug_enabled()
    }
    pub fn is_info_enabled(&self) -> bool {
        self.sink.is_info_enabled()
    }
    pub fn is_warn_enabled(&self) -> bool {
        self.sink.is_warn_enabled()
    }
    pub fn is_error_enabled(&self) -> bool {
        self.sink.is_error_enabled()
    }
    pub fn is_fatal_enabled(&self) -> bool {
        self.sink.is_fatal_enabled()
    }

    pub fn trace(&self, message: &str) {
        self.sink.trace(message, None);
    }
    pub fn debug(&self, message: &str) {
        self.sink.debug(message, None);
    }
    pub fn info(&self, message: &str) {
        self.sink.info(message, None);
    }
    pub fn warn(&self, message: &str) {
        self.sink.warn(message, None);
    }
    pub fn error(&self, message: &str) {
        self.sink.error(message, None);
    }
    pub fn fatal(&self, message: &str) {
        self.sink.fatal(message, None);
    }

    pub fn trace_cause(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.sink.trace(message, Some(cause));
    }
    pub fn debug_cause(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.sink.debug(message, Some(cause));
    }
    pub fn info_cause(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.sink.info(message, Some(cause));
    }
    pub fn warn_cause(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.sink.warn(message, Some(cause));
    }
    pub fn error_cause(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.sink.error(message, Some(cause));
    }
    pub fn fatal_cause(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.sink.fatal(message, Some(cause));
    }
}

// ===== Макросы =====

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log(
            $crate::LogLevel::Trace,
            ::std::format_args!($($arg)*),
            ::std::option::Option::None,
        );
    }};
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log(
            $crate::LogLevel::Debug,
            ::std::format_args!($($arg)*),
            ::std::option::Option::None,
        );
    }};
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log(
            $crate::LogLevel::Info,
            ::std::format_args!($($arg)*),
            ::std::option::Option::None,
        );
    }};
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log(
            $crate::LogLevel::Warn,
            ::std::format_args!($($arg)*),
            ::std::option::Option::None,
        );
    }};
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log(
            $crate::LogLevel::Error,
            ::std::format_args!($($arg)*),
            ::std::option::Option::None,
        );
    }};
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.log(
            $crate::LogLevel::Fatal,
            ::std::format_args!($($arg)*),
            ::std::option::Option::None,
        );
    }};
}
