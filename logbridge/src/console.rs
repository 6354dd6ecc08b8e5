//! Консольный сток: форматированные записи в stderr.

use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;

use crate::config::Config;
use crate::error::SinkError;
use crate::level::{category_level, LogLevel};
use crate::sink::{short_name, LogSink};

/// Префикс ключей конфигурации консольного стока.
pub const CONSOLE_PREFIX: &str = "logbridge.console.";
/// Формат даты по умолчанию (перевод «yyyy/MM/dd HH:mm:ss:SSS zzz»).
pub const DEFAULT_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S:%3f %Z";

#[derive(Debug, Clone)]
struct DisplayOptions {
    show_log_name: bool,
    show_short_name: bool,
    show_date_time: bool,
    date_format: String,
    show_level: bool,
}

impl Default for DisplayOptions {
    fn default() -> DisplayOptions {
        DisplayOptions {
            show_log_name: false,
            show_short_name: true,
            show_date_time: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            show_level: false,
        }
    }
}

impl DisplayOptions {
    /// Накладывает найденные ключи на базовые настройки. Источник ключей
    /// взаимозаменяем: конфигурация процесса или атрибуты фабрики.
    fn overlay<F>(get: F, base: DisplayOptions) -> DisplayOptions
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_bool = |suffix: &str, default: bool| {
            match get(&format!("{}{}", CONSOLE_PREFIX, suffix)) {
                Some(v) => v.eq_ignore_ascii_case("true"),
                None => default,
            }
        };
        let mut opts = DisplayOptions {
            show_log_name: get_bool("showlogname", base.show_log_name),
            show_short_name: get_bool("showShortLogname", base.show_short_name),
            show_date_time: get_bool("showdatetime", base.show_date_time),
            show_level: get_bool("showlevel", base.show_level),
            date_format: base.date_format,
        };
        if opts.show_date_time {
            if let Some(fmt) = get(&format!("{}dateTimeFormat", CONSOLE_PREFIX)) {
                opts.date_format = validated_format(&fmt);
            }
        }
        opts
    }
}

/// Некорректный шаблон даты молча заменяется форматом по умолчанию.
fn validated_format(fmt: &str) -> String {
    let broken = StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error));
    if broken {
        DEFAULT_DATE_FORMAT.to_string()
    } else {
        fmt.to_string()
    }
}

pub struct ConsoleSink {
    name: String,
    short_name: String,
    level: LogLevel,
    opts: DisplayOptions,
    // Сборка и вывод одной записи сериализуются целиком.
    write_lock: Mutex<()>,
}

impl ConsoleSink {
    /// Зарегистрированный конструктор (см. реестр).
    pub(crate) fn create(name: &str, config: &Config) -> Result<Box<dyn LogSink>, SinkError> {
        Ok(Box::new(ConsoleSink::new(name, config)))
    }

    pub fn new(name: &str, config: &Config) -> ConsoleSink {
        let opts = DisplayOptions::overlay(|key| config.resolve(key), DisplayOptions::default());
        let level = category_level(CONSOLE_PREFIX, name, |key| config.resolve(key))
            .unwrap_or(LogLevel::Info);
        ConsoleSink {
            name: name.to_string(),
            short_name: short_name(name).to_string(),
            level,
            opts,
            write_lock: Mutex::new(()),
        }
    }

    fn is_level_enabled(&self, level: LogLevel) -> bool {
        self.level.enables(level)
    }

    /// Сборка строки записи; вынесена отдельно ради тестируемости.
    fn format_record(
        &self,
        level: LogLevel,
        message: &str,
        cause: Option<&(dyn Error + 'static)>,
    ) -> String {
        let mut buf = String::new();
        if self.opts.show_date_time {
            buf.push_str(&Local::now().format(&self.opts.date_format).to_string());
            buf.push(' ');
        }
        if self.opts.show_level {
            buf.push('[');
            buf.push_str(level.as_str());
            buf.push_str("] ");
        }
        if self.opts.show_short_name {
            buf.push_str(&self.short_name);
            buf.push_str(" - ");
        } else if self.opts.show_log_name {
            buf.push_str(&self.name);
            buf.push_str(" - ");
        }
        buf.push_str(message);
        if let Some(cause) = cause {
            buf.push_str(" <");
            buf.push_str(&cause.to_string());
            buf.push('>');
            let mut source = cause.source();
            while let Some(inner) = source {
                buf.push_str("\nCaused by: ");
                buf.push_str(&inner.to_string());
                source = inner.source();
            }
        }
        buf
    }

    fn log(&self, level: LogLevel, message: &str, cause: Option<&(dyn Error + 'static)>) {
        if !self.is_level_enabled(level) {
            return;
        }
        let record = self.format_record(level, message, cause);
        let _guard = self.write_lock.lock().unwrap();
        eprintln!("{}", record);
    }
}

impl LogSink for ConsoleSink {
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

    fn bind_factory(&mut self, attributes: &HashMap<String, String>) {
        // Атрибуты фабрики сильнее объемлющей конфигурации.
        self.opts = DisplayOptions::overlay(|key| attributes.get(key).cloned(), self.opts.clone());
        if let Some(level) =
            category_level(CONSOLE_PREFIX, &self.name, |key| attributes.get(key).cloned())
        {
            self.level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Inner;
    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "root cause")
        }
    }
    impl Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);
    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "outer failure")
        }
    }
    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn default_record_shows_short_name_only() {
        let config = Config::from_pairs::<_, String, String>([]);
        let sink = ConsoleSink::new("com.acme.Widget", &config);
        assert_eq!(
            sink.format_record(LogLevel::Info, "started", None),
            "Widget - started"
        );
    }

    #[test]
    fn level_and_full_name_are_opt_in() {
        let config = Config::from_pairs([
            ("logbridge.console.showlevel", "true"),
            ("logbridge.console.showShortLogname", "false"),
            ("logbridge.console.showlogname", "true"),
        ]);
        let sink = ConsoleSink::new("com.acme.Widget", &config);
        assert_eq!(
            sink.format_record(LogLevel::Warn, "careful", None),
            "[WARN] com.acme.Widget - careful"
        );
    }

    #[test]
    fn cause_chain_is_appended() {
        let config = Config::from_pairs([("logbridge.console.showShortLogname", "false")]);
        let sink = ConsoleSink::new("x", &config);
        let err = Outer(Inner);
        assert_eq!(
            sink.format_record(LogLevel::Error, "failed", Some(&err)),
            "failed <outer failure>\nCaused by: root cause"
        );
    }

    #[test]
    fn default_level_is_info() {
        let config = Config::from_pairs::<_, String, String>([]);
        let sink = ConsoleSink::new("com.acme.Widget", &config);
        assert!(sink.is_info_enabled());
        assert!(sink.is_fatal_enabled());
        assert!(!sink.is_debug_enabled());
        assert!(!sink.is_trace_enabled());
    }

    #[test]
    fn category_key_sets_the_level() {
        let config = Config::from_pairs([("logbridge.console.log.com.acme", "debug")]);
        let sink = ConsoleSink::new("com.acme.Widget", &config);
        assert!(sink.is_debug_enabled());
        assert!(!sink.is_trace_enabled());
    }

    #[test]
    fn invalid_date_format_falls_back_to_default() {
        assert_eq!(validated_format("%Y %Q %d"), DEFAULT_DATE_FORMAT);
        assert_eq!(validated_format("%H:%M"), "%H:%M");
    }

    #[test]
    fn bind_factory_overlays_attributes() {
        let config = Config::from_pairs::<_, String, String>([]);
        let mut sink = ConsoleSink::new("com.acme.Widget", &config);
        let mut attributes = HashMap::new();
        attributes.insert(
            "logbridge.console.showlevel".to_string(),
            "true".to_string(),
        );
        attributes.insert(
            "logbridge.console.log.com.acme".to_string(),
            "trace".to_string(),
        );
        sink.bind_factory(&attributes);

        assert!(sink.is_trace_enabled());
        assert_eq!(
            sink.format_record(LogLevel::Trace, "deep", None),
            "[TRACE] Widget - deep"
        );
    }
}
