//! Уровни логгирования и поиск уровня по категории.

/// Уровень записи. Числовой порядок задаёт правило включения:
/// запись уровня L попадает в журнал, если L >= текущего уровня стока.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    All = 0,
    Trace = 1,
    Debug = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
    Fatal = 6,
    Off = 7,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::All => "ALL",
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Off => "OFF",
        }
    }

    /// Разбор значения из конфигурации, без учёта регистра.
    pub fn parse(value: &str) -> Option<LogLevel> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(LogLevel::All),
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "fatal" => Some(LogLevel::Fatal),
            "off" => Some(LogLevel::Off),
            _ => None,
        }
    }

    /// Пропускает ли текущий уровень `self` запись уровня `record`.
    pub fn enables(self, record: LogLevel) -> bool {
        record as u8 >= self as u8
    }
}

/// Уровень для категории: сперва `<prefix>log.<имя>`, затем родительские
/// категории (хвостовые сегменты отрезаются по точкам), затем
/// `<prefix>defaultlog`. Первый найденный ключ останавливает поиск.
pub fn category_level<F>(prefix: &str, category: &str, get: F) -> Option<LogLevel>
where
    F: Fn(&str) -> Option<String>,
{
    let mut name = category;
    let mut value = get(&format!("{}log.{}", prefix, name));
    while value.is_none() {
        match name.rfind('.') {
            Some(idx) => {
                name = &name[..idx];
                value = get(&format!("{}log.{}", prefix, name));
            }
            None => break,
        }
    }
    value
        .or_else(|| get(&format!("{}defaultlog", prefix)))
        .and_then(|v| LogLevel::parse(&v))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse(" off "), Some(LogLevel::Off));
        assert_eq!(LogLevel::parse("All"), Some(LogLevel::All));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn numeric_ordering_drives_enabling() {
        assert!(LogLevel::Info.enables(LogLevel::Info));
        assert!(LogLevel::Info.enables(LogLevel::Fatal));
        assert!(!LogLevel::Info.enables(LogLevel::Debug));
        assert!(LogLevel::All.enables(LogLevel::Trace));
        assert!(!LogLevel::Off.enables(LogLevel::Fatal));
    }

    #[test]
    fn category_lookup_strips_suffixes() {
        let mut keys = HashMap::new();
        keys.insert("p.log.com.acme".to_string(), "debug".to_string());
        let get = |key: &str| keys.get(key).cloned();

        assert_eq!(
            category_level("p.", "com.acme.Widget", get),
            Some(LogLevel::Debug)
        );
        assert_eq!(category_level("p.", "com.acme", get), Some(LogLevel::Debug));
        assert_eq!(category_level("p.", "com.other", get), None);
    }

    #[test]
    fn category_lookup_falls_back_to_defaultlog() {
        let mut keys = HashMap::new();
        keys.insert("p.defaultlog".to_string(), "warn".to_string());
        let get = |key: &str| keys.get(key).cloned();

        assert_eq!(
            category_level("p.", "com.acme.Widget", get),
            Some(LogLevel::Warn)
        );
    }

    #[test]
    fn nearest_configured_key_wins_even_if_unparsable() {
        let mut keys = HashMap::new();
        keys.insert("p.log.com.acme".to_string(), "nonsense".to_string());
        keys.insert("p.defaultlog".to_string(), "error".to_string());
        let get = |key: &str| keys.get(key).cloned();

        // Найденный, но нечитаемый ключ не подменяется defaultlog.
        assert_eq!(category_level("p.", "com.acme.Widget", get), None);
    }
}
