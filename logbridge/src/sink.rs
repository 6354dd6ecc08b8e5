//! Контракт стока: шесть предикатов уровня и шесть операций записи.

use std::collections::HashMap;
use std::error::Error;

use crate::config::Config;
use crate::error::SinkError;

/// Конструктор стока: имя логгера плюс объемлющая конфигурация.
/// Единственное структурное требование к реализации.
pub type SinkCtor = fn(&str, &Config) -> Result<Box<dyn LogSink>, SinkError>;

pub trait LogSink: Send + Sync {
    fn is_trace_enabled(&self) -> bool;
    fn is_debug_enabled(&self) -> bool;
    fn is_info_enabled(&self) -> bool;
    fn is_warn_enabled(&self) -> bool;
    fn is_error_enabled(&self) -> bool;
    fn is_fatal_enabled(&self) -> bool;

    fn trace(&self, message: &str, cause: Option<&(dyn Error + 'static)>);
    fn debug(&self, message: &str, cause: Option<&(dyn Error + 'static)>);
    fn info(&self, message: &str, cause: Option<&(dyn Error + 'static)>);
    fn warn(&self, message: &str, cause: Option<&(dyn Error + 'static)>);
    fn error(&self, message: &str, cause: Option<&(dyn Error + 'static)>);
    fn fatal(&self, message: &str, cause: Option<&(dyn Error + 'static)>);

    /// Необязательная привязка к фабрике: сток получает её атрибуты и может
    /// переопределить собственные настройки. Вызывается на каждом новом
    /// экземпляре, но только если запись в реестре объявила `binds_factory`.
    fn bind_factory(&mut self, _attributes: &HashMap<String, String>) {}
}

/// Последний компонент имени (после точек и слешей).
pub(crate) fn short_name(name: &str) -> &str {
    let tail = name.rsplit('.').next().unwrap_or(name);
    tail.rsplit('/').next().unwrap_or(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_cuts_dots_and_slashes() {
        assert_eq!(short_name("com.acme.Widget"), "Widget");
        assert_eq!(short_name("plain"), "plain");
        assert_eq!(short_name("path/to.Thing"), "Thing");
        assert_eq!(short_name("a.b/c"), "c");
    }
}
