//! Ошибки конфигурации и конструирования стоков.

use thiserror::Error;

/// Ошибки конструктора стока.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Нижележащий бекенд недоступен; для обнаружения это мягкий сигнал,
    /// неотличимый от «библиотека не установлена».
    #[error("underlying backend is unavailable: {0}")]
    Unavailable(String),

    /// Любая другая ошибка при создании стока.
    #[error("{0}")]
    Construction(String),
}

/// Фатальные ошибки обнаружения; всегда доходят до вызывающей стороны.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Пользователь явно назвал реализацию, которую нельзя получить.
    /// Умолчание при этом никогда не подставляется молча.
    #[error("user-specified sink '{name}' cannot be found or is not usable.{suggestion}")]
    UserMisconfiguration { name: String, suggestion: String },

    /// Ни один встроенный кандидат не удалось получить.
    #[error("no suitable sink implementation")]
    NoSinkAvailable,

    /// Запись реестра собрана против другой версии контракта стока.
    #[error("terminating discovery due to bad sink hierarchy: '{name}' is bound to sink contract version {found}, expected {expected}")]
    FlawedHierarchy {
        name: String,
        found: u32,
        expected: u32,
    },

    /// Ошибка конструирования кандидата в строгом режиме.
    #[error("could not instantiate sink '{name}'")]
    FlawedDiscovery {
        name: String,
        #[source]
        source: SinkError,
    },

    /// Назначенная цепочка областей видимости не связана со встроенной.
    #[error("designated scope chain is unrelated to the built-in scope")]
    ScopeRelationship,
}
