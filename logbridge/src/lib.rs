//! logbridge — мост журналирования с обнаружением реализации на лету.
//!
//! Библиотека отделяет вызывающий код от конкретного бэкенда журнала:
//! код пишет через фасад [`Logger`], а фабрика [`LogFactory`] сама
//! подбирает сток ([`LogSink`]) по атрибутам, переменным окружения и
//! файлам свойств. Из коробки есть консольный сток и сток системного
//! журнала платформы; свои стоки подключаются через реестр
//! ([`Scope`]).
//!
//! Простейший случай:
//!
//! ```no_run
//! let log = logbridge::get_logger("com.acme.Widget").unwrap();
//! logbridge::info!(log, "started in {} ms", 42);
//! ```

pub mod config;
pub mod console;
mod diag;
mod discovery;
pub mod error;
pub mod factory;
pub mod level;
pub mod logger;
pub mod platform;
pub mod registry;
pub mod sink;

pub use config::Config;
pub use error::{ConfigError, SinkError};
pub use factory::LogFactory;
pub use level::LogLevel;
pub use logger::{get_logger, get_logger_for, Logger};
pub use registry::{
    builtin_scope, Scope, SinkEntry, CONSOLE_SINK, PLATFORM_SINK, SINK_CONTRACT_VERSION,
};
pub use sink::{LogSink, SinkCtor};
