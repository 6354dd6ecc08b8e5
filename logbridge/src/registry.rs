//! Реестр стоков: явная замена динамической загрузки классов.
//! Область видимости — поименованный словарь конструкторов; цепочка
//! областей заменяет иерархию загрузчиков.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::console::ConsoleSink;
use crate::platform::PlatformSink;
use crate::sink::SinkCtor;

/// Версия контракта `LogSink`. Несовпадение у записи реестра — признак
/// «чужой» копии интерфейса.
pub const SINK_CONTRACT_VERSION: u32 = 1;

/// Имя консольного стока (реализация по умолчанию).
pub const CONSOLE_SINK: &str = "logbridge::ConsoleSink";
/// Имя платформенного стока.
pub const PLATFORM_SINK: &str = "logbridge::PlatformSink";

/// Общий префикс встроенных имён; участвует в подсказке при опечатке.
pub(crate) const SINK_NAME_PREFIX: &str = "logbridge::";

/// Кандидаты автоматического обнаружения, по порядку.
pub(crate) const DEFAULT_SINKS: &[&str] = &[CONSOLE_SINK];

/// Запись реестра: конструктор, версия контракта и желание стока
/// получать атрибуты фабрики.
#[derive(Clone, Copy)]
pub struct SinkEntry {
    pub ctor: SinkCtor,
    pub contract: u32,
    pub binds_factory: bool,
}

pub struct Scope {
    name: String,
    entries: HashMap<String, SinkEntry>,
}

impl Scope {
    pub fn new(name: &str) -> Scope {
        Scope {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, sink_name: &str, entry: SinkEntry) {
        self.entries.insert(sink_name.to_string(), entry);
    }

    pub fn lookup(&self, sink_name: &str) -> Option<&SinkEntry> {
        self.entries.get(sink_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Встроенная область видимости — аналог загрузчика самой библиотеки.
/// Одна на процесс.
pub fn builtin_scope() -> Arc<Scope> {
    static BUILTIN: Lazy<Arc<Scope>> = Lazy::new(|| {
        let mut scope = Scope::new("builtin");
        scope.register(
            CONSOLE_SINK,
            SinkEntry {
                ctor: ConsoleSink::create,
                contract: SINK_CONTRACT_VERSION,
                binds_factory: true,
            },
        );
        scope.register(
            PLATFORM_SINK,
            SinkEntry {
                ctor: PlatformSink::create,
                contract: SINK_CONTRACT_VERSION,
                binds_factory: false,
            },
        );
        Arc::new(scope)
    });
    Arc::clone(&BUILTIN)
}
