//! Фабрика стоков: кеш экземпляров по имени, атрибуты, синглтон процесса.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::config::{Config, DIAGNOSTICS_PROPERTY};
use crate::diag::Diagnostics;
use crate::discovery::{Binding, Discovery};
use crate::error::ConfigError;
use crate::logger::Logger;
use crate::registry::{builtin_scope, Scope};
use crate::sink::LogSink;

pub struct LogFactory {
    config: Config,
    diag: Diagnostics,
    discovery: Discovery,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    attributes: HashMap<String, String>,
    instances: HashMap<String, Arc<dyn LogSink>>,
    binding: Option<Binding>,
}

impl LogFactory {
    pub fn new(config: Config) -> LogFactory {
        LogFactory::with_scopes(config, vec![builtin_scope()])
    }

    /// Фабрика с назначенной цепочкой областей видимости: локальные
    /// реестры идут первыми, встроенная область обычно последней.
    pub fn with_scopes(config: Config, scopes: Vec<Arc<Scope>>) -> LogFactory {
        let diag = Diagnostics::new(config.resolve_bool(DIAGNOSTICS_PROPERTY, false));
        diag.log("Instance created.");
        LogFactory {
            discovery: Discovery::new(scopes),
            config,
            diag,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Общефабричный синглтон процесса.
    pub fn global() -> &'static LogFactory {
        static GLOBAL: Lazy<LogFactory> = Lazy::new(|| LogFactory::new(Config::from_env()));
        &GLOBAL
    }

    /// Возвращает сток для имени, создавая его при первом обращении.
    /// Первое успешное обнаружение фиксирует привязку для всех
    /// последующих имён.
    pub fn get_or_create(&self, name: &str) -> Result<Arc<dyn LogSink>, ConfigError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.instances.get(name) {
            return Ok(Arc::clone(existing));
        }

        let sink: Box<dyn LogSink> = match inner.binding.clone() {
            Some(binding) => self.instantiate(&binding, name, &inner.attributes)?,
            None => {
                let (sink, binding) =
                    self.discovery
                        .discover(name, &self.config, &inner.attributes, &self.diag)?;
                inner.binding = Some(binding);
                sink
            }
        };

        let sink: Arc<dyn LogSink> = Arc::from(sink);
        inner.instances.insert(name.to_string(), Arc::clone(&sink));
        Ok(sink)
    }

    /// Фасад Logger поверх стока этой фабрики.
    pub fn logger(&self, name: &str) -> Result<Logger, ConfigError> {
        Ok(Logger::new(self.get_or_create(name)?))
    }

    fn instantiate(
        &self,
        binding: &Binding,
        name: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<Box<dyn LogSink>, ConfigError> {
        match (binding.ctor)(name, &self.config) {
            Ok(mut sink) => {
                if binding.binds_factory {
                    sink.bind_factory(attributes);
                }
                Ok(sink)
            }
            Err(err) => Err(ConfigError::FlawedDiscovery {
                name: binding.sink_name.clone(),
                source: err,
            }),
        }
    }

    /// Установка (или снятие, при `None`) атрибута конфигурации. После
    /// разрешения привязки вызов принимается, но уже ни на что не влияет.
    pub fn set_attribute(&self, key: &str, value: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        if inner.binding.is_some() {
            self.diag
                .log("setAttribute: call too late; configuration already performed.");
        }
        match value {
            Some(v) => {
                inner.attributes.insert(key.to_string(), v.to_string());
            }
            None => {
                inner.attributes.remove(key);
            }
        }
    }

    pub fn get_attribute(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().attributes.get(key).cloned()
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .attributes
            .keys()
            .cloned()
            .collect()
    }

    /// Сбрасывает только кеш экземпляров; привязка и атрибуты переживают
    /// сброс (семантика перезагрузки контейнера).
    pub fn release_all(&self) {
        self.diag.log("Releasing all known sinks");
        self.inner.lock().unwrap().instances.clear();
    }

    /// Имя стока, выбранного обнаружением, если привязка уже разрешена.
    pub fn resolved_sink_name(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .binding
            .as_ref()
            .map(|b| b.sink_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SINK_PROPERTY;
    use crate::registry::CONSOLE_SINK;

    fn factory() -> LogFactory {
        LogFactory::new(Config::from_pairs::<_, String, String>([]))
    }

    #[test]
    fn same_name_is_reference_stable_distinct_names_are_not() {
        let factory = factory();
        let a1 = factory.get_or_create("com.acme.A").unwrap();
        let a2 = factory.get_or_create("com.acme.A").unwrap();
        let b = factory.get_or_create("com.acme.B").unwrap();
        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));
    }

    #[test]
    fn release_all_recreates_instances_but_keeps_the_binding() {
        let factory = factory();
        let before = factory.get_or_create("com.acme.A").unwrap();
        let resolved = factory.resolved_sink_name().unwrap();

        factory.release_all();
        let after = factory.get_or_create("com.acme.A").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(factory.resolved_sink_name().unwrap(), resolved);
    }

    #[test]
    fn attribute_change_after_resolution_does_not_rebind() {
        let factory = factory();
        let _ = factory.get_or_create("com.acme.A").unwrap();
        assert_eq!(factory.resolved_sink_name().as_deref(), Some(CONSOLE_SINK));

        factory.set_attribute(SINK_PROPERTY, Some("logbridge::Nothing"));
        let sink = factory.get_or_create("com.acme.B");
        assert!(sink.is_ok());
        assert_eq!(factory.resolved_sink_name().as_deref(), Some(CONSOLE_SINK));
    }

    #[test]
    fn attribute_before_resolution_pins_the_sink() {
        let factory = factory();
        factory.set_attribute(SINK_PROPERTY, Some(CONSOLE_SINK));
        let _ = factory.get_or_create("com.acme.A").unwrap();
        assert_eq!(factory.resolved_sink_name().as_deref(), Some(CONSOLE_SINK));
    }

    #[test]
    fn misconfigured_sink_attribute_is_fatal() {
        let factory = factory();
        factory.set_attribute(SINK_PROPERTY, Some("logbridge::Nothing"));
        let err = factory.get_or_create("com.acme.A").err().unwrap();
        assert!(matches!(err, ConfigError::UserMisconfiguration { .. }));
        // Неудачное обнаружение ничего не кеширует и может быть повторено.
        assert!(factory.resolved_sink_name().is_none());
        factory.set_attribute(SINK_PROPERTY, None);
        assert!(factory.get_or_create("com.acme.A").is_ok());
    }

    #[test]
    fn attributes_can_be_listed_and_removed() {
        let factory = factory();
        factory.set_attribute("a", Some("1"));
        factory.set_attribute("b", Some("2"));
        let mut names = factory.attribute_names();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

        factory.set_attribute("a", None);
        assert_eq!(factory.get_attribute("a"), None);
        assert_eq!(factory.get_attribute("b").as_deref(), Some("2"));
    }

    #[test]
    fn global_factory_is_a_singleton() {
        let a = LogFactory::global() as *const LogFactory;
        let b = LogFactory::global() as *const LogFactory;
        assert_eq!(a, b);
    }
}
