//! Движок обнаружения: выбирает реализацию стока по конфигурации,
//! обходя цепочку областей видимости, и запоминает привязку.
//!
//! Мягкие сбои (бекенд отсутствует) поглощаются внутри цикла и становятся
//! фатальными только если ни один кандидат не удался. Явно названная
//! пользователем реализация, которую нельзя получить, фатальна всегда.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{
    Config, ALLOW_FLAWED_CONTEXT_PROPERTY, ALLOW_FLAWED_DISCOVERY_PROPERTY,
    ALLOW_FLAWED_HIERARCHY_PROPERTY, SINK_PROPERTY,
};
use crate::diag::Diagnostics;
use crate::error::{ConfigError, SinkError};
use crate::registry::{
    builtin_scope, Scope, CONSOLE_SINK, DEFAULT_SINKS, SINK_CONTRACT_VERSION, SINK_NAME_PREFIX,
};
use crate::sink::{LogSink, SinkCtor};

/// Разрешённая привязка: имя выбранного стока и его конструктор.
/// Вычисляется не более одного раза за жизнь фабрики.
#[derive(Clone)]
pub(crate) struct Binding {
    pub sink_name: String,
    pub ctor: SinkCtor,
    pub binds_factory: bool,
}

/// Терпимость к дефектам обнаружения; по умолчанию всё разрешено.
struct FlawPolicy {
    allow_flawed_context: bool,
    allow_flawed_discovery: bool,
    allow_flawed_hierarchy: bool,
}

impl FlawPolicy {
    fn resolve(config: &Config, attributes: &HashMap<String, String>) -> FlawPolicy {
        let get_bool = |key: &str| match attributes.get(key) {
            Some(v) => v.eq_ignore_ascii_case("true"),
            None => config.resolve_bool(key, true),
        };
        FlawPolicy {
            allow_flawed_context: get_bool(ALLOW_FLAWED_CONTEXT_PROPERTY),
            allow_flawed_discovery: get_bool(ALLOW_FLAWED_DISCOVERY_PROPERTY),
            allow_flawed_hierarchy: get_bool(ALLOW_FLAWED_HIERARCHY_PROPERTY),
        }
    }
}

pub(crate) struct Discovery {
    scopes: Vec<Arc<Scope>>,
    root: Arc<Scope>,
}

impl Discovery {
    pub fn new(scopes: Vec<Arc<Scope>>) -> Discovery {
        Discovery {
            scopes,
            root: builtin_scope(),
        }
    }

    /// Полный цикл обнаружения для имени логгера.
    pub fn discover(
        &self,
        name: &str,
        config: &Config,
        attributes: &HashMap<String, String>,
        diag: &Diagnostics,
    ) -> Result<(Box<dyn LogSink>, Binding), ConfigError> {
        diag.log("Discovering a sink implementation...");
        let policy = FlawPolicy::resolve(config, attributes);
        let chain = self.effective_chain(&policy, diag)?;

        if let Some(requested) = user_specified_sink(config, attributes, diag) {
            diag.log(&format!(
                "Attempting to instantiate user-specified sink '{}'...",
                requested
            ));
            if let Some(found) =
                self.try_candidate(&requested, name, &chain, config, attributes, &policy, diag)?
            {
                return Ok(found);
            }
            return Err(ConfigError::UserMisconfiguration {
                suggestion: similar_name_hint(&requested, CONSOLE_SINK),
                name: requested,
            });
        }

        diag.log("No user-specified sink; performing discovery over the built-in candidates...");
        for candidate in DEFAULT_SINKS {
            if let Some(found) =
                self.try_candidate(candidate, name, &chain, config, attributes, &policy, diag)?
            {
                return Ok(found);
            }
        }
        Err(ConfigError::NoSinkAvailable)
    }

    /// Проверка цепочки: она обязана содержать встроенную область. Чужая
    /// цепочка — либо предупреждение с дополнением, либо фатальная ошибка.
    fn effective_chain(
        &self,
        policy: &FlawPolicy,
        diag: &Diagnostics,
    ) -> Result<Vec<Arc<Scope>>, ConfigError> {
        if self.scopes.iter().any(|s| Arc::ptr_eq(s, &self.root)) {
            return Ok(self.scopes.clone());
        }
        if !policy.allow_flawed_context {
            return Err(ConfigError::ScopeRelationship);
        }
        diag.log("Designated scope chain does not reach the built-in scope; appending it as best guess");
        let mut chain = self.scopes.clone();
        chain.push(Arc::clone(&self.root));
        Ok(chain)
    }

    /// Один кандидат по всей цепочке. `Ok(None)` — кандидат нигде не
    /// получился мягким образом; `Err` — строгий режим прервал поиск.
    fn try_candidate(
        &self,
        candidate: &str,
        name: &str,
        chain: &[Arc<Scope>],
        config: &Config,
        attributes: &HashMap<String, String>,
        policy: &FlawPolicy,
        diag: &Diagnostics,
    ) -> Result<Option<(Box<dyn LogSink>, Binding)>, ConfigError> {
        for scope in chain {
            diag.log(&format!(
                "Trying '{}' in scope '{}'",
                candidate,
                scope.name()
            ));

            let entry = match scope.lookup(candidate) {
                Some(entry) => *entry,
                None => {
                    // Второй шанс: область самой библиотеки, на случай
                    // несогласованной цепочки у вызывающей стороны.
                    match self.root.lookup(candidate) {
                        Some(entry) if !Arc::ptr_eq(scope, &self.root) => {
                            diag.log(&format!(
                                "'{}' resolved through the built-in scope instead of '{}'",
                                candidate,
                                scope.name()
                            ));
                            *entry
                        }
                        _ => {
                            diag.log(&format!(
                                "Sink '{}' is not registered in scope '{}'",
                                candidate,
                                scope.name()
                            ));
                            continue;
                        }
                    }
                }
            };

            if entry.contract != SINK_CONTRACT_VERSION {
                self.handle_flawed_hierarchy(candidate, entry.contract, policy, diag)?;
                continue;
            }

            match (entry.ctor)(name, config) {
                Ok(mut sink) => {
                    if entry.binds_factory {
                        sink.bind_factory(attributes);
                    }
                    diag.log(&format!(
                        "Sink '{}' from scope '{}' has been selected for use",
                        candidate,
                        scope.name()
                    ));
                    return Ok(Some((
                        sink,
                        Binding {
                            sink_name: candidate.to_string(),
                            ctor: entry.ctor,
                            binds_factory: entry.binds_factory,
                        },
                    )));
                }
                Err(SinkError::Unavailable(reason)) => {
                    // Неотличимо от «не установлено»; продолжаем поиск.
                    diag.log(&format!(
                        "Sink '{}' is missing its backend in scope '{}': {}",
                        candidate,
                        scope.name(),
                        reason
                    ));
                    continue;
                }
                Err(err) => {
                    self.handle_flawed_discovery(candidate, err, policy, diag)?;
                    continue;
                }
            }
        }
        Ok(None)
    }

    fn handle_flawed_hierarchy(
        &self,
        candidate: &str,
        found: u32,
        policy: &FlawPolicy,
        diag: &Diagnostics,
    ) -> Result<(), ConfigError> {
        if !policy.allow_flawed_hierarchy {
            return Err(ConfigError::FlawedHierarchy {
                name: candidate.to_string(),
                found,
                expected: SINK_CONTRACT_VERSION,
            });
        }
        diag.log(&format!(
            "Entry '{}' is bound to sink contract version {} (expected {}); continuing discovery",
            candidate, found, SINK_CONTRACT_VERSION
        ));
        Ok(())
    }

    fn handle_flawed_discovery(
        &self,
        candidate: &str,
        err: SinkError,
        policy: &FlawPolicy,
        diag: &Diagnostics,
    ) -> Result<(), ConfigError> {
        if !policy.allow_flawed_discovery {
            return Err(ConfigError::FlawedDiscovery {
                name: candidate.to_string(),
                source: err,
            });
        }
        diag.log(&format!(
            "Could not instantiate sink '{}' -- {}; continuing discovery",
            candidate, err
        ));
        Ok(())
    }
}

fn user_specified_sink(
    config: &Config,
    attributes: &HashMap<String, String>,
    diag: &Diagnostics,
) -> Option<String> {
    diag.log(&format!(
        "Trying to get sink name from attribute '{}'",
        SINK_PROPERTY
    ));
    let requested = attributes.get(SINK_PROPERTY).cloned().or_else(|| {
        diag.log(&format!(
            "Trying to get sink name from property '{}'",
            SINK_PROPERTY
        ));
        config.resolve(SINK_PROPERTY)
    });
    // Пробелы в имени всегда опечатка; срезаем их молча.
    requested
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Подсказка при опечатке: имя похоже на умолчание, если совпадают общий
/// префикс и ещё пять символов, без учёта регистра.
fn similar_name_hint(requested: &str, candidate: &str) -> String {
    if requested == candidate {
        return String::new();
    }
    let span = SINK_NAME_PREFIX.len() + 5;
    match (requested.get(..span), candidate.get(..span)) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => {
            format!(" Did you mean '{}'?", candidate)
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable_ctor(_name: &str, _config: &Config) -> Result<Box<dyn LogSink>, SinkError> {
        Err(SinkError::Unavailable("library not installed".to_string()))
    }

    fn failing_ctor(_name: &str, _config: &Config) -> Result<Box<dyn LogSink>, SinkError> {
        Err(SinkError::Construction("backend is broken".to_string()))
    }

    fn entry(ctor: SinkCtor, contract: u32) -> crate::registry::SinkEntry {
        crate::registry::SinkEntry {
            ctor,
            contract,
            binds_factory: false,
        }
    }

    fn discover_with(
        scopes: Vec<Arc<Scope>>,
        attributes: &[(&str, &str)],
    ) -> Result<(Box<dyn LogSink>, Binding), ConfigError> {
        let config = Config::from_pairs::<_, String, String>([]);
        let attributes: HashMap<String, String> = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let diag = Diagnostics::new(false);
        Discovery::new(scopes).discover("com.acme.Widget", &config, &attributes, &diag)
    }

    #[test]
    fn default_discovery_selects_console() {
        let (sink, binding) = discover_with(vec![builtin_scope()], &[]).unwrap();
        assert_eq!(binding.sink_name, CONSOLE_SINK);
        assert!(binding.binds_factory);
        assert!(sink.is_info_enabled());
        assert!(!sink.is_trace_enabled());
    }

    #[test]
    fn local_failure_is_absorbed_and_search_ascends() {
        let mut local = Scope::new("local");
        local.register(CONSOLE_SINK, entry(failing_ctor, SINK_CONTRACT_VERSION));
        let chain = vec![Arc::new(local), builtin_scope()];

        let (_, binding) = discover_with(chain, &[]).unwrap();
        assert_eq!(binding.sink_name, CONSOLE_SINK);
    }

    #[test]
    fn strict_discovery_raises_on_local_failure() {
        let mut local = Scope::new("local");
        local.register(CONSOLE_SINK, entry(failing_ctor, SINK_CONTRACT_VERSION));
        let chain = vec![Arc::new(local), builtin_scope()];

        let err = discover_with(chain, &[(ALLOW_FLAWED_DISCOVERY_PROPERTY, "false")])
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::FlawedDiscovery { .. }));
    }

    #[test]
    fn missing_backend_is_always_soft() {
        let mut local = Scope::new("local");
        local.register(CONSOLE_SINK, entry(unavailable_ctor, SINK_CONTRACT_VERSION));
        let chain = vec![Arc::new(local), builtin_scope()];

        // Даже в строгом режиме отсутствующий бекенд не фатален.
        let (_, binding) = discover_with(
            chain,
            &[
                (ALLOW_FLAWED_DISCOVERY_PROPERTY, "false"),
                (ALLOW_FLAWED_HIERARCHY_PROPERTY, "false"),
            ],
        )
        .unwrap();
        assert_eq!(binding.sink_name, CONSOLE_SINK);
    }

    #[test]
    fn contract_mismatch_is_lenient_by_default_and_strict_on_request() {
        let mut local = Scope::new("local");
        local.register(CONSOLE_SINK, entry(failing_ctor, SINK_CONTRACT_VERSION + 1));
        let local = Arc::new(local);

        let (_, binding) =
            discover_with(vec![Arc::clone(&local), builtin_scope()], &[]).unwrap();
        assert_eq!(binding.sink_name, CONSOLE_SINK);

        let err = discover_with(
            vec![local, builtin_scope()],
            &[(ALLOW_FLAWED_HIERARCHY_PROPERTY, "false")],
        )
        .err()
        .unwrap();
        assert!(matches!(err, ConfigError::FlawedHierarchy { found, .. } if found == 2));
    }

    #[test]
    fn unrelated_chain_is_repaired_or_rejected() {
        let local = Arc::new(Scope::new("detached"));

        // Мягкий режим дополняет цепочку встроенной областью.
        let (_, binding) = discover_with(vec![Arc::clone(&local)], &[]).unwrap();
        assert_eq!(binding.sink_name, CONSOLE_SINK);

        let err = discover_with(vec![local], &[(ALLOW_FLAWED_CONTEXT_PROPERTY, "false")])
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::ScopeRelationship));
    }

    #[test]
    fn user_specified_unknown_sink_is_fatal_despite_valid_default() {
        let err = discover_with(
            vec![builtin_scope()],
            &[(SINK_PROPERTY, "com.acme::FancySink")],
        )
        .err()
        .unwrap();
        match err {
            ConfigError::UserMisconfiguration { name, suggestion } => {
                assert_eq!(name, "com.acme::FancySink");
                assert!(suggestion.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn user_specified_name_is_trimmed() {
        let (_, binding) = discover_with(
            vec![builtin_scope()],
            &[(SINK_PROPERTY, "  logbridge::ConsoleSink  ")],
        )
        .unwrap();
        assert_eq!(binding.sink_name, CONSOLE_SINK);
    }

    #[test]
    fn near_miss_gets_a_suggestion() {
        assert_eq!(
            similar_name_hint("logbridge::consolesink", CONSOLE_SINK),
            " Did you mean 'logbridge::ConsoleSink'?"
        );
        assert_eq!(
            similar_name_hint("logbridge::Consol", CONSOLE_SINK),
            " Did you mean 'logbridge::ConsoleSink'?"
        );
        // Слишком короткое, чужой префикс или точное совпадение — без подсказки.
        assert_eq!(similar_name_hint("logbridge::Con", CONSOLE_SINK), "");
        assert_eq!(similar_name_hint("acme::ConsoleSink", CONSOLE_SINK), "");
        assert_eq!(similar_name_hint(CONSOLE_SINK, CONSOLE_SINK), "");
    }

    #[test]
    fn user_misconfiguration_message_carries_the_suggestion() {
        let err = discover_with(
            vec![builtin_scope()],
            &[(SINK_PROPERTY, "logbridge::consolsink")],
        )
        .err()
        .unwrap();
        let text = err.to_string();
        assert!(text.contains("logbridge::consolsink"), "{}", text);
        assert!(
            text.contains("Did you mean 'logbridge::ConsoleSink'?"),
            "{}",
            text
        );
    }

    #[test]
    fn resolved_sink_respects_configured_category_level() {
        let config = Config::from_pairs([("logbridge.console.log.com.acme", "debug")]);
        let diag = Diagnostics::new(false);
        let (sink, _) = Discovery::new(vec![builtin_scope()])
            .discover("com.acme.Widget", &config, &HashMap::new(), &diag)
            .unwrap();
        assert!(sink.is_debug_enabled());
        assert!(!sink.is_trace_enabled());
    }
}
