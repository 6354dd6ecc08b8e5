//! Разрешение конфигурации: явные значения, переменные окружения,
//! properties-файлы с выбором по приоритету.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ключ явного выбора реализации стока.
pub const SINK_PROPERTY: &str = "logbridge.sink";
/// Ключ включения внутренней диагностики.
pub const DIAGNOSTICS_PROPERTY: &str = "logbridge.diagnostics";
/// Терпимость к чужой цепочке областей видимости.
pub const ALLOW_FLAWED_CONTEXT_PROPERTY: &str = "logbridge.sink.allowFlawedContext";
/// Терпимость к ошибкам конструирования кандидата.
pub const ALLOW_FLAWED_DISCOVERY_PROPERTY: &str = "logbridge.sink.allowFlawedDiscovery";
/// Терпимость к несовпадению версии контракта стока.
pub const ALLOW_FLAWED_HIERARCHY_PROPERTY: &str = "logbridge.sink.allowFlawedHierarchy";

/// Имя properties-файла (аналог ресурса в classpath).
pub const PROPERTIES_FILE: &str = "logbridge.properties";
/// Переменная окружения со списком каталогов, где искать properties-файл.
pub const PROPERTIES_PATH_ENV: &str = "LOGBRIDGE_PROPERTIES_PATH";

const PRIORITY_KEY: &str = "priority";

/// Объемлющая конфигурация процесса. Неизменяема после создания;
/// `resolve` смотрит по порядку: явные значения, переменные окружения,
/// выигравший properties-файл.
#[derive(Debug, Clone)]
pub struct Config {
    overrides: HashMap<String, String>,
    properties: HashMap<String, String>,
    use_env: bool,
}

impl Config {
    /// Конфигурация из окружения процесса плюс properties-файл,
    /// найденный по `LOGBRIDGE_PROPERTIES_PATH` и текущему каталогу.
    pub fn from_env() -> Config {
        let diagnostics = env_var(DIAGNOSTICS_PROPERTY)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let properties = load_winning_properties(&search_path(), diagnostics);
        Config {
            overrides: HashMap::new(),
            properties,
            use_env: true,
        }
    }

    /// Конфигурация из готовых пар; окружение не опрашивается.
    /// Используется тестами и встраивающими приложениями.
    pub fn from_pairs<I, K, V>(pairs: I) -> Config
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Config {
            overrides: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            properties: HashMap::new(),
            use_env: false,
        }
    }

    pub fn resolve(&self, key: &str) -> Option<String> {
        if let Some(v) = self.overrides.get(key) {
            return Some(v.clone());
        }
        if self.use_env {
            if let Some(v) = env_var(key) {
                return Some(v);
            }
        }
        self.properties.get(key).cloned()
    }

    /// Булево значение: `"true"` без учёта регистра; любое другое
    /// присутствующее значение — false; отсутствующее — умолчание.
    pub fn resolve_bool(&self, key: &str, default: bool) -> bool {
        match self.resolve(key) {
            Some(v) => v.eq_ignore_ascii_case("true"),
            None => default,
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn search_path() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = match env::var_os(PROPERTIES_PATH_ENV) {
        Some(raw) => env::split_paths(&raw).collect(),
        None => Vec::new(),
    };
    dirs.push(PathBuf::from("."));
    dirs
}

/// Разбор properties-файла: `ключ=значение` построчно, `#` — комментарий.
fn load_properties(path: &Path) -> io::Result<HashMap<String, String>> {
    let text = fs::read_to_string(path)?;
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(map)
}

fn file_priority(props: &HashMap<String, String>) -> f64 {
    props
        .get(PRIORITY_KEY)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0.0)
}

struct FoundFile {
    path: PathBuf,
    props: HashMap<String, String>,
    priority: f64,
}

/// Перебирает каталоги и оставляет файл со строго наибольшим приоритетом;
/// при равенстве остаётся найденный первым.
fn load_winning_properties(dirs: &[PathBuf], diagnostics: bool) -> HashMap<String, String> {
    let mut best: Option<FoundFile> = None;

    for dir in dirs {
        let path = dir.join(PROPERTIES_FILE);
        let props = match load_properties(&path) {
            Ok(props) => props,
            Err(_) => continue,
        };
        let priority = file_priority(&props);

        match &best {
            None => {
                lookup_diag(
                    diagnostics,
                    &format!(
                        "[LOOKUP] Properties file found at '{}' with priority {}",
                        path.display(),
                        priority
                    ),
                );
                best = Some(FoundFile {
                    path,
                    props,
                    priority,
                });
            }
            Some(current) if priority > current.priority => {
                lookup_diag(
                    diagnostics,
                    &format!(
                        "[LOOKUP] Properties file at '{}' with priority {} overrides file at '{}' with priority {}",
                        path.display(),
                        priority,
                        current.path.display(),
                        current.priority
                    ),
                );
                best = Some(FoundFile {
                    path,
                    props,
                    priority,
                });
            }
            Some(current) => {
                lookup_diag(
                    diagnostics,
                    &format!(
                        "[LOOKUP] Properties file at '{}' with priority {} does not override file at '{}' with priority {}",
                        path.display(),
                        priority,
                        current.path.display(),
                        current.priority
                    ),
                );
            }
        }
    }

    match best {
        Some(found) => {
            lookup_diag(
                diagnostics,
                &format!(
                    "[LOOKUP] Using properties file at '{}'",
                    found.path.display()
                ),
            );
            found.props
        }
        None => {
            lookup_diag(
                diagnostics,
                &format!("[LOOKUP] No properties file of name '{}' found.", PROPERTIES_FILE),
            );
            HashMap::new()
        }
    }
}

fn lookup_diag(enabled: bool, message: &str) {
    if enabled {
        eprintln!("{}", message);
    }
}
