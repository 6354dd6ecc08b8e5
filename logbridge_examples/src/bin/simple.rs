// example_simple — простой пример: общая фабрика, именованные логгеры, макросы

use logbridge::{debug, error, info, warn};

const APP_NAME: &str = "example_simple";
const APP_VERSION: &str = "1.0.0";

fn main() {
    // 1. Преамбула: логгер из общефабричного синглтона
    let log = match logbridge::get_logger("com.acme.simple.Main") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[FATAL] Cannot discover a log sink: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    info!(log, "Starting {} v{}", APP_NAME, APP_VERSION);

    // 2. Основной код: уровни и ленивые проверки
    debug!(log, "This record is below the default level and is dropped");
    if log.is_debug_enabled() {
        // Дорогую подготовку сообщения имеет смысл охранять проверкой
        debug!(log, "expensive state dump: {:?}", vec![1, 2, 3]);
    }

    warn!(log, "Non-critical issue detected");
    error!(log, "An error occurred, but we continue");

    // 3. Ошибка с причиной
    let cause = std::fs::read_to_string("does-not-exist.conf").unwrap_err();
    log.error_cause("Failed to read optional configuration", &cause);

    // 4. Логгер второго компонента берётся из того же кеша
    let worker = logbridge::get_logger("com.acme.simple.Worker").unwrap();
    info!(worker, "Worker attached to the same sink implementation");

    info!(log, "Application finished successfully");
}
