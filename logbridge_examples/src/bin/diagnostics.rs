// example_diagnostics — внутренняя диагностика обнаружения и сброс кеша

use logbridge::config::DIAGNOSTICS_PROPERTY;
use logbridge::{info, Config, LogFactory};

fn main() {
    // 1. Диагностика включается обычным ключом конфигурации; каждая
    //    строка уходит в stderr с префиксом [LogFactory@N]
    let config = Config::from_pairs([
        (DIAGNOSTICS_PROPERTY, "true"),
        ("logbridge.console.showlevel", "true"),
    ]);
    let factory = LogFactory::new(config);

    let log = match factory.logger("com.acme.diag.Main") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[FATAL] {}", e);
            std::process::exit(1);
        }
    };
    info!(log, "First discovery is fully traced above");

    // 2. Повторное обращение берёт сток из кеша, без нового обнаружения
    let again = factory.logger("com.acme.diag.Main").unwrap();
    info!(again, "Cached lookup produced no discovery chatter");

    // 3. Сброс кеша: экземпляры создаются заново, привязка переживает сброс
    factory.release_all();
    let fresh = factory.logger("com.acme.diag.Main").unwrap();
    info!(
        fresh,
        "Recreated after release_all; binding is still {:?}",
        factory.resolved_sink_name()
    );
}
