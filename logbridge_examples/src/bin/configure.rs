// example_configure — локальная фабрика: настройка вывода, выбор стока,
// подсказка при опечатке в имени

use logbridge::config::SINK_PROPERTY;
use logbridge::{info, trace, Config, LogFactory, CONSOLE_SINK};

fn main() {
    // 1. Фабрика с собственной конфигурацией вместо окружения процесса.
    //    Ключи те же, что и в logbridge.properties.
    let config = Config::from_pairs([
        ("logbridge.console.showlevel", "true"),
        ("logbridge.console.showdatetime", "true"),
        ("logbridge.console.log.com.acme.cfg", "trace"),
    ]);
    let factory = LogFactory::new(config);

    // 2. Явный выбор реализации атрибутом (до первого логгера)
    factory.set_attribute(SINK_PROPERTY, Some(CONSOLE_SINK));

    let log = match factory.logger("com.acme.cfg.Main") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[FATAL] {}", e);
            std::process::exit(1);
        }
    };

    info!(log, "Configured factory is up; sink = {:?}", factory.resolved_sink_name());
    trace!(log, "Trace is enabled for this category");

    // 3. Опечатка в имени стока фатальна и сопровождается подсказкой
    let broken = LogFactory::new(Config::from_pairs::<_, String, String>([]));
    broken.set_attribute(SINK_PROPERTY, Some("logbridge::consolsink"));
    match broken.logger("com.acme.cfg.Broken") {
        Ok(_) => eprintln!("unexpectedly succeeded"),
        Err(e) => info!(log, "Misconfigured factory failed as expected: {}", e),
    }
}
