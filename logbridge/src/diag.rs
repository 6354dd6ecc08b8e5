//! Внутренняя диагностика фабрики. Включается ключом `logbridge.diagnostics`
//! и никогда не влияет на ход обнаружения.

use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

#[derive(Debug, Clone)]
pub(crate) struct Diagnostics {
    enabled: bool,
    prefix: String,
}

impl Diagnostics {
    pub fn new(enabled: bool) -> Diagnostics {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Diagnostics {
            enabled,
            prefix: format!("[LogFactory@{}] ", id),
        }
    }

    pub fn log(&self, message: &str) {
        if self.enabled {
            eprintln!("{}{}", self.prefix, message);
        }
    }
}
