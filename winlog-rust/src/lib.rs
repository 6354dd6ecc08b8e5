//! # winlog-rs
//!
//! Запись в Windows Event Log. Источник событий регистрируется один раз
//! при создании; если зарегистрировать выбранный источник не удалось —
//! используется "Application" с префиксом в тексте сообщения.

#![cfg(windows)]

use std::ffi::CString;

use windows_sys::core::PCSTR;
use windows_sys::Win32::Foundation::{HANDLE, PSID};
use windows_sys::Win32::System::EventLog::{
    DeregisterEventSource, RegisterEventSourceA, ReportEventA, EVENTLOG_ERROR_TYPE,
    EVENTLOG_INFORMATION_TYPE, EVENTLOG_WARNING_TYPE,
};

/// Тип записи журнала событий.
#[derive(Debug, Clone, Copy)]
pub enum EventKind {
    Info,
    Warning,
    Error,
}

impl EventKind {
    fn to_event_type(self) -> u16 {
        match self {
            EventKind::Info => EVENTLOG_INFORMATION_TYPE,
            EventKind::Warning => EVENTLOG_WARNING_TYPE,
            EventKind::Error => EVENTLOG_ERROR_TYPE,
        }
    }
}

pub struct EventLogWriter {
    handle: HANDLE,
    // Префикс добавляется, когда пишем через запасной источник.
    prefix: Option<String>,
}

// Дескриптор источника событий можно использовать из разных потоков.
unsafe impl Send for EventLogWriter {}
unsafe impl Sync for EventLogWriter {}

impl EventLogWriter {
    /// Регистрирует источник; при неудаче пробует "Application".
    pub fn register(preferred_source: &str) -> Option<EventLogWriter> {
        if let Some(handle) = register_source(preferred_source) {
            return Some(EventLogWriter {
                handle,
                prefix: None,
            });
        }

        let handle = register_source("Application")?;
        Some(EventLogWriter {
            handle,
            prefix: Some(format!("[{}] ", preferred_source)),
        })
    }

    pub fn report(&self, kind: EventKind, message: &str) -> bool {
        let text = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, message),
            None => message.to_owned(),
        };
        let c_message = match CString::new(text) {
            Ok(s) => s,
            Err(_) => return false,
        };
        let msg_ptr: PCSTR = c_message.as_ptr() as _;

        let success: i32 = unsafe {
            ReportEventA(
                self.handle,
                kind.to_event_type(),
                0,
                1000,
                0 as PSID,
                1,
                0,
                &msg_ptr,
                std::ptr::null(),
            )
        };

        success != 0
    }
}

impl Drop for EventLogWriter {
    fn drop(&mut self) {
        let _ = unsafe { DeregisterEventSource(self.handle) };
    }
}

fn register_source(source: &str) -> Option<HANDLE> {
    let c_source = CString::new(source).ok()?;
    let source_ptr: PCSTR = c_source.as_ptr() as _;
    let handle = unsafe { RegisterEventSourceA(std::ptr::null(), source_ptr) };
    if handle == 0 {
        None
    } else {
        Some(handle)
    }
}
