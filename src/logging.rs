use crate::common::types::{LogCallback, LogLevel, LogRecord, PathStatus, StringView};

use core::ffi::{c_char, c_void};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Sink {
    Disabled = 0,
    Stderr = 1,
    Callback = 2,
}

impl Sink {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Sink::Stderr,
            2 => Sink::Callback,
            _ => Sink::Disabled,
        }
    }
}

struct CallbackSlot {
    callback: LogCallback,
    user_data: usize,
}

pub struct GuestpathLogger {
    sink: AtomicU8,
    level: AtomicU8,
    slot: Mutex<CallbackSlot>,
}

impl GuestpathLogger {
    const fn new() -> Self {
        Self {
            sink: AtomicU8::new(Sink::Disabled as u8),
            level: AtomicU8::new(LogLevel::Off as u8),
            slot: Mutex::new(CallbackSlot {
                callback: None,
                user_data: 0,
            }),
        }
    }

    fn sink(&self) -> Sink {
        Sink::from_u8(self.sink.load(Ordering::Relaxed))
    }

    fn set_sink(&self, sink: Sink) {
        self.sink.store(sink as u8, Ordering::Relaxed);
    }

    fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
        log::set_max_level(level_filter(level));
    }

    fn max_level(&self) -> Option<Level> {
        level_from_u8(self.level.load(Ordering::Relaxed))
    }

    fn set_callback(&self, callback: LogCallback, user_data: *mut c_void) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.callback = callback;
            slot.user_data = user_data as usize;
        }
    }

    fn emit_callback(&self, record: &Record) {
        let Ok(slot) = self.slot.lock() else {
            return;
        };
        let Some(callback) = slot.callback else {
            return;
        };
        let message = record.args().to_string();
        let raw = LogRecord {
            level: log_level_from(record.level()),
            target: view_of(record.target()),
            message: view_of(&message),
            file: view_of(record.file().unwrap_or("")),
            line: record.line().unwrap_or(0),
        };
        callback(&raw as *const LogRecord, slot.user_data as *mut c_void);
    }
}

impl Log for GuestpathLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.max_level() {
            Some(level) => metadata.level() <= level,
            None => false,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match self.sink() {
            Sink::Stderr => {
                eprintln!("[guestpath][{}] {}", record.level(), record.args());
            }
            Sink::Callback => self.emit_callback(record),
            Sink::Disabled => {}
        }
    }

    fn flush(&self) {}
}

static LOGGER: GuestpathLogger = GuestpathLogger::new();
static INSTALL: OnceLock<Install> = OnceLock::new();

#[derive(Copy, Clone)]
enum Install {
    Ours,
    Foreign,
}

fn install() -> Install {
    *INSTALL.get_or_init(|| match log::set_logger(&LOGGER) {
        Ok(()) => {
            log::set_max_level(LevelFilter::Off);
            Install::Ours
        }
        Err(_) => Install::Foreign,
    })
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Off => LevelFilter::Off,
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

fn level_from_u8(level: u8) -> Option<Level> {
    match level {
        x if x == LogLevel::Error as u8 => Some(Level::Error),
        x if x == LogLevel::Warn as u8 => Some(Level::Warn),
        x if x == LogLevel::Info as u8 => Some(Level::Info),
        x if x == LogLevel::Debug as u8 => Some(Level::Debug),
        x if x == LogLevel::Trace as u8 => Some(Level::Trace),
        _ => None,
    }
}

fn log_level_from(level: Level) -> LogLevel {
    match level {
        Level::Error => LogLevel::Error,
        Level::Warn => LogLevel::Warn,
        Level::Info => LogLevel::Info,
        Level::Debug => LogLevel::Debug,
        Level::Trace => LogLevel::Trace,
    }
}

fn view_of(value: &str) -> StringView {
    StringView {
        ptr: value.as_ptr() as *const c_char,
        len: value.len(),
    }
}

pub fn log_set_stderr(level: LogLevel) -> PathStatus {
    if matches!(install(), Install::Foreign) {
        return PathStatus::IoError;
    }
    LOGGER.set_sink(Sink::Stderr);
    LOGGER.set_level(level);
    PathStatus::Ok
}

pub fn log_set_callback(callback: LogCallback, user_data: *mut c_void, level: LogLevel) -> PathStatus {
    if callback.is_none() {
        return log_disable();
    }
    if matches!(install(), Install::Foreign) {
        return PathStatus::IoError;
    }
    LOGGER.set_callback(callback, user_data);
    LOGGER.set_sink(Sink::Callback);
    LOGGER.set_level(level);
    PathStatus::Ok
}

/// With a foreign logger installed only the global max level moves.
pub fn log_set_level(level: LogLevel) -> PathStatus {
    match install() {
        Install::Ours => LOGGER.set_level(level),
        Install::Foreign => log::set_max_level(level_filter(level)),
    }
    PathStatus::Ok
}

pub fn log_disable() -> PathStatus {
    match install() {
        Install::Ours => {
            LOGGER.set_sink(Sink::Disabled);
            LOGGER.set_level(LogLevel::Off);
        }
        Install::Foreign => log::set_max_level(LevelFilter::Off),
    }
    PathStatus::Ok
}
