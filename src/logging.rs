use env_logger::Builder;
use log::{debug, error, info, trace, warn, Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Префикс модулей крейта, в строке лога не печатается
const CRATE_PREFIX: &str = "quiz_shorts::";

/// HTTP клиенты пишут на debug каждый запрос к API
const QUIET_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls", "tokio_util"];

/// Цель записи без префикса крейта: `video::composer` вместо `quiz_shorts::video::composer`
pub fn short_target(target: &str) -> &str {
    target.strip_prefix(CRATE_PREFIX).unwrap_or(target)
}

fn is_quiet(target: &str) -> bool {
    QUIET_TARGETS
        .iter()
        .any(|quiet| target == *quiet || target.starts_with(&format!("{}::", quiet)))
}

/// Строка лога: время, уровень, модуль, сообщение
pub fn format_line(level: Level, target: &str, message: &std::fmt::Arguments) -> String {
    format!(
        "{} [{:<5}] {} - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        short_target(target),
        message
    )
}

/// Логгер тестов: печатает через `println!`, чтобы вывод перехватывался тестами
#[derive(Clone)]
pub struct TestLogger {
    level: LevelFilter,
}

impl TestLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for TestLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        metadata.level() <= Level::Warn || !is_quiet(metadata.target())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}", format_line(record.level(), record.target(), record.args()));
        }
    }

    fn flush(&self) {}
}

/// Настраивает логирование приложения.
///
/// Сторонние HTTP крейты ограничены уровнем warn.
/// Переменная окружения `RUST_LOG` имеет приоритет над обоими правилами.
pub fn setup_logging(level: LevelFilter) {
    let mut builder = Builder::new();

    builder.filter_level(level);
    for target in QUIET_TARGETS {
        builder.filter_module(target, level.min(LevelFilter::Warn));
    }
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format(|buf, record| {
        writeln!(buf, "{}", format_line(record.level(), record.target(), record.args()))
    });

    let _ = builder.try_init();

    info!("Логирование настроено с уровнем: {}", level);
}

/// Настраивает логирование для тестов; повторные вызовы ничего не меняют
pub fn setup_test_logging(level: LevelFilter) {
    INIT.call_once(|| {
        let logger = TestLogger::new(level);
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(level);
        }
    });
}

/// Логирует ошибку и возвращает её
pub fn log_error<T, E: std::fmt::Display>(err: E, message: &str) -> Result<T, crate::error::Error> {
    let error_message = format!("{}: {}", message, err);
    error!("{}", error_message);
    Err(crate::error::Error::LoggedError(error_message))
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_debug(message: &str) {
    debug!("{}", message);
}

pub fn log_trace(message: &str) {
    trace!("{}", message);
}
