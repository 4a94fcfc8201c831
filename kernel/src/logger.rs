//! A [`log`] backend writing through `printk`.
//!
//! The maximum level is fixed at build time by the `LOG` environment variable. Records carry the
//! prefix of the module that installed the logger.

use core::{
    ffi::{c_char, CStr},
    fmt::Write,
    ptr,
    sync::atomic::{AtomicPtr, Ordering},
};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::{
    bindings,
    print::{printk, LogLineWriter},
    pr_info, pr_warn,
};

struct SimpleLogger {
    /// `NUL`-terminated prefix set by [`init_logger`].
    prefix: AtomicPtr<c_char>,
}

static LOGGER: SimpleLogger = SimpleLogger {
    prefix: AtomicPtr::new(ptr::null_mut()),
};

impl SimpleLogger {
    fn prefix(&self) -> &'static [u8] {
        let ptr = self.prefix.load(Ordering::Acquire);
        if ptr.is_null() {
            return crate::__LOG_PREFIX;
        }
        // SAFETY: Only `init_logger` stores into `prefix`, and it stores a pointer to a static
        // `NUL`-terminated string.
        unsafe { CStr::from_ptr(ptr) }.to_bytes_with_nul()
    }
}

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let (level, tag) = match record.level() {
            Level::Error => (&bindings::KERN_ERR[..], "ERROR"),
            Level::Warn => (&bindings::KERN_WARNING[..], " WARN"),
            Level::Info => (&bindings::KERN_INFO[..], " INFO"),
            Level::Debug => (&bindings::KERN_DEBUG[..], "DEBUG"),
            Level::Trace => (&bindings::KERN_DEBUG[..], "TRACE"),
        };
        let mut writer = LogLineWriter::new();
        let _ = writeln!(
            writer,
            "[{}] [{}] {}",
            tag,
            record.module_path().unwrap_or_default(),
            record.args()
        );
        printk(level, self.prefix(), writer.as_bytes());
    }
    fn flush(&self) {}
}

fn level_filter(level: Option<&str>) -> LevelFilter {
    match level {
        Some("ERROR") => LevelFilter::Error,
        Some("WARN") => LevelFilter::Warn,
        Some("INFO") => LevelFilter::Info,
        Some("DEBUG") => LevelFilter::Debug,
        Some("TRACE") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Installs the logger, tagging records with `prefix`. Calling it again is a no-op.
///
/// Modules pass the `__LOG_PREFIX` emitted by [`module!`](crate::module).
pub fn init_logger(prefix: &'static [u8]) {
    if log::set_logger(&LOGGER).is_err() {
        return;
    }
    match CStr::from_bytes_with_nul(prefix) {
        Ok(prefix) => LOGGER
            .prefix
            .store(prefix.as_ptr() as *mut c_char, Ordering::Release),
        Err(_) => pr_warn!("log prefix is not NUL-terminated, using the kernel prefix\n"),
    }
    log::set_max_level(level_filter(option_env!("LOG")));
    pr_info!("Init logger {:?}\n", option_env!("LOG"));
}
