//! Printing facilities.
//!
//! C header: `include/linux/printk.h`

use core::{cmp, ffi::c_int, fmt};

use crate::bindings;

/// `printk` format used for prefixed lines: module prefix, then the message.
const PREFIXED_FORMAT: &[u8] = b"%s: %.*s\0";
/// `printk` format used for continuation lines.
const CONT_FORMAT: &[u8] = b"%.*s\0";
/// Every `KERN_*` level is a `SOH` byte followed by one level character.
const LEVEL_LEN: usize = 2;

/// Prints a message via the kernel's [`_printk`].
///
/// `level` is one of the `KERN_*` constants and `prefix` is a `NUL`-terminated
/// module name.
///
/// [`_printk`]: ../../../../include/linux/printk.h
#[doc(hidden)]
pub fn printk(level: &[u8], prefix: &[u8], s: &[u8]) {
    let mut fmt_str = [0u8; LEVEL_LEN + PREFIXED_FORMAT.len()];
    fmt_str[..LEVEL_LEN].copy_from_slice(&level[..LEVEL_LEN]);
    fmt_str[LEVEL_LEN..].copy_from_slice(PREFIXED_FORMAT);

    // SAFETY: `fmt_str` is `NUL`-terminated and matches the arguments, `prefix` is
    // `NUL`-terminated and `s` is valid for `s.len()` bytes.
    unsafe {
        bindings::_printk(
            fmt_str.as_ptr() as _,
            prefix.as_ptr(),
            s.len() as c_int,
            s.as_ptr(),
        )
    };
}

/// Prints a message continuing the previous line, without a module prefix.
#[doc(hidden)]
pub fn printk_cont(s: &[u8]) {
    let mut fmt_str = [0u8; LEVEL_LEN + CONT_FORMAT.len()];
    fmt_str[..LEVEL_LEN].copy_from_slice(&bindings::KERN_CONT[..LEVEL_LEN]);
    fmt_str[LEVEL_LEN..].copy_from_slice(CONT_FORMAT);

    // SAFETY: `fmt_str` is `NUL`-terminated and matches the arguments.
    unsafe { bindings::_printk(fmt_str.as_ptr() as _, s.len() as c_int, s.as_ptr()) };
}

// From kernel/print/printk.c
const LOG_LINE_MAX: usize = 1024 - 32;

/// Formats one log line on the stack, silently truncating overlong lines.
#[doc(hidden)]
pub struct LogLineWriter {
    data: [u8; LOG_LINE_MAX],
    pos: usize,
}

#[allow(clippy::new_without_default)]
impl LogLineWriter {
    pub fn new() -> LogLineWriter {
        LogLineWriter {
            data: [0u8; LOG_LINE_MAX],
            pos: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.pos]
    }
}

impl fmt::Write for LogLineWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let copy_len = cmp::min(LOG_LINE_MAX - self.pos, s.as_bytes().len());
        self.data[self.pos..self.pos + copy_len].copy_from_slice(&s.as_bytes()[..copy_len]);
        self.pos += copy_len;
        Ok(())
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! print_macro {
    ($level:expr, $($arg:tt)+) => ({
        let mut writer = $crate::print::LogLineWriter::new();
        let _ = ::core::fmt::write(&mut writer, ::core::format_args!($($arg)+));
        $crate::print::printk(&$level[..], crate::__LOG_PREFIX, writer.as_bytes());
    });
}

/// Prints an emergency-level message (level 0).
#[macro_export]
macro_rules! pr_emerg (
    ($($arg:tt)*) => ($crate::print_macro!($crate::bindings::KERN_EMERG, $($arg)*))
);

/// Prints an alert-level message (level 1).
#[macro_export]
macro_rules! pr_alert (
    ($($arg:tt)*) => ($crate::print_macro!($crate::bindings::KERN_ALERT, $($arg)*))
);

/// Prints a critical-level message (level 2).
#[macro_export]
macro_rules! pr_crit (
    ($($arg:tt)*) => ($crate::print_macro!($crate::bindings::KERN_CRIT, $($arg)*))
);

/// Prints an error-level message (level 3).
#[macro_export]
macro_rules! pr_err (
    ($($arg:tt)*) => ($crate::print_macro!($crate::bindings::KERN_ERR, $($arg)*))
);

/// Prints a warning-level message (level 4).
#[macro_export]
macro_rules! pr_warn (
    ($($arg:tt)*) => ($crate::print_macro!($crate::bindings::KERN_WARNING, $($arg)*))
);

/// Prints a notice-level message (level 5).
#[macro_export]
macro_rules! pr_notice (
    ($($arg:tt)*) => ($crate::print_macro!($crate::bindings::KERN_NOTICE, $($arg)*))
);

/// Prints an info-level message (level 6).
#[macro_export]
macro_rules! pr_info (
    ($($arg:tt)*) => ($crate::print_macro!($crate::bindings::KERN_INFO, $($arg)*))
);

/// Prints a debug-level message (level 7).
#[macro_export]
macro_rules! pr_debug (
    ($($arg:tt)*) => ($crate::print_macro!($crate::bindings::KERN_DEBUG, $($arg)*))
);

/// Continues a previous log message in the same line.
#[macro_export]
macro_rules! pr_cont (
    ($($arg:tt)*) => ({
        let mut writer = $crate::print::LogLineWriter::new();
        let _ = ::core::fmt::write(&mut writer, ::core::format_args!($($arg)*));
        $crate::print::printk_cont(writer.as_bytes());
    })
);

/// [`println!`] functions the same as it does in `std`, except instead of
/// printing to `stdout`, it writes to the kernel console at the `KERN_INFO`
/// level.
///
/// [`println!`]: https://doc.rust-lang.org/stable/std/macro.println.html
#[macro_export]
macro_rules! println {
    () => ({
        $crate::pr_info!("\n");
    });
    ($fmt:expr) => ({
        $crate::pr_info!(concat!($fmt, "\n"));
    });
    ($fmt:expr, $($arg:tt)*) => ({
        $crate::pr_info!(concat!($fmt, "\n"), $($arg)*);
    });
}
