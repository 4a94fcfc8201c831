#![feature(allocator_api)]
#![no_std]
#![allow(improper_ctypes)]
extern crate alloc;

pub mod bindings;
pub mod buf;
pub mod error;
pub mod idr;
mod kalloc;
pub mod logger;
pub mod module;
pub mod print;
pub mod proc_fs;
pub mod seq_file;
pub mod str;
pub mod sync;
pub mod types;

pub use error::linux_err as code;
pub use init::PinInit;
pub use kalloc::AllocFlags;
pub use module::{InPlaceModule, Module, ThisModule};

/// Prefix to appear before log messages printed from within the `kernel` crate.
const __LOG_PREFIX: &[u8] = b"rust_kernel\0";

pub mod init {
    pub use pinned_init::*;
}
pub use kmacro::*;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    pr_emerg!("{}\n", info);
    // SAFETY: FFI call.
    unsafe { bindings::BUG() }
}
