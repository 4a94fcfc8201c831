#![no_std]
#[allow(
    clippy::all,
    missing_docs,
    non_camel_case_types,
    non_upper_case_globals,
    non_snake_case,
    improper_ctypes,
    unreachable_pub,
    unsafe_op_in_unsafe_fn
)]
mod bindings {
    include!("bindings_c.rs");
}
pub use bindings::*;

pub const GFP_KERNEL: gfp_t = BINDINGS_GFP_KERNEL;
pub const GFP_NOWAIT: gfp_t = BINDINGS_GFP_NOWAIT;

pub const S_IRUSR: umode_t = BINDINGS_S_IRUSR;
pub const S_IWUSR: umode_t = BINDINGS_S_IWUSR;

/// Upper bound handed to `idr_alloc`; `0` means "up to `INT_MAX`".
pub const IDR_END_UNBOUNDED: core::ffi::c_int = 0;
