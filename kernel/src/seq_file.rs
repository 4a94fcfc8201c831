//! Seq file bindings.
//!
//! C header: [`include/linux/seq_file.h`](srctree/include/linux/seq_file.h)

use core::{ffi::c_void, fmt};

use crate::bindings;

/// A utility for generating the contents of a seq file.
///
/// Output written through this handle lands in the seq_file buffer. When the buffer overflows,
/// the kernel discards it, grows it and calls `show` again, so writes never fail here.
///
/// # Invariants
///
/// `ptr` points to a valid `seq_file` for the lifetime of this handle and is only used from the
/// `show` callback that received it.
pub struct SeqFile {
    ptr: *mut bindings::seq_file,
}

impl SeqFile {
    /// Creates a new [`SeqFile`] from a raw pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure that for the duration of the returned handle, `ptr` points at a
    /// valid `seq_file` and that it is only accessed through this handle.
    pub(crate) unsafe fn from_raw(ptr: *mut bindings::seq_file) -> SeqFile {
        // INVARIANT: The safety requirements guarantee the type invariants.
        SeqFile { ptr }
    }

    /// Appends raw bytes to the output.
    pub fn write_bytes(&mut self, data: &[u8]) {
        // SAFETY: By the type invariants `self.ptr` is a valid `seq_file`, and `data` is valid
        // for reads of `data.len()` bytes. An overflow is recorded inside the `seq_file` itself.
        unsafe { bindings::seq_write(self.ptr, data.as_ptr() as *const c_void, data.len()) };
    }
}

impl fmt::Write for SeqFile {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
