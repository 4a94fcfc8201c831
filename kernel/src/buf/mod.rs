//! User-space memory access.
//!
//! C header: `include/linux/uaccess.h`

use core::{
    ffi::{c_ulong, c_void},
    mem::MaybeUninit,
};

use crate::{bindings, code::EFAULT, error::KernelResult as Result};

/// The type used for userspace addresses.
pub type UserPtr = usize;

/// A pointer to an area in userspace memory, which can be either read-only or read-write.
///
/// All methods on this struct are safe: attempting to read or write on bad addresses (either out
/// of the bound of the slice or unmapped addresses) will return [`EFAULT`]. Concurrent access,
/// *including data races to/from userspace memory*, is permitted, because fundamentally another
/// userspace thread/process could always be modifying memory at the same time (in the same way
/// that userspace Rust's [`std::io`] permits data races with the contents of files on disk). In
/// the presence of a race, the exact byte values read/written are unspecified but the operation is
/// well-defined.
///
/// [`std::io`]: https://doc.rust-lang.org/std/io/index.html
pub struct UserSlice {
    ptr: UserPtr,
    length: usize,
}

impl UserSlice {
    /// Constructs a user slice from a raw pointer and a length in bytes.
    ///
    /// Checks on the pointer are deferred to the reads through the returned slice.
    pub fn new(ptr: UserPtr, length: usize) -> Self {
        UserSlice { ptr, length }
    }

    /// Constructs a [`UserSliceReader`].
    pub fn reader(self) -> UserSliceReader {
        UserSliceReader {
            ptr: self.ptr,
            length: self.length,
        }
    }
}

/// A reader for [`UserSlice`].
///
/// Used to incrementally read from the user slice.
pub struct UserSliceReader {
    ptr: UserPtr,
    length: usize,
}

#[allow(clippy::len_without_is_empty)]
impl UserSliceReader {
    /// Returns the number of bytes left to be read from this reader.
    ///
    /// Note that even reading less than this number of bytes may fail.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Reads raw data from the user slice into a kernel buffer.
    ///
    /// For a version that uses `&mut [u8]`, please see [`UserSliceReader::read_slice`].
    ///
    /// Fails with [`EFAULT`] if the read happens on a bad address, or if the read goes out of
    /// bounds of this [`UserSliceReader`]. This call may modify `out` even if it returns an error.
    ///
    /// # Guarantees
    ///
    /// After a successful call to this method, all bytes in `out` are initialized.
    pub fn read_raw(&mut self, out: &mut [MaybeUninit<u8>]) -> Result {
        let len = out.len();
        let out_ptr = out.as_mut_ptr().cast::<c_void>();
        if len > self.length {
            return Err(EFAULT);
        }
        let Ok(len_ulong) = c_ulong::try_from(len) else {
            return Err(EFAULT);
        };
        // SAFETY: `out_ptr` points into a mutable slice of length `len_ulong`, so we may write
        // that many bytes to it.
        let res =
            unsafe { bindings::_copy_from_user(out_ptr, self.ptr as *const c_void, len_ulong) };
        if res != 0 {
            return Err(EFAULT);
        }
        self.ptr = self.ptr.wrapping_add(len);
        self.length -= len;
        Ok(())
    }

    /// Reads raw data from the user slice into a kernel buffer.
    ///
    /// Fails with [`EFAULT`] if the read happens on a bad address, or if the read goes out of
    /// bounds of this [`UserSliceReader`]. This call may modify `out` even if it returns an error.
    pub fn read_slice(&mut self, out: &mut [u8]) -> Result {
        // SAFETY: The types are compatible and `read_raw` doesn't write uninitialized bytes to
        // `out`.
        let out = unsafe { &mut *(out as *mut [u8] as *mut [MaybeUninit<u8>]) };
        self.read_raw(out)
    }

    /// Reads as many bytes as fit into `out`, and returns how many were read.
    ///
    /// Bytes beyond `out.len()` stay in the reader.
    pub fn read_bounded(&mut self, out: &mut [u8]) -> Result<usize> {
        let len = core::cmp::min(self.length, out.len());
        self.read_slice(&mut out[..len])?;
        Ok(len)
    }
}
