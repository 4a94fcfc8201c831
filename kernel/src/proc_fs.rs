//! Proc filesystem entries.
//!
//! C headers: `include/linux/proc_fs.h`, `include/linux/seq_file.h`
//!
//! An entry is a "single open" seq file: reads are produced by one call to
//! [`ProcOperations::show`] per open, writes are handed to [`ProcOperations::write`].

use alloc::boxed::Box;
use core::{
    ffi::{c_char, c_int, c_void},
    marker::PhantomData,
    pin::Pin,
    ptr,
};

use crate::{
    bindings,
    buf::{UserPtr, UserSlice, UserSliceReader},
    code::ENOMEM,
    error::{from_result, Error, KernelResult},
    init::{InPlaceInit, PinInit},
    seq_file::SeqFile,
    str::CStr,
    types::Mode,
};

/// Callbacks of a proc entry.
///
/// The implementing type is the state shared by every open file of the entry, so callbacks can
/// run concurrently on several CPUs and only get `&self`.
pub trait ProcOperations: Sync + Sized {
    /// Renders the whole file content.
    fn show(&self, m: &mut SeqFile) -> KernelResult;

    /// Handles a write from user space and returns how many bytes were consumed.
    fn write(&self, reader: &mut UserSliceReader) -> KernelResult<usize>;
}

struct ProcVtable<T>(PhantomData<T>);

impl<T: ProcOperations> ProcVtable<T> {
    const VTABLE: bindings::proc_ops = bindings::proc_ops {
        proc_open: Some(Self::open_callback),
        proc_read: Some(bindings::seq_read),
        proc_write: Some(Self::write_callback),
        proc_lseek: Some(bindings::seq_lseek),
        proc_release: Some(bindings::single_release),
        // SAFETY: All remaining fields are optional callbacks or flags, for which zero
        // means "not provided".
        ..unsafe { core::mem::zeroed() }
    };

    const fn build() -> &'static bindings::proc_ops {
        &Self::VTABLE
    }

    unsafe extern "C" fn open_callback(
        inode: *mut bindings::inode,
        file: *mut bindings::file,
    ) -> c_int {
        // SAFETY: `inode` belongs to the proc entry, whose data pointer was set to a live `T` by
        // `ProcEntry::register`.
        let data = unsafe { bindings::pde_data(inode) };
        // SAFETY: `file` is the file being opened; `single_open` stores `data` as the
        // `seq_file`'s private pointer.
        unsafe { bindings::single_open(file, Some(Self::show_callback), data) }
    }

    unsafe extern "C" fn show_callback(m: *mut bindings::seq_file, _v: *mut c_void) -> c_int {
        // SAFETY: `private` was set by `open_callback` and the entry outlives every open file.
        let data = unsafe { &*((*m).private as *const T) };
        // SAFETY: `m` is valid for the duration of this callback and only used through `seq`.
        let mut seq = unsafe { SeqFile::from_raw(m) };
        from_result(|| {
            data.show(&mut seq)?;
            Ok(0)
        })
    }

    unsafe extern "C" fn write_callback(
        file: *mut bindings::file,
        buf: *const c_char,
        count: usize,
        _ppos: *mut bindings::loff_t,
    ) -> bindings::ssize_t {
        // SAFETY: After `single_open`, `private_data` is the `seq_file` whose `private` field was
        // set by `open_callback`.
        let data = unsafe {
            let seq = (*file).private_data as *mut bindings::seq_file;
            &*((*seq).private as *const T)
        };
        let mut reader = UserSlice::new(buf as UserPtr, count).reader();
        from_result(|| {
            let written = data.write(&mut reader)?;
            Ok(bindings::ssize_t::try_from(written)?)
        })
    }
}

/// A registered `/proc` entry that owns the state its callbacks use.
///
/// The entry is removed from `/proc` when this value is dropped. `proc_remove` waits for callbacks
/// that are still running, so the state is never freed under them.
///
/// # Invariants
///
/// `entry` is a live proc entry whose data pointer is the address of `*data`.
pub struct ProcEntry<T: ProcOperations> {
    entry: *mut bindings::proc_dir_entry,
    data: Pin<Box<T>>,
}

// SAFETY: The raw entry pointer is only used to remove the entry, which may happen from any
// thread; the state is `Sync` per `ProcOperations`.
unsafe impl<T: ProcOperations + Send> Send for ProcEntry<T> {}

// SAFETY: `ProcEntry` exposes only `&T`, and `T: Sync`.
unsafe impl<T: ProcOperations> Sync for ProcEntry<T> {}

impl<T: ProcOperations> ProcEntry<T> {
    /// Creates `/proc/<name>` with the given permissions, backed by the state built by `init`.
    pub fn register(
        name: &'static CStr,
        mode: Mode,
        init: impl PinInit<T, Error>,
    ) -> KernelResult<Self> {
        let data = Box::try_pin_init(init)?;
        let data_ptr = &*data as *const T as *mut c_void;
        // SAFETY: `name` is `NUL`-terminated, the vtable is static and `data_ptr` stays valid
        // until the entry is removed in `drop`.
        let entry = unsafe {
            bindings::proc_create_data(
                name.as_ptr(),
                mode.as_int() as bindings::umode_t,
                ptr::null_mut(),
                ProcVtable::<T>::build(),
                data_ptr,
            )
        };
        if entry.is_null() {
            return Err(ENOMEM);
        }
        // INVARIANT: `entry` was just created with `data_ptr`.
        Ok(ProcEntry { entry, data })
    }

    /// Returns the state shared by the entry's callbacks.
    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T: ProcOperations> Drop for ProcEntry<T> {
    fn drop(&mut self) {
        // SAFETY: By the type invariants `entry` is live; it is removed exactly once here,
        // before `data` is dropped.
        unsafe { bindings::proc_remove(self.entry) };
    }
}
