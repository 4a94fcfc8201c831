//! Integer ID allocator.
//!
//! C header: `include/linux/idr.h`
//!
//! The IDR does no locking of its own: every method that changes the tree takes `&mut self`
//! (iteration takes `&self`), so callers share an [`Idr`] through a lock such as
//! [`SpinLock`](crate::sync::SpinLock).

use alloc::boxed::Box;
use core::{
    ffi::{c_int, c_ulong, c_void},
    marker::PhantomData,
};

use crate::{
    bindings,
    error::{from_err_ptr, Error, KernelResult},
    types::Opaque,
    AllocFlags,
};

/// An IDR that owns its values.
///
/// Every stored pointer comes from [`Box::into_raw`] and is turned back into a [`Box`] exactly
/// once: when it is removed, replaced, or when the IDR is dropped.
///
/// # Invariants
///
/// `idr` points to an initialised `struct idr` whose entries are all non-null pointers obtained
/// from `Box::<T>::into_raw`.
pub struct Idr<T> {
    // Boxed so the tree root never moves; tree nodes point back at it.
    idr: Box<Opaque<bindings::idr>>,
    _p: PhantomData<Box<T>>,
}

// SAFETY: The IDR owns its values, so sending it sends the values.
unsafe impl<T: Send> Send for Idr<T> {}

// SAFETY: Shared references only allow iteration, which hands out `&T`.
unsafe impl<T: Sync> Sync for Idr<T> {}

impl<T> Idr<T> {
    /// Creates an empty IDR whose ids start at 0.
    pub fn new() -> KernelResult<Self> {
        let idr = Box::try_new(Opaque::uninit())?;
        // SAFETY: `idr` points to writable memory that lives as long as `Self`.
        unsafe { bindings::idr_init(idr.get()) };
        // INVARIANT: The IDR was just initialised and is empty.
        Ok(Idr {
            idr,
            _p: PhantomData,
        })
    }

    /// Stores `value` under the lowest free id and returns that id.
    ///
    /// Fails with `ENOMEM` when tree nodes can't be allocated and `ENOSPC` when the id space
    /// is exhausted; `value` is dropped in both cases. Pass [`AllocFlags::NOWAIT`] when a spinlock
    /// is held and use [`preload`] beforehand.
    pub fn alloc(&mut self, value: Box<T>, flags: AllocFlags) -> KernelResult<u32> {
        let ptr = Box::into_raw(value);
        // SAFETY: `self.idr` is initialised and exclusively borrowed.
        let ret = unsafe {
            bindings::idr_alloc(
                self.idr.get(),
                ptr as *mut c_void,
                0,
                bindings::IDR_END_UNBOUNDED,
                flags.bits(),
            )
        };
        if ret < 0 {
            // SAFETY: The IDR didn't take `ptr`, so it is still uniquely owned here.
            drop(unsafe { Box::from_raw(ptr) });
            return Err(Error::from_errno(ret));
        }
        Ok(ret as u32)
    }

    /// Detaches the value stored under `id`.
    pub fn remove(&mut self, id: u32) -> Option<Box<T>> {
        // SAFETY: `self.idr` is initialised and exclusively borrowed.
        let ptr = unsafe { bindings::idr_remove(self.idr.get(), id as c_ulong) };
        if ptr.is_null() {
            return None;
        }
        // SAFETY: The entry is no longer reachable from the IDR, so ownership returns to us.
        Some(unsafe { Box::from_raw(ptr as *mut T) })
    }

    /// Swaps the value stored under `id` and returns the displaced one.
    ///
    /// Fails with `ENOENT` if `id` is not allocated; `value` is dropped in that case.
    pub fn replace(&mut self, id: u32, value: Box<T>) -> KernelResult<Box<T>> {
        let ptr = Box::into_raw(value);
        // SAFETY: `self.idr` is initialised and exclusively borrowed.
        let old =
            unsafe { bindings::idr_replace(self.idr.get(), ptr as *mut c_void, id as c_ulong) };
        match from_err_ptr(old) {
            Ok(old) => {
                // SAFETY: `old` was stored by `alloc` or `replace` and is now detached.
                Ok(unsafe { Box::from_raw(old as *mut T) })
            }
            Err(e) => {
                // SAFETY: The IDR didn't take `ptr`.
                drop(unsafe { Box::from_raw(ptr) });
                Err(e)
            }
        }
    }

    /// Iterates over the entries in ascending id order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            idr: self,
            next: Some(0),
        }
    }

    /// Returns the entry with the lowest id at or above `start`.
    fn next_entry(&self, start: c_int) -> Option<(c_int, *mut T)> {
        let mut id = start;
        // SAFETY: `self.idr` is initialised; `idr_get_next` doesn't modify the tree.
        let ptr = unsafe { bindings::idr_get_next(self.idr.get(), &mut id) };
        if ptr.is_null() {
            None
        } else {
            Some((id, ptr as *mut T))
        }
    }
}

impl<T> Drop for Idr<T> {
    fn drop(&mut self) {
        let mut start = Some(0);
        while let Some((id, ptr)) = start.and_then(|s| self.next_entry(s)) {
            // SAFETY: By the type invariants `ptr` is an owned `Box<T>`; the tree is destroyed
            // right after, so nothing reaches it again.
            drop(unsafe { Box::from_raw(ptr) });
            start = id.checked_add(1);
        }
        // SAFETY: `self.idr` is initialised and is never used after this.
        unsafe { bindings::idr_destroy(self.idr.get()) };
    }
}

/// Iterator over the entries of an [`Idr`], see [`Idr::iter`].
pub struct Iter<'a, T> {
    idr: &'a Idr<T>,
    next: Option<c_int>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (u32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, ptr) = self.idr.next_entry(self.next?)?;
        self.next = id.checked_add(1);
        // SAFETY: The entry is owned by the IDR, which is borrowed for `'a`.
        Some((id as u32, unsafe { &*ptr }))
    }
}

/// Keeps per-CPU tree nodes reserved for one allocation, see [`preload`].
///
/// Preemption stays disabled until the guard is dropped.
pub struct PreloadGuard {
    _not_send: PhantomData<*mut ()>,
}

/// Reserves memory for the next [`Idr::alloc`] on this CPU.
///
/// Call it before taking the lock that protects the IDR, with flags that may sleep, then
/// allocate with [`AllocFlags::NOWAIT`] under the lock. Drop the guard after releasing the lock.
pub fn preload(flags: AllocFlags) -> PreloadGuard {
    // SAFETY: FFI call; it is paired with `idr_preload_end` in `Drop`.
    unsafe { bindings::idr_preload(flags.bits()) };
    PreloadGuard {
        _not_send: PhantomData,
    }
}

impl Drop for PreloadGuard {
    fn drop(&mut self) {
        // SAFETY: `idr_preload` was called when the guard was created.
        unsafe { bindings::idr_preload_end() };
    }
}
