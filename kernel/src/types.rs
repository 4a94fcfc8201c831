//! Kernel types.

use core::{cell::UnsafeCell, marker::PhantomPinned, mem::MaybeUninit};

use crate::{bindings, init::PinInit};

/// Permissions.
///
/// C header: `include/uapi/linux/stat.h`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mode(bindings::umode_t);

impl Mode {
    /// Read permission, owner.
    pub const OWNER_READ: Mode = Mode(bindings::S_IRUSR);
    /// Write permission, owner.
    pub const OWNER_WRITE: Mode = Mode(bindings::S_IWUSR);

    /// Returns the mode as an integer.
    pub const fn as_int(&self) -> u16 {
        self.0 as u16
    }

    /// Combines two sets of permission bits.
    pub const fn union(self, other: Mode) -> Mode {
        Mode(self.0 | other.0)
    }
}

/// Stores an opaque value.
///
/// This is meant to be used with FFI objects that are never interpreted by Rust code.
#[repr(transparent)]
pub struct Opaque<T> {
    value: UnsafeCell<MaybeUninit<T>>,
    _pin: PhantomPinned,
}

impl<T> Opaque<T> {
    /// Creates an uninitialised value.
    pub const fn uninit() -> Self {
        Self {
            value: UnsafeCell::new(MaybeUninit::uninit()),
            _pin: PhantomPinned,
        }
    }

    /// Creates a pin-initializer from the given initializer closure.
    ///
    /// The returned initializer calls the given closure with the pointer to the inner `T` of this
    /// `Opaque`. Since this memory is uninitialized, the closure is not allowed to read from it.
    ///
    /// This function is safe, because the `T` inside of an `Opaque` is allowed to be
    /// uninitialized. Additionally, access to the inner `T` requires `unsafe`, so the caller needs
    /// to verify at that point that the inner value is valid.
    pub fn ffi_init(init_func: impl FnOnce(*mut T)) -> impl PinInit<Self> {
        // SAFETY: We contain a `MaybeUninit`, so it is OK for the `init_func` to not fully
        // initialize the `T`.
        unsafe {
            crate::init::pin_init_from_closure::<_, ::core::convert::Infallible>(move |slot| {
                init_func(Self::raw_get(slot));
                Ok(())
            })
        }
    }

    /// Returns a raw pointer to the opaque data.
    pub const fn get(&self) -> *mut T {
        UnsafeCell::get(&self.value).cast::<T>()
    }

    /// Gets the value behind `this`.
    ///
    /// This function is useful to get access to the value without creating intermediate
    /// references.
    pub const fn raw_get(this: *const Self) -> *mut T {
        UnsafeCell::raw_get(this.cast::<UnsafeCell<MaybeUninit<T>>>()).cast::<T>()
    }
}
