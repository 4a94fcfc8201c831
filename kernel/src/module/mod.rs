//! Module lifecycle.
//!
//! [`module!`](crate::module) stores the module value in a static and pin-initialises it from
//! `init_module`. The value is dropped from `cleanup_module`, so everything the module registered
//! (proc entries, tables) is owned by it and torn down by its `Drop`.

use crate::{
    bindings,
    error::{Error, KernelResult},
    init::{self, PinInit},
    pr_err,
};

/// A loadable module.
///
/// `init` registers whatever the module exposes and returns the value that owns it. An error
/// fails the load with that errno and nothing is left registered.
pub trait Module: Sized + Sync {
    fn init(module: &'static ThisModule) -> KernelResult<Self>;
}

/// A module built directly in its final, pinned location.
///
/// Every [`Module`] is one through the blanket impl; implement this directly when the module
/// value holds pinned state such as a lock.
pub trait InPlaceModule: Sync {
    fn init(module: &'static ThisModule) -> impl PinInit<Self, Error>;
}

impl<T: Module> InPlaceModule for T {
    fn init(module: &'static ThisModule) -> impl PinInit<Self, Error> {
        let initer = move |slot: *mut Self| match <Self as Module>::init(module) {
            Ok(m) => {
                // SAFETY: `pin_init_from_closure` hands us a slot valid for writes.
                unsafe { slot.write(m) };
                Ok(())
            }
            Err(e) => {
                pr_err!("module init failed: {:?}\n", e);
                Err(e)
            }
        };
        // SAFETY: The closure initialises `slot` whenever it returns `Ok`.
        unsafe { init::pin_init_from_closure(initer) }
    }
}

/// The running module's `struct module`, `THIS_MODULE` in C.
pub struct ThisModule(*mut bindings::module);

// SAFETY: `struct module` is shared by every context the module runs in.
unsafe impl Sync for ThisModule {}

impl ThisModule {
    /// # Safety
    ///
    /// `ptr` must be this module's `__this_module`.
    pub const unsafe fn from_ptr(ptr: *mut bindings::module) -> ThisModule {
        ThisModule(ptr)
    }
}
