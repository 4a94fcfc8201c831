mod allocator;

use crate::bindings;

#[global_allocator]
static ALLOCATOR: allocator::KernelAllocator = allocator::KernelAllocator;

bitflags::bitflags! {
    /// Allocation flags, a subset of the kernel's `gfp_t` masks.
    ///
    /// C header: `include/linux/gfp_types.h`
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AllocFlags: bindings::gfp_t {
        /// Normal allocation, may sleep.
        const KERNEL = bindings::GFP_KERNEL;
        /// Must not sleep and must not touch emergency pools.
        const NOWAIT = bindings::GFP_NOWAIT;
    }
}
