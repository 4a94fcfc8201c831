//! State behind the proc test modules: an id-keyed string registry and a fixed-size string
//! buffer.
//!
//! Nothing here locks or touches kernel memory. The kernel modules wrap these types in a
//! spinlock and plug the registry into the kernel IDR through [`IdTable`].
#![no_std]
extern crate alloc;

mod buffer;
mod registry;
mod table;

use core::fmt;

pub use buffer::{StringBuffer, PROC_BUFFER_SIZE};
pub use registry::{Outcome, Registry, Request, LISTING_HEADER};
pub use table::{IdTable, MapTable, MAX_ID};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Memory for the value or the table could not be allocated.
    OutOfMemory,
    /// Every id up to [`MAX_ID`] is taken.
    NoSpace,
    /// No entry has the requested id.
    NotFound,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StoreError::OutOfMemory => "out of memory",
            StoreError::NoSpace => "no free id",
            StoreError::NotFound => "no such entry",
        };
        f.write_str(msg)
    }
}
