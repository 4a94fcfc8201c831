#![feature(allocator_api)]
#![no_std]
extern crate alloc;

use alloc::{boxed::Box, string::String};

use command::{Command, ParseError, COMMAND_BUF_SIZE};
use kernel::{
    buf::UserSliceReader,
    c_str,
    code::{EINVAL, ENOENT, ENOMEM, ENOSPC},
    error::{Error, KernelResult as Result},
    idr::{self, Idr},
    init::{pin_data, try_pin_init, PinInit},
    module, new_spinlock,
    proc_fs::{ProcEntry, ProcOperations},
    seq_file::SeqFile,
    sync::SpinLock,
    types::Mode,
    AllocFlags, Module, ThisModule,
};
use store::{IdTable, Registry, Request, StoreError, StoreResult};

module! {
    type: ProcIdrModule,
    name: "proc_idr",
    author: "godones",
    description: "String registry keyed by IDR ids, driven through /proc/test_mod_file",
    license: "GPL",
}

/// The kernel IDR seen as a registry table.
struct IdrTable(Idr<String>);

fn store_error(err: Error) -> StoreError {
    match err {
        ENOSPC => StoreError::NoSpace,
        ENOENT => StoreError::NotFound,
        _ => StoreError::OutOfMemory,
    }
}

fn to_errno(err: StoreError) -> Error {
    match err {
        StoreError::OutOfMemory => ENOMEM,
        StoreError::NoSpace => ENOSPC,
        StoreError::NotFound => ENOENT,
    }
}

impl IdTable for IdrTable {
    type Value = Box<String>;

    // Runs under the registry spinlock; nodes come from `idr::preload`.
    fn insert(&mut self, value: Box<String>) -> StoreResult<u32> {
        self.0.alloc(value, AllocFlags::NOWAIT).map_err(store_error)
    }

    fn remove(&mut self, id: u32) -> Option<Box<String>> {
        self.0.remove(id)
    }

    fn replace(&mut self, id: u32, value: Box<String>) -> StoreResult<Box<String>> {
        self.0.replace(id, value).map_err(store_error)
    }

    fn try_for_each<E, F>(&self, mut f: F) -> core::result::Result<(), E>
    where
        F: FnMut(u32, &String) -> core::result::Result<(), E>,
    {
        self.0.iter().try_for_each(|(id, value)| f(id, value))
    }
}

/// Copies `token` into a new heap string, before the registry lock is taken.
fn alloc_token(token: &str) -> StoreResult<Box<String>> {
    let mut s = String::new();
    s.try_reserve_exact(token.len())
        .map_err(|_| StoreError::OutOfMemory)?;
    s.push_str(token);
    Box::try_new(s).map_err(|_| StoreError::OutOfMemory)
}

#[pin_data]
struct IdrFile {
    #[pin]
    registry: SpinLock<Registry<IdrTable>>,
}

impl IdrFile {
    fn new(table: IdrTable) -> impl PinInit<Self, Error> {
        try_pin_init!(Self {
            registry <- new_spinlock!(Registry::new(table), "proc_idr_registry"),
        }? Error)
    }

    fn execute(&self, request: Request<Box<String>>) -> StoreResult<()> {
        let _preload = request.needs_id().then(|| idr::preload(AllocFlags::KERNEL));
        let outcome = {
            let mut registry = self.registry.lock();
            registry.execute(request)
        };
        // Removed and displaced strings are freed here, after the lock is released.
        outcome.map(drop)
    }
}

impl ProcOperations for IdrFile {
    fn show(&self, m: &mut SeqFile) -> Result {
        self.registry.lock().write_listing(m)?;
        Ok(())
    }

    fn write(&self, reader: &mut UserSliceReader) -> Result<usize> {
        let count = reader.len();
        let mut buf = [0u8; COMMAND_BUF_SIZE];
        let len = reader.read_bounded(&mut buf)?;

        let command = match Command::parse_bounded(&buf[..len]) {
            Ok(command) => command,
            Err(ParseError::Unrecognized) => {
                log::debug!("ignoring unrecognized command");
                return Ok(count);
            }
            Err(e) => {
                log::debug!("rejecting command: {}", e);
                return Err(EINVAL);
            }
        };
        let request = Request::from_command(command, alloc_token).map_err(to_errno)?;
        self.execute(request).map_err(|e| {
            log::debug!("command failed: {}", e);
            to_errno(e)
        })?;
        Ok(count)
    }
}

struct ProcIdrModule {
    entry: ProcEntry<IdrFile>,
}

impl Module for ProcIdrModule {
    fn init(_module: &'static ThisModule) -> Result<Self> {
        kernel::logger::init_logger(__LOG_PREFIX);
        let table = IdrTable(Idr::new()?);
        let entry = ProcEntry::register(
            c_str!("test_mod_file"),
            Mode::OWNER_READ.union(Mode::OWNER_WRITE),
            IdrFile::new(table),
        )?;
        log::info!("proc_idr loaded, /proc/test_mod_file created");
        Ok(ProcIdrModule { entry })
    }
}

impl Drop for ProcIdrModule {
    fn drop(&mut self) {
        let left = self.entry.data().registry.lock().len();
        log::info!("proc_idr unloading, freeing {} entries", left);
    }
}
