#![no_std]

use kernel::{
    buf::UserSliceReader,
    c_str,
    error::{Error, KernelResult as Result},
    init::{pin_data, try_pin_init, PinInit},
    module, new_spinlock,
    proc_fs::{ProcEntry, ProcOperations},
    seq_file::SeqFile,
    sync::SpinLock,
    types::Mode,
    Module, ThisModule,
};
use store::{StringBuffer, PROC_BUFFER_SIZE};

module! {
    type: ProcBufferModule,
    name: "proc_buffer",
    author: "godones",
    description: "Fixed-size string buffer exposed through /proc/test_buffer_file",
    license: "GPL",
}

type Buffer = StringBuffer<PROC_BUFFER_SIZE>;

#[pin_data]
struct BufferFile {
    #[pin]
    buffer: SpinLock<Buffer>,
}

impl BufferFile {
    fn new() -> impl PinInit<Self, Error> {
        try_pin_init!(Self {
            buffer <- new_spinlock!(Buffer::new(), "proc_buffer"),
        }? Error)
    }
}

impl ProcOperations for BufferFile {
    fn show(&self, m: &mut SeqFile) -> Result {
        m.write_bytes(self.buffer.lock().as_bytes());
        Ok(())
    }

    fn write(&self, reader: &mut UserSliceReader) -> Result<usize> {
        let count = reader.len();
        // Copied to the stack first; user memory may fault and can't be read under the lock.
        let mut data = [0u8; Buffer::CAPACITY];
        let len = reader.read_bounded(&mut data)?;
        let stored = self.buffer.lock().store(&data[..len]);
        log::debug!("stored {} of {} bytes", stored, count);
        Ok(count)
    }
}

struct ProcBufferModule {
    _entry: ProcEntry<BufferFile>,
}

impl Module for ProcBufferModule {
    fn init(_module: &'static ThisModule) -> Result<Self> {
        kernel::logger::init_logger(__LOG_PREFIX);
        let entry = ProcEntry::register(
            c_str!("test_buffer_file"),
            Mode::OWNER_READ.union(Mode::OWNER_WRITE),
            BufferFile::new(),
        )?;
        log::info!("proc_buffer loaded, /proc/test_buffer_file created");
        Ok(ProcBufferModule { _entry: entry })
    }
}

impl Drop for ProcBufferModule {
    fn drop(&mut self) {
        log::info!("proc_buffer unloading");
    }
}
