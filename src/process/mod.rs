#[rustfmt::skip]
use {
    crate::error::{Error, Result},
    sysinfo::System,
    std::io::{IoSlice, IoSliceMut},
};

#[rustfmt::skip]
use {
    nix::sys::uio,
    nix::sys::uio::RemoteIoVec,
    nix::unistd::Pid,
    procfs::process::Process as LinuxProcess,
    procfs::ProcError,
};

pub use memory_module::*;

pub mod memory_module;

#[cfg(test)]
pub mod fake;

/// Byte level access to the address space of another process
pub trait RemoteMemory {
    /// Copies `buffer.len()` bytes starting at `address` into `buffer`.
    /// Returns how many bytes were transferred.
    fn read_into(&self, address: usize, buffer: &mut [u8]) -> Result<usize>;

    /// Copies `payload` to `address`. Returns how many bytes were transferred.
    fn write_from(&self, address: usize, payload: &[u8]) -> Result<usize>;
}

/// External Process Manager, uses kernel calls to change memory
#[derive(Debug, Clone)]
pub struct ProcessManager {
    pub pid: i32,
    pub name: String,
}

impl ProcessManager {
    /// Creates a new ProcessManager for the first process called `name`
    pub fn new(name: &str) -> Result<ProcessManager> {
        let system = System::new_all();
        let pid = system
            .processes_by_exact_name(name)
            .map(|process| process.pid().as_u32() as i32)
            .min()
            .ok_or_else(|| Error::ProcessNotFound(name.to_string()))?;
        log::info!("Process {} found with id: {}", name, pid);
        Ok(ProcessManager {
            pid,
            name: name.to_string(),
        })
    }

    /// Creates a new ProcessManager for a known process id
    pub fn from_pid(pid: i32) -> Result<ProcessManager> {
        let process = LinuxProcess::new(pid).map_err(|err| proc_error(pid, err))?;
        let name = process.stat().map_err(|err| proc_error(pid, err))?.comm;
        log::info!("Process {} found with id: {}", name, pid);
        Ok(ProcessManager { pid, name })
    }

    /// Enumerates the memory regions of the process
    pub fn regions(&self) -> Result<RegionCatalog> {
        RegionCatalog::enumerate(self.pid)
    }
}

/// A vanished process is "not found", anything else keeps the procfs cause
fn proc_error(pid: i32, err: ProcError) -> Error {
    match err {
        ProcError::NotFound(_) => Error::ProcessNotFound(pid.to_string()),
        source => Error::Procfs { pid, source },
    }
}

impl RemoteMemory for ProcessManager {
    fn read_into(&self, address: usize, buffer: &mut [u8]) -> Result<usize> {
        let len = buffer.len();
        let remote = [RemoteIoVec { base: address, len }];
        let mut local = [IoSliceMut::new(buffer)];
        uio::process_vm_readv(Pid::from_raw(self.pid), &mut local, &remote)
            .map_err(|source| Error::Read {
                address,
                len,
                source,
            })
    }

    fn write_from(&self, address: usize, payload: &[u8]) -> Result<usize> {
        let len = payload.len();
        let remote = [RemoteIoVec { base: address, len }];
        let local = [IoSlice::new(payload)];
        uio::process_vm_writev(Pid::from_raw(self.pid), &local, &remote).map_err(|source| {
            Error::Write {
                address,
                len,
                source,
            }
        })
    }
}
