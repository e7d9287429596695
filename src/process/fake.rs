use super::RemoteMemory;
use crate::error::{Error, Result};
use nix::errno::Errno;
use std::cell::RefCell;
use std::collections::HashSet;

pub struct FakeMemory {
    segments: RefCell<Vec<(usize, Vec<u8>)>>,
    broken_writes: HashSet<usize>,
    pub reads: RefCell<Vec<(usize, usize)>>,
    pub writes: RefCell<Vec<usize>>,
}

impl FakeMemory {
    pub fn new() -> FakeMemory {
        FakeMemory {
            segments: RefCell::new(Vec::new()),
            broken_writes: HashSet::new(),
            reads: RefCell::new(Vec::new()),
            writes: RefCell::new(Vec::new()),
        }
    }

    pub fn with_segment(self, base: usize, bytes: Vec<u8>) -> FakeMemory {
        self.segments.borrow_mut().push((base, bytes));
        self
    }

    /// Makes every write to `address` fail with EFAULT
    pub fn with_broken_write(mut self, address: usize) -> FakeMemory {
        self.broken_writes.insert(address);
        self
    }

    pub fn poke(&self, address: usize, bytes: &[u8]) {
        let mut segments = self.segments.borrow_mut();
        let (base, data) = segments
            .iter_mut()
            .find(|(base, data)| address >= *base && address + bytes.len() <= *base + data.len())
            .expect("poke outside of fake memory");
        let start = address - *base;
        data[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl RemoteMemory for FakeMemory {
    fn read_into(&self, address: usize, buffer: &mut [u8]) -> Result<usize> {
        self.reads.borrow_mut().push((address, buffer.len()));
        let segments = self.segments.borrow();
        let (base, data) = segments
            .iter()
            .find(|(base, data)| address >= *base && address < *base + data.len())
            .ok_or(Error::Read {
                address,
                len: buffer.len(),
                source: Errno::EFAULT,
            })?;
        let start = address - *base;
        let available = (data.len() - start).min(buffer.len());
        buffer[..available].copy_from_slice(&data[start..start + available]);
        Ok(available)
    }

    fn write_from(&self, address: usize, payload: &[u8]) -> Result<usize> {
        self.writes.borrow_mut().push(address);
        let mapped = self.segments.borrow().iter().any(|(base, data)| {
            address >= *base && address + payload.len() <= *base + data.len()
        });
        if !mapped || self.broken_writes.contains(&address) {
            return Err(Error::Write {
                address,
                len: payload.len(),
                source: Errno::EFAULT,
            });
        }
        self.poke(address, payload);
        Ok(payload.len())
    }
}
