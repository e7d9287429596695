use crate::common::Pattern;
use crate::error::{Error, Result};
use crate::process::RemoteMemory;

/// Result of writing one pattern to a list of addresses
#[derive(Debug, Default)]
pub struct WriteReport {
    pub outcomes: Vec<(usize, Result<()>)>,
}

impl WriteReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, result)| result.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (usize, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|(address, result)| result.as_ref().err().map(|err| (*address, err)))
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded() == self.attempted()
    }
}

pub struct MemoryWriter<'a, M: RemoteMemory> {
    memory: &'a M,
}

impl<'a, M: RemoteMemory> MemoryWriter<'a, M> {
    pub fn new(memory: &'a M) -> Self {
        MemoryWriter { memory }
    }

    /// Writes the pattern to a single address
    pub fn write(&self, pattern: &Pattern, address: usize) -> Result<()> {
        let payload = pattern.as_bytes();
        let written = self.memory.write_from(address, payload)?;
        if written != payload.len() {
            return Err(Error::ShortTransfer {
                address,
                expected: payload.len(),
                actual: written,
            });
        }
        Ok(())
    }

    /// Attempts every address once, a failure never stops the remaining writes
    pub fn write_all(&self, pattern: &Pattern, addresses: &[usize]) -> WriteReport {
        let mut report = WriteReport::default();
        for &address in addresses {
            let result = self.write(pattern, address);
            match &result {
                Ok(()) => log::info!("Wrote {} to {:#x}", pattern, address),
                Err(err) => log::warn!("{}", err),
            }
            report.outcomes.push((address, result));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Width;
    use crate::process::fake::FakeMemory;

    const BASE: usize = 0x1000;

    #[test]
    fn test_partial_failure_keeps_going() {
        let memory = FakeMemory::new()
            .with_segment(BASE, vec![0u8; 32])
            .with_broken_write(BASE + 8);
        let pattern = Pattern::encode(0xcafe, Width::DWORD);
        let addresses = [BASE, BASE + 8, BASE + 16];

        let report = MemoryWriter::new(&memory).write_all(&pattern, &addresses);

        assert_eq!(*memory.writes.borrow(), addresses.to_vec());
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.succeeded(), 2);
        assert!(!report.is_complete());
        assert!(report.outcomes[0].1.is_ok());
        assert!(matches!(report.outcomes[1].1, Err(Error::Write { address, .. }) if address == BASE + 8));
        assert!(report.outcomes[2].1.is_ok());
        assert_eq!(report.failed().map(|(a, _)| a).collect::<Vec<_>>(), vec![BASE + 8]);
    }

    #[test]
    fn test_write_then_read_back() {
        let memory = FakeMemory::new().with_segment(BASE, vec![0u8; 8]);
        let pattern = Pattern::encode(123_456, Width::DWORD);

        MemoryWriter::new(&memory).write(&pattern, BASE + 4).unwrap();

        let mut bytes = [0u8; 4];
        memory.read_into(BASE + 4, &mut bytes).unwrap();
        assert_eq!(Pattern::decode(&bytes), pattern.value());
    }

    #[test]
    fn test_unmapped_address_fails() {
        let memory = FakeMemory::new().with_segment(BASE, vec![0u8; 8]);
        let pattern = Pattern::encode(1, Width::DWORD);
        let report = MemoryWriter::new(&memory).write_all(&pattern, &[BASE + 6]);
        assert_eq!(report.succeeded(), 0);
    }
}
