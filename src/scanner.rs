use crate::common::Pattern;
use crate::config::Config;
use crate::process::{MemoryRegion, RemoteMemory};

/// Addresses found by one scan and how many regions could not be read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub addresses: Vec<usize>,
    pub failed_regions: usize,
    pub skipped_regions: usize,
}

/// Compares only offsets that are a multiple of the pattern width from the
/// region base, values stored at unaligned offsets are missed.
pub struct Scanner<'a, M: RemoteMemory> {
    memory: &'a M,
    chunk_size: usize,
    readable_only: bool,
}

impl<'a, M: RemoteMemory> Scanner<'a, M> {
    pub fn new(memory: &'a M, config: &Config) -> Scanner<'a, M> {
        Scanner {
            memory,
            chunk_size: config.chunk_size,
            readable_only: config.readable_only,
        }
    }

    /// Searches every region for `pattern`.
    /// Regions are visited in order and addresses ascend within each region.
    pub fn scan(&self, regions: &[MemoryRegion], pattern: &Pattern) -> ScanResult {
        let mut result = ScanResult::default();
        for region in regions {
            if self.readable_only && !region.is_readable() {
                log::debug!("Skipping unreadable region {}", region);
                result.skipped_regions += 1;
                continue;
            }
            if !self.scan_region(region, pattern, &mut result.addresses) {
                result.failed_regions += 1;
            }
        }
        log::debug!(
            "Scan for {} over {} regions: {} matches, {} failed, {} skipped",
            pattern,
            regions.len(),
            result.addresses.len(),
            result.failed_regions,
            result.skipped_regions
        );
        result
    }

    /// Returns false if the region could not be read completely
    fn scan_region(&self, region: &MemoryRegion, pattern: &Pattern, found: &mut Vec<usize>) -> bool {
        let width = pattern.width();
        // chunks must start on a stride boundary of the region
        let chunk_len = width.align_down(self.chunk_size).max(width.bytes());
        let mut buffer = vec![0u8; chunk_len.min(region.size())];

        let mut offset = 0;
        while offset < region.size() {
            let len = chunk_len.min(region.size() - offset);
            let chunk = &mut buffer[..len];
            let address = region.begin + offset;
            let read = match self.memory.read_into(address, chunk) {
                Ok(read) => read,
                Err(err) => {
                    log::warn!("{} in region {}", err, region);
                    return false;
                }
            };
            found.extend(
                pattern
                    .aligned_matches(&chunk[..read])
                    .map(|hit| address + hit),
            );
            if read < len {
                log::warn!(
                    "Region {} ended early: read {} of {} bytes at {:#x}",
                    region,
                    read,
                    len,
                    address
                );
                return false;
            }
            offset += len;
        }
        true
    }
}
