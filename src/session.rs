use crate::common::Pattern;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::process::{MemoryRegion, RemoteMemory};
use crate::scanner::{ScanResult, Scanner};
use crate::writer::{MemoryWriter, WriteReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No value submitted yet
    InitialScan,
    /// More than one candidate left and the last round removed some
    Narrowing,
    /// A single candidate left, or a round that kept every candidate
    Converged,
    /// The last round found nothing
    Empty,
    /// The user asked to write before convergence
    Aborted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Converged | Phase::Empty | Phase::Aborted)
    }

    /// Whether the candidates may be written
    pub fn is_writable(self) -> bool {
        matches!(self, Phase::Converged | Phase::Aborted)
    }
}

pub struct NarrowingSession<'a, M: RemoteMemory> {
    memory: &'a M,
    config: Config,
    regions: Vec<MemoryRegion>,
    pattern: Option<Pattern>,
    candidates: Vec<usize>,
    previous: Option<Vec<usize>>,
    phase: Phase,
    round: usize,
    failed_regions: usize,
    skipped_regions: usize,
}

impl<'a, M: RemoteMemory> NarrowingSession<'a, M> {
    /// `regions` is the full address space to search in the first round
    pub fn new(memory: &'a M, regions: Vec<MemoryRegion>, config: Config) -> Self {
        NarrowingSession {
            memory,
            config,
            regions,
            pattern: None,
            candidates: Vec::new(),
            previous: None,
            phase: Phase::InitialScan,
            round: 0,
            failed_regions: 0,
            skipped_regions: 0,
        }
    }

    /// Runs one round for `value` and returns the phase the session moved to
    pub fn submit_value(&mut self, value: u64) -> Result<Phase> {
        if self.phase.is_terminal() {
            return Err(Error::SessionFinished);
        }
        let pattern = Pattern::encode(value, self.config.width);
        self.round += 1;
        log::info!("Round {}: searching for {} ({})", self.round, value, pattern);

        let result = self.scan(&pattern);
        self.failed_regions = result.failed_regions;
        self.skipped_regions = result.skipped_regions;
        if self.failed_regions > 0 || self.skipped_regions > 0 {
            log::warn!(
                "Round {}: {} regions could not be read, {} skipped without read permission",
                self.round,
                self.failed_regions,
                self.skipped_regions
            );
        }

        let previous = std::mem::replace(&mut self.candidates, result.addresses);
        if self.round > 1 {
            self.previous = Some(previous);
        }
        self.pattern = Some(pattern);
        self.phase = self.next_phase();
        log::info!(
            "Round {}: {} candidates, now {:?}",
            self.round,
            self.candidates.len(),
            self.phase
        );
        Ok(self.phase)
    }

    fn scan(&self, pattern: &Pattern) -> ScanResult {
        let scanner = Scanner::new(self.memory, &self.config);
        if self.round == 1 {
            return scanner.scan(&self.regions, pattern);
        }
        let width = self.config.width.bytes();
        let singletons: Vec<MemoryRegion> = self
            .candidates
            .iter()
            .map(|&address| MemoryRegion::singleton(address, width))
            .collect();
        scanner.scan(&singletons, pattern)
    }

    /// Surviving candidates are always a subset of the previous round, so an
    /// unchanged count also means an unchanged set. The sets are compared anyway.
    fn next_phase(&self) -> Phase {
        match self.candidates.len() {
            0 => Phase::Empty,
            1 => Phase::Converged,
            _ if self.previous.as_ref() == Some(&self.candidates) => Phase::Converged,
            _ => Phase::Narrowing,
        }
    }

    /// Stops narrowing and keeps the current candidates ("set now")
    pub fn force_converge(&mut self) -> Result<Phase> {
        match self.phase {
            Phase::Narrowing => {
                log::info!(
                    "Stopped after round {} with {} candidates",
                    self.round,
                    self.candidates.len()
                );
                self.phase = Phase::Aborted;
                Ok(self.phase)
            }
            Phase::InitialScan => Err(Error::NotConverged),
            _ => Err(Error::SessionFinished),
        }
    }

    /// Writes `value` to every remaining candidate
    pub fn write_value(&self, value: u64) -> Result<WriteReport> {
        if !self.phase.is_writable() {
            return Err(Error::NotConverged);
        }
        for &address in &self.candidates {
            match self.region_of(address) {
                Some(region) if !region.is_writable() => {
                    log::warn!("{:#x} lies in read-only region {}", address, region)
                }
                _ => {}
            }
        }
        let pattern = Pattern::encode(value, self.config.width);
        Ok(MemoryWriter::new(self.memory).write_all(&pattern, &self.candidates))
    }

    /// The region scanned in the first round that holds `address`
    pub fn region_of(&self, address: usize) -> Option<&MemoryRegion> {
        self.regions.iter().find(|region| region.contains(address))
    }

    /// Regions whose read failed in the last round
    pub fn failed_regions(&self) -> usize {
        self.failed_regions
    }

    /// Regions the last round left out for lacking read permission
    pub fn skipped_regions(&self) -> usize {
        self.skipped_regions
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }
}
