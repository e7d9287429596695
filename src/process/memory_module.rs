#[rustfmt::skip]
use {
    crate::error::{Error, Result},
    std::fmt,
    std::fs::File,
    std::io::{BufRead, BufReader},
};

/// One contiguous mapping of the target address space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub begin: usize,
    pub end: usize,
    pub perms: String,
    pub offset: usize,
    pub device: String,
    pub inode: u64,
    pub pathname: Option<String>,
}

impl MemoryRegion {
    /// Synthetic region covering a single candidate value
    pub fn singleton(address: usize, width: usize) -> MemoryRegion {
        MemoryRegion {
            begin: address,
            end: address + width,
            perms: String::from("r---"),
            offset: 0,
            device: String::from("00:00"),
            inode: 0,
            pathname: None,
        }
    }

    pub fn size(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    pub fn is_writable(&self) -> bool {
        self.perms.chars().nth(1) == Some('w')
    }

    pub fn contains(&self, address: usize) -> bool {
        address >= self.begin && address < self.end
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:x}-{:x} {} {:08x} {} {}",
            self.begin, self.end, self.perms, self.offset, self.device, self.inode
        )?;
        if let Some(path) = &self.pathname {
            write!(f, " {}", path)?;
        }
        Ok(())
    }
}

fn malformed(line: &str, reason: &'static str) -> Error {
    Error::MalformedMapLine {
        line: line.to_string(),
        reason,
    }
}

/// Parses a line shaped like `begin-end perms offset dev inode [pathname]`
pub fn parse_line(line: &str) -> Result<MemoryRegion> {
    let mut fields = line.splitn(6, char::is_whitespace);
    let mut next = |reason| {
        fields
            .next()
            .filter(|field| !field.is_empty())
            .ok_or_else(|| malformed(line, reason))
    };

    let (begin, end) = match next("missing address range")?.split_once('-') {
        Some(bounds) => bounds,
        None => return Err(malformed(line, "address range without '-'")),
    };
    let begin = usize::from_str_radix(begin, 16).map_err(|_| malformed(line, "bad begin address"))?;
    let end = usize::from_str_radix(end, 16).map_err(|_| malformed(line, "bad end address"))?;
    if begin >= end {
        return Err(malformed(line, "empty address range"));
    }

    let perms = next("missing permissions")?;
    if perms.len() != 4 {
        return Err(malformed(line, "bad permissions"));
    }
    let offset = usize::from_str_radix(next("missing offset")?, 16)
        .map_err(|_| malformed(line, "bad offset"))?;
    let device = next("missing device")?;
    if !device.contains(':') {
        return Err(malformed(line, "bad device"));
    }
    let inode = next("missing inode")?
        .parse::<u64>()
        .map_err(|_| malformed(line, "bad inode"))?;
    let pathname = fields
        .next()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(String::from);

    Ok(MemoryRegion {
        begin,
        end,
        perms: perms.to_string(),
        offset,
        device: device.to_string(),
        inode,
        pathname,
    })
}

/// Regions of a process, in the order the kernel lists them
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: Vec<MemoryRegion>,
    skipped: usize,
}

impl RegionCatalog {
    /// Reads `/proc/<pid>/maps`
    pub fn enumerate(pid: i32) -> Result<RegionCatalog> {
        let path = format!("/proc/{}/maps", pid);
        let file = File::open(&path).map_err(|source| Error::Maps { pid, source })?;
        let catalog =
            RegionCatalog::parse(BufReader::new(file)).map_err(|err| match err {
                Error::Io(source) => Error::Maps { pid, source },
                other => other,
            })?;
        log::info!(
            "{} memory regions found in {} ({} skipped)",
            catalog.regions.len(),
            path,
            catalog.skipped
        );
        Ok(catalog)
    }

    /// Parses a maps description, skipping lines that do not fit the format
    pub fn parse<R: BufRead>(reader: R) -> Result<RegionCatalog> {
        let mut catalog = RegionCatalog::default();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(region) => catalog.regions.push(region),
                Err(err) => {
                    log::warn!("{}", err);
                    catalog.skipped += 1;
                }
            }
        }
        Ok(catalog)
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<MemoryRegion> {
        self.regions
    }

    /// Number of lines that could not be parsed
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
