//! # Anonymous Memory Mapping for Frame Pools
//!
//! ## Purpose
//!
//! This module owns the single memory region that backs a frame pool. The region is
//! mapped once when the transport is created and unmapped when it is dropped, so the
//! data path never touches the heap allocator.
//!
//! ## How it works
//!
//! `OwnedMmap` wraps a pointer returned by `libc::mmap` together with its aligned size
//! and calls `libc::munmap` from its `Drop` implementation. The mapping can optionally
//! be backed by 2 MiB huge pages; when the caller does not decide, huge pages are used
//! only if the region spans at least one huge page and `/proc/meminfo` reports free
//! ones. A failed huge page mapping falls back to standard pages.
//!
//! ## Main components
//!
//! - `OwnedMmap`: owner of a private anonymous mapping.
//! - `get_hugepage_info()`: parses `/proc/meminfo` for the huge page configuration.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::{io, ptr};

const HUGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// A private anonymous memory mapping that is released on drop.
pub struct OwnedMmap(
    /// A raw pointer to the beginning of the mapped area.
    pub *mut libc::c_void,
    /// The total size of the mapped area in bytes.
    pub usize,
);

impl OwnedMmap {
    /// Maps at least `size` bytes of zeroed, read-write memory.
    ///
    /// # How it works
    ///
    /// `huge_page` selects the backing: `Some(true)` asks for huge pages, `Some(false)`
    /// uses standard pages and `None` picks huge pages only when they pay off (see the
    /// module docs). The size is rounded up to the chosen page size.
    pub fn anonymous(size: usize, huge_page: Option<bool>) -> io::Result<Self> {
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot map an empty region",
            ));
        }
        let huge_tlb = match huge_page {
            Some(yes) => yes,
            None => size >= HUGE_PAGE_SIZE && huge_pages_available(),
        };
        if huge_tlb {
            match Self::map(size, true) {
                Ok(mmap) => return Ok(mmap),
                Err(e) => log::warn!("huge page mapping of {size} bytes failed ({e}), using standard pages"),
            }
        }
        Self::map(size, false)
    }

    fn map(size: usize, huge_tlb: bool) -> io::Result<Self> {
        let page_size = if huge_tlb {
            HUGE_PAGE_SIZE
        } else {
            unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
        };
        let aligned_size = (size + page_size - 1) & !(page_size - 1);
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                aligned_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE
                    | libc::MAP_ANONYMOUS
                    | if huge_tlb {
                        libc::MAP_HUGETLB | libc::MAP_HUGE_2MB
                    } else {
                        0
                    },
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(OwnedMmap(ptr, aligned_size))
    }

    /// Returns the start of the mapping as a byte pointer.
    pub fn as_u8_ptr(&self) -> *mut u8 {
        self.0 as *mut u8
    }

    /// Returns the size of the mapping in bytes.
    pub(crate) fn len(&self) -> usize {
        self.1
    }
}

impl Drop for OwnedMmap {
    fn drop(&mut self) {
        unsafe {
            if self.0 != libc::MAP_FAILED && !self.0.is_null() {
                let res = libc::munmap(self.0, self.1);
                if res < 0 {
                    log::error!("Failed to unmap memory: {}", io::Error::last_os_error());
                }
            }
        }
    }
}

/// Contains information about the system's huge page configuration.
#[derive(Debug, Default)]
pub struct HugePageInfo {
    /// The size of a huge page in kilobytes.
    pub size_kb: Option<u64>,
    /// The number of free (available) huge pages.
    pub free: Option<u64>,
}

fn huge_pages_available() -> bool {
    match get_hugepage_info() {
        Ok(HugePageInfo {
            free: Some(free),
            size_kb: Some(2048),
            ..
        }) => free > 0,
        Ok(_) => false,
        Err(e) => {
            log::debug!("cannot read huge page info: {e}");
            false
        }
    }
}

/// Parses `/proc/meminfo` to get information about huge pages.
pub fn get_hugepage_info() -> io::Result<HugePageInfo> {
    let file = File::open("/proc/meminfo")?;
    parse_meminfo(BufReader::new(file))
}

pub(crate) fn parse_meminfo(reader: impl BufRead) -> io::Result<HugePageInfo> {
    let mut info = HugePageInfo::default();
    for line in reader.lines() {
        let line = line?;
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value_str = value.trim().trim_end_matches(" kB");
        match key.trim() {
            "Hugepagesize" => info.size_kb = Some(value_str.parse().map_err(io::Error::other)?),
            "HugePages_Free" => info.free = Some(value_str.parse().map_err(io::Error::other)?),
            _ => {}
        }
    }
    Ok(info)
}
