//! Fixed LC4 memory-region map and decoding helpers.

/// Inclusive start address of the user code region.
pub const USER_CODE_START: u16 = 0x0000;
/// Inclusive end address of the user code region.
pub const USER_CODE_END: u16 = 0x1FFF;
/// Inclusive start address of the user data region.
pub const USER_DATA_START: u16 = 0x2000;
/// Inclusive end address of the user data region.
pub const USER_DATA_END: u16 = 0x7FFF;
/// Inclusive start address of the OS code region.
pub const OS_CODE_START: u16 = 0x8000;
/// Inclusive end address of the OS code region.
pub const OS_CODE_END: u16 = 0x9FFF;
/// Inclusive start address of the OS data region.
pub const OS_DATA_START: u16 = 0xA000;
/// Inclusive end address of the OS data region.
pub const OS_DATA_END: u16 = 0xFFFF;

/// Canonical fixed-region descriptor for the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionDescriptor {
    /// Region classification.
    pub region: MemoryRegion,
    /// Inclusive start address.
    pub start: u16,
    /// Inclusive end address.
    pub end: u16,
}

/// Region classification for LC4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    /// User code (`0x0000..=0x1FFF`).
    UserCode,
    /// User data (`0x2000..=0x7FFF`).
    UserData,
    /// OS code (`0x8000..=0x9FFF`).
    OsCode,
    /// OS data (`0xA000..=0xFFFF`).
    OsData,
}

impl MemoryRegion {
    /// Returns the inclusive bounds for this region.
    #[must_use]
    pub const fn bounds(self) -> (u16, u16) {
        match self {
            Self::UserCode => (USER_CODE_START, USER_CODE_END),
            Self::UserData => (USER_DATA_START, USER_DATA_END),
            Self::OsCode => (OS_CODE_START, OS_CODE_END),
            Self::OsData => (OS_DATA_START, OS_DATA_END),
        }
    }

    /// Returns `true` for regions that hold instructions.
    #[must_use]
    pub const fn is_code(self) -> bool {
        matches!(self, Self::UserCode | Self::OsCode)
    }

    /// Returns `true` for regions that require the PSR privilege bit.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::OsCode | Self::OsData)
    }

    /// Returns the canonical descriptor for this region.
    #[must_use]
    pub const fn descriptor(self) -> RegionDescriptor {
        let (start, end) = self.bounds();
        RegionDescriptor {
            region: self,
            start,
            end,
        }
    }
}

/// Canonical fixed region layout in ascending address order.
pub const FIXED_MEMORY_REGIONS: [RegionDescriptor; 4] = [
    MemoryRegion::UserCode.descriptor(),
    MemoryRegion::UserData.descriptor(),
    MemoryRegion::OsCode.descriptor(),
    MemoryRegion::OsData.descriptor(),
];

const _: () = assert_fixed_region_layout();

const fn assert_fixed_region_layout() {
    let mut index = 0;
    while index < FIXED_MEMORY_REGIONS.len() {
        let descriptor = FIXED_MEMORY_REGIONS[index];
        assert!(
            descriptor.start <= descriptor.end,
            "region start cannot be greater than end"
        );

        if index > 0 {
            let previous = FIXED_MEMORY_REGIONS[index - 1];
            assert!(
                previous.end.wrapping_add(1) == descriptor.start,
                "fixed regions must be contiguous"
            );
        }

        index += 1;
    }

    assert!(
        FIXED_MEMORY_REGIONS[0].start == 0x0000 && FIXED_MEMORY_REGIONS[3].end == u16::MAX,
        "fixed regions must cover full address space"
    );
}

/// Decodes a 16-bit address into its fixed memory region.
#[must_use]
pub const fn decode_memory_region(addr: u16) -> MemoryRegion {
    match addr {
        USER_CODE_START..=USER_CODE_END => MemoryRegion::UserCode,
        USER_DATA_START..=USER_DATA_END => MemoryRegion::UserData,
        OS_CODE_START..=OS_CODE_END => MemoryRegion::OsCode,
        OS_DATA_START..=OS_DATA_END => MemoryRegion::OsData,
    }
}
