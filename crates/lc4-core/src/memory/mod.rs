//! Memory model primitives and fixed address-space policies.

/// Region legality helpers used by the protection check.
pub mod access;
/// Fixed memory-region map and address decoder.
pub mod map;

pub use access::{validate_data_access, validate_fetch_privilege, validate_fetch_region};
pub use map::{
    decode_memory_region, MemoryRegion, RegionDescriptor, FIXED_MEMORY_REGIONS, OS_CODE_END,
    OS_CODE_START, OS_DATA_END, OS_DATA_START, USER_CODE_END, USER_CODE_START, USER_DATA_END,
    USER_DATA_START,
};

/// Number of 16-bit words in the address space.
pub const ADDRESS_SPACE_WORDS: usize = u16::MAX as usize + 1;

/// Flat 64K-word memory holding both instructions and data.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    words: Box<[u16]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            words: vec![0; ADDRESS_SPACE_WORDS].into_boxed_slice(),
        }
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let populated = self.words.iter().filter(|word| **word != 0).count();
        f.debug_struct("Memory")
            .field("populated_words", &populated)
            .finish()
    }
}

impl Memory {
    /// Reads the word at `addr`.
    #[must_use]
    pub fn read(&self, addr: u16) -> u16 {
        self.words[usize::from(addr)]
    }

    /// Writes `value` to `addr`.
    pub fn write(&mut self, addr: u16, value: u16) {
        self.words[usize::from(addr)] = value;
    }

    /// Zeroes every word.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Returns the full backing store in address order.
    #[must_use]
    pub fn words(&self) -> &[u16] {
        &self.words
    }
}
