//! EVM memory implementation

use crate::stack::U256;

/// EVM memory (byte-addressable, expandable)
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Get current memory size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Ensure memory is at least `size` bytes, expanding if needed
    /// Returns the gas cost for expansion
    pub fn expand(&mut self, offset: usize, size: usize) -> usize {
        if size == 0 {
            return 0;
        }

        let new_size = offset.saturating_add(size);
        let current_size = self.data.len();

        if new_size > current_size {
            // Round up to 32-byte word boundary
            let new_size_words = new_size.div_ceil(32);
            let new_size_aligned = new_size_words * 32;
            self.data.resize(new_size_aligned, 0);
            new_size_aligned
        } else {
            current_size
        }
    }

    /// Load a 32-byte word from memory
    pub fn load(&self, offset: usize) -> U256 {
        let mut result = [0u8; 32];
        let end = (offset + 32).min(self.data.len());
        let copy_len = end.saturating_sub(offset);

        if copy_len > 0 && offset < self.data.len() {
            result[..copy_len].copy_from_slice(&self.data[offset..end]);
        }

        result
    }

    /// Store a 32-byte word to memory
    pub fn store(&mut self, offset: usize, value: &U256) {
        self.expand(offset, 32);
        self.data[offset..offset + 32].copy_from_slice(value);
    }

    /// Store a single byte to memory
    pub fn store8(&mut self, offset: usize, value: u8) {
        self.expand(offset, 1);
        self.data[offset] = value;
    }

    /// Load a byte slice from memory
    pub fn load_slice(&self, offset: usize, size: usize) -> Vec<u8> {
        if size == 0 {
            return Vec::new();
        }

        let mut result = vec![0u8; size];
        let end = (offset + size).min(self.data.len());
        let copy_len = end.saturating_sub(offset);

        if copy_len > 0 && offset < self.data.len() {
            result[..copy_len].copy_from_slice(&self.data[offset..end]);
        }

        result
    }

    /// Store a byte slice to memory
    pub fn store_slice(&mut self, offset: usize, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.expand(offset, data.len());
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Copy within memory (for MCOPY)
    pub fn copy(&mut self, dest: usize, src: usize, size: usize) {
        if size == 0 {
            return;
        }

        // Expand to cover both source and destination
        let max_offset = dest.max(src);
        self.expand(max_offset, size);

        // Use copy_within for overlapping copies
        if dest <= src {
            self.data.copy_within(src..src + size, dest);
        } else {
            // Copy backwards for overlapping regions where dest > src
            for i in (0..size).rev() {
                self.data[dest + i] = self.data[src + i];
            }
        }
    }

    /// Clear memory
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get raw data slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
