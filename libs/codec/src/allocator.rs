//! Base and heap region writers
//!
//! Both allocators live for exactly one encode call. The base region is
//! written at caller-chosen offsets (schema constants), the heap region is
//! append-only and hands back the offset of each payload.
//!
//! ```text
//! DynamicAllocator   [ scalar | scalar | (off,len) | nested struct ... ]
//!                                          │
//! HeapAllocator      [ payload 0 | payload 1 | ... ]
//!                      ▲ off
//! ```

/// Growable base-region writer
///
/// `add` may be called in any order; disjoint writes always produce the same
/// region. Gaps are zero-filled.
#[derive(Debug, Default)]
pub struct DynamicAllocator {
    data: Vec<u8>,
    #[cfg(debug_assertions)]
    written: Vec<(usize, usize)>,
}

impl DynamicAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with capacity for a struct of known fixed size
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            #[cfg(debug_assertions)]
            written: Vec::new(),
        }
    }

    /// Place `bytes` at `offset`, growing the region as needed
    ///
    /// Overlapping an earlier write is a caller bug and trips a debug assertion.
    pub fn add(&mut self, bytes: &[u8], offset: usize) {
        let end = offset + bytes.len();

        #[cfg(debug_assertions)]
        {
            if !bytes.is_empty() {
                debug_assert!(
                    !self.written.iter().any(|&(s, e)| offset < e && s < end),
                    "overlapping base-region write at [{offset}, {end})"
                );
                self.written.push((offset, end));
            }
        }

        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
    }

    /// Zero-extend the region to at least `size` bytes
    pub fn reserve_to(&mut self, size: usize) {
        if self.data.len() < size {
            self.data.resize(size, 0);
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Append-only writer for variable-length payloads
#[derive(Debug, Default)]
pub struct HeapAllocator {
    data: Vec<u8>,
}

impl HeapAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes`, returning their offset from the heap-region start
    pub fn add(&mut self, bytes: &[u8]) -> usize {
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        offset
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
