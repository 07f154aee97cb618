//! # PDU Wire Constants
//!
//! Values that every language binding must agree on byte-for-byte. Changing
//! any of these breaks interoperability with already deployed peers.
//!
//! ```text
//! [0 .. PDU_META_DATA_SIZE)      Metadata
//! [base_off .. heap_off)         Base region
//! [heap_off .. total_size)       Heap region
//! ```

/// Encoded size of the metadata header
pub const PDU_META_DATA_SIZE: usize = 24;

/// Magic number at byte 0 of every encoded PDU
pub const PDU_META_DATA_MAGICNO: u32 = 0x1234_5678;

/// Metadata layout version
pub const PDU_META_DATA_VERSION: u32 = 2;

/// Alignment of the base region start
pub const PDU_BASE_ALIGNMENT: usize = 8;

/// Capacity of fixed strings in service headers, terminator included
pub const HAKO_STRING_SIZE: usize = 128;

/// Base-region footprint of a heap reference: offset u32 + length u32
pub const HEAP_REF_SIZE: usize = 8;

/// Round `value` up to the next multiple of `align` (a power of two)
pub const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}
