//! PDU Metadata Header
//!
//! The header is identical for all PDUs and records where the base and heap
//! regions start.
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬────────────┬──────────┐
//! │ magicno  │ version  │ base_off │ heap_off │ total_size │ reserved │
//! │ u32 LE   │ u32 LE   │ u32 LE   │ u32 LE   │ u32 LE     │ u32 LE   │
//! └──────────┴──────────┴──────────┴──────────┴────────────┴──────────┘
//!  0          4          8          12         16           20      24
//! ```

use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

use crate::bounds::SafeConvert;
use crate::constants::{
    align_up, PDU_BASE_ALIGNMENT, PDU_META_DATA_MAGICNO, PDU_META_DATA_SIZE,
    PDU_META_DATA_VERSION,
};
use crate::error::PduResult;

type LeU32 = U32<LittleEndian>;

/// Raw wire image of the metadata header (24 bytes, unaligned)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct PduMetadataWire {
    pub magicno: LeU32,
    pub version: LeU32,
    pub base_off: LeU32,
    pub heap_off: LeU32,
    pub total_size: LeU32,
    pub reserved: LeU32,
}

/// Decoded metadata header
///
/// Immutable once built: constructed fresh by every encode, produced
/// read-only by the parser on every decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduMetadata {
    magicno: u32,
    version: u32,
    base_off: u32,
    heap_off: u32,
    total_size: u32,
}

impl PduMetadata {
    /// Header size in bytes
    pub const SIZE: usize = PDU_META_DATA_SIZE;

    /// Lay out a PDU holding `base_size` base bytes and `heap_size` heap bytes
    pub fn for_regions(base_size: usize, heap_size: usize) -> PduResult<Self> {
        let base_off = align_up(PDU_META_DATA_SIZE, PDU_BASE_ALIGNMENT);
        let heap_off = base_off.saturating_add(base_size);
        let total_size = heap_off.saturating_add(heap_size);

        Ok(Self {
            magicno: PDU_META_DATA_MAGICNO,
            version: PDU_META_DATA_VERSION,
            base_off: base_off.safe_convert()?,
            heap_off: heap_off.safe_convert()?,
            total_size: total_size.safe_convert()?,
        })
    }

    pub(crate) fn from_wire(wire: &PduMetadataWire) -> Self {
        Self {
            magicno: wire.magicno.get(),
            version: wire.version.get(),
            base_off: wire.base_off.get(),
            heap_off: wire.heap_off.get(),
            total_size: wire.total_size.get(),
        }
    }

    pub fn to_wire(&self) -> PduMetadataWire {
        PduMetadataWire {
            magicno: LeU32::new(self.magicno),
            version: LeU32::new(self.version),
            base_off: LeU32::new(self.base_off),
            heap_off: LeU32::new(self.heap_off),
            total_size: LeU32::new(self.total_size),
            reserved: LeU32::new(0),
        }
    }

    /// Write the header into the first `SIZE` bytes of `out`
    pub fn write_to(&self, out: &mut [u8]) {
        out[..Self::SIZE].copy_from_slice(self.to_wire().as_bytes());
    }

    pub fn magicno(&self) -> u32 {
        self.magicno
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn base_off(&self) -> usize {
        self.base_off as usize
    }

    pub fn heap_off(&self) -> usize {
        self.heap_off as usize
    }

    pub fn total_size(&self) -> usize {
        self.total_size as usize
    }

    pub fn base_size(&self) -> usize {
        self.heap_off() - self.base_off()
    }

    pub fn heap_size(&self) -> usize {
        self.total_size() - self.heap_off()
    }

    /// Base region of a buffer this header was parsed from
    pub fn base_region<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.base_off()..self.heap_off()]
    }

    /// Heap region of a buffer this header was parsed from
    pub fn heap_region<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.heap_off()..self.total_size()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_size() {
        assert_eq!(std::mem::size_of::<PduMetadataWire>(), PduMetadata::SIZE);
        assert_eq!(PduMetadata::SIZE, 24);
    }

    #[test]
    fn test_region_layout() {
        let meta = PduMetadata::for_regions(268 + 8, 7).unwrap();
        assert_eq!(meta.base_off(), 24);
        assert_eq!(meta.heap_off(), 24 + 276);
        assert_eq!(meta.total_size(), 24 + 276 + 7);
        assert_eq!(meta.base_size(), 276);
        assert_eq!(meta.heap_size(), 7);
        assert!(meta.base_off() <= meta.heap_off() && meta.heap_off() <= meta.total_size());
    }

    #[test]
    fn test_wire_image_is_little_endian() {
        let meta = PduMetadata::for_regions(4, 0).unwrap();
        let mut out = [0u8; 24];
        meta.write_to(&mut out);
        assert_eq!(
            out,
            [
                0x78, 0x56, 0x34, 0x12, // magicno
                2, 0, 0, 0, // version
                24, 0, 0, 0, // base_off
                28, 0, 0, 0, // heap_off
                28, 0, 0, 0, // total_size
                0, 0, 0, 0, // reserved
            ]
        );

        let wire = PduMetadataWire::read_from(&out[..]).unwrap();
        assert_eq!(PduMetadata::from_wire(&wire), meta);
    }

    #[test]
    fn test_oversized_regions_are_rejected() {
        assert!(PduMetadata::for_regions(u32::MAX as usize, 1).is_err());
    }
}
