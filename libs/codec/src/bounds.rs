//! Bounds Checking for Safe Buffer Reads
//!
//! Every read from an untrusted buffer goes through these helpers, so a
//! malformed offset turns into `OutOfBounds` instead of a slice panic.

use crate::error::{PduError, PduResult};

/// Check if a buffer has enough bytes for a read operation
pub fn check_buffer_bounds(buffer: &[u8], offset: usize, size: usize) -> PduResult<()> {
    match offset.checked_add(size) {
        Some(end) if end <= buffer.len() => Ok(()),
        _ => Err(PduError::out_of_bounds(
            "",
            offset,
            size,
            buffer.len(),
        )),
    }
}

/// Safely extract a slice from a buffer with bounds checking
pub fn safe_slice(buffer: &[u8], offset: usize, size: usize) -> PduResult<&[u8]> {
    check_buffer_bounds(buffer, offset, size)?;
    Ok(&buffer[offset..offset + size])
}

/// Bounds-checked integer conversion for wire-sized fields
pub trait SafeConvert<T> {
    fn safe_convert(self) -> PduResult<T>;
}

impl SafeConvert<usize> for u32 {
    fn safe_convert(self) -> PduResult<usize> {
        usize::try_from(self).map_err(|_| PduError::PduTooLarge {
            size: usize::MAX,
            limit: usize::MAX,
        })
    }
}

impl SafeConvert<u32> for usize {
    fn safe_convert(self) -> PduResult<u32> {
        u32::try_from(self).map_err(|_| PduError::PduTooLarge {
            size: self,
            limit: u32::MAX as usize,
        })
    }
}
