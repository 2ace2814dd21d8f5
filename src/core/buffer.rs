//! # Wire Buffer
//!
//! Growable byte sequence with independent read and write cursors and a
//! sub-byte accumulator on each side.
//!
//! ## Bit Order Convention
//! - **Within a byte**: MSB-first (the first bit written lands in bit 7)
//! - **Multi-bit fields**: most significant bit of the field first
//! - **Integers and floats**: little-endian
//!
//! ## Alignment
//! Every byte-level write flushes the pending bit accumulator (zero padded)
//! before appending. Every byte-level read discards whatever is left of a
//! partially consumed bit byte. Writer and reader therefore stay in lockstep
//! as long as both run the same layout.
//!
//! ```text
//! write_bit(1) write_bit(0) write_bit(1) write_u8(0xAB)
//!   => [0b1010_0000, 0xAB]
//! ```

use crate::error::{constants, ProtocolError, Result};
use crate::utils::metrics::global_metrics;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

/// Bit position meaning "no bits buffered on the read side".
const READ_BITS_EMPTY: u8 = 8;

/// Default capacity for outbound buffers
const DEFAULT_CAPACITY: usize = 64;

/// Byte buffer with bit-level and byte-level cursors for a single message.
#[derive(Debug, Clone)]
pub struct WireBuffer {
    storage: BytesMut,
    rpos: usize,
    /// Partially filled outbound byte
    write_acc: u8,
    /// Number of bits already placed in `write_acc` (0-7)
    write_bit_count: u8,
    /// Inbound byte currently being consumed bit by bit
    read_acc: u8,
    /// Next bit to consume from `read_acc` (8 = empty)
    read_bit_pos: u8,
}

impl Default for WireBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&[u8]> for WireBuffer {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}

impl WireBuffer {
    /// Create an empty buffer for encoding.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: BytesMut::with_capacity(capacity),
            rpos: 0,
            write_acc: 0,
            write_bit_count: 0,
            read_acc: 0,
            read_bit_pos: READ_BITS_EMPTY,
        }
    }

    /// Create a buffer for decoding a received message body.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut buffer = Self::with_capacity(data.len());
        buffer.storage.extend_from_slice(data);
        buffer
    }

    /// Number of complete bytes in the buffer.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty() && self.write_bit_count == 0
    }

    /// Bytes written so far (pending bits excluded).
    pub fn as_slice(&self) -> &[u8] {
        &self.storage
    }

    /// Current read position.
    pub fn rpos(&self) -> usize {
        self.rpos
    }

    /// Bytes not yet consumed by the reader.
    pub fn remaining(&self) -> usize {
        self.storage.len().saturating_sub(self.rpos)
    }

    /// True once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Flush pending bits and hand the encoded body off.
    pub fn into_bytes(mut self) -> Bytes {
        self.flush_bits();
        self.storage.freeze()
    }

    // ------------------------------------------------------------------
    // Bit-level writes
    // ------------------------------------------------------------------

    /// True when a partially filled byte is waiting for a flush.
    pub fn has_pending_bits(&self) -> bool {
        self.write_bit_count > 0
    }

    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.write_acc |= 0x80 >> self.write_bit_count;
        }
        self.write_bit_count += 1;

        if self.write_bit_count == 8 {
            self.storage.put_u8(self.write_acc);
            self.write_acc = 0;
            self.write_bit_count = 0;
        }
    }

    /// Append the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u32) {
        let count = count.min(u32::BITS);
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 != 0);
        }
    }

    /// Like [`write_bits`](Self::write_bits) but masks values that do not fit
    /// the field, logging and counting the event.
    pub fn write_bits_checked(&mut self, value: u32, count: u32, field: &'static str) {
        let max = field_max(count);
        let value = if value > max {
            warn!(field, value, width = count, "Value exceeds bit field width, masking");
            global_metrics().field_clamped();
            value & max
        } else {
            value
        };
        self.write_bits(value, count);
    }

    /// Pad the pending byte with zero bits and append it.
    pub fn flush_bits(&mut self) {
        if self.write_bit_count > 0 {
            self.storage.put_u8(self.write_acc);
            self.write_acc = 0;
            self.write_bit_count = 0;
        }
    }

    // ------------------------------------------------------------------
    // Byte-level writes
    // ------------------------------------------------------------------

    pub fn write_u8(&mut self, value: u8) {
        self.flush_bits();
        self.storage.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.flush_bits();
        self.storage.put_u16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.flush_bits();
        self.storage.put_u32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.flush_bits();
        self.storage.put_u64_le(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.flush_bits();
        self.storage.put_i16_le(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.flush_bits();
        self.storage.put_i32_le(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.flush_bits();
        self.storage.put_f32_le(value);
    }

    /// One byte, 0 or 1.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.flush_bits();
        self.storage.put_slice(data);
    }

    /// String bytes followed by a NUL terminator.
    /// Write `value` and a terminator. Anything from an embedded NUL on is
    /// dropped, see [`cstring_content`].
    pub fn write_cstring(&mut self, value: &str) {
        self.flush_bits();
        self.storage.put_slice(cstring_content(value).as_bytes());
        self.storage.put_u8(0);
    }

    // ------------------------------------------------------------------
    // Bit-level reads
    // ------------------------------------------------------------------

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.read_bit_pos >= READ_BITS_EMPTY {
            let start = self.advance(1)?;
            self.read_acc = self.storage[start];
            self.read_bit_pos = 0;
        }

        let bit = (self.read_acc >> (7 - self.read_bit_pos)) & 1 != 0;
        self.read_bit_pos += 1;
        Ok(bit)
    }

    /// Read a `count`-bit field, most significant bit first.
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..count.min(u32::BITS) {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Drop the unread remainder of the current bit byte.
    pub fn reset_bit_reader(&mut self) {
        self.read_bit_pos = READ_BITS_EMPTY;
    }

    // ------------------------------------------------------------------
    // Byte-level reads
    // ------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Any non-zero byte reads as true.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read exactly `N` bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.reset_bit_reader();
        let start = self.advance(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.storage[start..start + N]);
        Ok(out)
    }

    /// Read a NUL terminated UTF-8 string.
    pub fn read_cstring(&mut self) -> Result<String> {
        self.reset_bit_reader();
        let unread = &self.storage[self.rpos..];
        let Some(end) = unread.iter().position(|&b| b == 0) else {
            return Err(ProtocolError::Truncated {
                needed: unread.len() + 1,
                remaining: unread.len(),
            });
        };

        let value = std::str::from_utf8(&unread[..end])
            .map_err(|_| ProtocolError::Malformed(constants::ERR_INVALID_UTF8.to_string()))?
            .to_owned();
        self.rpos += end + 1;
        Ok(value)
    }

    /// Reject a length prefix whose elements cannot fit in the unread bytes.
    ///
    /// Called before allocating so a hostile count cannot force a huge
    /// reservation.
    pub fn ensure_count(&self, count: usize, min_element_size: usize) -> Result<()> {
        let needed = count.saturating_mul(min_element_size);
        let remaining = self.remaining();
        if needed > remaining {
            return Err(ProtocolError::Truncated { needed, remaining });
        }
        Ok(())
    }

    /// Move the read cursor forward by `count`, returning the old position.
    fn advance(&mut self, count: usize) -> Result<usize> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(ProtocolError::Truncated {
                needed: count,
                remaining,
            });
        }
        let start = self.rpos;
        self.rpos += count;
        Ok(start)
    }
}

/// Largest value a `width`-bit field can hold.
pub fn field_max(width: u32) -> u32 {
    if width >= u32::BITS {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// The part of `value` a C-string can carry: everything before the first
/// NUL. Cutting counts as a clamp.
pub fn cstring_content(value: &str) -> &str {
    match value.find('\0') {
        Some(end) => {
            warn!(len = value.len(), kept = end, "String contains NUL, truncating");
            global_metrics().field_clamped();
            &value[..end]
        }
        None => value,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_bits_are_packed_msb_first() {
        let mut buf = WireBuffer::new();
        buf.write_bit(true);
        buf.write_bit(false);
        buf.write_bit(true);
        buf.flush_bits();
        assert_eq!(buf.as_slice(), &[0b1010_0000]);
    }

    #[test]
    fn test_full_byte_of_bits_needs_no_flush() {
        let mut buf = WireBuffer::new();
        for _ in 0..8 {
            buf.write_bit(true);
        }
        assert!(!buf.has_pending_bits());
        assert_eq!(buf.as_slice(), &[0xFF]);
    }

    #[test]
    fn test_byte_write_flushes_pending_bits() {
        let mut buf = WireBuffer::new();
        buf.write_bit(true);
        buf.write_u8(0xAB);
        assert_eq!(buf.as_slice(), &[0x80, 0xAB]);
    }

    #[test]
    fn test_multi_bit_field_order() {
        let mut buf = WireBuffer::new();
        buf.write_bits(0b101, 3);
        buf.write_bits(0x3, 2);
        buf.flush_bits();
        assert_eq!(buf.as_slice(), &[0b1011_1000]);

        let mut reader = WireBuffer::from_slice(buf.as_slice());
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
    }

    #[test]
    fn test_byte_read_discards_partial_bits() {
        let mut buf = WireBuffer::new();
        buf.write_bits(0b11, 2);
        buf.write_u16(0xBEEF);
        buf.write_bit(true);
        let bytes = buf.into_bytes();

        let mut reader = WireBuffer::from_slice(&bytes);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert!(reader.read_bit().unwrap());
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_typed_values_are_little_endian() {
        let mut buf = WireBuffer::new();
        buf.write_u32(0x0102_0304);
        buf.write_i16(-2);
        buf.write_f32(1.0);
        assert_eq!(
            buf.as_slice(),
            &[0x04, 0x03, 0x02, 0x01, 0xFE, 0xFF, 0x00, 0x00, 0x80, 0x3F]
        );
    }

    #[test]
    fn test_twenty_three_bit_max_roundtrips() {
        let max = field_max(23);
        assert_eq!(max, (1 << 23) - 1);

        let mut buf = WireBuffer::new();
        buf.write_bits(max, 23);
        buf.flush_bits();
        assert_eq!(buf.len(), 3);

        let mut reader = WireBuffer::from_slice(buf.as_slice());
        assert_eq!(reader.read_bits(23).unwrap(), max);
    }

    #[test]
    fn test_checked_bits_mask_overflow() {
        let mut buf = WireBuffer::new();
        buf.write_bits_checked(0x1FFF, 12, "extra movement flags");
        buf.flush_bits();

        let mut reader = WireBuffer::from_slice(buf.as_slice());
        assert_eq!(reader.read_bits(12).unwrap(), 0x0FFF);
    }

    #[test]
    fn test_cstring_roundtrip() {
        let mut buf = WireBuffer::new();
        buf.write_cstring("Thrall");
        buf.write_u8(7);
        assert_eq!(&buf.as_slice()[..7], b"Thrall\0");

        let mut reader = WireBuffer::from_slice(buf.as_slice());
        assert_eq!(reader.read_cstring().unwrap(), "Thrall");
        assert_eq!(reader.read_u8().unwrap(), 7);
    }

    #[test]
    fn test_cstring_cut_at_embedded_nul() {
        let before = global_metrics().snapshot().fields_clamped;
        let mut buf = WireBuffer::new();
        buf.write_cstring("Jaina\0Proudmoore");
        buf.write_u8(0x7E);
        assert_eq!(buf.as_slice(), b"Jaina\0\x7E");
        assert!(global_metrics().snapshot().fields_clamped > before);

        let bytes = buf.into_bytes();
        let mut reader = WireBuffer::from_slice(&bytes);
        assert_eq!(reader.read_cstring().unwrap(), "Jaina");
        assert_eq!(reader.read_u8().unwrap(), 0x7E);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_unterminated_cstring_is_truncated() {
        let mut reader = WireBuffer::from_slice(b"abc");
        let err = reader.read_cstring().unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut reader = WireBuffer::from_slice(&[0xFF, 0xFE, 0x00]);
        let err = reader.read_cstring().unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_read_past_end_is_truncated() {
        let mut reader = WireBuffer::from_slice(&[1, 2, 3]);
        assert_eq!(
            reader.read_u32(),
            Err(ProtocolError::Truncated {
                needed: 4,
                remaining: 3
            })
        );
        // A failed read leaves the cursor where it was
        assert_eq!(reader.rpos(), 0);
    }

    #[test]
    fn test_read_bit_on_empty_is_truncated() {
        let mut reader = WireBuffer::from_slice(&[]);
        assert!(reader.read_bit().unwrap_err().is_truncated());
    }

    #[test]
    fn test_ensure_count_rejects_impossible_lengths() {
        let reader = WireBuffer::from_slice(&[0; 16]);
        assert!(reader.ensure_count(2, 8).is_ok());
        assert!(reader.ensure_count(3, 8).unwrap_err().is_truncated());
        assert!(reader.ensure_count(usize::MAX, 8).unwrap_err().is_truncated());
    }
}
