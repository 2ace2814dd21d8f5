//! # Packed Identifiers
//!
//! Entity, item and transport references are 8-byte identifiers. On the wire
//! most of them travel in packed form: one presence bit per byte, followed by
//! only the bytes that are non-zero.
//!
//! The order in which the 8 presence bits are written and the order in which
//! the bytes follow are both fixed per call site by the peer. Most sites use
//! the canonical form (a mask byte, then bytes in ascending index order);
//! a handful of message types scramble both orders, sometimes interleaving
//! the bits and bytes of two identifiers with other fields. Every order used
//! lives in [`crate::protocol::layout`].
//!
//! ## Wire Format (canonical)
//! ```text
//! [mask(1)] [byte i for each set bit i, ascending]
//! 0x0000_0000_0000_12FF  =>  [0x03, 0xFF, 0x12]
//! ```

use crate::core::buffer::WireBuffer;
use crate::error::Result;
use std::fmt;

/// Presence bit order that reproduces the canonical mask byte.
///
/// Bits are packed MSB-first, so byte 7's presence has to go out first for
/// byte 0's presence to land in the mask's lowest bit.
pub const CANONICAL_MASK_ORDER: [u8; 8] = [7, 6, 5, 4, 3, 2, 1, 0];

/// Byte order of the canonical packed form.
pub const CANONICAL_BYTE_ORDER: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// One step of an interleaved layout: (identifier slot, byte index).
pub type GuidStep = (usize, u8);

/// Opaque 8-byte identifier. Byte `i` is bits `8*i..8*i+8` of the value.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectGuid(u64);

impl ObjectGuid {
    pub const EMPTY: ObjectGuid = ObjectGuid(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }

    pub fn bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Byte `index` (0-7) of the identifier.
    pub fn byte(self, index: u8) -> u8 {
        self.bytes()[usize::from(index & 7)]
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Canonical presence mask: bit `i` set when byte `i` is non-zero.
    pub fn mask(self) -> u8 {
        self.bytes()
            .iter()
            .enumerate()
            .fold(0u8, |mask, (i, &b)| if b != 0 { mask | (1 << i) } else { mask })
    }
}

impl fmt::Debug for ObjectGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectGuid(0x{:016X})", self.0)
    }
}

impl From<u64> for ObjectGuid {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Identifier under construction while its presence bits and bytes arrive
/// out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedGuid {
    mask: u8,
    bytes: [u8; 8],
}

impl PackedGuid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_present(&mut self, index: u8, present: bool) {
        let bit = 1u8 << (index & 7);
        if present {
            self.mask |= bit;
        } else {
            self.mask &= !bit;
        }
    }

    /// Number of bytes announced present.
    pub fn present_count(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_present(&self, index: u8) -> bool {
        self.mask & (1 << (index & 7)) != 0
    }

    pub fn set_byte(&mut self, index: u8, value: u8) {
        self.bytes[usize::from(index & 7)] = value;
    }

    /// Bytes whose presence bit never arrived stay zero.
    pub fn into_guid(self) -> ObjectGuid {
        ObjectGuid::from_bytes(self.bytes)
    }
}

impl WireBuffer {
    /// Write one presence bit per index in `order`.
    pub fn write_guid_mask(&mut self, guid: ObjectGuid, order: &[u8]) {
        for &index in order {
            self.write_bit(guid.byte(index) != 0);
        }
    }

    /// Write the non-zero bytes among `order`, in that order.
    pub fn write_guid_bytes(&mut self, guid: ObjectGuid, order: &[u8]) {
        for &index in order {
            self.write_byte_seq(guid, index);
        }
    }

    /// Write byte `index` of `guid` if it is non-zero.
    pub fn write_byte_seq(&mut self, guid: ObjectGuid, index: u8) {
        let value = guid.byte(index);
        if value != 0 {
            self.write_u8(value);
        }
    }

    pub fn read_guid_mask(&mut self, guid: &mut PackedGuid, order: &[u8]) -> Result<()> {
        for &index in order {
            guid.set_present(index, self.read_bit()?);
        }
        Ok(())
    }

    pub fn read_guid_bytes(&mut self, guid: &mut PackedGuid, order: &[u8]) -> Result<()> {
        for &index in order {
            self.read_byte_seq(guid, index)?;
        }
        Ok(())
    }

    /// Read byte `index` into `guid` if its presence bit was set.
    pub fn read_byte_seq(&mut self, guid: &mut PackedGuid, index: u8) -> Result<()> {
        if guid.is_present(index) {
            let value = self.read_u8()?;
            guid.set_byte(index, value);
        }
        Ok(())
    }

    /// Presence bits for several identifiers interleaved step by step.
    pub fn write_interleaved_mask(&mut self, guids: &[ObjectGuid], steps: &[GuidStep]) {
        for &(slot, index) in steps {
            self.write_bit(guids[slot].byte(index) != 0);
        }
    }

    /// Bytes for several identifiers interleaved step by step.
    pub fn write_interleaved_bytes(&mut self, guids: &[ObjectGuid], steps: &[GuidStep]) {
        for &(slot, index) in steps {
            self.write_byte_seq(guids[slot], index);
        }
    }

    pub fn read_interleaved_mask(
        &mut self,
        guids: &mut [PackedGuid],
        steps: &[GuidStep],
    ) -> Result<()> {
        for &(slot, index) in steps {
            let present = self.read_bit()?;
            guids[slot].set_present(index, present);
        }
        Ok(())
    }

    pub fn read_interleaved_bytes(
        &mut self,
        guids: &mut [PackedGuid],
        steps: &[GuidStep],
    ) -> Result<()> {
        for &(slot, index) in steps {
            self.read_byte_seq(&mut guids[slot], index)?;
        }
        Ok(())
    }

    /// Presence bits in `bit_order`, then non-zero bytes in `byte_order`.
    pub fn pack_identifier(&mut self, guid: ObjectGuid, bit_order: &[u8; 8], byte_order: &[u8; 8]) {
        self.write_guid_mask(guid, bit_order);
        self.write_guid_bytes(guid, byte_order);
    }

    /// Mirror of [`pack_identifier`](Self::pack_identifier).
    pub fn unpack_identifier(
        &mut self,
        bit_order: &[u8; 8],
        byte_order: &[u8; 8],
    ) -> Result<ObjectGuid> {
        let mut guid = PackedGuid::new();
        self.read_guid_mask(&mut guid, bit_order)?;
        self.read_guid_bytes(&mut guid, byte_order)?;
        Ok(guid.into_guid())
    }

    /// Canonical packed form, always byte aligned.
    pub fn write_packed_guid(&mut self, guid: ObjectGuid) {
        self.flush_bits();
        self.pack_identifier(guid, &CANONICAL_MASK_ORDER, &CANONICAL_BYTE_ORDER);
    }

    pub fn read_packed_guid(&mut self) -> Result<ObjectGuid> {
        self.reset_bit_reader();
        self.unpack_identifier(&CANONICAL_MASK_ORDER, &CANONICAL_BYTE_ORDER)
    }

    /// Full 8-byte form.
    pub fn write_guid(&mut self, guid: ObjectGuid) {
        self.write_u64(guid.raw());
    }

    pub fn read_guid(&mut self) -> Result<ObjectGuid> {
        self.read_u64().map(ObjectGuid::new)
    }
}
