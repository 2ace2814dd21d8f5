//! Rune resource updates.

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::error::Result;
use crate::protocol::spells::{read_u32_list, write_u32_list};

/// A rune slot changed type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertRune {
    pub index: u8,
    pub rune: u8,
}

impl WireCodec for ConvertRune {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u8(self.index);
        buf.write_u8(self.rune);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        Ok(Self {
            index: buf.read_u8()?,
            rune: buf.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResyncRune {
    pub rune_type: u8,
    pub cooldown: u8,
}

/// Full rune state: `u32` count, then (type, cooldown) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncRunes {
    pub runes: Vec<ResyncRune>,
}

impl WireCodec for ResyncRunes {
    fn write(&self, buf: &mut WireBuffer) {
        write_u32_list(buf, &self.runes, "resync runes", |b, rune| {
            b.write_u8(rune.rune_type);
            b.write_u8(rune.cooldown);
        });
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let runes = read_u32_list(buf, 2, |b| {
            Ok(ResyncRune {
                rune_type: b.read_u8()?,
                cooldown: b.read_u8()?,
            })
        })?;
        Ok(Self { runes })
    }
}

/// Runes refilled, one bit per rune slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddRunePower {
    pub added_runes_mask: u32,
}

impl WireCodec for AddRunePower {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u32(self.added_runes_mask);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        Ok(Self {
            added_runes_mask: buf.read_u32()?,
        })
    }
}
