//! # Visual Effects
//!
//! Layouts in this module predate the canonical packed form: identifiers are
//! sent as scrambled presence bits and bytes, interleaved with other fields.
//! Every order comes from [`crate::protocol::layout`].

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::core::guid::{ObjectGuid, PackedGuid};
use crate::error::Result;
use crate::protocol::geometry::Position;
use crate::protocol::layout::{
    MISSILE_CANCEL_BYTES_A, MISSILE_CANCEL_BYTES_B, MISSILE_CANCEL_MASK_A, MISSILE_CANCEL_MASK_B,
    PLAY_SPELL_VISUAL_BYTES, PLAY_SPELL_VISUAL_KIT_BYTES, PLAY_SPELL_VISUAL_KIT_MASK,
    PLAY_SPELL_VISUAL_MASK_A, PLAY_SPELL_VISUAL_MASK_B, VISUAL_SOURCE, VISUAL_TARGET,
};

/// Visual played from a source towards a target.
///
/// ```text
/// f32 z, i32 visual, u16 miss reason, f32 o, f32 x, u16 reflect status, f32 y,
/// bits (mask A), bit speed-as-time, bits (mask B), flush, bytes
/// ```
///
/// Byte 0 of the target has no presence bit but is still sent when non-zero.
/// The reader takes it as present when the body holds one byte more than the
/// mask announces, so the body has to end where the message ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaySpellVisual {
    pub source: ObjectGuid,
    pub target: ObjectGuid,
    pub target_position: Position,
    pub spell_visual_id: i32,
    pub miss_reason: u16,
    pub reflect_status: u16,
    pub speed_as_time: bool,
}

impl WireCodec for PlaySpellVisual {
    fn write(&self, buf: &mut WireBuffer) {
        let mut guids = [ObjectGuid::EMPTY; 2];
        guids[VISUAL_SOURCE] = self.source;
        guids[VISUAL_TARGET] = self.target;

        buf.write_f32(self.target_position.z);
        buf.write_i32(self.spell_visual_id);
        buf.write_u16(self.miss_reason);
        buf.write_f32(self.target_position.orientation);
        buf.write_f32(self.target_position.x);
        buf.write_u16(self.reflect_status);
        buf.write_f32(self.target_position.y);

        buf.write_interleaved_mask(&guids, &PLAY_SPELL_VISUAL_MASK_A);
        buf.write_bit(self.speed_as_time);
        buf.write_interleaved_mask(&guids, &PLAY_SPELL_VISUAL_MASK_B);
        buf.flush_bits();
        buf.write_interleaved_bytes(&guids, &PLAY_SPELL_VISUAL_BYTES);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let z = buf.read_f32()?;
        let spell_visual_id = buf.read_i32()?;
        let miss_reason = buf.read_u16()?;
        let orientation = buf.read_f32()?;
        let x = buf.read_f32()?;
        let reflect_status = buf.read_u16()?;
        let y = buf.read_f32()?;

        let mut guids = [PackedGuid::new(); 2];
        buf.read_interleaved_mask(&mut guids, &PLAY_SPELL_VISUAL_MASK_A)?;
        let speed_as_time = buf.read_bit()?;
        buf.read_interleaved_mask(&mut guids, &PLAY_SPELL_VISUAL_MASK_B)?;
        let announced: usize = guids.iter().map(PackedGuid::present_count).sum();
        guids[VISUAL_TARGET].set_present(0, buf.remaining() > announced);
        buf.read_interleaved_bytes(&mut guids, &PLAY_SPELL_VISUAL_BYTES)?;

        Ok(Self {
            source: guids[VISUAL_SOURCE].into_guid(),
            target: guids[VISUAL_TARGET].into_guid(),
            target_position: Position::new(x, y, z, orientation),
            spell_visual_id,
            miss_reason,
            reflect_status,
            speed_as_time,
        })
    }
}

/// Visual kit played on a unit.
///
/// ```text
/// u32 duration, i32 kit rec id, i32 kit type, unit bits, unit bytes
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaySpellVisualKit {
    pub unit: ObjectGuid,
    pub duration: u32,
    pub kit_rec_id: i32,
    pub kit_type: i32,
}

impl WireCodec for PlaySpellVisualKit {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u32(self.duration);
        buf.write_i32(self.kit_rec_id);
        buf.write_i32(self.kit_type);
        buf.pack_identifier(
            self.unit,
            &PLAY_SPELL_VISUAL_KIT_MASK,
            &PLAY_SPELL_VISUAL_KIT_BYTES,
        );
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let duration = buf.read_u32()?;
        let kit_rec_id = buf.read_i32()?;
        let kit_type = buf.read_i32()?;
        let unit = buf.unpack_identifier(&PLAY_SPELL_VISUAL_KIT_MASK, &PLAY_SPELL_VISUAL_KIT_BYTES)?;
        Ok(Self {
            unit,
            duration,
            kit_rec_id,
            kit_type,
        })
    }
}

/// Missile in flight was cancelled.
///
/// ```text
/// owner bits 7,2,4,6, bit reverse, owner bits 1,0,3,5, flush,
/// owner bytes 6,1,4,2,5,7, u32 spell id, owner bytes 0,3
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissileCancel {
    pub owner: ObjectGuid,
    pub reverse: bool,
    pub spell_id: u32,
}

impl WireCodec for MissileCancel {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_guid_mask(self.owner, &MISSILE_CANCEL_MASK_A);
        buf.write_bit(self.reverse);
        buf.write_guid_mask(self.owner, &MISSILE_CANCEL_MASK_B);
        buf.flush_bits();
        buf.write_guid_bytes(self.owner, &MISSILE_CANCEL_BYTES_A);
        buf.write_u32(self.spell_id);
        buf.write_guid_bytes(self.owner, &MISSILE_CANCEL_BYTES_B);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let mut owner = PackedGuid::new();
        buf.read_guid_mask(&mut owner, &MISSILE_CANCEL_MASK_A)?;
        let reverse = buf.read_bit()?;
        buf.read_guid_mask(&mut owner, &MISSILE_CANCEL_MASK_B)?;
        buf.read_guid_bytes(&mut owner, &MISSILE_CANCEL_BYTES_A)?;
        let spell_id = buf.read_u32()?;
        buf.read_guid_bytes(&mut owner, &MISSILE_CANCEL_BYTES_B)?;
        Ok(Self {
            owner: owner.into_guid(),
            reverse,
            spell_id,
        })
    }
}
