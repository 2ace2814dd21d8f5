//! Inbound cast requests.
//!
//! ```text
//! CastSpell: u8 cast id, u32 spell id, <tail>
//! UseItem:   u8 pack slot, u8 slot, u8 cast id, u32 spell id, guid item, <tail>
//! tail:      u32 misc, u8 send flags, target data,
//!            [HAS_TRAJECTORY: f32 pitch, f32 speed, u8 has movement, movement?]
//!            [HAS_WEIGHT: u32 count, count x (u8 type, u32 id, u32 quantity)]
//! ```

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::core::guid::ObjectGuid;
use crate::core::optional::read_if;
use crate::error::Result;
use crate::protocol::layout::cast_request_flags;
use crate::protocol::movement::MovementStatus;
use crate::protocol::spells::target::SpellTargetData;
use crate::protocol::spells::{read_u32_list, write_u32_list};

/// Encoded size of one weight entry.
const SPELL_WEIGHT_SIZE: usize = 9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissileTrajectoryRequest {
    pub pitch: f32,
    pub speed: f32,
    /// Mover state at release, when the client sends one.
    pub move_update: Option<MovementStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellWeight {
    pub kind: u8,
    pub id: u32,
    pub quantity: u32,
}

/// Body of a cast request, shared by spell casts and item use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellCastRequest {
    pub cast_id: u8,
    pub spell_id: u32,
    pub misc: u32,
    pub send_cast_flags: u8,
    pub target: SpellTargetData,
    pub trajectory: Option<MissileTrajectoryRequest>,
    pub weight: Option<Vec<SpellWeight>>,
}

impl SpellCastRequest {
    /// `send_cast_flags` with the trajectory and weight bits matching the
    /// populated sections.
    pub fn wire_flags(&self) -> u8 {
        let mut flags = self.send_cast_flags
            & !(cast_request_flags::HAS_TRAJECTORY | cast_request_flags::HAS_WEIGHT);
        if self.trajectory.is_some() {
            flags |= cast_request_flags::HAS_TRAJECTORY;
        }
        if self.weight.is_some() {
            flags |= cast_request_flags::HAS_WEIGHT;
        }
        flags
    }

    /// Copy with every flag field replaced by its wire value.
    pub fn normalized(mut self) -> Self {
        self.send_cast_flags = self.wire_flags();
        self.target = self.target.normalized();
        self
    }

    /// Everything after the spell id.
    fn write_tail(&self, buf: &mut WireBuffer) {
        buf.write_u32(self.misc);
        buf.write_u8(self.wire_flags());
        self.target.write(buf);

        if let Some(trajectory) = &self.trajectory {
            buf.write_f32(trajectory.pitch);
            buf.write_f32(trajectory.speed);
            buf.write_bool(trajectory.move_update.is_some());
            if let Some(status) = &trajectory.move_update {
                status.write(buf);
            }
        }

        if let Some(weight) = &self.weight {
            write_u32_list(buf, weight, "spell weight", |b, entry| {
                b.write_u8(entry.kind);
                b.write_u32(entry.id);
                b.write_u32(entry.quantity);
            });
        }
    }

    fn read_tail(buf: &mut WireBuffer, cast_id: u8, spell_id: u32) -> Result<Self> {
        let misc = buf.read_u32()?;
        let send_cast_flags = buf.read_u8()?;
        let target = SpellTargetData::read(buf)?;

        let trajectory = read_if(
            buf,
            send_cast_flags & cast_request_flags::HAS_TRAJECTORY != 0,
            |b| {
                let pitch = b.read_f32()?;
                let speed = b.read_f32()?;
                // Any non-zero byte announces a movement block.
                let has_movement = b.read_bool()?;
                let move_update = read_if(b, has_movement, MovementStatus::read)?;
                Ok(MissileTrajectoryRequest {
                    pitch,
                    speed,
                    move_update,
                })
            },
        )?;

        let weight = read_if(
            buf,
            send_cast_flags & cast_request_flags::HAS_WEIGHT != 0,
            |b| {
                read_u32_list(b, SPELL_WEIGHT_SIZE, |b| {
                    Ok(SpellWeight {
                        kind: b.read_u8()?,
                        id: b.read_u32()?,
                        quantity: b.read_u32()?,
                    })
                })
            },
        )?;

        Ok(Self {
            cast_id,
            spell_id,
            misc,
            send_cast_flags,
            target,
            trajectory,
            weight,
        })
    }
}

impl WireCodec for SpellCastRequest {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u8(self.cast_id);
        buf.write_u32(self.spell_id);
        self.write_tail(buf);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let cast_id = buf.read_u8()?;
        let spell_id = buf.read_u32()?;
        Self::read_tail(buf, cast_id, spell_id)
    }
}

/// Cast triggered by using an item. The cast item sits between the spell id
/// and the rest of the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UseItem {
    pub pack_slot: u8,
    pub slot: u8,
    pub cast_item: ObjectGuid,
    pub cast: SpellCastRequest,
}

impl WireCodec for UseItem {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u8(self.pack_slot);
        buf.write_u8(self.slot);
        buf.write_u8(self.cast.cast_id);
        buf.write_u32(self.cast.spell_id);
        buf.write_guid(self.cast_item);
        self.cast.write_tail(buf);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let pack_slot = buf.read_u8()?;
        let slot = buf.read_u8()?;
        let cast_id = buf.read_u8()?;
        let spell_id = buf.read_u32()?;
        let cast_item = buf.read_guid()?;
        let cast = SpellCastRequest::read_tail(buf, cast_id, spell_id)?;
        Ok(Self {
            pack_slot,
            slot,
            cast_item,
            cast,
        })
    }
}
