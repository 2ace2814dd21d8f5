//! # Aura Updates
//!
//! An aura update names a unit and then lists auras until the payload ends;
//! there is no count. Each entry is a slot and a spell id, and a spell id of
//! zero or less means the slot was cleared and nothing else follows.
//!
//! ```text
//! packed unit
//! repeat: u8 slot, i32 spell id,
//!         [spell id > 0: u16 flags, u8 cast level, u8 applications,
//!                        [!NOCASTER packed caster],
//!                        [DURATION i32 duration, i32 remaining],
//!                        [ANY_EFFECT_AMOUNT_SENT: i32 points for each EFF_INDEX_i set]]
//! ```

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::core::guid::{ObjectGuid, PackedGuid};
use crate::core::optional::read_if;
use crate::error::Result;
use crate::protocol::layout::{
    aura_flags, AURA_POINTS_DEPLETED_BYTES_A, AURA_POINTS_DEPLETED_BYTES_B,
    AURA_POINTS_DEPLETED_BYTES_C, AURA_POINTS_DEPLETED_MASK, MAX_AURA_EFFECTS,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuraDuration {
    pub duration: i32,
    pub remaining: i32,
}

/// Live aura in a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuraDataInfo {
    /// Must be positive; an entry with no data is sent as spell id 0.
    pub spell_id: i32,
    pub flags: u16,
    pub cast_level: u8,
    pub applications: u8,
    pub cast_unit: Option<ObjectGuid>,
    pub duration: Option<AuraDuration>,
    pub points: [Option<i32>; MAX_AURA_EFFECTS],
}

impl AuraDataInfo {
    /// Flags with NOCASTER, DURATION and the effect amount bits matching the
    /// populated fields. Effect index bits are left alone when no amount is
    /// sent.
    pub fn wire_flags(&self) -> u16 {
        let mut flags = self.flags;
        set_flag(&mut flags, aura_flags::NOCASTER, self.cast_unit.is_none());
        set_flag(&mut flags, aura_flags::DURATION, self.duration.is_some());

        let any_points = self.points.iter().any(Option::is_some);
        set_flag(&mut flags, aura_flags::ANY_EFFECT_AMOUNT_SENT, any_points);
        if any_points {
            for (index, points) in self.points.iter().enumerate() {
                set_flag(&mut flags, 1 << index, points.is_some());
            }
        }
        flags
    }

    pub fn normalized(mut self) -> Self {
        self.flags = self.wire_flags();
        self
    }

    fn write_after_spell_id(&self, buf: &mut WireBuffer) {
        buf.write_u16(self.wire_flags());
        buf.write_u8(self.cast_level);
        buf.write_u8(self.applications);
        if let Some(caster) = self.cast_unit {
            buf.write_packed_guid(caster);
        }
        if let Some(duration) = &self.duration {
            buf.write_i32(duration.duration);
            buf.write_i32(duration.remaining);
        }
        for points in self.points.iter().flatten() {
            buf.write_i32(*points);
        }
    }

    fn read_after_spell_id(buf: &mut WireBuffer, spell_id: i32) -> Result<Self> {
        let flags = buf.read_u16()?;
        let cast_level = buf.read_u8()?;
        let applications = buf.read_u8()?;
        let cast_unit = read_if(buf, flags & aura_flags::NOCASTER == 0, |b| {
            b.read_packed_guid()
        })?;
        let duration = read_if(buf, flags & aura_flags::DURATION != 0, |b| {
            Ok(AuraDuration {
                duration: b.read_i32()?,
                remaining: b.read_i32()?,
            })
        })?;

        let amounts_sent = flags & aura_flags::ANY_EFFECT_AMOUNT_SENT != 0;
        let mut points = [None; MAX_AURA_EFFECTS];
        for (index, slot) in points.iter_mut().enumerate() {
            *slot = read_if(buf, amounts_sent && flags & (1 << index) != 0, |b| {
                b.read_i32()
            })?;
        }

        Ok(Self {
            spell_id,
            flags,
            cast_level,
            applications,
            cast_unit,
            duration,
            points,
        })
    }
}

fn set_flag(flags: &mut u16, bit: u16, on: bool) {
    if on {
        *flags |= bit;
    } else {
        *flags &= !bit;
    }
}

/// One slot of an aura update. `data` is `None` when the slot was cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuraInfo {
    pub slot: u8,
    pub data: Option<AuraDataInfo>,
}

impl WireCodec for AuraInfo {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u8(self.slot);
        match &self.data {
            Some(data) if data.spell_id > 0 => {
                buf.write_i32(data.spell_id);
                data.write_after_spell_id(buf);
            }
            _ => buf.write_i32(0),
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let slot = buf.read_u8()?;
        let spell_id = buf.read_i32()?;
        let data = if spell_id > 0 {
            Some(AuraDataInfo::read_after_spell_id(buf, spell_id)?)
        } else {
            None
        };
        Ok(Self { slot, data })
    }
}

/// Body of both the incremental and the full aura update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuraUpdate {
    pub unit: ObjectGuid,
    pub auras: Vec<AuraInfo>,
}

impl WireCodec for AuraUpdate {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_packed_guid(self.unit);
        for aura in &self.auras {
            aura.write(buf);
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let unit = buf.read_packed_guid()?;
        let mut auras = Vec::new();
        while !buf.is_exhausted() {
            auras.push(AuraInfo::read(buf)?);
        }
        Ok(Self { unit, auras })
    }
}

/// An absorb or similar effect of an aura ran out of points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuraPointsDepleted {
    pub unit: ObjectGuid,
    pub slot: u8,
    pub effect_index: u8,
}

impl WireCodec for AuraPointsDepleted {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_guid_mask(self.unit, &AURA_POINTS_DEPLETED_MASK);
        buf.write_guid_bytes(self.unit, &AURA_POINTS_DEPLETED_BYTES_A);
        buf.write_u8(self.effect_index);
        buf.write_guid_bytes(self.unit, &AURA_POINTS_DEPLETED_BYTES_B);
        buf.write_u8(self.slot);
        buf.write_guid_bytes(self.unit, &AURA_POINTS_DEPLETED_BYTES_C);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let mut unit = PackedGuid::new();
        buf.read_guid_mask(&mut unit, &AURA_POINTS_DEPLETED_MASK)?;
        buf.read_guid_bytes(&mut unit, &AURA_POINTS_DEPLETED_BYTES_A)?;
        let effect_index = buf.read_u8()?;
        buf.read_guid_bytes(&mut unit, &AURA_POINTS_DEPLETED_BYTES_B)?;
        let slot = buf.read_u8()?;
        buf.read_guid_bytes(&mut unit, &AURA_POINTS_DEPLETED_BYTES_C)?;
        Ok(Self {
            unit: unit.into_guid(),
            slot,
            effect_index,
        })
    }
}
