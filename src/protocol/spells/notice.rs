//! Small one-shot notices: failures, delays, mount results, resurrect offers
//! and action bar updates.

use crate::core::buffer::{cstring_content, WireBuffer};
use crate::core::codec::WireCodec;
use crate::core::guid::ObjectGuid;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::layout::MAX_ACTION_BUTTONS;

/// Cast failed. Sent to the caster and, as "failed other", to observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellFailure {
    pub caster_unit: ObjectGuid,
    pub cast_id: u8,
    pub spell_id: i32,
    pub reason: u8,
}

impl WireCodec for SpellFailure {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_packed_guid(self.caster_unit);
        buf.write_u8(self.cast_id);
        buf.write_i32(self.spell_id);
        buf.write_u8(self.reason);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        Ok(Self {
            caster_unit: buf.read_packed_guid()?,
            cast_id: buf.read_u8()?,
            spell_id: buf.read_i32()?,
            reason: buf.read_u8()?,
        })
    }
}

/// Cast was pushed back by the given number of milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellDelayed {
    pub caster: ObjectGuid,
    pub actual_delay: i32,
}

impl WireCodec for SpellDelayed {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_packed_guid(self.caster);
        buf.write_i32(self.actual_delay);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        Ok(Self {
            caster: buf.read_packed_guid()?,
            actual_delay: buf.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountResult {
    pub result: i32,
}

impl WireCodec for MountResult {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_i32(self.result);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        Ok(Self {
            result: buf.read_i32()?,
        })
    }
}

/// Offer to resurrect the receiver.
///
/// ```text
/// guid offerer, u32 name length + 1, cstring name, u8 sickness, u8 use timer,
/// i32 spell id
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResurrectRequest {
    pub offerer: ObjectGuid,
    pub name: String,
    pub sickness: bool,
    pub use_timer: bool,
    pub spell_id: i32,
}

impl WireCodec for ResurrectRequest {
    fn write(&self, buf: &mut WireBuffer) {
        let name = cstring_content(&self.name);
        buf.write_guid(self.offerer);
        buf.write_u32(name.len() as u32 + 1);
        buf.write_cstring(name);
        buf.write_bool(self.sickness);
        buf.write_bool(self.use_timer);
        buf.write_i32(self.spell_id);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let offerer = buf.read_guid()?;
        let declared = buf.read_u32()? as usize;
        let name = buf.read_cstring()?;
        if declared != name.len() + 1 {
            return Err(ProtocolError::Malformed(
                constants::ERR_NAME_LENGTH_MISMATCH.to_string(),
            ));
        }
        Ok(Self {
            offerer,
            name,
            sickness: buf.read_bool()?,
            use_timer: buf.read_bool()?,
            spell_id: buf.read_i32()?,
        })
    }
}

/// Whole action bar: one packed `u32` per slot, then the update reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateActionButtons {
    pub buttons: [u32; MAX_ACTION_BUTTONS],
    pub reason: u8,
}

impl Default for UpdateActionButtons {
    fn default() -> Self {
        Self {
            buttons: [0; MAX_ACTION_BUTTONS],
            reason: 0,
        }
    }
}

impl WireCodec for UpdateActionButtons {
    fn write(&self, buf: &mut WireBuffer) {
        for &button in &self.buttons {
            buf.write_u32(button);
        }
        buf.write_u8(self.reason);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        buf.ensure_count(MAX_ACTION_BUTTONS, 4)?;
        let mut buttons = [0u32; MAX_ACTION_BUTTONS];
        for button in buttons.iter_mut() {
            *button = buf.read_u32()?;
        }
        let reason = buf.read_u8()?;
        Ok(Self { buttons, reason })
    }
}
