//! Spellbook state: known and unlearned spells, cooldowns and modifiers.

use crate::core::buffer::{field_max, WireBuffer};
use crate::core::codec::WireCodec;
use crate::error::Result;
use crate::protocol::layout::{CATEGORY_COOLDOWN_COUNT_BITS, MAX_KNOWN_SPELLS};
use crate::protocol::spells::{clamp_list, read_counted, read_u32_list, write_u32_list};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCooldownInfo {
    pub category: u32,
    pub mod_cooldown: i32,
}

/// Category cooldown modifiers.
///
/// ```text
/// bits(23) count, flush, count x (u32 category, i32 mod cooldown)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCooldown {
    pub cooldowns: Vec<CategoryCooldownInfo>,
}

impl WireCodec for CategoryCooldown {
    fn write(&self, buf: &mut WireBuffer) {
        let max = field_max(CATEGORY_COOLDOWN_COUNT_BITS) as usize;
        let cooldowns = clamp_list(&self.cooldowns, max, "category cooldowns");
        buf.write_bits(cooldowns.len() as u32, CATEGORY_COOLDOWN_COUNT_BITS);
        buf.flush_bits();
        for cooldown in cooldowns {
            buf.write_u32(cooldown.category);
            buf.write_i32(cooldown.mod_cooldown);
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let count = buf.read_bits(CATEGORY_COOLDOWN_COUNT_BITS)? as usize;
        buf.reset_bit_reader();
        let cooldowns = read_counted(buf, count, 8, |b| {
            Ok(CategoryCooldownInfo {
                category: b.read_u32()?,
                mod_cooldown: b.read_i32()?,
            })
        })?;
        Ok(Self { cooldowns })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellHistoryEntry {
    pub spell_id: u32,
    pub item_id: u32,
    pub category: u16,
    pub recovery_time: i32,
    pub category_recovery_time: i32,
}

/// Full spellbook sent at login or after a reset.
///
/// ```text
/// u8 initial login, u16 count, count x (u32 spell, i16 slot = 0),
/// u16 count, count x (u32 spell, u32 item, u16 category, i32 recovery,
///                     i32 category recovery)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendKnownSpells {
    pub initial_login: bool,
    pub known_spells: Vec<u32>,
    pub history: Vec<SpellHistoryEntry>,
}

impl WireCodec for SendKnownSpells {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_bool(self.initial_login);

        let spells = clamp_list(&self.known_spells, MAX_KNOWN_SPELLS, "known spells");
        buf.write_u16(spells.len() as u16);
        for &spell_id in spells {
            buf.write_u32(spell_id);
            buf.write_i16(0);
        }

        let history = clamp_list(&self.history, MAX_KNOWN_SPELLS, "spell history");
        buf.write_u16(history.len() as u16);
        for entry in history {
            buf.write_u32(entry.spell_id);
            buf.write_u32(entry.item_id);
            buf.write_u16(entry.category);
            buf.write_i32(entry.recovery_time);
            buf.write_i32(entry.category_recovery_time);
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let initial_login = buf.read_bool()?;

        let count = buf.read_u16()? as usize;
        let known_spells = read_counted(buf, count, 6, |b| {
            let spell_id = b.read_u32()?;
            b.read_i16()?;
            Ok(spell_id)
        })?;

        let count = buf.read_u16()? as usize;
        let history = read_counted(buf, count, 18, |b| {
            Ok(SpellHistoryEntry {
                spell_id: b.read_u32()?,
                item_id: b.read_u32()?,
                category: b.read_u16()?,
                recovery_time: b.read_i32()?,
                category_recovery_time: b.read_i32()?,
            })
        })?;

        Ok(Self {
            initial_login,
            known_spells,
            history,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendUnlearnSpells {
    pub spells: Vec<u32>,
}

impl WireCodec for SendUnlearnSpells {
    fn write(&self, buf: &mut WireBuffer) {
        write_u32_list(buf, &self.spells, "unlearned spells", |b, &id| b.write_u32(id));
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let spells = read_u32_list(buf, 4, |b| b.read_u32())?;
        Ok(Self { spells })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnlearnedSpells {
    pub spell_id: u32,
}

impl WireCodec for UnlearnedSpells {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u32(self.spell_id);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        Ok(Self {
            spell_id: buf.read_u32()?,
        })
    }
}

/// A rank replaced an older one in the spellbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupercededSpells {
    pub spell_id: i32,
    pub superceded: i32,
}

impl WireCodec for SupercededSpells {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_i32(self.spell_id);
        buf.write_i32(self.superceded);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        Ok(Self {
            spell_id: buf.read_i32()?,
            superceded: buf.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpellModifierData {
    pub class_index: u8,
    pub value: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellModifier {
    pub mod_index: u8,
    pub data: Vec<SpellModifierData>,
}

/// Flat or percentage spell modifiers; both use this body.
///
/// ```text
/// u32 count, count x (u32 data count, u8 mod index, data x (u8 class, f32 value))
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetSpellModifier {
    pub modifiers: Vec<SpellModifier>,
}

impl WireCodec for SetSpellModifier {
    fn write(&self, buf: &mut WireBuffer) {
        write_u32_list(buf, &self.modifiers, "spell modifiers", |b, modifier| {
            let data = clamp_list(&modifier.data, u32::MAX as usize, "spell modifier data");
            b.write_u32(data.len() as u32);
            b.write_u8(modifier.mod_index);
            for entry in data {
                b.write_u8(entry.class_index);
                b.write_f32(entry.value);
            }
        });
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let modifiers = read_u32_list(buf, 5, |b| {
            let count = b.read_u32()? as usize;
            let mod_index = b.read_u8()?;
            let data = read_counted(b, count, 5, |b| {
                Ok(SpellModifierData {
                    class_index: b.read_u8()?,
                    value: b.read_f32()?,
                })
            })?;
            Ok(SpellModifier { mod_index, data })
        })?;
        Ok(Self { modifiers })
    }
}
