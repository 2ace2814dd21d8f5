//! # Cast Results
//!
//! Cast start and cast go share one body. Go additionally carries the hit
//! and miss lists between the cast time and the target data.
//!
//! ```text
//! packed caster, packed caster unit, u8 cast id, u32 spell id,
//! u32 cast flags, u32 cast flags ex, u32 cast time,
//! [go only: u8 hits, hits x guid, u8 misses, misses x (guid, u8 reason, [u8 reflect])]
//! target data,
//! [POWER_LEFT_SELF  u32 remaining power]
//! [RUNE_LIST        u8 start, u8 count, 6 x u8 cooldown]
//! [ADJUST_MISSILE   f32 pitch, i32 travel time]
//! [PROJECTILE       i32 display id, i32 inventory type]
//! [VISUAL_CHAIN     i32, i32]
//! [target has destination: u8 cast index]
//! [IMMUNITY         i32 school, i32 value]
//! [HEAL_PREDICTION  i32 points, u8 type, [packed beacon]]
//! ```
//!
//! The section bits of `cast_flags` are recomputed from the populated
//! sections on encode; every other bit is sent as given.

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::core::guid::ObjectGuid;
use crate::core::optional::read_if;
use crate::error::{ProtocolError, Result};
use crate::protocol::layout::{
    cast_flags, HEAL_PREDICTION_TARGET_AND_BEACON, MAX_RUNES, MAX_TARGET_LIST, SPELL_MISS_REFLECT,
};
use crate::protocol::spells::target::SpellTargetData;
use crate::protocol::spells::{clamp_list, read_counted};

/// Why a target was not hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellMissReason {
    None,
    Miss,
    Resist,
    Dodge,
    Parry,
    Block,
    Evade,
    Immune,
    Immune2,
    Deflect,
    Absorb,
    /// Reflected, with the outcome of the reflected cast.
    Reflect { status: u8 },
}

impl SpellMissReason {
    pub fn code(self) -> u8 {
        match self {
            SpellMissReason::None => 0,
            SpellMissReason::Miss => 1,
            SpellMissReason::Resist => 2,
            SpellMissReason::Dodge => 3,
            SpellMissReason::Parry => 4,
            SpellMissReason::Block => 5,
            SpellMissReason::Evade => 6,
            SpellMissReason::Immune => 7,
            SpellMissReason::Immune2 => 8,
            SpellMissReason::Deflect => 9,
            SpellMissReason::Absorb => 10,
            SpellMissReason::Reflect { .. } => SPELL_MISS_REFLECT,
        }
    }
}

impl WireCodec for SpellMissReason {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u8(self.code());
        if let SpellMissReason::Reflect { status } = self {
            buf.write_u8(*status);
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let reason = match buf.read_u8()? {
            0 => SpellMissReason::None,
            1 => SpellMissReason::Miss,
            2 => SpellMissReason::Resist,
            3 => SpellMissReason::Dodge,
            4 => SpellMissReason::Parry,
            5 => SpellMissReason::Block,
            6 => SpellMissReason::Evade,
            7 => SpellMissReason::Immune,
            8 => SpellMissReason::Immune2,
            9 => SpellMissReason::Deflect,
            10 => SpellMissReason::Absorb,
            SPELL_MISS_REFLECT => SpellMissReason::Reflect {
                status: buf.read_u8()?,
            },
            value => {
                return Err(ProtocolError::InvalidDiscriminant {
                    field: "spell miss reason",
                    value: u32::from(value),
                })
            }
        };
        Ok(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellMissStatus {
    pub target: ObjectGuid,
    pub reason: SpellMissReason,
}

/// Hit and miss lists of a cast go. Each list holds at most 255 entries on
/// the wire; longer lists are cut to their first 255 entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellHitInfo {
    pub hit_targets: Vec<ObjectGuid>,
    pub miss_status: Vec<SpellMissStatus>,
}

impl WireCodec for SpellHitInfo {
    fn write(&self, buf: &mut WireBuffer) {
        let hits = clamp_list(&self.hit_targets, MAX_TARGET_LIST, "hit targets");
        buf.write_u8(hits.len() as u8);
        for &target in hits {
            buf.write_guid(target);
        }

        let misses = clamp_list(&self.miss_status, MAX_TARGET_LIST, "miss targets");
        buf.write_u8(misses.len() as u8);
        for miss in misses {
            buf.write_guid(miss.target);
            miss.reason.write(buf);
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let hit_count = buf.read_u8()? as usize;
        let hit_targets = read_counted(buf, hit_count, 8, |b| b.read_guid())?;

        let miss_count = buf.read_u8()? as usize;
        let miss_status = read_counted(buf, miss_count, 9, |b| {
            Ok(SpellMissStatus {
                target: b.read_guid()?,
                reason: SpellMissReason::read(b)?,
            })
        })?;

        Ok(Self {
            hit_targets,
            miss_status,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuneData {
    pub start: u8,
    pub count: u8,
    pub cooldowns: [u8; MAX_RUNES],
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MissileTrajectoryResult {
    pub pitch: f32,
    pub travel_time: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellAmmo {
    pub display_id: i32,
    pub inventory_type: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatureImmunities {
    pub school: i32,
    pub value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealPredictionKind {
    Target,
    TargetAndCaster,
    TargetAndBeacon(ObjectGuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellHealPrediction {
    pub points: i32,
    pub kind: HealPredictionKind,
}

impl WireCodec for SpellHealPrediction {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_i32(self.points);
        match self.kind {
            HealPredictionKind::Target => buf.write_u8(0),
            HealPredictionKind::TargetAndCaster => buf.write_u8(1),
            HealPredictionKind::TargetAndBeacon(beacon) => {
                buf.write_u8(HEAL_PREDICTION_TARGET_AND_BEACON);
                buf.write_packed_guid(beacon);
            }
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let points = buf.read_i32()?;
        let kind = match buf.read_u8()? {
            0 => HealPredictionKind::Target,
            1 => HealPredictionKind::TargetAndCaster,
            HEAL_PREDICTION_TARGET_AND_BEACON => {
                HealPredictionKind::TargetAndBeacon(buf.read_packed_guid()?)
            }
            value => {
                return Err(ProtocolError::InvalidDiscriminant {
                    field: "heal prediction type",
                    value: u32::from(value),
                })
            }
        };
        Ok(Self { points, kind })
    }
}

/// Shared body of cast start and cast go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellCastData {
    pub caster: ObjectGuid,
    pub caster_unit: ObjectGuid,
    pub cast_id: u8,
    pub spell_id: u32,
    pub cast_flags: u32,
    pub cast_flags_ex: u32,
    pub cast_time: u32,
    pub target: SpellTargetData,
    pub remaining_power: Option<u32>,
    pub remaining_runes: Option<RuneData>,
    pub missile_trajectory: Option<MissileTrajectoryResult>,
    pub ammo: Option<SpellAmmo>,
    pub projectile_visual: Option<[i32; 2]>,
    /// Sent only when the target has a destination location; 0 when unset.
    pub dest_loc_spell_cast_index: Option<u8>,
    pub immunities: Option<CreatureImmunities>,
    pub predict: Option<SpellHealPrediction>,
}

impl SpellCastData {
    /// Cast flags with every section bit matching the populated sections.
    pub fn wire_cast_flags(&self) -> u32 {
        let sections = [
            (self.remaining_power.is_some(), cast_flags::POWER_LEFT_SELF),
            (self.remaining_runes.is_some(), cast_flags::RUNE_LIST),
            (self.missile_trajectory.is_some(), cast_flags::ADJUST_MISSILE),
            (self.ammo.is_some(), cast_flags::PROJECTILE),
            (self.projectile_visual.is_some(), cast_flags::VISUAL_CHAIN),
            (self.immunities.is_some(), cast_flags::IMMUNITY),
            (self.predict.is_some(), cast_flags::HEAL_PREDICTION),
        ];
        sections
            .iter()
            .filter(|(present, _)| *present)
            .fold(self.cast_flags & !cast_flags::SECTION_MASK, |flags, (_, bit)| {
                flags | bit
            })
    }

    /// Copy with every flag field replaced by its wire value.
    pub fn normalized(mut self) -> Self {
        self.cast_flags = self.wire_cast_flags();
        self.target = self.target.normalized();
        self.dest_loc_spell_cast_index = if self.target.has_dst_location() {
            Some(self.dest_loc_spell_cast_index.unwrap_or(0))
        } else {
            None
        };
        self
    }

    /// Write the body, with hit lists in between when `hit_info` is given.
    pub fn write_with(&self, buf: &mut WireBuffer, hit_info: Option<&SpellHitInfo>) {
        let flags = self.wire_cast_flags();

        buf.write_packed_guid(self.caster);
        buf.write_packed_guid(self.caster_unit);
        buf.write_u8(self.cast_id);
        buf.write_u32(self.spell_id);
        buf.write_u32(flags);
        buf.write_u32(self.cast_flags_ex);
        buf.write_u32(self.cast_time);

        if let Some(hit_info) = hit_info {
            hit_info.write(buf);
        }

        self.target.write(buf);

        if let Some(power) = self.remaining_power {
            buf.write_u32(power);
        }
        if let Some(runes) = &self.remaining_runes {
            buf.write_u8(runes.start);
            buf.write_u8(runes.count);
            buf.write_bytes(&runes.cooldowns);
        }
        if let Some(trajectory) = &self.missile_trajectory {
            buf.write_f32(trajectory.pitch);
            buf.write_i32(trajectory.travel_time);
        }
        if let Some(ammo) = &self.ammo {
            buf.write_i32(ammo.display_id);
            buf.write_i32(ammo.inventory_type);
        }
        if let Some([first, second]) = self.projectile_visual {
            buf.write_i32(first);
            buf.write_i32(second);
        }
        if self.target.has_dst_location() {
            buf.write_u8(self.dest_loc_spell_cast_index.unwrap_or(0));
        }
        if let Some(immunities) = &self.immunities {
            buf.write_i32(immunities.school);
            buf.write_i32(immunities.value);
        }
        if let Some(predict) = &self.predict {
            predict.write(buf);
        }
    }

    /// Mirror of [`write_with`](Self::write_with).
    pub fn read_with(
        buf: &mut WireBuffer,
        with_hit_info: bool,
    ) -> Result<(Self, Option<SpellHitInfo>)> {
        let caster = buf.read_packed_guid()?;
        let caster_unit = buf.read_packed_guid()?;
        let cast_id = buf.read_u8()?;
        let spell_id = buf.read_u32()?;
        let flags = buf.read_u32()?;
        let cast_flags_ex = buf.read_u32()?;
        let cast_time = buf.read_u32()?;

        let hit_info = read_if(buf, with_hit_info, SpellHitInfo::read)?;
        let target = SpellTargetData::read(buf)?;
        let has = |bit: u32| flags & bit != 0;

        let remaining_power = read_if(buf, has(cast_flags::POWER_LEFT_SELF), |b| b.read_u32())?;
        let remaining_runes = read_if(buf, has(cast_flags::RUNE_LIST), |b| {
            Ok(RuneData {
                start: b.read_u8()?,
                count: b.read_u8()?,
                cooldowns: b.read_array::<MAX_RUNES>()?,
            })
        })?;
        let missile_trajectory = read_if(buf, has(cast_flags::ADJUST_MISSILE), |b| {
            Ok(MissileTrajectoryResult {
                pitch: b.read_f32()?,
                travel_time: b.read_i32()?,
            })
        })?;
        let ammo = read_if(buf, has(cast_flags::PROJECTILE), |b| {
            Ok(SpellAmmo {
                display_id: b.read_i32()?,
                inventory_type: b.read_i32()?,
            })
        })?;
        let projectile_visual = read_if(buf, has(cast_flags::VISUAL_CHAIN), |b| {
            Ok([b.read_i32()?, b.read_i32()?])
        })?;
        let dest_loc_spell_cast_index =
            read_if(buf, target.has_dst_location(), |b| b.read_u8())?;
        let immunities = read_if(buf, has(cast_flags::IMMUNITY), |b| {
            Ok(CreatureImmunities {
                school: b.read_i32()?,
                value: b.read_i32()?,
            })
        })?;
        let predict = read_if(
            buf,
            has(cast_flags::HEAL_PREDICTION),
            SpellHealPrediction::read,
        )?;

        let data = Self {
            caster,
            caster_unit,
            cast_id,
            spell_id,
            cast_flags: flags,
            cast_flags_ex,
            cast_time,
            target,
            remaining_power,
            remaining_runes,
            missile_trajectory,
            ammo,
            projectile_visual,
            dest_loc_spell_cast_index,
            immunities,
            predict,
        };
        Ok((data, hit_info))
    }
}

/// Cast has begun. Carries no hit lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellStart {
    pub cast: SpellCastData,
}

impl WireCodec for SpellStart {
    fn write(&self, buf: &mut WireBuffer) {
        self.cast.write_with(buf, None);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let (cast, _) = SpellCastData::read_with(buf, false)?;
        Ok(Self { cast })
    }
}

/// Cast has landed, with the targets it hit and missed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellGo {
    pub cast: SpellCastData,
    pub hit_info: SpellHitInfo,
}

impl WireCodec for SpellGo {
    fn write(&self, buf: &mut WireBuffer) {
        self.cast.write_with(buf, Some(&self.hit_info));
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let (cast, hit_info) = SpellCastData::read_with(buf, true)?;
        Ok(Self {
            cast,
            hit_info: hit_info.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::protocol::geometry::Vector3;
    use crate::protocol::layout::target_flags;
    use crate::protocol::spells::target::TargetLocation;

    fn base_cast() -> SpellCastData {
        SpellCastData {
            caster: ObjectGuid::new(0x0000_0000_0000_0001),
            caster_unit: ObjectGuid::new(0x0000_0000_0000_0001),
            cast_id: 9,
            spell_id: 116,
            cast_flags: cast_flags::PENDING | cast_flags::HAS_TRAJECTORY,
            cast_flags_ex: 0,
            cast_time: 2500,
            ..Default::default()
        }
    }

    fn every_section() -> SpellCastData {
        SpellCastData {
            target: SpellTargetData {
                flags: target_flags::DEST_LOCATION,
                dst_location: Some(TargetLocation {
                    transport: ObjectGuid::EMPTY,
                    location: Vector3::new(10.0, 20.0, 30.0),
                }),
                ..Default::default()
            },
            remaining_power: Some(4200),
            remaining_runes: Some(RuneData {
                start: 0x3F,
                count: 0x3C,
                cooldowns: [0, 0, 255, 128, 0, 64],
            }),
            missile_trajectory: Some(MissileTrajectoryResult {
                pitch: 0.5,
                travel_time: 900,
            }),
            ammo: Some(SpellAmmo {
                display_id: 5996,
                inventory_type: 24,
            }),
            projectile_visual: Some([1, 2]),
            dest_loc_spell_cast_index: Some(4),
            immunities: Some(CreatureImmunities {
                school: 0x7F,
                value: 1,
            }),
            predict: Some(SpellHealPrediction {
                points: 1500,
                kind: HealPredictionKind::TargetAndBeacon(ObjectGuid::new(0x0102)),
            }),
            ..base_cast()
        }
    }

    #[test]
    fn test_spell_start_without_sections() {
        let start = SpellStart { cast: base_cast() };
        let bytes = start.to_bytes();
        // 2 x [mask, 0x01], cast id, spell, flags, flags ex, time, target flags
        assert_eq!(bytes.len(), 2 + 2 + 1 + 4 * 4 + 4);
        assert_eq!(SpellStart::from_bytes(&bytes).unwrap(), start);
    }

    #[test]
    fn test_every_section_roundtrips() {
        let go = SpellGo {
            cast: every_section(),
            hit_info: SpellHitInfo {
                hit_targets: vec![ObjectGuid::new(5), ObjectGuid::new(6)],
                miss_status: vec![
                    SpellMissStatus {
                        target: ObjectGuid::new(7),
                        reason: SpellMissReason::Reflect { status: 2 },
                    },
                    SpellMissStatus {
                        target: ObjectGuid::new(8),
                        reason: SpellMissReason::Immune,
                    },
                ],
            },
        };
        let decoded = SpellGo::from_bytes(&go.to_bytes()).unwrap();
        assert_eq!(decoded.cast, go.cast.clone().normalized());
        assert_eq!(decoded.hit_info, go.hit_info);
        assert_eq!(
            decoded.cast.cast_flags & cast_flags::SECTION_MASK,
            cast_flags::SECTION_MASK
        );
    }

    #[test]
    fn test_stale_section_flags_are_cleared() {
        let cast = SpellCastData {
            cast_flags: cast_flags::RUNE_LIST | cast_flags::IMMUNITY | cast_flags::NO_GCD,
            ..base_cast()
        };
        assert_eq!(cast.wire_cast_flags(), cast_flags::NO_GCD);
        let decoded = SpellStart::from_bytes(&SpellStart { cast }.to_bytes()).unwrap();
        assert_eq!(decoded.cast.remaining_runes, None);
        assert_eq!(decoded.cast.immunities, None);
    }

    #[test]
    fn test_dest_index_follows_target() {
        let mut cast = every_section();
        cast.dest_loc_spell_cast_index = None;
        let decoded = SpellStart::from_bytes(&SpellStart { cast }.to_bytes()).unwrap();
        assert_eq!(decoded.cast.dest_loc_spell_cast_index, Some(0));
    }

    #[test]
    fn test_hit_list_boundary() {
        let hits = |n: u64| (1..=n).map(ObjectGuid::new).collect::<Vec<_>>();

        let exact = SpellHitInfo {
            hit_targets: hits(255),
            miss_status: vec![],
        };
        let bytes = exact.to_bytes();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 1 + 255 * 8 + 1);

        let over = SpellHitInfo {
            hit_targets: hits(256),
            miss_status: vec![],
        };
        let bytes = over.to_bytes();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 1 + 255 * 8 + 1);
        let decoded = SpellHitInfo::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.hit_targets, hits(255));
    }

    #[test]
    fn test_miss_list_truncated_to_prefix() {
        let misses = (0..300u64)
            .map(|i| SpellMissStatus {
                target: ObjectGuid::new(i + 1),
                reason: SpellMissReason::Dodge,
            })
            .collect::<Vec<_>>();
        let info = SpellHitInfo {
            hit_targets: vec![],
            miss_status: misses.clone(),
        };
        let decoded = SpellHitInfo::from_bytes(&info.to_bytes()).unwrap();
        assert_eq!(decoded.miss_status.len(), 255);
        assert_eq!(decoded.miss_status[..], misses[..255]);
    }

    #[test]
    fn test_unknown_miss_reason_is_malformed() {
        let mut bytes = vec![0u8, 1];
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.push(12);
        let err = SpellHitInfo::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidDiscriminant {
                field: "spell miss reason",
                value: 12
            }
        ));
    }

    #[test]
    fn test_unknown_heal_prediction_type() {
        let mut bytes = 100i32.to_le_bytes().to_vec();
        bytes.push(3);
        let err = SpellHealPrediction::from_bytes(&bytes).unwrap_err();
        assert!(err.is_malformed());
    }
}
