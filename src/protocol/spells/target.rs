//! Target data: which entity, item, locations or name a cast is aimed at.
//!
//! ```text
//! u32 flags
//! [packed unit]        flags & UNIT_MASK
//! [packed item]        flags & ITEM_MASK
//! [source location]    flags & SOURCE_LOCATION
//! [dest location]      flags & DEST_LOCATION
//! [cstring name]       flags & STRING
//! location = packed transport, f32 x, f32 y, f32 z
//! ```

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::core::guid::ObjectGuid;
use crate::core::optional::read_if;
use crate::error::Result;
use crate::protocol::geometry::Vector3;
use crate::protocol::layout::target_flags;

/// A point in the world, optionally relative to a transport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetLocation {
    pub transport: ObjectGuid,
    pub location: Vector3,
}

impl WireCodec for TargetLocation {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_packed_guid(self.transport);
        buf.write_f32(self.location.x);
        buf.write_f32(self.location.y);
        buf.write_f32(self.location.z);
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let transport = buf.read_packed_guid()?;
        let x = buf.read_f32()?;
        let y = buf.read_f32()?;
        let z = buf.read_f32()?;
        Ok(Self {
            transport,
            location: Vector3::new(x, y, z),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellTargetData {
    pub flags: u32,
    pub unit: Option<ObjectGuid>,
    pub item: Option<ObjectGuid>,
    pub src_location: Option<TargetLocation>,
    pub dst_location: Option<TargetLocation>,
    pub name: Option<String>,
}

impl SpellTargetData {
    /// Flags as they go on the wire: every presence group agrees with the
    /// populated fields. Flags outside the presence groups pass through.
    pub fn wire_flags(&self) -> u32 {
        let mut flags = self.flags;
        flags = with_group(flags, self.unit.is_some(), target_flags::UNIT_MASK, target_flags::UNIT);
        flags = with_group(flags, self.item.is_some(), target_flags::ITEM_MASK, target_flags::ITEM);
        flags = with_group(
            flags,
            self.src_location.is_some(),
            target_flags::SOURCE_LOCATION,
            target_flags::SOURCE_LOCATION,
        );
        flags = with_group(
            flags,
            self.dst_location.is_some(),
            target_flags::DEST_LOCATION,
            target_flags::DEST_LOCATION,
        );
        with_group(flags, self.name.is_some(), target_flags::STRING, target_flags::STRING)
    }

    /// Copy with `flags` replaced by [`wire_flags`](Self::wire_flags) and the
    /// name cut at its first NUL.
    pub fn normalized(mut self) -> Self {
        self.flags = self.wire_flags();
        if let Some(name) = &mut self.name {
            if let Some(end) = name.find('\0') {
                name.truncate(end);
            }
        }
        self
    }

    pub fn has_dst_location(&self) -> bool {
        self.dst_location.is_some()
    }
}

/// Keep any bit of `group` when present (adding `primary` if none is set),
/// clear the whole group when absent.
fn with_group(flags: u32, present: bool, group: u32, primary: u32) -> u32 {
    match (present, flags & group != 0) {
        (true, true) => flags,
        (true, false) => flags | primary,
        (false, _) => flags & !group,
    }
}

impl WireCodec for SpellTargetData {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_u32(self.wire_flags());
        if let Some(unit) = self.unit {
            buf.write_packed_guid(unit);
        }
        if let Some(item) = self.item {
            buf.write_packed_guid(item);
        }
        if let Some(src) = &self.src_location {
            src.write(buf);
        }
        if let Some(dst) = &self.dst_location {
            dst.write(buf);
        }
        if let Some(name) = &self.name {
            buf.write_cstring(name);
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let flags = buf.read_u32()?;
        let unit = read_if(buf, flags & target_flags::UNIT_MASK != 0, |b| {
            b.read_packed_guid()
        })?;
        let item = read_if(buf, flags & target_flags::ITEM_MASK != 0, |b| {
            b.read_packed_guid()
        })?;
        let src_location = read_if(
            buf,
            flags & target_flags::SOURCE_LOCATION != 0,
            TargetLocation::read,
        )?;
        let dst_location = read_if(
            buf,
            flags & target_flags::DEST_LOCATION != 0,
            TargetLocation::read,
        )?;
        let name = read_if(buf, flags & target_flags::STRING != 0, |b| b.read_cstring())?;

        Ok(Self {
            flags,
            unit,
            item,
            src_location,
            dst_location,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::protocol::layout::target_flags::*;

    #[test]
    fn test_empty_target_is_four_bytes() {
        let target = SpellTargetData::default();
        assert_eq!(target.to_bytes().as_ref(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_gameobject_flag_carries_unit() {
        let target = SpellTargetData {
            flags: GAMEOBJECT,
            unit: Some(ObjectGuid::new(0xF100_0000_0000_0042)),
            ..Default::default()
        };
        let bytes = target.to_bytes();
        // GAMEOBJECT already selects the unit slot, UNIT is not added
        assert_eq!(&bytes[..4], &GAMEOBJECT.to_le_bytes());
        assert_eq!(&bytes[4..], &[0x81, 0x42, 0xF1]);
        assert_eq!(SpellTargetData::from_bytes(&bytes).unwrap(), target);
    }

    #[test]
    fn test_flags_follow_populated_fields() {
        let target = SpellTargetData {
            flags: UNIT | ITEM | UNIT_ENEMY,
            unit: None,
            item: Some(ObjectGuid::new(7)),
            dst_location: Some(TargetLocation::default()),
            name: Some("Gnomeregan".into()),
            ..Default::default()
        };
        assert_eq!(target.wire_flags(), ITEM | UNIT_ENEMY | DEST_LOCATION | STRING);

        let decoded = SpellTargetData::from_bytes(&target.to_bytes()).unwrap();
        assert_eq!(decoded, target.clone().normalized());
    }

    #[test]
    fn test_locations_read_in_order() {
        let target = SpellTargetData {
            src_location: Some(TargetLocation {
                transport: ObjectGuid::EMPTY,
                location: Vector3::new(1.0, 2.0, 3.0),
            }),
            dst_location: Some(TargetLocation {
                transport: ObjectGuid::new(0x1F00),
                location: Vector3::new(4.0, 5.0, 6.0),
            }),
            ..Default::default()
        }
        .normalized();

        let bytes = target.to_bytes();
        // flags, [0 mask, x, y, z], [mask 0x02, 0x1F, x, y, z]
        assert_eq!(bytes.len(), 4 + 13 + 14);
        assert_eq!(bytes[4], 0x00);
        assert_eq!(&bytes[17..19], &[0x02, 0x1F]);
        assert_eq!(SpellTargetData::from_bytes(&bytes).unwrap(), target);
    }

    #[test]
    fn test_name_with_nul_keeps_later_fields_aligned() {
        let target = SpellTargetData {
            name: Some("Onyxia\0's Lair".into()),
            ..Default::default()
        };
        let bytes = target.to_bytes();
        assert_eq!(&bytes[4..], b"Onyxia\0");

        let decoded = SpellTargetData::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, target.normalized());
        assert_eq!(decoded.name.as_deref(), Some("Onyxia"));
    }

    #[test]
    fn test_unterminated_name_is_truncated() {
        let mut bytes = STRING.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        let err = SpellTargetData::from_bytes(&bytes).unwrap_err();
        assert!(err.is_truncated());
    }
}
