//! Channel start.
//!
//! Both optional sections use a presence byte rather than a bit, written
//! whether or not the section follows.

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::core::guid::ObjectGuid;
use crate::error::Result;
use crate::protocol::spells::cast::SpellHealPrediction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStartInterruptImmunities {
    pub school_immunities: i32,
    pub immunities: i32,
}

/// Heal prediction aimed at a specific unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetedHealPrediction {
    pub target: ObjectGuid,
    pub predict: SpellHealPrediction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStart {
    pub caster: ObjectGuid,
    pub spell_id: u32,
    pub channel_duration: i32,
    pub interrupt_immunities: Option<ChannelStartInterruptImmunities>,
    pub heal_prediction: Option<TargetedHealPrediction>,
}

impl WireCodec for ChannelStart {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_packed_guid(self.caster);
        buf.write_u32(self.spell_id);
        buf.write_i32(self.channel_duration);

        buf.write_optional(self.interrupt_immunities.as_ref(), |b, immunities| {
            b.write_i32(immunities.school_immunities);
            b.write_i32(immunities.immunities);
        });
        buf.write_optional(self.heal_prediction.as_ref(), |b, heal| {
            b.write_packed_guid(heal.target);
            heal.predict.write(b);
        });
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let caster = buf.read_packed_guid()?;
        let spell_id = buf.read_u32()?;
        let channel_duration = buf.read_i32()?;

        let interrupt_immunities = buf.read_optional(|b| {
            Ok(ChannelStartInterruptImmunities {
                school_immunities: b.read_i32()?,
                immunities: b.read_i32()?,
            })
        })?;
        let heal_prediction = buf.read_optional(|b| {
            Ok(TargetedHealPrediction {
                target: b.read_packed_guid()?,
                predict: SpellHealPrediction::read(b)?,
            })
        })?;

        Ok(Self {
            caster,
            spell_id,
            channel_duration,
            interrupt_immunities,
            heal_prediction,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::protocol::spells::cast::HealPredictionKind;

    #[test]
    fn test_presence_bytes_always_written() {
        let channel = ChannelStart {
            caster: ObjectGuid::new(0x10),
            spell_id: 5143,
            channel_duration: 5000,
            ..Default::default()
        };
        let bytes = channel.to_bytes();
        // [0x01, 0x10], spell, duration, 0, 0
        assert_eq!(bytes.len(), 2 + 4 + 4 + 2);
        assert_eq!(&bytes[10..], &[0, 0]);
        assert_eq!(ChannelStart::from_bytes(&bytes).unwrap(), channel);
    }

    #[test]
    fn test_both_sections() {
        let channel = ChannelStart {
            caster: ObjectGuid::new(0x10),
            spell_id: 740,
            channel_duration: 8000,
            interrupt_immunities: Some(ChannelStartInterruptImmunities {
                school_immunities: 0x7E,
                immunities: 0x10,
            }),
            heal_prediction: Some(TargetedHealPrediction {
                target: ObjectGuid::new(0x2000),
                predict: SpellHealPrediction {
                    points: 3000,
                    kind: HealPredictionKind::TargetAndCaster,
                },
            }),
        };
        let bytes = channel.to_bytes();
        assert_eq!(bytes[10], 1);
        assert_eq!(bytes[19], 1);
        assert_eq!(ChannelStart::from_bytes(&bytes).unwrap(), channel);
    }

    #[test]
    fn test_presence_byte_other_than_one() {
        let mut bytes = ChannelStart::default().to_bytes().to_vec();
        let at = bytes.len() - 1;
        bytes[at] = 0x80;
        assert!(ChannelStart::from_bytes(&bytes).unwrap_err().is_malformed());
    }
}
