//! # Movement Snapshot
//!
//! Player movement state embedded in cast requests that carry a trajectory.
//!
//! The layout is the densest in the catalog: presence markers (most of them
//! inverted) are interleaved with the mover identifier's presence bits, the
//! transport record adds its own markers and identifier bits, and only after
//! every bit has been consumed do the payloads follow, in an order that does
//! not match the marker order.
//!
//! ## Wire Layout
//! ```text
//! f32 z, y, x
//! bits   fall+ time- facing- spline hcf M6 M4 extra- M3 M5 elev- pitch- M7
//!        transport+ M2 flags- M1 M0
//!        [transport: T6 T2 T5 prev+ T7 T4 vehicle+ T0 T1 T3]
//!        [extra flags:12] [flags:30] [fall: velocity+]
//! bytes  M1 M4 M7 M3 M0 M2 M5 M6
//!        [transport: u8 seat, f32 o, u32 time, T6 T5, u32 prev?, f32 x, T4,
//!                    f32 z, T2 T0, i32 vehicle?, T1 T3, f32 y, T7]
//!        f32 facing?  f32 elevation?
//!        [fall: u32 time, (f32 dir.y, f32 dir.x, f32 speed)?, f32 jump]
//!        u32 time?  f32 pitch?
//! ```
//! `+` marks a positive marker, `-` an inverted one (0 = present).

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::core::guid::{ObjectGuid, PackedGuid};
use crate::core::optional::{read_if, Marker};
use crate::error::Result;
use crate::protocol::geometry::{Position, Vector2, Vector3};
use crate::protocol::layout::{
    EXTRA_MOVEMENT_FLAGS_BITS, MOVEMENT_FLAGS_BITS, MOVER_BYTES, MOVER_MASK_A, MOVER_MASK_B,
    MOVER_MASK_C, MOVER_MASK_D, MOVER_MASK_E, TRANSPORT_BYTES_A, TRANSPORT_BYTES_B,
    TRANSPORT_BYTES_C, TRANSPORT_BYTES_D, TRANSPORT_BYTES_E, TRANSPORT_MASK_A, TRANSPORT_MASK_B,
    TRANSPORT_MASK_C,
};

/// Attachment to a transport or vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementTransport {
    pub guid: ObjectGuid,
    /// Offset relative to the transport.
    pub position: Position,
    pub seat: u8,
    pub move_time: u32,
    pub prev_move_time: Option<u32>,
    pub vehicle_rec_id: Option<i32>,
}

/// Horizontal component of a fall.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementFallVelocity {
    pub direction: Vector2,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementFall {
    pub time: u32,
    pub jump_velocity: f32,
    pub velocity: Option<MovementFallVelocity>,
}

/// Movement state of a player at the moment of a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementStatus {
    pub mover: ObjectGuid,
    pub position: Vector3,
    pub facing: Option<f32>,
    /// First flags group, 30 bits on the wire.
    pub movement_flags: Option<u32>,
    /// Second flags group, 12 bits on the wire.
    pub extra_movement_flags: Option<u32>,
    pub move_time: Option<u32>,
    pub pitch: Option<f32>,
    pub spline_elevation: Option<f32>,
    pub has_spline: bool,
    pub height_change_failed: bool,
    pub transport: Option<MovementTransport>,
    pub fall: Option<MovementFall>,
}

/// Markers read in the bit section, consumed by the byte section.
struct TransportMarkers {
    guid: PackedGuid,
    has_prev_move_time: bool,
    has_vehicle_rec_id: bool,
}

impl MovementTransport {
    fn write_markers(&self, buf: &mut WireBuffer) {
        buf.write_guid_mask(self.guid, &TRANSPORT_MASK_A);
        buf.write_marker(Marker::Positive, self.prev_move_time.is_some());
        buf.write_guid_mask(self.guid, &TRANSPORT_MASK_B);
        buf.write_marker(Marker::Positive, self.vehicle_rec_id.is_some());
        buf.write_guid_mask(self.guid, &TRANSPORT_MASK_C);
    }

    fn write_payload(&self, buf: &mut WireBuffer) {
        buf.write_u8(self.seat);
        buf.write_f32(self.position.orientation);
        buf.write_u32(self.move_time);
        buf.write_guid_bytes(self.guid, &TRANSPORT_BYTES_A);
        if let Some(prev) = self.prev_move_time {
            buf.write_u32(prev);
        }
        buf.write_f32(self.position.x);
        buf.write_guid_bytes(self.guid, &TRANSPORT_BYTES_B);
        buf.write_f32(self.position.z);
        buf.write_guid_bytes(self.guid, &TRANSPORT_BYTES_C);
        if let Some(vehicle) = self.vehicle_rec_id {
            buf.write_i32(vehicle);
        }
        buf.write_guid_bytes(self.guid, &TRANSPORT_BYTES_D);
        buf.write_f32(self.position.y);
        buf.write_guid_bytes(self.guid, &TRANSPORT_BYTES_E);
    }

    fn read_markers(buf: &mut WireBuffer) -> Result<TransportMarkers> {
        let mut guid = PackedGuid::new();
        buf.read_guid_mask(&mut guid, &TRANSPORT_MASK_A)?;
        let has_prev_move_time = buf.read_marker(Marker::Positive)?;
        buf.read_guid_mask(&mut guid, &TRANSPORT_MASK_B)?;
        let has_vehicle_rec_id = buf.read_marker(Marker::Positive)?;
        buf.read_guid_mask(&mut guid, &TRANSPORT_MASK_C)?;
        Ok(TransportMarkers {
            guid,
            has_prev_move_time,
            has_vehicle_rec_id,
        })
    }

    fn read_payload(buf: &mut WireBuffer, markers: TransportMarkers) -> Result<Self> {
        let TransportMarkers {
            mut guid,
            has_prev_move_time,
            has_vehicle_rec_id,
        } = markers;

        let seat = buf.read_u8()?;
        let orientation = buf.read_f32()?;
        let move_time = buf.read_u32()?;
        buf.read_guid_bytes(&mut guid, &TRANSPORT_BYTES_A)?;
        let prev_move_time = read_if(buf, has_prev_move_time, |b| b.read_u32())?;
        let x = buf.read_f32()?;
        buf.read_guid_bytes(&mut guid, &TRANSPORT_BYTES_B)?;
        let z = buf.read_f32()?;
        buf.read_guid_bytes(&mut guid, &TRANSPORT_BYTES_C)?;
        let vehicle_rec_id = read_if(buf, has_vehicle_rec_id, |b| b.read_i32())?;
        buf.read_guid_bytes(&mut guid, &TRANSPORT_BYTES_D)?;
        let y = buf.read_f32()?;
        buf.read_guid_bytes(&mut guid, &TRANSPORT_BYTES_E)?;

        Ok(Self {
            guid: guid.into_guid(),
            position: Position::new(x, y, z, orientation),
            seat,
            move_time,
            prev_move_time,
            vehicle_rec_id,
        })
    }
}

impl MovementFall {
    fn write_payload(&self, buf: &mut WireBuffer) {
        buf.write_u32(self.time);
        if let Some(velocity) = &self.velocity {
            buf.write_f32(velocity.direction.y);
            buf.write_f32(velocity.direction.x);
            buf.write_f32(velocity.speed);
        }
        buf.write_f32(self.jump_velocity);
    }

    fn read_payload(buf: &mut WireBuffer, has_velocity: bool) -> Result<Self> {
        let time = buf.read_u32()?;
        let velocity = read_if(buf, has_velocity, |b| {
            let y = b.read_f32()?;
            let x = b.read_f32()?;
            let speed = b.read_f32()?;
            Ok(MovementFallVelocity {
                direction: Vector2::new(x, y),
                speed,
            })
        })?;
        let jump_velocity = buf.read_f32()?;
        Ok(Self {
            time,
            jump_velocity,
            velocity,
        })
    }
}

impl WireCodec for MovementStatus {
    fn write(&self, buf: &mut WireBuffer) {
        buf.write_f32(self.position.z);
        buf.write_f32(self.position.y);
        buf.write_f32(self.position.x);

        // Bit section
        buf.write_marker(Marker::Positive, self.fall.is_some());
        buf.write_marker(Marker::Inverted, self.move_time.is_some());
        buf.write_marker(Marker::Inverted, self.facing.is_some());
        buf.write_bit(self.has_spline);
        buf.write_bit(self.height_change_failed);
        buf.write_guid_mask(self.mover, &MOVER_MASK_A);
        buf.write_marker(Marker::Inverted, self.extra_movement_flags.is_some());
        buf.write_guid_mask(self.mover, &MOVER_MASK_B);
        buf.write_marker(Marker::Inverted, self.spline_elevation.is_some());
        buf.write_marker(Marker::Inverted, self.pitch.is_some());
        buf.write_guid_mask(self.mover, &MOVER_MASK_C);
        buf.write_marker(Marker::Positive, self.transport.is_some());
        buf.write_guid_mask(self.mover, &MOVER_MASK_D);
        buf.write_marker(Marker::Inverted, self.movement_flags.is_some());
        buf.write_guid_mask(self.mover, &MOVER_MASK_E);

        if let Some(transport) = &self.transport {
            transport.write_markers(buf);
        }
        if let Some(flags) = self.extra_movement_flags {
            buf.write_bits_checked(flags, EXTRA_MOVEMENT_FLAGS_BITS, "extra movement flags");
        }
        if let Some(flags) = self.movement_flags {
            buf.write_bits_checked(flags, MOVEMENT_FLAGS_BITS, "movement flags");
        }
        if let Some(fall) = &self.fall {
            buf.write_marker(Marker::Positive, fall.velocity.is_some());
        }
        buf.flush_bits();

        // Byte section
        buf.write_guid_bytes(self.mover, &MOVER_BYTES);
        if let Some(transport) = &self.transport {
            transport.write_payload(buf);
        }
        if let Some(facing) = self.facing {
            buf.write_f32(facing);
        }
        if let Some(elevation) = self.spline_elevation {
            buf.write_f32(elevation);
        }
        if let Some(fall) = &self.fall {
            fall.write_payload(buf);
        }
        if let Some(time) = self.move_time {
            buf.write_u32(time);
        }
        if let Some(pitch) = self.pitch {
            buf.write_f32(pitch);
        }
    }

    fn read(buf: &mut WireBuffer) -> Result<Self> {
        let z = buf.read_f32()?;
        let y = buf.read_f32()?;
        let x = buf.read_f32()?;

        // Bit section: markers only, payloads come later
        let mut mover = PackedGuid::new();
        let has_fall = buf.read_marker(Marker::Positive)?;
        let has_time = buf.read_marker(Marker::Inverted)?;
        let has_facing = buf.read_marker(Marker::Inverted)?;
        let has_spline = buf.read_bit()?;
        let height_change_failed = buf.read_bit()?;
        buf.read_guid_mask(&mut mover, &MOVER_MASK_A)?;
        let has_extra_flags = buf.read_marker(Marker::Inverted)?;
        buf.read_guid_mask(&mut mover, &MOVER_MASK_B)?;
        let has_spline_elevation = buf.read_marker(Marker::Inverted)?;
        let has_pitch = buf.read_marker(Marker::Inverted)?;
        buf.read_guid_mask(&mut mover, &MOVER_MASK_C)?;
        let has_transport = buf.read_marker(Marker::Positive)?;
        buf.read_guid_mask(&mut mover, &MOVER_MASK_D)?;
        let has_flags = buf.read_marker(Marker::Inverted)?;
        buf.read_guid_mask(&mut mover, &MOVER_MASK_E)?;

        let transport_markers = read_if(buf, has_transport, MovementTransport::read_markers)?;
        let extra_movement_flags =
            read_if(buf, has_extra_flags, |b| b.read_bits(EXTRA_MOVEMENT_FLAGS_BITS))?;
        let movement_flags = read_if(buf, has_flags, |b| b.read_bits(MOVEMENT_FLAGS_BITS))?;
        let has_velocity = has_fall && buf.read_marker(Marker::Positive)?;

        // Byte section
        buf.read_guid_bytes(&mut mover, &MOVER_BYTES)?;
        let transport = match transport_markers {
            Some(markers) => Some(MovementTransport::read_payload(buf, markers)?),
            None => None,
        };
        let facing = read_if(buf, has_facing, |b| b.read_f32())?;
        let spline_elevation = read_if(buf, has_spline_elevation, |b| b.read_f32())?;
        let fall = read_if(buf, has_fall, |b| MovementFall::read_payload(b, has_velocity))?;
        let move_time = read_if(buf, has_time, |b| b.read_u32())?;
        let pitch = read_if(buf, has_pitch, |b| b.read_f32())?;

        Ok(Self {
            mover: mover.into_guid(),
            position: Vector3::new(x, y, z),
            facing,
            movement_flags,
            extra_movement_flags,
            move_time,
            pitch,
            spline_elevation,
            has_spline,
            height_change_failed,
            transport,
            fall,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    /// Offset of the bit section: three leading floats.
    const BITS_START: usize = 12;

    fn bit_at(bytes: &[u8], index: usize) -> bool {
        (bytes[BITS_START + index / 8] >> (7 - index % 8)) & 1 != 0
    }

    fn roundtrip(status: &MovementStatus) -> MovementStatus {
        let bytes = status.to_bytes();
        let mut reader = WireBuffer::from_slice(&bytes);
        let decoded = MovementStatus::read(&mut reader).expect("decode");
        assert!(reader.is_exhausted(), "snapshot left unread bytes");
        decoded
    }

    fn full_transport() -> MovementTransport {
        MovementTransport {
            guid: ObjectGuid::from_bytes([0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17]),
            position: Position::new(1.5, -2.5, 0.25, 3.0),
            seat: 2,
            move_time: 9000,
            prev_move_time: Some(8900),
            vehicle_rec_id: Some(341),
        }
    }

    #[test]
    fn test_minimal_snapshot_layout() {
        let status = MovementStatus {
            position: Vector3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let bytes = status.to_bytes();

        // z, y, x then three bytes of markers, no payloads
        assert_eq!(bytes.len(), 15);
        assert_eq!(&bytes[0..4], &3.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[12..], &[0b0110_0001, 0b0011_0001, 0b0000_0000]);
        assert_eq!(roundtrip(&status), status);
    }

    #[test]
    fn test_inverted_markers_both_branches() {
        // (bit index in the bit section, snapshot with only that field set)
        let cases: Vec<(usize, MovementStatus)> = vec![
            (
                1,
                MovementStatus {
                    move_time: Some(123_456),
                    ..Default::default()
                },
            ),
            (
                2,
                MovementStatus {
                    facing: Some(1.25),
                    ..Default::default()
                },
            ),
            (
                7,
                MovementStatus {
                    extra_movement_flags: Some(0x0ABC),
                    ..Default::default()
                },
            ),
            (
                10,
                MovementStatus {
                    spline_elevation: Some(-4.0),
                    ..Default::default()
                },
            ),
            (
                11,
                MovementStatus {
                    pitch: Some(0.5),
                    ..Default::default()
                },
            ),
            (
                15,
                MovementStatus {
                    movement_flags: Some(0x2000_0001),
                    ..Default::default()
                },
            ),
        ];

        let absent = MovementStatus::default().to_bytes();
        for (bit, status) in cases {
            // absent: marker bit is 1 and nothing follows
            assert!(bit_at(&absent, bit), "bit {bit} should be 1 when absent");

            // present: marker bit is 0 and the payload is read back
            let present = status.to_bytes();
            assert!(!bit_at(&present, bit), "bit {bit} should be 0 when present");
            assert!(present.len() > absent.len());
            assert_eq!(roundtrip(&status), status);
        }
    }

    #[test]
    fn test_fall_without_velocity() {
        let status = MovementStatus {
            fall: Some(MovementFall {
                time: 250,
                jump_velocity: 7.5,
                velocity: None,
            }),
            ..Default::default()
        };
        let bytes = status.to_bytes();
        assert!(bit_at(&bytes, 0));
        // velocity marker is the bit right after the base markers
        assert!(!bit_at(&bytes, 18));
        // 12 floats/bits header + 3 marker bytes + time + jump velocity
        assert_eq!(bytes.len(), 12 + 3 + 4 + 4);
        assert_eq!(roundtrip(&status), status);
    }

    #[test]
    fn test_fall_with_velocity() {
        let status = MovementStatus {
            fall: Some(MovementFall {
                time: 250,
                jump_velocity: -7.5,
                velocity: Some(MovementFallVelocity {
                    direction: Vector2::new(0.6, 0.8),
                    speed: 7.0,
                }),
            }),
            ..Default::default()
        };
        let bytes = status.to_bytes();
        assert!(bit_at(&bytes, 18));
        // direction is sent y first
        assert_eq!(&bytes[19..23], &0.8f32.to_le_bytes());
        assert_eq!(&bytes[23..27], &0.6f32.to_le_bytes());
        assert_eq!(roundtrip(&status), status);
    }

    #[test]
    fn test_transport_without_optional_fields() {
        let mut transport = full_transport();
        transport.prev_move_time = None;
        transport.vehicle_rec_id = None;
        let status = MovementStatus {
            transport: Some(transport),
            ..Default::default()
        };
        let decoded = roundtrip(&status);
        assert_eq!(decoded.transport, Some(transport));
    }

    #[test]
    fn test_transport_guid_bits_independent_of_optionals() {
        let mut variants = Vec::new();
        for prev in [None, Some(1u32)] {
            for vehicle in [None, Some(2i32)] {
                let mut transport = full_transport();
                transport.prev_move_time = prev;
                transport.vehicle_rec_id = vehicle;
                variants.push(MovementStatus {
                    transport: Some(transport),
                    ..Default::default()
                });
            }
        }

        for status in variants {
            let bytes = status.to_bytes();
            assert!(bit_at(&bytes, 13), "transport marker");
            // T6 T2 T5 | prev | T7 T4 | vehicle | T0 T1 T3
            for bit in [18, 19, 20, 22, 23, 25, 26, 27] {
                assert!(bit_at(&bytes, bit), "transport presence bit {bit}");
            }
            let transport = status.transport.expect("transport");
            assert_eq!(bit_at(&bytes, 21), transport.prev_move_time.is_some());
            assert_eq!(bit_at(&bytes, 24), transport.vehicle_rec_id.is_some());
            assert_eq!(roundtrip(&status), status);
        }
    }

    #[test]
    fn test_transport_payload_order() {
        let status = MovementStatus {
            transport: Some(full_transport()),
            ..Default::default()
        };
        let bytes = status.to_bytes();
        // 18 base bits + 10 transport bits = 4 bytes of bits
        let payload = &bytes[BITS_START + 4..];
        assert_eq!(payload[0], 2); // seat
        assert_eq!(&payload[1..5], &3.0f32.to_le_bytes()); // orientation
        assert_eq!(&payload[5..9], &9000u32.to_le_bytes());
        assert_eq!(&payload[9..11], &[0x16, 0x15]);
        assert_eq!(&payload[11..15], &8900u32.to_le_bytes());
        assert_eq!(&payload[15..19], &1.5f32.to_le_bytes()); // x
        assert_eq!(payload[19], 0x14);
        assert_eq!(&payload[20..24], &0.25f32.to_le_bytes()); // z
        assert_eq!(&payload[24..26], &[0x12, 0x10]);
        assert_eq!(&payload[26..30], &341i32.to_le_bytes());
        assert_eq!(&payload[30..32], &[0x11, 0x13]);
        assert_eq!(&payload[32..36], &(-2.5f32).to_le_bytes()); // y
        assert_eq!(payload[36], 0x17);
        assert_eq!(payload.len(), 37);
    }

    #[test]
    fn test_mover_bytes_follow_fixed_order() {
        let status = MovementStatus {
            mover: ObjectGuid::from_bytes([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7]),
            ..Default::default()
        };
        let bytes = status.to_bytes();
        assert_eq!(
            &bytes[BITS_START + 3..],
            &[0xA1, 0xA4, 0xA7, 0xA3, 0xA0, 0xA2, 0xA5, 0xA6]
        );
        assert_eq!(roundtrip(&status), status);
    }

    #[test]
    fn test_flag_groups_are_masked_to_width() {
        let status = MovementStatus {
            movement_flags: Some(0xFFFF_FFFF),
            extra_movement_flags: Some(0xFFFF),
            ..Default::default()
        };
        let decoded = roundtrip(&status);
        assert_eq!(decoded.movement_flags, Some(0x3FFF_FFFF));
        assert_eq!(decoded.extra_movement_flags, Some(0x0FFF));
    }

    #[test]
    fn test_everything_present() {
        let status = MovementStatus {
            mover: ObjectGuid::new(0x0600_0000_0012_3456),
            position: Vector3::new(-8949.95, -132.493, 83.5312),
            facing: Some(0.64),
            movement_flags: Some(0x0000_0801),
            extra_movement_flags: Some(0x0020),
            move_time: Some(1_000_000),
            pitch: Some(-0.3),
            spline_elevation: Some(1.0),
            has_spline: true,
            height_change_failed: true,
            transport: Some(full_transport()),
            fall: Some(MovementFall {
                time: 12,
                jump_velocity: 8.0,
                velocity: Some(MovementFallVelocity {
                    direction: Vector2::new(1.0, 0.0),
                    speed: 7.0,
                }),
            }),
        };
        assert_eq!(roundtrip(&status), status);
    }

    #[test]
    fn test_truncated_snapshot_fails() {
        let status = MovementStatus {
            transport: Some(full_transport()),
            pitch: Some(1.0),
            ..Default::default()
        };
        let bytes = status.to_bytes();
        for len in 0..bytes.len() {
            let mut reader = WireBuffer::from_slice(&bytes[..len]);
            let err = MovementStatus::read(&mut reader).unwrap_err();
            assert!(err.is_truncated(), "prefix of {len} bytes");
        }
    }
}
