//! # Conditional Fields
//!
//! A conditional field is a marker followed by a payload that only exists when
//! the marker says so. Markers come in three shapes:
//!
//! - **Positive bit**: 1 = present
//! - **Inverted bit**: 0 = present (the common case costs a zero bit)
//! - **Presence byte**: a whole byte, 0 or 1
//!
//! Layouts that batch several markers read all of them into locals first and
//! read the payloads afterwards in their own order. That two-pass shape is
//! spelled out in each layout rather than hidden behind a helper, so the
//! marker order and the payload order stay visible side by side.

use crate::core::buffer::WireBuffer;
use crate::error::{ProtocolError, Result};

/// Sense of a single-bit presence marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Bit set means the payload follows.
    Positive,
    /// Bit clear means the payload follows.
    Inverted,
}

impl Marker {
    /// Bit to put on the wire for a field that is (or isn't) present.
    pub fn encode(self, present: bool) -> bool {
        match self {
            Marker::Positive => present,
            Marker::Inverted => !present,
        }
    }

    /// Whether the payload follows, given the bit read from the wire.
    pub fn decode(self, bit: bool) -> bool {
        match self {
            Marker::Positive => bit,
            Marker::Inverted => !bit,
        }
    }
}

impl WireBuffer {
    pub fn write_marker(&mut self, marker: Marker, present: bool) {
        self.write_bit(marker.encode(present));
    }

    pub fn read_marker(&mut self, marker: Marker) -> Result<bool> {
        self.read_bit().map(|bit| marker.decode(bit))
    }

    pub fn write_presence_byte(&mut self, present: bool) {
        self.write_u8(u8::from(present));
    }

    /// Anything other than 0 or 1 is rejected.
    pub fn read_presence_byte(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(ProtocolError::InvalidDiscriminant {
                field: "presence byte",
                value: u32::from(value),
            }),
        }
    }

    /// Presence byte, then the payload when `value` is `Some`.
    pub fn write_optional<T>(&mut self, value: Option<&T>, write: impl FnOnce(&mut Self, &T)) {
        self.write_presence_byte(value.is_some());
        if let Some(value) = value {
            write(self, value);
        }
    }

    /// Mirror of [`write_optional`](Self::write_optional).
    pub fn read_optional<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.read_presence_byte()? {
            read(self).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Run `read` only when `present` is set.
pub fn read_if<T>(
    buf: &mut WireBuffer,
    present: bool,
    read: impl FnOnce(&mut WireBuffer) -> Result<T>,
) -> Result<Option<T>> {
    if present {
        read(buf).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_marker_senses() {
        assert!(Marker::Positive.encode(true));
        assert!(!Marker::Inverted.encode(true));
        assert!(Marker::Inverted.decode(false));
        assert!(!Marker::Inverted.decode(true));
    }

    #[test]
    fn test_inverted_marker_on_wire() {
        let mut buf = WireBuffer::new();
        buf.write_marker(Marker::Inverted, true);
        buf.write_marker(Marker::Inverted, false);
        buf.write_marker(Marker::Positive, true);
        buf.flush_bits();
        assert_eq!(buf.as_slice(), &[0b0110_0000]);

        let mut reader = WireBuffer::from_slice(buf.as_slice());
        assert!(reader.read_marker(Marker::Inverted).unwrap());
        assert!(!reader.read_marker(Marker::Inverted).unwrap());
        assert!(reader.read_marker(Marker::Positive).unwrap());
    }

    #[test]
    fn test_optional_with_presence_byte() {
        let mut buf = WireBuffer::new();
        buf.write_optional(Some(&7u32), |b, v| b.write_u32(*v));
        buf.write_optional(None::<&u32>, |b, v| b.write_u32(*v));
        assert_eq!(buf.as_slice(), &[1, 7, 0, 0, 0, 0]);

        let mut reader = WireBuffer::from_slice(buf.as_slice());
        assert_eq!(reader.read_optional(|b| b.read_u32()).unwrap(), Some(7));
        assert_eq!(reader.read_optional(|b| b.read_u32()).unwrap(), None);
    }

    #[test]
    fn test_bad_presence_byte_is_malformed() {
        let mut reader = WireBuffer::from_slice(&[2]);
        let err = reader.read_presence_byte().unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_read_if_skips_absent_payload() {
        let mut reader = WireBuffer::from_slice(&[]);
        assert_eq!(read_if(&mut reader, false, |b| b.read_u8()).unwrap(), None);
        assert!(read_if(&mut reader, true, |b| b.read_u8())
            .unwrap_err()
            .is_truncated());
    }
}
