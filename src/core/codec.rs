//! # Wire Codec Trait
//!
//! Every message and sub-record implements [`WireCodec`]: a fixed, linear
//! sequence of writes and the mirror sequence of reads over a [`WireBuffer`].

use crate::core::buffer::WireBuffer;
use crate::error::Result;
use bytes::Bytes;

/// Bit-exact layout of one wire structure.
pub trait WireCodec: Sized {
    /// Append this value to `buf`. Never fails; oversized input is clamped.
    fn write(&self, buf: &mut WireBuffer);

    /// Consume one value from `buf`.
    fn read(buf: &mut WireBuffer) -> Result<Self>;

    /// Encode into a fresh, flushed message body.
    fn to_bytes(&self) -> Bytes {
        let mut buf = WireBuffer::new();
        self.write(&mut buf);
        buf.into_bytes()
    }

    /// Decode from a complete message body. Trailing bytes are left unread.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut buf = WireBuffer::from_slice(data);
        Self::read(&mut buf)
    }
}
