//! # Core Codec Components
//!
//! Low-level building blocks shared by every message layout.
//!
//! ## Components
//! - **Buffer**: byte sequence with bit-level and byte-level cursors
//! - **Guid**: packed identifier encoding with per-site permutations
//! - **Optional**: presence markers (positive, inverted, presence byte)
//! - **Codec**: the [`WireCodec`](codec::WireCodec) trait every layout implements
//!
//! ## Wire Conventions
//! ```text
//! bits:     MSB-first within a byte, zero padded on flush
//! integers: little-endian
//! floats:   IEEE-754 single, little-endian
//! strings:  UTF-8, NUL terminated
//! ```

pub mod buffer;
pub mod codec;
pub mod guid;
pub mod optional;

pub use buffer::WireBuffer;
pub use codec::WireCodec;
pub use guid::{ObjectGuid, PackedGuid};
