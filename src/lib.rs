//! # spellwire
//!
//! Bit-exact encoder and decoder for the spell, aura and cooldown messages of
//! a game client/server protocol.
//!
//! Each message body is a fixed sequence of bit fields, little-endian
//! integers and floats, and packed 8-byte identifiers whose bits and bytes
//! are emitted in per-message scrambled orders. This crate owns those
//! layouts; framing, opcode numbering and transport belong to the caller.
//!
//! ```rust
//! use spellwire::config::CodecConfig;
//! use spellwire::protocol::spells::notice::SpellDelayed;
//! use spellwire::protocol::{Dispatcher, Message, Opcode};
//!
//! let dispatcher = Dispatcher::new(&CodecConfig::default());
//! let body = dispatcher.encode(&Message::SpellDelayed(SpellDelayed {
//!     caster: 0x42.into(),
//!     actual_delay: 500,
//! }));
//! let decoded = dispatcher.decode(Opcode::SpellDelayed, &body).unwrap();
//! assert_eq!(decoded.opcode(), Opcode::SpellDelayed);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::config::CodecConfig;
pub use crate::core::buffer::WireBuffer;
pub use crate::core::codec::WireCodec;
pub use crate::core::guid::ObjectGuid;
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::{Dispatcher, Message, Opcode};
