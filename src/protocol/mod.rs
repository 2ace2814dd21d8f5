//! # Spell Protocol Layouts
//!
//! Message structures and the catalog that routes opcodes to them.
//!
//! ## Components
//! - **Layout**: permutation tables and flag constants fixed by the peer
//! - **Geometry / Movement**: shared positional sub-records
//! - **Spells**: every spell, aura and cooldown message body
//! - **Message**: the closed [`Opcode`](message::Opcode) / [`Message`](message::Message) catalog
//! - **Dispatcher**: decode routing with payload limits and metrics

pub mod dispatcher;
pub mod geometry;
pub mod layout;
pub mod message;
pub mod movement;
pub mod spells;


pub use dispatcher::Dispatcher;
pub use message::{Direction, Message, Opcode};
