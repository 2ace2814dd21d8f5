//! # Message Catalog
//!
//! The closed set of spell messages. Each [`Opcode`] names one layout and
//! each [`Message`] variant carries the structure for it.
//!
//! Opcodes here are symbolic: the numeric values belong to the transport
//! layer that frames payloads, which maps them to and from [`Opcode`].
//!
//! ```rust
//! use spellwire::protocol::message::{Message, Opcode};
//! use spellwire::protocol::spells::runes::AddRunePower;
//!
//! let message = Message::AddRunePower(AddRunePower { added_runes_mask: 0b11 });
//! let body = message.encode();
//! assert_eq!(Message::decode(Opcode::AddRunePower, &body).unwrap(), message);
//! ```

use crate::core::buffer::WireBuffer;
use crate::core::codec::WireCodec;
use crate::error::Result;
use crate::protocol::spells::aura::{AuraPointsDepleted, AuraUpdate};
use crate::protocol::spells::cast::{SpellGo, SpellStart};
use crate::protocol::spells::channel::ChannelStart;
use crate::protocol::spells::history::{
    CategoryCooldown, SendKnownSpells, SendUnlearnSpells, SetSpellModifier, SupercededSpells,
    UnlearnedSpells,
};
use crate::protocol::spells::notice::{
    MountResult, ResurrectRequest, SpellDelayed, SpellFailure, UpdateActionButtons,
};
use crate::protocol::spells::request::{SpellCastRequest, UseItem};
use crate::protocol::spells::runes::{AddRunePower, ConvertRune, ResyncRunes};
use crate::protocol::spells::visual::{MissileCancel, PlaySpellVisual, PlaySpellVisualKit};
use bytes::Bytes;
use std::fmt;

/// Who sends a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ClientToServer,
    ServerToClient,
}

/// Decode routine for one opcode.
pub type DecodeFn = fn(&mut WireBuffer) -> Result<Message>;

macro_rules! message_catalog {
    ($( $variant:ident($body:ty) => $name:literal, $direction:ident; )+) => {
        /// Message type selected by the framing layer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Opcode {
            $( $variant, )+
        }

        impl Opcode {
            /// Every opcode, in catalog order.
            pub const ALL: &'static [Opcode] = &[$( Opcode::$variant, )+];

            /// Protocol name, e.g. `SMSG_SPELL_GO`.
            pub fn name(self) -> &'static str {
                match self {
                    $( Opcode::$variant => $name, )+
                }
            }

            pub fn direction(self) -> Direction {
                match self {
                    $( Opcode::$variant => Direction::$direction, )+
                }
            }

            /// Look up an opcode by its protocol name.
            pub fn from_name(name: &str) -> Option<Opcode> {
                match name {
                    $( $name => Some(Opcode::$variant), )+
                    _ => None,
                }
            }

            /// The layout's decode routine.
            pub fn decoder(self) -> DecodeFn {
                match self {
                    $( Opcode::$variant => (|buf: &mut WireBuffer| {
                        <$body as WireCodec>::read(buf).map(Message::$variant)
                    }) as DecodeFn, )+
                }
            }
        }

        /// One decoded or to-be-encoded message body.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Message {
            $( $variant($body), )+
        }

        impl Message {
            pub fn opcode(&self) -> Opcode {
                match self {
                    $( Message::$variant(_) => Opcode::$variant, )+
                }
            }

            /// Append the body to `buf`.
            pub fn write(&self, buf: &mut WireBuffer) {
                match self {
                    $( Message::$variant(body) => body.write(buf), )+
                }
            }
        }
    };
}

message_catalog! {
    CastSpell(SpellCastRequest) => "CMSG_CAST_SPELL", ClientToServer;
    UseItem(UseItem) => "CMSG_USE_ITEM", ClientToServer;
    SpellStart(SpellStart) => "SMSG_SPELL_START", ServerToClient;
    SpellGo(SpellGo) => "SMSG_SPELL_GO", ServerToClient;
    ChannelStart(ChannelStart) => "SMSG_CHANNEL_START", ServerToClient;
    MountResult(MountResult) => "SMSG_MOUNT_RESULT", ServerToClient;
    AuraUpdate(AuraUpdate) => "SMSG_AURA_UPDATE", ServerToClient;
    AuraUpdateAll(AuraUpdate) => "SMSG_AURA_UPDATE_ALL", ServerToClient;
    MissileCancel(MissileCancel) => "SMSG_MISSILE_CANCEL", ServerToClient;
    CategoryCooldown(CategoryCooldown) => "SMSG_CATEGORY_COOLDOWN", ServerToClient;
    PlaySpellVisual(PlaySpellVisual) => "SMSG_PLAY_SPELL_VISUAL", ServerToClient;
    PlaySpellVisualKit(PlaySpellVisualKit) => "SMSG_PLAY_SPELL_VISUAL_KIT", ServerToClient;
    SendKnownSpells(SendKnownSpells) => "SMSG_SEND_KNOWN_SPELLS", ServerToClient;
    SendUnlearnSpells(SendUnlearnSpells) => "SMSG_SEND_UNLEARN_SPELLS", ServerToClient;
    UnlearnedSpells(UnlearnedSpells) => "SMSG_UNLEARNED_SPELLS", ServerToClient;
    UpdateActionButtons(UpdateActionButtons) => "SMSG_UPDATE_ACTION_BUTTONS", ServerToClient;
    SetFlatSpellModifier(SetSpellModifier) => "SMSG_SET_FLAT_SPELL_MODIFIER", ServerToClient;
    SetPctSpellModifier(SetSpellModifier) => "SMSG_SET_PCT_SPELL_MODIFIER", ServerToClient;
    ConvertRune(ConvertRune) => "SMSG_CONVERT_RUNE", ServerToClient;
    ResyncRunes(ResyncRunes) => "SMSG_RESYNC_RUNES", ServerToClient;
    AddRunePower(AddRunePower) => "SMSG_ADD_RUNE_POWER", ServerToClient;
    SupercededSpells(SupercededSpells) => "SMSG_SUPERCEDED_SPELLS", ServerToClient;
    AuraPointsDepleted(AuraPointsDepleted) => "SMSG_AURA_POINTS_DEPLETED", ServerToClient;
    SpellFailure(SpellFailure) => "SMSG_SPELL_FAILURE", ServerToClient;
    SpellFailedOther(SpellFailure) => "SMSG_SPELL_FAILED_OTHER", ServerToClient;
    ResurrectRequest(ResurrectRequest) => "SMSG_RESURRECT_REQUEST", ServerToClient;
    SpellDelayed(SpellDelayed) => "SMSG_SPELL_DELAYED", ServerToClient;
}

impl Message {
    /// Encode into a fresh message body.
    pub fn encode(&self) -> Bytes {
        let mut buf = WireBuffer::new();
        self.write(&mut buf);
        buf.into_bytes()
    }

    /// Decode a body of the given type. Bytes after the body are ignored;
    /// use [`Dispatcher`](crate::protocol::dispatcher::Dispatcher) to apply
    /// size and trailing-byte policy.
    pub fn decode(opcode: Opcode, payload: &[u8]) -> Result<Message> {
        let mut buf = WireBuffer::from_slice(payload);
        (opcode.decoder())(&mut buf)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
