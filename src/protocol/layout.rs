//! # Protocol Constant Table
//!
//! Every bit-exact constant the peer depends on, in one place: identifier
//! permutations, flag bit assignments, field widths and collection caps.
//! Nothing here is derived from data; changing any value breaks
//! interoperability.

use crate::core::guid::GuidStep;

// ============================================================================
// Field widths and caps
// ============================================================================

/// Hit, miss and target lists carry a `u8` count.
pub const MAX_TARGET_LIST: usize = u8::MAX as usize;

/// Width of the category cooldown count field.
pub const CATEGORY_COOLDOWN_COUNT_BITS: u32 = 23;

/// Width of the first movement flags group.
pub const MOVEMENT_FLAGS_BITS: u32 = 30;

/// Width of the extra movement flags group.
pub const EXTRA_MOVEMENT_FLAGS_BITS: u32 = 12;

/// Known spells and spell history carry a `u16` count.
pub const MAX_KNOWN_SPELLS: usize = u16::MAX as usize;

/// Rune cooldown bytes sent with a rune list.
pub const MAX_RUNES: usize = 6;

/// Action bar slots in an action button update.
pub const MAX_ACTION_BUTTONS: usize = 144;

/// Effects per aura that can carry an amount.
pub const MAX_AURA_EFFECTS: usize = 3;

// ============================================================================
// Target data flags (u32)
// ============================================================================

pub mod target_flags {
    pub const NONE: u32 = 0x0000_0000;
    pub const UNIT: u32 = 0x0000_0002;
    pub const UNIT_RAID: u32 = 0x0000_0004;
    pub const UNIT_PARTY: u32 = 0x0000_0008;
    pub const ITEM: u32 = 0x0000_0010;
    pub const SOURCE_LOCATION: u32 = 0x0000_0020;
    pub const DEST_LOCATION: u32 = 0x0000_0040;
    pub const UNIT_ENEMY: u32 = 0x0000_0080;
    pub const UNIT_ALLY: u32 = 0x0000_0100;
    pub const CORPSE_ENEMY: u32 = 0x0000_0200;
    pub const UNIT_DEAD: u32 = 0x0000_0400;
    pub const GAMEOBJECT: u32 = 0x0000_0800;
    pub const TRADE_ITEM: u32 = 0x0000_1000;
    pub const STRING: u32 = 0x0000_2000;
    pub const GAMEOBJECT_ITEM: u32 = 0x0000_4000;
    pub const CORPSE_ALLY: u32 = 0x0000_8000;
    pub const UNIT_MINIPET: u32 = 0x0001_0000;

    /// Any of these means an entity identifier follows.
    pub const UNIT_MASK: u32 = UNIT | UNIT_MINIPET | GAMEOBJECT | CORPSE_ENEMY | CORPSE_ALLY;

    /// Any of these means an item identifier follows.
    pub const ITEM_MASK: u32 = ITEM | TRADE_ITEM;
}

// ============================================================================
// Cast request flags (u8, client to server)
// ============================================================================

pub mod cast_request_flags {
    pub const HAS_TRAJECTORY: u8 = 0x02;
    pub const HAS_WEIGHT: u8 = 0x08;
}

// ============================================================================
// Cast data flags (u32, server to client)
// ============================================================================

pub mod cast_flags {
    pub const PENDING: u32 = 0x0000_0001;
    pub const HAS_TRAJECTORY: u32 = 0x0000_0002;
    pub const PROJECTILE: u32 = 0x0000_0020;
    pub const POWER_LEFT_SELF: u32 = 0x0000_0800;
    pub const ADJUST_MISSILE: u32 = 0x0002_0000;
    pub const NO_GCD: u32 = 0x0004_0000;
    pub const VISUAL_CHAIN: u32 = 0x0008_0000;
    pub const RUNE_LIST: u32 = 0x0020_0000;
    pub const IMMUNITY: u32 = 0x0400_0000;
    pub const HEAL_PREDICTION: u32 = 0x4000_0000;

    /// Flags whose only meaning is "this trailing section is present".
    pub const SECTION_MASK: u32 = POWER_LEFT_SELF
        | RUNE_LIST
        | ADJUST_MISSILE
        | PROJECTILE
        | VISUAL_CHAIN
        | IMMUNITY
        | HEAL_PREDICTION;
}

// ============================================================================
// Aura flags (u16)
// ============================================================================

pub mod aura_flags {
    pub const EFF_INDEX_0: u16 = 0x0001;
    pub const EFF_INDEX_1: u16 = 0x0002;
    pub const EFF_INDEX_2: u16 = 0x0004;
    pub const NOCASTER: u16 = 0x0008;
    pub const POSITIVE: u16 = 0x0010;
    pub const DURATION: u16 = 0x0020;
    pub const ANY_EFFECT_AMOUNT_SENT: u16 = 0x0040;
    pub const NEGATIVE: u16 = 0x0080;

    pub const EFF_INDEX_MASK: u16 = EFF_INDEX_0 | EFF_INDEX_1 | EFF_INDEX_2;
}

// ============================================================================
// Discriminants
// ============================================================================

/// Miss reason that carries a trailing reflect status byte.
pub const SPELL_MISS_REFLECT: u8 = 11;

/// Heal prediction type that carries a beacon identifier.
pub const HEAL_PREDICTION_TARGET_AND_BEACON: u8 = 2;

// ============================================================================
// Movement snapshot identifier permutations
// ============================================================================

/// Mover presence bits, in the groups they are interleaved with markers.
pub const MOVER_MASK_A: [u8; 2] = [6, 4];
pub const MOVER_MASK_B: [u8; 2] = [3, 5];
pub const MOVER_MASK_C: [u8; 1] = [7];
pub const MOVER_MASK_D: [u8; 1] = [2];
pub const MOVER_MASK_E: [u8; 2] = [1, 0];

/// Mover bytes, read once all bits are done.
pub const MOVER_BYTES: [u8; 8] = [1, 4, 7, 3, 0, 2, 5, 6];

/// Transport presence bits around the prev-move-time and vehicle markers.
pub const TRANSPORT_MASK_A: [u8; 3] = [6, 2, 5];
pub const TRANSPORT_MASK_B: [u8; 2] = [7, 4];
pub const TRANSPORT_MASK_C: [u8; 3] = [0, 1, 3];

/// Transport bytes, interleaved with the transport payload.
pub const TRANSPORT_BYTES_A: [u8; 2] = [6, 5];
pub const TRANSPORT_BYTES_B: [u8; 1] = [4];
pub const TRANSPORT_BYTES_C: [u8; 2] = [2, 0];
pub const TRANSPORT_BYTES_D: [u8; 2] = [1, 3];
pub const TRANSPORT_BYTES_E: [u8; 1] = [7];

// ============================================================================
// Missile cancel
// ============================================================================

pub const MISSILE_CANCEL_MASK_A: [u8; 4] = [7, 2, 4, 6];
pub const MISSILE_CANCEL_MASK_B: [u8; 4] = [1, 0, 3, 5];
pub const MISSILE_CANCEL_BYTES_A: [u8; 6] = [6, 1, 4, 2, 5, 7];
pub const MISSILE_CANCEL_BYTES_B: [u8; 2] = [0, 3];

// ============================================================================
// Play spell visual (two identifiers interleaved)
// ============================================================================

/// Slot of the source identifier in interleaved steps.
pub const VISUAL_SOURCE: usize = 0;
/// Slot of the target identifier in interleaved steps.
pub const VISUAL_TARGET: usize = 1;

pub const PLAY_SPELL_VISUAL_MASK_A: [GuidStep; 8] = [
    (VISUAL_TARGET, 1),
    (VISUAL_SOURCE, 3),
    (VISUAL_SOURCE, 0),
    (VISUAL_TARGET, 2),
    (VISUAL_TARGET, 5),
    (VISUAL_SOURCE, 2),
    (VISUAL_SOURCE, 4),
    (VISUAL_TARGET, 6),
];

/// Target byte 0 has no presence bit in this layout.
pub const PLAY_SPELL_VISUAL_MASK_B: [GuidStep; 7] = [
    (VISUAL_SOURCE, 6),
    (VISUAL_TARGET, 7),
    (VISUAL_SOURCE, 5),
    (VISUAL_SOURCE, 1),
    (VISUAL_SOURCE, 7),
    (VISUAL_TARGET, 3),
    (VISUAL_TARGET, 4),
];

/// Target byte 0 is written whenever it is non-zero, although no presence
/// bit announces it.
pub const PLAY_SPELL_VISUAL_BYTES: [GuidStep; 16] = [
    (VISUAL_SOURCE, 7),
    (VISUAL_SOURCE, 4),
    (VISUAL_TARGET, 7),
    (VISUAL_SOURCE, 1),
    (VISUAL_SOURCE, 3),
    (VISUAL_SOURCE, 0),
    (VISUAL_SOURCE, 6),
    (VISUAL_TARGET, 0),
    (VISUAL_TARGET, 4),
    (VISUAL_SOURCE, 5),
    (VISUAL_TARGET, 1),
    (VISUAL_TARGET, 5),
    (VISUAL_TARGET, 6),
    (VISUAL_TARGET, 2),
    (VISUAL_SOURCE, 2),
    (VISUAL_TARGET, 3),
];

// ============================================================================
// Play spell visual kit
// ============================================================================

pub const PLAY_SPELL_VISUAL_KIT_MASK: [u8; 8] = [4, 7, 5, 3, 1, 2, 0, 6];
pub const PLAY_SPELL_VISUAL_KIT_BYTES: [u8; 8] = [0, 4, 1, 6, 7, 2, 3, 5];

// ============================================================================
// Aura points depleted
// ============================================================================

pub const AURA_POINTS_DEPLETED_MASK: [u8; 8] = [2, 4, 1, 7, 5, 0, 3, 6];
pub const AURA_POINTS_DEPLETED_BYTES_A: [u8; 2] = [5, 0];
pub const AURA_POINTS_DEPLETED_BYTES_B: [u8; 4] = [3, 7, 4, 2];
pub const AURA_POINTS_DEPLETED_BYTES_C: [u8; 2] = [6, 1];
