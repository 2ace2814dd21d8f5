//! # Spell Message Catalog
//!
//! Field layouts for every spell-related message, grouped by what they carry:
//!
//! - **target**: target data shared by requests and cast results
//! - **request**: inbound cast and item-use requests
//! - **cast**: cast start/go results and their trailing sections
//! - **channel**: channel start
//! - **aura**: aura updates and depleted points
//! - **history**: cooldowns, known and unlearned spells, modifiers
//! - **visual**: visual effects and missile cancel
//! - **runes**: rune conversion and resync
//! - **notice**: small one-shot notices (failures, mount, resurrect, delay)
//!
//! Each structure implements [`WireCodec`](crate::core::codec::WireCodec).
//! Length-prefixed lists are clamped to what the count field can hold before
//! the count is written, so count and element number always agree.

pub mod aura;
pub mod cast;
pub mod channel;
pub mod history;
pub mod notice;
pub mod request;
pub mod runes;
pub mod target;
pub mod visual;

use crate::core::buffer::WireBuffer;
use crate::error::Result;
use crate::utils::metrics::global_metrics;
use tracing::warn;

/// Order-preserving prefix of `items` that fits a count field holding `max`.
pub(crate) fn clamp_list<'a, T>(items: &'a [T], max: usize, field: &'static str) -> &'a [T] {
    if items.len() > max {
        warn!(field, len = items.len(), max, "List exceeds count field, truncating");
        global_metrics().field_clamped();
        &items[..max]
    } else {
        items
    }
}

/// `u32` count followed by the elements.
pub(crate) fn write_u32_list<T>(
    buf: &mut WireBuffer,
    items: &[T],
    field: &'static str,
    mut write: impl FnMut(&mut WireBuffer, &T),
) {
    let items = clamp_list(items, u32::MAX as usize, field);
    buf.write_u32(items.len() as u32);
    for item in items {
        write(buf, item);
    }
}

/// Mirror of [`write_u32_list`]. `min_size` is the smallest encoded element.
pub(crate) fn read_u32_list<T>(
    buf: &mut WireBuffer,
    min_size: usize,
    mut read: impl FnMut(&mut WireBuffer) -> Result<T>,
) -> Result<Vec<T>> {
    let count = buf.read_u32()? as usize;
    read_counted(buf, count, min_size, &mut read)
}

/// Read `count` elements after checking they can fit in what is left.
pub(crate) fn read_counted<T>(
    buf: &mut WireBuffer,
    count: usize,
    min_size: usize,
    mut read: impl FnMut(&mut WireBuffer) -> Result<T>,
) -> Result<Vec<T>> {
    buf.ensure_count(count, min_size)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read(buf)?);
    }
    Ok(items)
}
