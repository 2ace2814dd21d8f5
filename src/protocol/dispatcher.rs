//! Opcode routing with payload policy.
//!
//! [`Dispatcher`] maps an [`Opcode`] to its decode routine and applies the
//! [`LimitsConfig`] the session configured: oversized payloads are refused
//! before any parsing, and trailing bytes are either rejected or logged.
//! Every outcome is counted in the global metrics.

use crate::config::{CodecConfig, LimitsConfig};
use crate::core::buffer::WireBuffer;
use crate::error::{ProtocolError, Result};
use crate::protocol::message::{DecodeFn, Message, Opcode};
use crate::utils::metrics::{global_metrics, Timer};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Decoder table keyed by opcode.
pub struct Dispatcher {
    decoders: HashMap<Opcode, DecodeFn>,
    limits: LimitsConfig,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl Dispatcher {
    /// A dispatcher that knows every opcode in the catalog.
    pub fn new(config: &CodecConfig) -> Self {
        let decoders = Opcode::ALL
            .iter()
            .map(|&opcode| (opcode, opcode.decoder()))
            .collect();
        Self {
            decoders,
            limits: config.limits.clone(),
        }
    }

    /// A dispatcher with no routes; add them with [`register`](Self::register).
    pub fn empty(config: &CodecConfig) -> Self {
        Self {
            decoders: HashMap::new(),
            limits: config.limits.clone(),
        }
    }

    /// Route `opcode` to `decoder`, replacing any previous route.
    pub fn register(&mut self, opcode: Opcode, decoder: DecodeFn) {
        self.decoders.insert(opcode, decoder);
    }

    pub fn supports(&self, opcode: Opcode) -> bool {
        self.decoders.contains_key(&opcode)
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    #[instrument(skip(self, payload), fields(opcode = opcode.name(), len = payload.len()))]
    pub fn decode(&self, opcode: Opcode, payload: &[u8]) -> Result<Message> {
        let _timer = Timer::start("decode");
        if payload.len() > self.limits.max_payload_size {
            global_metrics().decode_malformed();
            warn!(
                max = self.limits.max_payload_size,
                "Payload exceeds configured limit"
            );
            return Err(ProtocolError::OversizedPacket(payload.len()));
        }

        let decoder = self.decoders.get(&opcode).ok_or_else(|| {
            global_metrics().decode_malformed();
            ProtocolError::Malformed(format!("no decoder registered for {opcode}"))
        })?;

        let mut buf = WireBuffer::from_slice(payload);
        let message = decoder(&mut buf).map_err(|e| {
            if e.is_truncated() {
                global_metrics().decode_truncated();
            } else {
                global_metrics().decode_malformed();
            }
            debug!(error = %e, "Decode failed");
            e
        })?;

        let trailing = buf.remaining();
        if trailing > 0 {
            if self.limits.reject_trailing_bytes {
                global_metrics().decode_malformed();
                warn!(trailing, "Rejecting trailing bytes");
                return Err(ProtocolError::TrailingBytes(trailing));
            }
            debug!(trailing, "Ignoring trailing bytes");
        }

        global_metrics().message_decoded(buf.rpos() as u64);
        debug!(consumed = buf.rpos(), "Decoded message");
        Ok(message)
    }

    /// Encode a message body. Bodies over the inbound limit are still
    /// returned, with a warning.
    #[instrument(skip(self, message), fields(opcode = message.opcode().name()))]
    pub fn encode(&self, message: &Message) -> Bytes {
        let _timer = Timer::start("encode");
        let body = message.encode();
        global_metrics().message_encoded(body.len() as u64);
        debug!(len = body.len(), "Encoded message");
        if body.len() > self.limits.max_payload_size {
            warn!(
                len = body.len(),
                max = self.limits.max_payload_size,
                "Encoded body exceeds configured limit"
            );
        }
        body
    }
}
