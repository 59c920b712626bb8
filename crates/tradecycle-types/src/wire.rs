//! Binary packet codec for the two client-to-server payloads.
//!
//! Layouts:
//!
//! | Packet | Length | Body |
//! |--------|--------|------|
//! | [`CYCLE_TRADE_CHANNEL`] | 0 | legacy, no preferences |
//! | [`CYCLE_TRADE_CHANNEL`] | 2 | `villager_flag`, `wandering_flag` |
//! | [`RELOAD_CONFIG_CHANNEL`] | 1 | legacy, `wandering_allowed` only |
//! | [`RELOAD_CONFIG_CHANNEL`] | 9 | `wandering_allowed`, `wandering_limit: i32 BE`, `villager_limit: i32 BE` |
//!
//! Booleans are a single byte, `0` or `1`. Anything else is rejected.

use crate::packets::{ConfigUpdateRequest, CycleTradeRequest};

/// Channel identifier for cycle requests.
pub const CYCLE_TRADE_CHANNEL: &str = "tradecycle:cycle_trade";

/// Channel identifier for config updates.
pub const RELOAD_CONFIG_CHANNEL: &str = "tradecycle:reload_config";

/// Errors produced while decoding or encoding a packet body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The body length matches neither the current nor the legacy layout.
    #[error("{channel}: unexpected body length {len}")]
    UnexpectedLength {
        /// Channel the body arrived on.
        channel: &'static str,
        /// Actual body length in bytes.
        len: usize,
    },

    /// A boolean field held something other than 0 or 1.
    #[error("{channel}: invalid boolean byte {byte:#04x}")]
    InvalidBool {
        /// Channel the body arrived on.
        channel: &'static str,
        /// The offending byte.
        byte: u8,
    },

    /// A config update with exactly one limit set has no binary layout.
    #[error("tradecycle:reload_config: cannot encode an update with only one limit")]
    PartialConfigUpdate,
}

const fn read_bool(channel: &'static str, byte: u8) -> Result<bool, WireError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(WireError::InvalidBool { channel, byte }),
    }
}

/// Decode a cycle request body.
pub fn decode_cycle_trade(body: &[u8]) -> Result<CycleTradeRequest, WireError> {
    match *body {
        [] => Ok(CycleTradeRequest::legacy()),
        [villager, wandering] => Ok(CycleTradeRequest {
            show_villager_success: Some(read_bool(CYCLE_TRADE_CHANNEL, villager)?),
            show_wandering_success: Some(read_bool(CYCLE_TRADE_CHANNEL, wandering)?),
        }),
        _ => Err(WireError::UnexpectedLength {
            channel: CYCLE_TRADE_CHANNEL,
            len: body.len(),
        }),
    }
}

/// Encode a cycle request body. Legacy requests encode to an empty body;
/// a request with one flag missing encodes that flag as `false`.
pub fn encode_cycle_trade(request: &CycleTradeRequest) -> Vec<u8> {
    if request.is_legacy() {
        return Vec::new();
    }
    vec![
        u8::from(request.show_villager_success.unwrap_or(false)),
        u8::from(request.show_wandering_success.unwrap_or(false)),
    ]
}

/// Decode a config update body.
pub fn decode_config_update(body: &[u8]) -> Result<ConfigUpdateRequest, WireError> {
    match *body {
        [allowed] => Ok(ConfigUpdateRequest::legacy(read_bool(
            RELOAD_CONFIG_CHANNEL,
            allowed,
        )?)),
        [allowed, w0, w1, w2, w3, v0, v1, v2, v3] => Ok(ConfigUpdateRequest {
            wandering_allowed: read_bool(RELOAD_CONFIG_CHANNEL, allowed)?,
            wandering_cycle_limit: Some(i32::from_be_bytes([w0, w1, w2, w3])),
            villager_cycle_limit: Some(i32::from_be_bytes([v0, v1, v2, v3])),
        }),
        _ => Err(WireError::UnexpectedLength {
            channel: RELOAD_CONFIG_CHANNEL,
            len: body.len(),
        }),
    }
}

/// Encode a config update body.
pub fn encode_config_update(update: &ConfigUpdateRequest) -> Result<Vec<u8>, WireError> {
    match (update.wandering_cycle_limit, update.villager_cycle_limit) {
        (None, None) => Ok(vec![u8::from(update.wandering_allowed)]),
        (Some(wandering), Some(villager)) => {
            let mut body = Vec::with_capacity(9);
            body.push(u8::from(update.wandering_allowed));
            body.extend_from_slice(&wandering.to_be_bytes());
            body.extend_from_slice(&villager.to_be_bytes());
            Ok(body)
        }
        _ => Err(WireError::PartialConfigUpdate),
    }
}
