use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::LogHash;

/// Identifier of the append-only consensus log stream a batch is linked to.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TypeError::EmptyChannel);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({})", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chain-validation resume point for one channel.
///
/// Exists only for the duration of one reconciliation; never persisted.
/// Starting from [`ChannelState::genesis`], each successfully validated
/// page advances the state so the next page can be checked without
/// re-reading the prefix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// Running hash of the last validated entry, `None` before genesis.
    pub last_running_hash: Option<LogHash>,
    /// Sequence number of the last validated entry, `None` before genesis.
    pub validated_up_to: Option<u64>,
}

impl ChannelState {
    /// State before any entry has been validated.
    pub fn genesis() -> Self {
        Self::default()
    }

    /// Resume point at a known position in the chain.
    pub fn at(running_hash: LogHash, seq: u64) -> Self {
        Self {
            last_running_hash: Some(running_hash),
            validated_up_to: Some(seq),
        }
    }

    /// The sequence number the next entry must carry.
    pub fn next_seq(&self) -> u64 {
        self.validated_up_to.map_or(1, |s| s + 1)
    }
}
