//! Publication channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Publication track for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Tagged, user-facing builds.
    Release,
    /// Every build.
    Nightly,
}

impl Channel {
    /// The serialized form, also used in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Release => "release",
            Channel::Nightly => "nightly",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(Channel::Release),
            "nightly" => Ok(Channel::Nightly),
            other => Err(UnknownChannel(other.to_string())),
        }
    }
}

/// Error for channel strings outside the known set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown channel '{0}', expected 'release' or 'nightly'")]
pub struct UnknownChannel(pub String);
