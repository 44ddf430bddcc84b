//! Broker releases, used to pick the newest protocol version a broker accepts

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use wirelog_common::{Error, Result};

/// A Kafka broker release such as `0.10.2.0` or `2.1.0`.
///
/// Releases compare component by component, so `V0_11_0_0 < V1_0_0_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct KafkaRelease([u32; 4]);

impl KafkaRelease {
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self([major, minor, patch, build])
    }

    pub const V0_8_2_0: Self = Self::new(0, 8, 2, 0);
    pub const V0_9_0_0: Self = Self::new(0, 9, 0, 0);
    pub const V0_10_0_0: Self = Self::new(0, 10, 0, 0);
    pub const V0_10_1_0: Self = Self::new(0, 10, 1, 0);
    pub const V0_10_2_0: Self = Self::new(0, 10, 2, 0);
    pub const V0_11_0_0: Self = Self::new(0, 11, 0, 0);
    pub const V1_0_0_0: Self = Self::new(1, 0, 0, 0);
    pub const V1_1_0_0: Self = Self::new(1, 1, 0, 0);
    pub const V2_0_0_0: Self = Self::new(2, 0, 0, 0);
    pub const V2_1_0_0: Self = Self::new(2, 1, 0, 0);
    pub const V2_2_0_0: Self = Self::new(2, 2, 0, 0);
    pub const V2_3_0_0: Self = Self::new(2, 3, 0, 0);
    pub const V2_8_0_0: Self = Self::new(2, 8, 0, 0);

    /// Oldest release with a known protocol version.
    pub const MIN: Self = Self::V0_8_2_0;
    /// Newest release in the table.
    pub const MAX: Self = Self::V2_8_0_0;

    pub fn is_at_least(self, other: KafkaRelease) -> bool {
        self >= other
    }
}

impl Default for KafkaRelease {
    fn default() -> Self {
        Self::V2_1_0_0
    }
}

impl fmt::Display for KafkaRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch, build] = self.0;
        if major == 0 {
            write!(f, "{}.{}.{}.{}", major, minor, patch, build)
        } else {
            write!(f, "{}.{}.{}", major, minor, patch)
        }
    }
}

impl FromStr for KafkaRelease {
    type Err = Error;

    /// Accepts `0.10.2.0`-style and `2.1.0`-style strings.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("invalid Kafka release: {s:?}"));
        let parts = s
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        match parts[..] {
            [major, minor, patch] if major > 0 => Ok(Self::new(major, minor, patch, 0)),
            [major, minor, patch, build] => Ok(Self::new(major, minor, patch, build)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for KafkaRelease {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}
