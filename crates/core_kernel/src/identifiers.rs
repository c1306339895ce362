//! Strongly-typed surrogate identifiers
//!
//! Every entity table assigns monotonically increasing integer keys. Wrapping
//! them in newtypes prevents passing a seizure id where a violation id is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw surrogate key
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the underlying key
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(UserId, "USR");
define_id!(ViolationId, "VIO");
define_id!(SeizureId, "SEZ");
define_id!(InfractionId, "INF");
define_id!(EvidenceId, "EVD");
define_id!(ActivityLogId, "ACT");
define_id!(StatisticsId, "STAT");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_id_display() {
        let id = ViolationId::new(42);
        assert_eq!(id.to_string(), "VIO-42");
    }

    #[test]
    fn test_id_parsing() {
        let original = SeizureId::new(7);
        let parsed: SeizureId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
        let bare: SeizureId = "7".parse().unwrap();
        assert_eq!(bare, original);
    }

    #[test]
    fn test_ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&UserId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
