use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Failure to read an id from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

/// Integer-backed id newtype. Prints bare in `Display`, tagged in `Debug`, and
/// parses from trimmed decimal text.
macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                })
            }
        }
    };
}

integer_id!(
    /// A flashcard.
    CardId
);
integer_id!(
    /// A flashcard set, the unit a quiz is taken on and rewarded for.
    SetId
);
integer_id!(
    /// A category, which owns a point counter and a level.
    CategoryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_id_display_and_parse() {
        let id = SetId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(" 42 ".parse::<SetId>().unwrap(), id);
    }

    #[test]
    fn parse_error_names_the_id_kind() {
        let err = "abc".parse::<CategoryId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse CategoryId from string");
        assert!("-1".parse::<CardId>().is_err());
    }

    #[test]
    fn debug_is_tagged() {
        assert_eq!(format!("{:?}", CardId::new(7)), "CardId(7)");
        assert_eq!(format!("{:?}", SetId::new(3)), "SetId(3)");
    }
}
