//! Opaque identifier types exchanged with agents and clients.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! opaque_string_id {
    ($name:ident, $kind:literal) => {
        #[doc = concat!("Opaque ", $kind, " identifier, supplied by the caller at registration time.")]
        #[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier after validating it is non-empty.
            ///
            /// # Errors
            ///
            /// Returns [`Error::InvalidId`] when the supplied string is empty or
            /// made up entirely of whitespace.
            pub fn new(id: impl Into<String>) -> crate::error::Result<Self> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(Error::InvalidId {
                        kind: $kind,
                        reason: "identifier cannot be empty",
                    });
                }
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

opaque_string_id!(AgentId, "agent");
opaque_string_id!(ClientId, "client");
