//! Prefixed identifiers for discussions, ideas and messages.
//!
//! Ids are minted as `<kind>-<uuid v4>`. Ideas are the only records whose ids
//! travel through generated text (the moderator is asked to echo them), so
//! [`IdeaId::is_minted`] tells a real id apart from a title or an invented
//! token a model wrote in its place.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! prefixed_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Kind prefix written before the uuid.
            pub const PREFIX: &'static str = $prefix;

            /// Mints a fresh id.
            pub fn new() -> Self {
                Self(format!("{}-{}", Self::PREFIX, Uuid::new_v4()))
            }

            /// Wraps an existing id string without checking it.
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether `s` has the shape of an id of this kind.
            pub fn is_minted(s: &str) -> bool {
                s.strip_prefix(Self::PREFIX)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .is_some_and(|uuid| Uuid::parse_str(uuid).is_ok())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

prefixed_id!(
    /// Identifies one discussion, and its entry in a session store.
    DiscussionId,
    "disc"
);
prefixed_id!(
    /// Identifies an idea for the lifetime of its discussion.
    IdeaId,
    "idea"
);
prefixed_id!(
    /// Identifies a transcript message.
    MessageId,
    "msg"
);
