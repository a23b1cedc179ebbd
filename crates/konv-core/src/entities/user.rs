//! User entity - opaque external identity

use std::fmt;

use serde::{Deserialize, Serialize};

/// A channel owner, identified by the sender id of an inbound message.
///
/// Users have no lifecycle of their own; they exist as long as something
/// refers to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
