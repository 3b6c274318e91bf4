use serde::{Deserialize, Serialize};

/// Where a board entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardOrigin {
    /// Matched by a board selector
    Markup,
    /// Synthesized from a `/board/{id}` hyperlink
    Link,
    /// Built-in known board
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub description: String,
    pub origin: BoardOrigin,
}

impl Board {
    pub fn new(id: impl Into<String>, name: impl Into<String>, origin: BoardOrigin) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            origin,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == BoardOrigin::Builtin
    }
}
