//! Wire references to elements and shadow roots.
//!
//! Both cross the wire as single-key objects keyed by a fixed marker, for
//! example `{"element-6066-11e4-a52e-4f735466cecf": "e1"}`.

use serde::{Deserialize, Serialize};

/// Marker key of an element reference.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// Marker key of a shadow-root reference.
pub const SHADOW_ROOT_KEY: &str = "shadow-6066-11e4-a52e-4f735466cecf";

/// Opaque handle of a remote element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    id: String,
}

impl ElementRef {
    /// Wraps a raw element id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Raw element id, as substituted for `$[element]`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Opaque handle of a remote shadow root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShadowRootRef {
    #[serde(rename = "shadow-6066-11e4-a52e-4f735466cecf")]
    id: String,
}

impl ShadowRootRef {
    /// Wraps a raw shadow-root id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Raw shadow-root id, as substituted for `$[shadow]`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}
