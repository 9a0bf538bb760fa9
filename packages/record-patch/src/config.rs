//! Patch engine configuration.

use serde::{Deserialize, Serialize};

use crate::fold::FoldMode;
use crate::schema::CollisionPolicy;
use crate::value::CoercionPolicy;

/// Patch engine configuration.
///
/// Deserializable with missing keys falling back to defaults, so it can be
/// embedded in a host service's own configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Folding of identifiers into default external names
    pub fold_mode: FoldMode,
    /// Handling of external name collisions at schema build time
    pub collisions: CollisionPolicy,
    /// Conversions accepted for incoming values
    pub coercion: CoercionPolicy,
    /// Emit a debug event for every field that fell back to the existing or
    /// zero value
    pub trace_fallbacks: bool,
}

impl PatchConfig {
    /// Configuration reproducing legacy behavior: legacy folding and
    /// last-declared-wins collisions.
    pub fn legacy() -> Self {
        Self {
            fold_mode: FoldMode::Legacy,
            collisions: CollisionPolicy::LastWins,
            ..Default::default()
        }
    }
}
