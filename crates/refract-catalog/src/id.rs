//! Transform identifiers, categories and kinds.

use serde::{Deserialize, Serialize};

/// Identifier of a catalog transform.
///
/// Ids are 1-based; 0 is reserved and never names a transform. The
/// built-in catalog uses 1 through 50.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformId(u16);

impl TransformId {
    /// Wraps a raw id. Returns `None` for the reserved id 0.
    pub const fn new(raw: u16) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    pub(crate) const fn builtin(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl core::fmt::Display for TransformId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Catalog grouping used by the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// EQ, gain, dynamics and speed basics.
    Basic,
    /// Voice characters.
    Vocal,
    /// Space, width and movement.
    Spatial,
    /// Vintage media emulation.
    Retro,
    /// Destructive and composite transforms.
    Experimental,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Self::Basic,
        Self::Vocal,
        Self::Spatial,
        Self::Retro,
        Self::Experimental,
    ];

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Vocal => "Vocal",
            Self::Spatial => "Spatial",
            Self::Retro => "Retro",
            Self::Experimental => "Experimental",
        }
    }
}

/// What a transform's constructor does to the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Inserts one or more effect nodes.
    Stage,
    /// Inserts nothing and only requests a playback rate.
    RateOnly,
    /// Chains other transforms or several processors as one unit.
    Composite,
}
