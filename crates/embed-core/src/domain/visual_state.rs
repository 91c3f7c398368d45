//! Display modes of the embedded widget.
//!
//! Each mode is a CSS class on the iframe.  Exactly one applies at a time, so
//! a transition removes the other three classes before adding the new one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four mutually exclusive widget display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    Init,
    Normal,
    Expanded,
    Closed,
}

impl VisualState {
    /// Every state, in declaration order.
    pub const ALL: [VisualState; 4] = [
        VisualState::Init,
        VisualState::Normal,
        VisualState::Expanded,
        VisualState::Closed,
    ];

    /// The CSS class that represents this state on the frame.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Normal => "normal",
            Self::Expanded => "expanded",
            Self::Closed => "closed",
        }
    }

    /// The three classes a transition into `self` removes.
    pub fn replaced_classes(self) -> impl Iterator<Item = &'static str> {
        Self::ALL
            .into_iter()
            .filter(move |state| *state != self)
            .map(VisualState::class_name)
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Returned when a `state` string is not one of the four modes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown visual state `{0}`")]
pub struct UnknownVisualState(pub String);

impl FromStr for VisualState {
    type Err = UnknownVisualState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.class_name() == s)
            .ok_or_else(|| UnknownVisualState(s.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
