//! Card stage state machine.

use serde::{Deserialize, Serialize};

use crate::notifier::ResponseValue;

/// The single visible stage of a card session.
///
/// Progresses: Envelope → Opening → Card → (Yes | No). `No` can start over
/// back to `Envelope`; `Yes` ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Envelope,
    Opening,
    Card,
    Yes,
    No,
}

impl Stage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            (Envelope, Opening) | (Opening, Card) | (Card, Yes) | (Card, No) | (No, Envelope)
        )
    }

    /// Whether the session has ended for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Yes)
    }

    /// Stage reached by answering.
    pub fn for_response(response: ResponseValue) -> Stage {
        match response {
            ResponseValue::Yes => Self::Yes,
            ResponseValue::No => Self::No,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Envelope => "envelope",
            Self::Opening => "opening",
            Self::Card => "card",
            Self::Yes => "yes",
            Self::No => "no",
        };
        write!(f, "{s}")
    }
}
