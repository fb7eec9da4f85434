//! Card system: the visitor-facing side of the Valentine card.
//!
//! A [`CardSession`] walks one visitor through envelope → opening → card →
//! answer and posts the answer through a [`ResponseSubmitter`].

pub mod effects;
pub mod session;
pub mod stage;
pub mod submitter;
pub mod terminal;

pub use effects::Effects;
pub use session::{CardSession, StageTransition, SubmissionState};
pub use stage::Stage;
pub use submitter::{HttpSubmitter, ResponseSubmitter};
