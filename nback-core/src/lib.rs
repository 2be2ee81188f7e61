pub mod phase;
pub mod stimulus;
pub mod trial;

pub use phase::{SessionPhase, TrialPhase};
pub use stimulus::{ParseStimulusKindError, Stimulus, StimulusKind};
pub use trial::{Outcome, TrialResponse};
