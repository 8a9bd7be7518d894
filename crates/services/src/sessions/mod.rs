mod progress;
mod quiz;
mod theory;
mod workflow;

// Public API of the session subsystem.
pub use progress::QuizProgress;
pub use quiz::{QuizResult, QuizSession};
pub use theory::TheoryPageSession;
pub use workflow::{QuizLoopService, TheoryLoopService};
