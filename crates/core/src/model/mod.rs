mod ids;
mod progress;
mod quiz;
mod section;

pub use ids::{KeyError, ProgressKey, TopicKey, UserId};

pub use progress::{
    GroupedTopic, MAX_SCORE, ProgressIndex, ProgressUpdate, SaveOutcome, TopicKind,
    TopicProgressRecord, Viewer,
};
pub use quiz::{Question, QuizSessionState};
pub use section::SectionVisitationSnapshot;
