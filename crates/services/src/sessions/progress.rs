/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub current_index: usize,
    /// Position of the current question, unrounded.
    pub percent: f64,
}
