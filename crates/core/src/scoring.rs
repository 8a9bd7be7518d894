use crate::model::{MAX_SCORE, Question};

/// Points granted for each correctly answered question.
pub const POINTS_PER_CORRECT_ANSWER: u32 = 20;

/// Counts answers matching their question's correct option.
///
/// Unanswered slots and slots without a matching question never count.
#[must_use]
pub fn count_correct(answers: &[Option<usize>], questions: &[Question]) -> usize {
    answers
        .iter()
        .enumerate()
        .filter(|(i, answer)| match (answer, questions.get(*i)) {
            (Some(choice), Some(question)) => question.is_correct(*choice),
            _ => false,
        })
        .count()
}

/// Final score of an attempt, 0 to 100.
///
/// Rounds half away from zero, so `2/3` gives 67 and `1/8` (12.5) gives 13.
/// An empty quiz scores 0.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = correct as f64 / total as f64 * 100.0;
    ratio.round().min(f64::from(MAX_SCORE)) as u8
}

#[must_use]
pub fn points_from_correct(correct: usize) -> u32 {
    u32::try_from(correct)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_CORRECT_ANSWER)
}

/// Position indicator for the question at `current_index`.
///
/// Not rounded: this drives a continuous progress bar, not a stored score.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn question_progress_percent(current_index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (current_index + 1) as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Question::new(
                    format!("Q{i}"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    *c,
                )
            })
            .collect()
    }

    #[test]
    fn counts_only_matching_answers() {
        let qs = questions(&[0, 1, 2, 3]);
        let answers = [Some(0), Some(2), None, Some(3)];
        assert_eq!(count_correct(&answers, &qs), 2);
    }

    #[test]
    fn answers_beyond_questions_never_match() {
        let qs = questions(&[1]);
        let answers = [Some(1), Some(0), Some(1)];
        assert_eq!(count_correct(&answers, &qs), 1);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(7, 10), 70);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(10, 10), 100);
    }

    #[test]
    fn percentage_of_empty_quiz_is_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn percentage_never_exceeds_hundred() {
        assert_eq!(percentage(12, 10), 100);
    }

    #[test]
    fn points_are_twenty_per_answer() {
        assert_eq!(points_from_correct(0), 0);
        assert_eq!(points_from_correct(3), 60);
    }

    #[test]
    fn progress_percent_is_unrounded() {
        assert!((question_progress_percent(0, 3) - 100.0 / 3.0).abs() < 1e-9);
        assert!((question_progress_percent(2, 3) - 100.0).abs() < 1e-9);
        assert!(question_progress_percent(4, 0).abs() < f64::EPSILON);
    }
}
