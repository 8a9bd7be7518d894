use std::collections::HashSet;

/// Evidence collected for one learning unit during one session.
///
/// Rebuilt client-side on every visit and never persisted. `required` keeps
/// the order it was declared in, without duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionVisitationSnapshot {
    visited: HashSet<String>,
    required: Vec<String>,
    scroll_percent: Option<f64>,
}

impl SectionVisitationSnapshot {
    /// Creates an empty snapshot for the given required sections.
    ///
    /// Repeated ids are dropped, keeping the first occurrence.
    #[must_use]
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let required = required
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| seen.insert(id.clone()))
            .collect();
        Self {
            visited: HashSet::new(),
            required,
            scroll_percent: None,
        }
    }

    #[must_use]
    pub fn with_visited<I, S>(mut self, visited: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visited.extend(visited.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_scroll_percent(mut self, percent: f64) -> Self {
        self.scroll_percent = Some(percent);
        self
    }

    /// Records a visited section. Returns `true` if it was not seen before.
    pub fn visit(&mut self, section_id: impl Into<String>) -> bool {
        self.visited.insert(section_id.into())
    }

    pub fn set_scroll_percent(&mut self, percent: f64) {
        self.scroll_percent = Some(percent);
    }

    #[must_use]
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    #[must_use]
    pub fn scroll_percent(&self) -> Option<f64> {
        self.scroll_percent
    }

    /// Number of required sections present in the visited set.
    #[must_use]
    pub fn visited_required_count(&self) -> usize {
        self.required
            .iter()
            .filter(|id| self.visited.contains(*id))
            .count()
    }

    /// True when at least one section is required and all of them were visited.
    #[must_use]
    pub fn all_required_visited(&self) -> bool {
        !self.required.is_empty() && self.visited_required_count() == self.required.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_ids_are_deduplicated_in_order() {
        let snapshot = SectionVisitationSnapshot::new(["intro", "body", "intro", "outro"]);
        assert_eq!(snapshot.required(), ["intro", "body", "outro"]);
    }

    #[test]
    fn unrelated_visits_do_not_count() {
        let snapshot =
            SectionVisitationSnapshot::new(["a", "b"]).with_visited(["a", "sidebar"]);
        assert_eq!(snapshot.visited_required_count(), 1);
        assert!(!snapshot.all_required_visited());
    }

    #[test]
    fn empty_requirements_are_never_all_visited() {
        let snapshot = SectionVisitationSnapshot::new(Vec::<String>::new()).with_visited(["a"]);
        assert!(!snapshot.all_required_visited());
    }

    #[test]
    fn visit_reports_new_sections() {
        let mut snapshot = SectionVisitationSnapshot::new(["a"]);
        assert!(snapshot.visit("a"));
        assert!(!snapshot.visit("a"));
    }
}
