//! Single-choice selection of a transparency ("ghost") reason.

/// The fixed reasons offered when lowering another member's transparency.
pub const GHOST_REASONS: [&str; 6] = [
    "Disparaging or belittling others",
    "Hate speech or discriminatory remarks",
    "Spam or promotional content",
    "Sexual or inappropriate content",
    "Impersonation or misleading information",
    "Other behaviour that makes people uncomfortable",
];

/// Error returned by [`ReasonSelector`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReasonError {
    #[error("no reason selected")]
    EmptySelection,
    #[error("reason index {index} out of range (have {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Radio-button style selector over [`GHOST_REASONS`].
///
/// At most one option is selected at a time. Confirming with nothing
/// selected fails and raises the warning flag the popup shows inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasonSelector {
    selected: Option<usize>,
    warning: bool,
}

impl ReasonSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// All options, in display order.
    pub fn options(&self) -> &'static [&'static str] {
        &GHOST_REASONS
    }

    /// Select the option at `index` (zero-based), replacing any previous
    /// selection.
    pub fn select(&mut self, index: usize) -> Result<(), ReasonError> {
        if index >= GHOST_REASONS.len() {
            return Err(ReasonError::OutOfRange {
                index,
                len: GHOST_REASONS.len(),
            });
        }
        self.selected = Some(index);
        self.warning = false;
        Ok(())
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_text(&self) -> Option<&'static str> {
        self.selected.map(|index| GHOST_REASONS[index])
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected == Some(index)
    }

    /// Whether the "pick a reason" warning should be visible.
    pub fn warning_visible(&self) -> bool {
        self.warning
    }

    /// Take the selected reason and clear the selector for next use.
    pub fn confirm(&mut self) -> Result<&'static str, ReasonError> {
        match self.selected.take() {
            Some(index) => {
                self.warning = false;
                Ok(GHOST_REASONS[index])
            }
            None => {
                self.warning = true;
                Err(ReasonError::EmptySelection)
            }
        }
    }

    /// Dismiss without producing a reason.
    pub fn cancel(&mut self) {
        self.selected = None;
        self.warning = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_without_selection_fails() {
        let mut selector = ReasonSelector::new();
        assert_eq!(selector.confirm(), Err(ReasonError::EmptySelection));
        assert!(selector.warning_visible());
    }

    #[test]
    fn confirm_returns_selected_text_and_resets() {
        let mut selector = ReasonSelector::new();
        selector.select(2).unwrap();
        assert_eq!(selector.confirm(), Ok(GHOST_REASONS[2]));
        assert_eq!(selector.selected(), None);
        assert_eq!(selector.confirm(), Err(ReasonError::EmptySelection));
    }

    #[test]
    fn selection_is_exclusive() {
        let mut selector = ReasonSelector::new();
        selector.select(0).unwrap();
        selector.select(4).unwrap();
        assert!(!selector.is_selected(0));
        assert!(selector.is_selected(4));
        assert_eq!(selector.selected_text(), Some(GHOST_REASONS[4]));
    }

    #[test]
    fn select_clears_warning() {
        let mut selector = ReasonSelector::new();
        let _ = selector.confirm();
        assert!(selector.warning_visible());

        selector.select(1).unwrap();
        assert!(!selector.warning_visible());
    }

    #[test]
    fn cancel_drops_selection() {
        let mut selector = ReasonSelector::new();
        selector.select(5).unwrap();
        selector.cancel();
        assert_eq!(selector.selected(), None);
        assert!(!selector.warning_visible());
    }

    #[test]
    fn out_of_range_keeps_previous_selection() {
        let mut selector = ReasonSelector::new();
        selector.select(3).unwrap();
        assert_eq!(
            selector.select(6),
            Err(ReasonError::OutOfRange { index: 6, len: 6 })
        );
        assert!(selector.is_selected(3));
    }
}
