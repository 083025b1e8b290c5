use crate::stage::StageView;

pub(crate) const CHOICE_VIEWPORT_ROWS: usize = 5;

/// Front-end state layered over the stage: typewriter progress, the choice
/// cursor, help and the status line.
#[derive(Debug, Default)]
pub(crate) struct TuiUiState {
    pub(crate) typed_chars: usize,
    pub(crate) selected_choice_index: usize,
    pub(crate) choice_scroll_offset: usize,
    pub(crate) help_visible: bool,
    pub(crate) status: String,
    generation: Option<u64>,
}

impl TuiUiState {
    pub(crate) fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    /// Resets per-scene state when a new transition has started.
    pub(crate) fn sync(&mut self, view: &StageView, generation: u64) {
        if self.generation != Some(generation) {
            self.generation = Some(generation);
            self.typed_chars = 0;
            self.selected_choice_index = 0;
            self.choice_scroll_offset = 0;
        }
        if !view.revealed {
            self.typed_chars = 0;
        }
    }

    pub(crate) fn typing_in_progress(&self, view: &StageView) -> bool {
        view.revealed && self.typed_chars < view.text.chars().count()
    }

    pub(crate) fn advance_typewriter(&mut self, view: &StageView) -> bool {
        if !self.typing_in_progress(view) {
            return false;
        }
        self.typed_chars += 1;
        true
    }

    pub(crate) fn finish_typewriter(&mut self, view: &StageView) {
        self.typed_chars = view.text.chars().count();
    }

    pub(crate) fn visible_text(&self, view: &StageView) -> String {
        if !view.revealed {
            return String::new();
        }
        view.text.chars().take(self.typed_chars).collect()
    }

    /// Choices are offered once the panel is revealed and the text is typed.
    pub(crate) fn choices_enabled(&self, view: &StageView) -> bool {
        view.revealed && !self.typing_in_progress(view) && !view.choices.is_empty()
    }

    pub(crate) fn move_up(&mut self) {
        self.selected_choice_index = self.selected_choice_index.saturating_sub(1);
        if self.selected_choice_index < self.choice_scroll_offset {
            self.choice_scroll_offset = self.selected_choice_index;
        }
    }

    pub(crate) fn move_down(&mut self, choice_count: usize) {
        let last = choice_count.saturating_sub(1);
        self.selected_choice_index = (self.selected_choice_index + 1).min(last);
        if self.selected_choice_index >= self.choice_scroll_offset + CHOICE_VIEWPORT_ROWS {
            self.choice_scroll_offset = self.selected_choice_index + 1 - CHOICE_VIEWPORT_ROWS;
        }
    }
}

#[cfg(test)]
mod tui_state_tests {
    use super::*;
    use vn_core::ChoiceControl;

    fn view(text: &str, revealed: bool, choices: usize) -> StageView {
        StageView {
            text: text.to_string(),
            revealed,
            choices: (0..choices)
                .map(|index| ChoiceControl {
                    index,
                    label: format!("choice {}", index),
                    target: format!("scene{}", index),
                })
                .collect(),
            ..StageView::default()
        }
    }

    #[test]
    fn typewriter_waits_for_reveal() {
        let hidden = view("Hi", false, 0);
        let mut ui = TuiUiState::default();
        ui.sync(&hidden, 1);
        assert!(!ui.advance_typewriter(&hidden));
        assert_eq!(ui.visible_text(&hidden), "");

        let shown = view("Hi", true, 1);
        assert!(ui.advance_typewriter(&shown));
        assert_eq!(ui.visible_text(&shown), "H");
        assert!(!ui.choices_enabled(&shown));
        assert!(ui.advance_typewriter(&shown));
        assert!(!ui.advance_typewriter(&shown));
        assert!(ui.choices_enabled(&shown));
    }

    #[test]
    fn new_generation_resets_cursor_and_text() {
        let shown = view("Hello", true, 3);
        let mut ui = TuiUiState::default();
        ui.sync(&shown, 1);
        ui.finish_typewriter(&shown);
        ui.move_down(3);
        assert_eq!(ui.selected_choice_index, 1);

        ui.sync(&shown, 1);
        assert_eq!(ui.selected_choice_index, 1);
        ui.sync(&shown, 2);
        assert_eq!(ui.selected_choice_index, 0);
        assert_eq!(ui.typed_chars, 0);
    }

    #[test]
    fn cursor_scrolls_within_viewport() {
        let mut ui = TuiUiState::with_status("ready");
        for _ in 0..7 {
            ui.move_down(7);
        }
        assert_eq!(ui.selected_choice_index, 6);
        assert_eq!(ui.choice_scroll_offset, 2);
        for _ in 0..6 {
            ui.move_up();
        }
        assert_eq!(ui.selected_choice_index, 0);
        assert_eq!(ui.choice_scroll_offset, 0);
        assert_eq!(ui.status, "ready");
    }
}
