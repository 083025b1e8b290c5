#[cfg(coverage)]
pub(super) fn has_terminal() -> bool {
    false
}

#[cfg(coverage)]
pub(super) fn run_tui_ratatui_mode(
    session: &mut super::Session,
    _title: &str,
) -> Result<i32, vn_core::NovelError> {
    super::run_line_mode(session)
}

#[cfg(not(coverage))]
mod rich {
    use std::io;
    use std::time::{Duration, Instant};

    use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use crossterm::terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    };
    use crossterm::ExecutableCommand;
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;
    use vn_core::NovelError;

    use crate::tui_render::render_tui;
    use crate::tui_state::TuiUiState;
    use crate::{map_tui_io, Session};

    const TYPEWRITER_CHARS_PER_SECOND: u64 = 60;
    const FRAME_TICK: Duration = Duration::from_millis(1000 / TYPEWRITER_CHARS_PER_SECOND);

    struct TuiTerminal {
        terminal: Terminal<CrosstermBackend<io::Stdout>>,
    }

    impl TuiTerminal {
        fn new() -> Result<Self, NovelError> {
            enable_raw_mode().map_err(map_tui_io)?;
            io::stdout()
                .execute(EnterAlternateScreen)
                .map_err(map_tui_io)?;
            let terminal = Terminal::new(CrosstermBackend::new(io::stdout())).map_err(map_tui_io)?;
            Ok(Self { terminal })
        }
    }

    impl Drop for TuiTerminal {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
            let _ = io::stdout().execute(LeaveAlternateScreen);
        }
    }

    pub(super) fn run_tui_ratatui_mode(
        session: &mut Session,
        title: &str,
    ) -> Result<i32, NovelError> {
        let mut terminal = TuiTerminal::new()?;
        let mut ui = TuiUiState::with_status("ready");
        let clock = Instant::now();
        session.start()?;

        loop {
            session.tick(clock.elapsed());
            let view = session.view();
            ui.sync(&view, session.sequencer().state().generation);
            ui.advance_typewriter(&view);

            terminal
                .terminal
                .draw(|frame| render_tui(frame, &ui, &view, title))
                .map_err(map_tui_io)?;

            if !event::poll(FRAME_TICK).map_err(map_tui_io)? {
                continue;
            }
            if let Event::Key(key) = event::read().map_err(map_tui_io)? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let should_quit = match handle_key(key, session, &mut ui) {
                    Ok(should_quit) => should_quit,
                    Err(error) => {
                        ui.status = error.message;
                        false
                    }
                };
                if should_quit {
                    break;
                }
            }
        }

        Ok(0)
    }

    fn handle_key(
        key: KeyEvent,
        session: &mut Session,
        ui: &mut TuiUiState,
    ) -> Result<bool, NovelError> {
        if key.code == KeyCode::Esc || matches!(key.code, KeyCode::Char('q')) {
            return Ok(true);
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        let view = session.view();
        match key.code {
            KeyCode::Char('h') => ui.help_visible = !ui.help_visible,
            KeyCode::Char('r') => {
                session.start()?;
                ui.status = "restarted".to_string();
            }
            KeyCode::Up if ui.choices_enabled(&view) => ui.move_up(),
            KeyCode::Down if ui.choices_enabled(&view) => ui.move_down(view.choices.len()),
            KeyCode::Enter if ui.typing_in_progress(&view) => ui.finish_typewriter(&view),
            KeyCode::Enter if ui.choices_enabled(&view) => {
                let selected = ui.selected_choice_index;
                let outcome = session.choose(selected)?;
                ui.status = format!("chose {} -> {}", selected, outcome.scene_id());
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Enter => {
                ui.status = if session.is_revealed() {
                    "no pending choice".to_string()
                } else {
                    "waiting for scene...".to_string()
                };
            }
            _ => {}
        }
        Ok(false)
    }
}

/// Full-screen mode needs both stdin and stdout attached to a terminal.
#[cfg(not(coverage))]
pub(super) fn has_terminal() -> bool {
    use std::io::IsTerminal;

    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

#[cfg(not(coverage))]
pub(super) fn run_tui_ratatui_mode(
    session: &mut super::Session,
    title: &str,
) -> Result<i32, vn_core::NovelError> {
    rich::run_tui_ratatui_mode(session, title)
}
