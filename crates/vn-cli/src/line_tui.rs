use std::io::{self, BufRead, Write};

use vn_core::NovelError;

use crate::stage::LayerContent;
use crate::{map_tui_io, Session};

const LINE_COMMANDS: &str = "commands: <index> :help :restart :quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineAction {
    Continue,
    Refresh,
    Quit,
    NotHandled,
}

pub(crate) fn run_line_mode(session: &mut Session) -> Result<i32, NovelError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_line_mode_with_io(session, &mut reader, &mut writer)
}

/// Plays on a simulated clock: each scene is settled before it is printed.
pub(crate) fn run_line_mode_with_io(
    session: &mut Session,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, NovelError> {
    writeln!(writer, "tablenovel").map_err(map_tui_io)?;
    writeln!(writer, "{}", LINE_COMMANDS).map_err(map_tui_io)?;
    session.start()?;
    session.settle();

    loop {
        write_scene(session, writer)?;
        if session.view().choices.is_empty() {
            writeln!(writer, "[END]").map_err(map_tui_io)?;
            return Ok(0);
        }

        loop {
            let Some(raw) = prompt_input_from("> ", reader, writer)? else {
                return Ok(0);
            };
            match handle_line_command(raw.as_str(), session, writer)? {
                LineAction::Continue => continue,
                LineAction::Refresh => break,
                LineAction::Quit => return Ok(0),
                LineAction::NotHandled => {}
            }
            let choice = match raw.trim().parse::<usize>() {
                Ok(choice) => choice,
                Err(_) => {
                    writeln!(writer, "invalid choice index: {}", raw).map_err(map_tui_io)?;
                    continue;
                }
            };
            if let Err(error) = session.choose(choice) {
                writeln!(writer, "{}", error).map_err(map_tui_io)?;
                continue;
            }
            session.settle();
            break;
        }
    }
}

pub(crate) fn handle_line_command(
    raw: &str,
    session: &mut Session,
    writer: &mut dyn Write,
) -> Result<LineAction, NovelError> {
    match raw.trim() {
        ":help" => {
            writeln!(writer, "{}", LINE_COMMANDS).map_err(map_tui_io)?;
            Ok(LineAction::Continue)
        }
        ":restart" => {
            session.start()?;
            session.settle();
            writeln!(writer, "restarted").map_err(map_tui_io)?;
            Ok(LineAction::Refresh)
        }
        ":quit" => {
            writeln!(writer, "bye").map_err(map_tui_io)?;
            Ok(LineAction::Quit)
        }
        _ => Ok(LineAction::NotHandled),
    }
}

fn write_scene(session: &Session, writer: &mut dyn Write) -> Result<(), NovelError> {
    let view = session.view();
    writeln!(writer).map_err(map_tui_io)?;
    if let Some(front) = view.front() {
        let background = match &view.layer(front).content {
            LayerContent::Image(path) => format!("image {}", path.display()),
            LayerContent::Fill(color) => format!("fill {}", color),
            LayerContent::Empty => "empty".to_string(),
        };
        writeln!(writer, "[background] {}", background).map_err(map_tui_io)?;
    }
    if let Some(source) = &view.music.source {
        writeln!(
            writer,
            "[music] {} {:.2}{}",
            source.display(),
            view.music.volume,
            if view.music.playing { "" } else { " (paused)" }
        )
        .map_err(map_tui_io)?;
    }
    match &view.diagnostic {
        Some(diagnostic) => writeln!(writer, "{}", diagnostic).map_err(map_tui_io)?,
        None => writeln!(writer, "{}", view.text).map_err(map_tui_io)?,
    }
    for choice in &view.choices {
        writeln!(writer, "  [{}] {}", choice.index, choice.label).map_err(map_tui_io)?;
    }
    Ok(())
}

/// Returns `None` once input is exhausted.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, NovelError> {
    write!(writer, "{}", prefix).map_err(map_tui_io)?;
    writer.flush().map_err(map_tui_io)?;
    let mut input = String::new();
    if reader.read_line(&mut input).map_err(map_tui_io)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

#[cfg(test)]
mod line_tui_tests {
    use super::*;
    use crate::cli_test_support::*;
    use crate::open_session;
    use crate::{resolve_settings, StoryArgs};
    use std::io::Cursor;

    fn play(input: &str) -> String {
        let base = demo_story_dir();
        let settings = resolve_settings(&StoryArgs {
            table: base.join("story.csv").to_string_lossy().to_string(),
            assets_dir: None,
            music_volume: None,
            seed: None,
            config: None,
        })
        .expect("settings");
        let mut session = open_session(&settings).expect("session");
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let code = run_line_mode_with_io(&mut session, &mut reader, &mut output)
            .expect("line mode should run");
        assert_eq!(code, 0);
        String::from_utf8(output).expect("utf-8 output")
    }

    #[test]
    fn line_mode_prints_scene_and_follows_choices() {
        let out = play("0\n:quit\n");
        assert!(out.contains("Wake up, traveler."));
        assert!(out.contains("  [1] Go right"));
        assert!(out.contains("[music]"));
        assert!(out.contains("The left path is quiet."));
        assert!(out.ends_with("bye\n"));
    }

    #[test]
    fn line_mode_reports_bad_input_and_keeps_going() {
        let out = play("x\n7\n:help\n");
        assert!(out.contains("invalid choice index: x"));
        assert!(out.contains("SCENE_CHOICE_INDEX"));
        assert_eq!(out.matches(LINE_COMMANDS).count(), 2);
    }

    #[test]
    fn line_mode_ends_on_missing_scene() {
        let out = play("1\n0\n");
        assert!(out.contains("A storm rolls in."));
        assert!(out.contains("Error: Scene 'nowhere' not found."));
        assert!(out.ends_with("[END]\n"));
    }

    #[test]
    fn restart_returns_to_entry_scene() {
        let out = play("1\n:restart\n");
        assert_eq!(out.matches("Wake up, traveler.").count(), 2);
        assert!(out.contains("restarted"));
    }
}
