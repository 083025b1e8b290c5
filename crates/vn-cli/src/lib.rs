use std::ffi::OsString;
use std::path::Path;

use clap::Parser;
use vn_api::load_story_from_path;
use vn_core::NovelError;

mod agent;
mod assets;
mod cli_args;
mod config;
mod error_map;
mod line_tui;
mod logging;
mod session;
mod stage;
mod tui;
mod tui_render;
mod tui_state;

#[cfg(test)]
mod cli_test_support;

pub(crate) use assets::AssetIndex;
pub(crate) use cli_args::{
    AgentArgs, AgentCommand, CheckArgs, Cli, Mode, PlayArgs, ShowArgs, StoryArgs,
};
pub(crate) use config::{resolve_settings, PlayerSettings};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_config_invalid, map_cli_config_read, map_tui_io,
};
pub(crate) use line_tui::run_line_mode;
pub(crate) use logging::init_tracing;
pub(crate) use session::Session;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, NovelError> {
    match cli.command {
        Mode::Agent(args) => {
            init_tracing("warn");
            agent::run_agent(args)
        }
        Mode::Play(args) => run_play(args),
    }
}

fn run_play(args: PlayArgs) -> Result<i32, NovelError> {
    let line_mode = args.line_mode || !tui::has_terminal();
    init_tracing(play_log_fallback(line_mode));
    let settings = resolve_settings(&args.story)?;
    let mut session = open_session(&settings)?;
    if line_mode {
        return run_line_mode(&mut session);
    }
    let title = format!("tablenovel | {}", display_name(&settings.table));
    tui::run_tui_ratatui_mode(&mut session, &title)
}

/// The full-screen view owns the terminal, so it logs nothing unless `VN_LOG`
/// asks for it.
fn play_log_fallback(line_mode: bool) -> &'static str {
    if line_mode {
        "warn"
    } else {
        "off"
    }
}

/// Loads the table once, indexes the asset roots, and wires a session.
pub(crate) fn open_session(settings: &PlayerSettings) -> Result<Session, NovelError> {
    let load = load_story_from_path(&settings.table);
    if let Some(alert) = load.alert() {
        tracing::error!("{}", alert);
    }
    let entry = load.entry_control();
    tracing::info!(enabled = entry.enabled, label = %entry.label, "entry control");
    let story = load.into_story()?;
    let assets = AssetIndex::scan(&settings.sequencer.assets);
    Ok(Session::new(&story, settings, assets))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
