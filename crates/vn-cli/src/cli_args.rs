use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tablenovel")]
#[command(about = "Plays a branching visual novel described by a scene table")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Agent(AgentArgs),
    Play(PlayArgs),
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Show(ShowArgs),
    Check(CheckArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct StoryArgs {
    #[arg(long = "table")]
    pub(crate) table: String,
    #[arg(long = "assets-dir")]
    pub(crate) assets_dir: Option<String>,
    #[arg(long = "music-volume")]
    pub(crate) music_volume: Option<f64>,
    #[arg(long = "seed")]
    pub(crate) seed: Option<u32>,
    #[arg(long = "config")]
    pub(crate) config: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    #[command(flatten)]
    pub(crate) story: StoryArgs,
    #[arg(long = "scene")]
    pub(crate) scene: Option<String>,
    #[arg(long = "choose")]
    pub(crate) choose: Vec<usize>,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) story: StoryArgs,
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    #[command(flatten)]
    pub(crate) story: StoryArgs,
    #[arg(long = "line-mode")]
    pub(crate) line_mode: bool,
}
