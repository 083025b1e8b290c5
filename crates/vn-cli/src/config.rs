use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vn_core::NovelError;
use vn_runtime::{AssetRoots, SequencerConfig, StalePolicy};

use crate::{map_cli_config_invalid, map_cli_config_read, StoryArgs};

pub(crate) const DEFAULT_EFFECT_NOMINAL: Duration = Duration::from_millis(1200);

/// Optional JSON settings file. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub(crate) struct PlayerConfigFile {
    pub(crate) assets_dir: Option<String>,
    pub(crate) base_music_volume: Option<f64>,
    pub(crate) crossfade_settle_ms: Option<u64>,
    pub(crate) reveal_delay_ms: Option<u64>,
    pub(crate) effect_nominal_ms: Option<u64>,
    pub(crate) fallback_fill: Option<String>,
    pub(crate) randomize_focal_point: Option<bool>,
    pub(crate) random_seed: Option<u32>,
    pub(crate) apply_stale_completions: Option<bool>,
}

#[derive(Debug, Clone)]
pub(crate) struct PlayerSettings {
    pub(crate) table: PathBuf,
    pub(crate) sequencer: SequencerConfig,
    /// How long a terminal effect "plays" before reporting completion.
    pub(crate) effect_nominal: Duration,
}

pub(crate) fn load_config_file(path: &Path) -> Result<PlayerConfigFile, NovelError> {
    if !path.exists() {
        return Err(NovelError::new(
            "CLI_CONFIG_NOT_FOUND",
            format!("Config file does not exist: {}", path.display()),
        ));
    }
    let raw = fs::read_to_string(path).map_err(map_cli_config_read)?;
    serde_json::from_str(&raw).map_err(map_cli_config_invalid)
}

/// Defaults, then the config file, then command-line flags.
pub(crate) fn resolve_settings(args: &StoryArgs) -> Result<PlayerSettings, NovelError> {
    let file = match &args.config {
        Some(path) => load_config_file(Path::new(path))?,
        None => PlayerConfigFile::default(),
    };
    resolve_settings_with(args, file)
}

pub(crate) fn resolve_settings_with(
    args: &StoryArgs,
    file: PlayerConfigFile,
) -> Result<PlayerSettings, NovelError> {
    let table = PathBuf::from(&args.table);
    let assets_dir = args
        .assets_dir
        .clone()
        .or(file.assets_dir)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            table
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });

    let base_music_volume = args
        .music_volume
        .or(file.base_music_volume)
        .unwrap_or(vn_runtime::DEFAULT_BASE_MUSIC_VOLUME);
    if !(0.0..=1.0).contains(&base_music_volume) {
        return Err(NovelError::new(
            "CLI_CONFIG_INVALID",
            format!(
                "Music volume must be within 0..=1, got {}.",
                base_music_volume
            ),
        ));
    }

    let defaults = SequencerConfig::default();
    let sequencer = SequencerConfig {
        base_music_volume,
        crossfade_settle: file
            .crossfade_settle_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.crossfade_settle),
        reveal_delay: file
            .reveal_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.reveal_delay),
        fallback_fill: file.fallback_fill.unwrap_or(defaults.fallback_fill),
        randomize_focal_point: file
            .randomize_focal_point
            .unwrap_or(defaults.randomize_focal_point),
        random_seed: args.seed.or(file.random_seed),
        stale_policy: if file.apply_stale_completions.unwrap_or(false) {
            StalePolicy::Apply
        } else {
            StalePolicy::Ignore
        },
        assets: AssetRoots::under(&assets_dir),
    };

    Ok(PlayerSettings {
        table,
        sequencer,
        effect_nominal: file
            .effect_nominal_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_EFFECT_NOMINAL),
    })
}
