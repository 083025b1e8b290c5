use std::fs;
use std::path::Path;
use std::sync::Arc;

use vn_core::NovelError;
use vn_parser::{parse_table, ParsedTable};
use vn_runtime::{PresentationResources, SceneGraph, Sequencer, SequencerConfig};

pub const LABEL_LOADING: &str = "Loading data...";
pub const LABEL_READY: &str = "START GAME";
pub const LABEL_EMPTY: &str = "Error: table is empty or formatted wrong";
pub const LABEL_FAILED: &str = "Error";

/// State of the control that starts the story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryControl {
    pub enabled: bool,
    pub label: String,
}

impl EntryControl {
    pub fn loading() -> Self {
        Self {
            enabled: false,
            label: LABEL_LOADING.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedStory {
    pub graph: Arc<SceneGraph>,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub skipped_rows: usize,
}

impl LoadedStory {
    pub fn entry_id(&self) -> Option<&str> {
        self.graph.entry().map(|record| record.id())
    }
}

/// Result of the one-time load: either a usable story or the reason there is
/// none, with the entry control already labelled for it.
#[derive(Debug, Clone)]
pub enum StoryLoad {
    Ready(LoadedStory),
    Empty { skipped_rows: usize },
    Failed(NovelError),
}

impl StoryLoad {
    pub fn entry_control(&self) -> EntryControl {
        match self {
            Self::Ready(_) => EntryControl {
                enabled: true,
                label: LABEL_READY.to_string(),
            },
            Self::Empty { .. } => EntryControl {
                enabled: false,
                label: LABEL_EMPTY.to_string(),
            },
            Self::Failed(_) => EntryControl {
                enabled: false,
                label: LABEL_FAILED.to_string(),
            },
        }
    }

    /// Message to surface as an alert, if any.
    pub fn alert(&self) -> Option<String> {
        match self {
            Self::Failed(error) => Some(format!("Error loading story table: {}", error.message)),
            _ => None,
        }
    }

    /// Converts the outcome into the story, or the error that prevents
    /// starting it.
    pub fn into_story(self) -> Result<LoadedStory, NovelError> {
        match self {
            Self::Ready(story) => Ok(story),
            Self::Empty { .. } => Err(NovelError::new("LOAD_EMPTY", LABEL_EMPTY)),
            Self::Failed(error) => Err(error),
        }
    }
}

pub fn load_story_from_text(raw: &str) -> StoryLoad {
    let ParsedTable {
        delimiter,
        headers,
        records,
        skipped_rows,
    } = parse_table(raw);

    if records.is_empty() {
        tracing::warn!(skipped_rows, "story table produced no scenes");
        return StoryLoad::Empty { skipped_rows };
    }

    tracing::info!(
        scenes = records.len(),
        skipped_rows,
        delimiter = %delimiter,
        "story table loaded"
    );
    StoryLoad::Ready(LoadedStory {
        graph: Arc::new(SceneGraph::new(records)),
        delimiter,
        headers,
        skipped_rows,
    })
}

/// Reads the table once and parses it.
pub fn load_story_from_path(path: &Path) -> StoryLoad {
    match fs::read_to_string(path) {
        Ok(raw) => load_story_from_text(&raw),
        Err(error) => {
            tracing::error!(path = %path.display(), %error, "failed to read story table");
            StoryLoad::Failed(NovelError::new(
                "LOAD_READ",
                format!("{}: {}", path.display(), error),
            ))
        }
    }
}

pub fn create_sequencer(
    story: &LoadedStory,
    resources: PresentationResources,
    config: SequencerConfig,
) -> Sequencer {
    Sequencer::new(Arc::clone(&story.graph), resources, config)
}
