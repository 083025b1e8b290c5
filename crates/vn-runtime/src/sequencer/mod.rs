use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use vn_core::{ChoiceControl, LayerSlot, MixLevels};

use crate::graph::SceneGraph;
use crate::media::{AssetRoots, MediaError, PresentationResources};
use crate::timers::TimerQueue;

mod completion;
mod present;

pub const DEFAULT_BASE_MUSIC_VOLUME: f64 = 0.2;
pub const DEFAULT_CROSSFADE_SETTLE: Duration = Duration::from_millis(1000);
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(400);
pub const DEFAULT_FALLBACK_FILL: &str = "#2b2d42";

/// What to do with a completion or timer that belongs to an older transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Drop it; only the current transition touches layers and the panel.
    #[default]
    Ignore,
    /// Apply it anyway, last write wins.
    Apply,
}

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Process-wide music level before ducking.
    pub base_music_volume: f64,
    /// Delay after a layer swap before the outgoing layer is cleared.
    pub crossfade_settle: Duration,
    /// Reveal delay for scenes without an effect.
    pub reveal_delay: Duration,
    pub fallback_fill: String,
    pub randomize_focal_point: bool,
    pub random_seed: Option<u32>,
    pub stale_policy: StalePolicy,
    pub assets: AssetRoots,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            base_music_volume: DEFAULT_BASE_MUSIC_VOLUME,
            crossfade_settle: DEFAULT_CROSSFADE_SETTLE,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            fallback_fill: DEFAULT_FALLBACK_FILL.to_string(),
            randomize_focal_point: true,
            random_seed: None,
            stale_policy: StalePolicy::Ignore,
            assets: AssetRoots::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationPhase {
    Idle,
    Resolving { scene_id: String },
    NotFound { scene_id: String },
    Presenting { scene_id: String },
    Revealed { scene_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossfadeStage {
    Idle,
    Preloading { path: PathBuf },
    Settling { outgoing: LayerSlot, deadline: Duration },
}

/// Per-transition state, replaced wholesale by every `show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationState {
    pub generation: u64,
    pub scene_id: Option<String>,
    pub front: LayerSlot,
    pub crossfade: CrossfadeStage,
    pub revealed: bool,
}

impl PresentationState {
    fn initial() -> Self {
        Self {
            generation: 0,
            scene_id: None,
            front: LayerSlot::Primary,
            crossfade: CrossfadeStage::Idle,
            revealed: false,
        }
    }

    fn replaced_for(&self, scene_id: &str) -> Self {
        Self {
            generation: self.generation + 1,
            scene_id: Some(scene_id.to_string()),
            front: self.front,
            crossfade: CrossfadeStage::Idle,
            revealed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundPlan {
    Preloading { path: PathBuf },
    Fill { layer: LayerSlot, color: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicPlan {
    Switched { path: PathBuf },
    Resumed { path: PathBuf },
    Continued { path: PathBuf },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectPlan {
    Playing { path: PathBuf },
    Failed { path: PathBuf, error: MediaError },
    Silent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenePresentation {
    pub scene_id: String,
    pub generation: u64,
    pub text: String,
    pub background: BackgroundPlan,
    pub mix: MixLevels,
    pub music: MusicPlan,
    pub effect: EffectPlan,
    pub choices: Vec<ChoiceControl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundReport {
    pub scene_id: String,
    pub generation: u64,
    pub diagnostic: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShowOutcome {
    Presented(ScenePresentation),
    NotFound(NotFoundReport),
}

impl ShowOutcome {
    pub fn scene_id(&self) -> &str {
        match self {
            Self::Presented(presentation) => &presentation.scene_id,
            Self::NotFound(report) => &report.scene_id,
        }
    }

    pub fn choices(&self) -> &[ChoiceControl] {
        match self {
            Self::Presented(presentation) => &presentation.choices,
            Self::NotFound(_) => &[],
        }
    }
}

/// Drives one scene transition at a time: resolves the scene, crossfades the
/// background pair, sets music and effect levels, and gates the content
/// reveal on effect completion.
///
/// All asynchronous work is reported back through [`Sequencer::dispatch`] and
/// [`Sequencer::advance`]; every such callback carries the generation of the
/// transition that started it.
pub struct Sequencer {
    graph: Arc<SceneGraph>,
    resources: PresentationResources,
    config: SequencerConfig,
    timers: TimerQueue,
    rng_state: u32,
    now: Duration,
    phase: PresentationPhase,
    state: PresentationState,
    choices: Vec<ChoiceControl>,
}

impl Sequencer {
    pub fn new(
        graph: Arc<SceneGraph>,
        mut resources: PresentationResources,
        config: SequencerConfig,
    ) -> Self {
        let state = PresentationState::initial();
        resources.layers[state.front.index()].set_visible(true);
        resources.layers[state.front.other().index()].set_visible(false);
        resources.panel.set_revealed(false);

        Self {
            graph,
            resources,
            rng_state: config.random_seed.unwrap_or(1),
            config,
            timers: TimerQueue::default(),
            now: Duration::ZERO,
            phase: PresentationPhase::Idle,
            state,
            choices: Vec::new(),
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn phase(&self) -> &PresentationPhase {
        &self.phase
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    pub fn front_layer(&self) -> LayerSlot {
        self.state.front
    }

    pub fn choices(&self) -> &[ChoiceControl] {
        &self.choices
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn resources(&self) -> &PresentationResources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut PresentationResources {
        &mut self.resources
    }
}
