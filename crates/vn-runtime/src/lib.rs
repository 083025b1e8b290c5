mod ducking;
mod graph;
mod media;
mod rng;
mod sequencer;
mod timers;

pub use ducking::duck;
pub use graph::{DanglingTarget, SceneGraph, SceneNotFound};
pub use media::{
    AssetRoots, BackgroundLayer, ContentPanel, EffectChannel, ImagePreloader, MediaError,
    MediaEvent, MusicChannel, PresentationResources, Ticket,
};
pub use sequencer::{
    BackgroundPlan, CrossfadeStage, EffectPlan, MusicPlan, NotFoundReport, PresentationPhase,
    PresentationState, ScenePresentation, Sequencer, SequencerConfig, ShowOutcome, StalePolicy,
    DEFAULT_BASE_MUSIC_VOLUME, DEFAULT_CROSSFADE_SETTLE, DEFAULT_FALLBACK_FILL,
    DEFAULT_REVEAL_DELAY,
};
pub use timers::{PendingTimer, TimerKind, TimerQueue};
