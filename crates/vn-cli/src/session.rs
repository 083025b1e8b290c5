use std::rc::Rc;
use std::time::Duration;

use vn_api::{create_sequencer, LoadedStory};
use vn_core::NovelError;
use vn_runtime::{MediaEvent, PresentationPhase, Sequencer, ShowOutcome};

use crate::stage::{terminal_resources, SharedQueue, SharedStage, StageView};
use crate::{AssetIndex, PlayerSettings};

const SETTLE_STEP_LIMIT: usize = 64;

/// A running story: the sequencer, the stage it draws into, and the queue of
/// simulated media completions, all on one session clock.
pub(crate) struct Session {
    sequencer: Sequencer,
    stage: SharedStage,
    queue: SharedQueue,
    last_outcome: Option<ShowOutcome>,
}

impl Session {
    pub(crate) fn new(story: &LoadedStory, settings: &PlayerSettings, assets: AssetIndex) -> Self {
        let stage = SharedStage::default();
        let queue = SharedQueue::default();
        let resources =
            terminal_resources(&stage, &queue, &Rc::new(assets), settings.effect_nominal);
        let sequencer = create_sequencer(story, resources, settings.sequencer.clone());
        Self {
            sequencer,
            stage,
            queue,
            last_outcome: None,
        }
    }

    pub(crate) fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub(crate) fn view(&self) -> StageView {
        self.stage.borrow().clone()
    }

    pub(crate) fn last_outcome(&self) -> Option<&ShowOutcome> {
        self.last_outcome.as_ref()
    }

    pub(crate) fn now(&self) -> Duration {
        self.queue.borrow().now()
    }

    pub(crate) fn start(&mut self) -> Result<&ShowOutcome, NovelError> {
        let outcome = self.sequencer.start()?;
        Ok(&*self.last_outcome.insert(outcome))
    }

    pub(crate) fn show(&mut self, scene_id: &str) -> &ShowOutcome {
        let outcome = self.sequencer.show(scene_id);
        &*self.last_outcome.insert(outcome)
    }

    pub(crate) fn choose(&mut self, index: usize) -> Result<&ShowOutcome, NovelError> {
        let outcome = self.sequencer.choose(index)?;
        Ok(&*self.last_outcome.insert(outcome))
    }

    /// Moves the session clock to `now`, fires due timers and delivers due
    /// media completions. Returns how many were applied.
    pub(crate) fn tick(&mut self, now: Duration) -> usize {
        self.queue.borrow_mut().set_now(now);
        let mut applied = self.sequencer.advance(now);
        let due = self.queue.borrow_mut().take_due();
        for event in due {
            let finished_effect = match &event {
                MediaEvent::EffectFinished { ticket } => Some(*ticket),
                _ => None,
            };
            if self.sequencer.dispatch(event) {
                applied += 1;
            }
            if let Some(ticket) = finished_effect {
                self.stage.borrow_mut().effect.finish(ticket);
            }
        }
        applied + self.sequencer.advance(now)
    }

    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        let timers = self.sequencer.next_deadline();
        let media = self.queue.borrow().next_deadline();
        match (timers, media) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Jumps the clock from deadline to deadline until nothing is pending.
    pub(crate) fn settle(&mut self) {
        for _ in 0..SETTLE_STEP_LIMIT {
            let Some(deadline) = self.next_deadline() else {
                return;
            };
            let now = deadline.max(self.now());
            self.tick(now);
        }
        tracing::warn!(now = ?self.now(), "session did not settle");
    }

    /// Whether text and choices are currently shown.
    pub(crate) fn is_revealed(&self) -> bool {
        matches!(
            self.sequencer.phase(),
            PresentationPhase::Revealed { .. } | PresentationPhase::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::cli_test_support::*;
    use crate::config::{resolve_settings_with, PlayerConfigFile};
    use crate::stage::LayerContent;
    use crate::StoryArgs;
    use vn_core::LayerSlot;

    fn demo_session() -> Session {
        let base = demo_story_dir();
        let args = StoryArgs {
            table: base.join("story.csv").to_string_lossy().to_string(),
            assets_dir: None,
            music_volume: None,
            seed: Some(7),
            config: None,
        };
        let settings =
            resolve_settings_with(&args, PlayerConfigFile::default()).expect("settings");
        let story = vn_api::load_story_from_path(&settings.table)
            .into_story()
            .expect("demo story should load");
        let assets = AssetIndex::scan(&settings.sequencer.assets);
        Session::new(&story, &settings, assets)
    }

    #[test]
    fn entry_scene_reveals_only_after_effect_finishes() {
        let mut session = demo_session();
        session.start().expect("start");
        assert!(!session.is_revealed());

        session.tick(Duration::ZERO);
        let view = session.view();
        assert_eq!(view.front(), Some(LayerSlot::Secondary));
        assert!(view.effect.playing);
        assert!(!view.revealed);

        session.tick(Duration::from_millis(1199));
        assert!(!session.is_revealed());
        session.tick(Duration::from_millis(1200));
        assert!(session.is_revealed());
        let view = session.view();
        assert!(view.revealed);
        assert!(!view.effect.playing);
        assert_eq!(view.layer(LayerSlot::Primary).content, LayerContent::Empty);
    }

    #[test]
    fn earlier_effect_finishing_leaves_current_effect_playing() {
        let mut session = demo_session();
        session.start().expect("start");
        session.tick(Duration::ZERO);
        session.tick(Duration::from_millis(600));
        session.choose(1).expect("right branch");
        session.tick(Duration::from_millis(600));

        assert_eq!(session.tick(Duration::from_millis(1200)), 0);
        assert!(!session.is_revealed());
        let view = session.view();
        assert!(view.effect.playing);
        assert_eq!(
            view.effect.source.as_ref().and_then(|path| path.file_name()),
            Some(std::ffi::OsStr::new("thunder.wav"))
        );

        session.tick(Duration::from_millis(1800));
        assert!(session.is_revealed());
        assert!(!session.view().effect.playing);
    }

    #[test]
    fn settle_drains_timers_and_completions() {
        let mut session = demo_session();
        session.start().expect("start");
        session.settle();
        assert_eq!(session.next_deadline(), None);
        assert!(session.is_revealed());
        assert_eq!(session.view().choices.len(), 2);
    }

    #[test]
    fn missing_background_falls_back_to_fill() {
        let mut session = demo_session();
        session.start().expect("start");
        session.settle();
        session.choose(1).expect("right branch");
        session.settle();

        let view = session.view();
        let front = view.front().expect("one layer visible");
        assert_eq!(
            view.layer(front).content,
            LayerContent::Fill(vn_runtime::DEFAULT_FALLBACK_FILL.to_string())
        );
        assert_eq!(view.choices.len(), 1);
        assert_eq!(view.choices[0].target, "nowhere");
    }

    #[test]
    fn unknown_scene_shows_diagnostic() {
        let mut session = demo_session();
        let outcome = session.show("nowhere");
        assert!(matches!(outcome, ShowOutcome::NotFound(_)));
        assert!(session.is_revealed());
        assert_eq!(
            session.view().diagnostic.as_deref(),
            Some("Error: Scene 'nowhere' not found.")
        );
    }
}
