use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use vn_core::{ChoiceControl, FocalPoint, LayerSlot};
use vn_runtime::{
    BackgroundLayer, ContentPanel, EffectChannel, ImagePreloader, MediaError, MediaEvent,
    MusicChannel, PresentationResources, Ticket,
};

use crate::AssetIndex;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub(crate) enum LayerContent {
    Empty,
    Image(PathBuf),
    Fill(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct LayerView {
    pub(crate) content: LayerContent,
    pub(crate) visible: bool,
    pub(crate) focal_point: FocalPoint,
    /// How many times the entrance animation has been restarted.
    pub(crate) entrances: u32,
}

impl Default for LayerView {
    fn default() -> Self {
        Self {
            content: LayerContent::Empty,
            visible: false,
            focal_point: FocalPoint::CENTER,
            entrances: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct MusicView {
    pub(crate) source: Option<PathBuf>,
    pub(crate) playing: bool,
    pub(crate) volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct EffectView {
    pub(crate) source: Option<PathBuf>,
    pub(crate) playing: bool,
    pub(crate) volume: f64,
    /// Transition that started the effect now playing.
    #[serde(skip)]
    pub(crate) ticket: Option<Ticket>,
}

impl EffectView {
    /// Marks the effect stopped if `ticket` started the one now playing.
    /// Returns whether it did.
    pub(crate) fn finish(&mut self, ticket: Ticket) -> bool {
        if self.ticket != Some(ticket) {
            return false;
        }
        self.playing = false;
        self.ticket = None;
        true
    }
}

/// Everything the terminal front ends draw, written by the media backends.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StageView {
    pub(crate) layers: [LayerView; 2],
    pub(crate) text: String,
    pub(crate) choices: Vec<ChoiceControl>,
    pub(crate) revealed: bool,
    pub(crate) diagnostic: Option<String>,
    pub(crate) music: MusicView,
    pub(crate) effect: EffectView,
}

impl StageView {
    pub(crate) fn layer(&self, slot: LayerSlot) -> &LayerView {
        &self.layers[slot.index()]
    }

    /// The visible layer, if exactly one is showing.
    pub(crate) fn front(&self) -> Option<LayerSlot> {
        let mut visible = LayerSlot::ALL
            .into_iter()
            .filter(|slot| self.layer(*slot).visible);
        match (visible.next(), visible.next()) {
            (Some(slot), None) => Some(slot),
            _ => None,
        }
    }
}

pub(crate) type SharedStage = Rc<RefCell<StageView>>;

/// Completions the terminal backends owe the sequencer, keyed by when they
/// become due on the session clock.
#[derive(Debug, Default)]
pub(crate) struct MediaQueue {
    now: Duration,
    pending: Vec<(Duration, MediaEvent)>,
}

impl MediaQueue {
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn set_now(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    pub(crate) fn push_after(&mut self, delay: Duration, event: MediaEvent) {
        self.pending.push((self.now + delay, event));
    }

    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|(deadline, _)| *deadline).min()
    }

    /// Removes and returns the events due at the current time, oldest first.
    pub(crate) fn take_due(&mut self) -> Vec<MediaEvent> {
        let now = self.now;
        let (mut due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(deadline, _)| *deadline <= now);
        self.pending = later;
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, event)| event).collect()
    }
}

pub(crate) type SharedQueue = Rc<RefCell<MediaQueue>>;

pub(crate) struct TerminalLayer {
    slot: LayerSlot,
    stage: SharedStage,
}

impl BackgroundLayer for TerminalLayer {
    fn assign_image(&mut self, path: &Path) {
        self.stage.borrow_mut().layers[self.slot.index()].content =
            LayerContent::Image(path.to_path_buf());
    }

    fn fill(&mut self, color: &str) {
        let mut stage = self.stage.borrow_mut();
        let layer = &mut stage.layers[self.slot.index()];
        layer.content = LayerContent::Fill(color.to_string());
        layer.focal_point = FocalPoint::CENTER;
    }

    fn set_focal_point(&mut self, point: FocalPoint) {
        self.stage.borrow_mut().layers[self.slot.index()].focal_point = point;
    }

    fn restart_entrance(&mut self) {
        self.stage.borrow_mut().layers[self.slot.index()].entrances += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        self.stage.borrow_mut().layers[self.slot.index()].visible = visible;
    }

    fn clear(&mut self) {
        let mut stage = self.stage.borrow_mut();
        let layer = &mut stage.layers[self.slot.index()];
        layer.content = LayerContent::Empty;
        layer.focal_point = FocalPoint::CENTER;
    }
}

pub(crate) struct TerminalPanel {
    stage: SharedStage,
}

impl ContentPanel for TerminalPanel {
    fn set_text(&mut self, text: &str) {
        let mut stage = self.stage.borrow_mut();
        stage.text = text.to_string();
        stage.diagnostic = None;
    }

    fn set_choices(&mut self, choices: &[ChoiceControl]) {
        self.stage.borrow_mut().choices = choices.to_vec();
    }

    fn set_revealed(&mut self, revealed: bool) {
        self.stage.borrow_mut().revealed = revealed;
    }

    fn show_diagnostic(&mut self, message: &str) {
        let mut stage = self.stage.borrow_mut();
        stage.text.clear();
        stage.diagnostic = Some(message.to_string());
    }
}

pub(crate) struct TerminalMusic {
    stage: SharedStage,
    assets: Rc<AssetIndex>,
    source: Option<PathBuf>,
    paused: bool,
}

impl MusicChannel for TerminalMusic {
    fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_source(&mut self, path: &Path) {
        self.source = Some(path.to_path_buf());
        self.paused = true;
        let mut stage = self.stage.borrow_mut();
        stage.music.source = self.source.clone();
        stage.music.playing = false;
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let Some(source) = &self.source else {
            return Err(MediaError::Rejected("no music source".to_string()));
        };
        if !self.assets.contains(source) {
            return Err(MediaError::Missing(source.clone()));
        }
        self.paused = false;
        self.stage.borrow_mut().music.playing = true;
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) {
        self.stage.borrow_mut().music.volume = volume;
    }
}

pub(crate) struct TerminalEffect {
    stage: SharedStage,
    queue: SharedQueue,
    assets: Rc<AssetIndex>,
    nominal: Duration,
    loaded: Option<PathBuf>,
}

impl EffectChannel for TerminalEffect {
    fn stop_and_rewind(&mut self) {
        let mut stage = self.stage.borrow_mut();
        stage.effect.playing = false;
        stage.effect.ticket = None;
    }

    fn load(&mut self, path: &Path) {
        self.loaded = Some(path.to_path_buf());
        self.stage.borrow_mut().effect.source = self.loaded.clone();
    }

    fn set_volume(&mut self, volume: f64) {
        self.stage.borrow_mut().effect.volume = volume;
    }

    fn play(&mut self, ticket: Ticket) -> Result<(), MediaError> {
        let Some(path) = &self.loaded else {
            return Err(MediaError::Rejected("no effect loaded".to_string()));
        };
        if !self.assets.contains(path) {
            return Err(MediaError::Missing(path.clone()));
        }
        let mut stage = self.stage.borrow_mut();
        stage.effect.playing = true;
        stage.effect.ticket = Some(ticket);
        self.queue
            .borrow_mut()
            .push_after(self.nominal, MediaEvent::EffectFinished { ticket });
        Ok(())
    }
}

pub(crate) struct TerminalPreloader {
    queue: SharedQueue,
    assets: Rc<AssetIndex>,
}

impl ImagePreloader for TerminalPreloader {
    fn preload(&mut self, path: &Path, ticket: Ticket) {
        let path = path.to_path_buf();
        let event = if self.assets.contains(&path) {
            MediaEvent::ImageLoaded { ticket, path }
        } else {
            MediaEvent::ImageFailed {
                ticket,
                error: MediaError::Missing(path.clone()),
                path,
            }
        };
        self.queue.borrow_mut().push_after(Duration::ZERO, event);
    }
}

/// Builds the terminal backends around one shared stage and event queue.
pub(crate) fn terminal_resources(
    stage: &SharedStage,
    queue: &SharedQueue,
    assets: &Rc<AssetIndex>,
    effect_nominal: Duration,
) -> PresentationResources {
    let layer = |slot: LayerSlot| -> Box<dyn BackgroundLayer> {
        Box::new(TerminalLayer {
            slot,
            stage: Rc::clone(stage),
        })
    };
    PresentationResources {
        layers: [layer(LayerSlot::Primary), layer(LayerSlot::Secondary)],
        panel: Box::new(TerminalPanel {
            stage: Rc::clone(stage),
        }),
        music: Box::new(TerminalMusic {
            stage: Rc::clone(stage),
            assets: Rc::clone(assets),
            source: None,
            paused: true,
        }),
        effect: Box::new(TerminalEffect {
            stage: Rc::clone(stage),
            queue: Rc::clone(queue),
            assets: Rc::clone(assets),
            nominal: effect_nominal,
            loaded: None,
        }),
        preloader: Box::new(TerminalPreloader {
            queue: Rc::clone(queue),
            assets: Rc::clone(assets),
        }),
    }
}

#[cfg(test)]
mod stage_tests {
    use super::*;
    use crate::cli_test_support::*;
    use vn_runtime::AssetRoots;

    fn fixture() -> (SharedStage, SharedQueue, AssetRoots, PresentationResources) {
        let base = temp_dir("stage");
        write_file(&base.join("images").join("hall.png"), "png");
        write_file(&base.join("audio").join("door.wav"), "wav");
        let roots = AssetRoots::under(&base);
        let assets = Rc::new(AssetIndex::scan(&roots));
        let stage = SharedStage::default();
        let queue = SharedQueue::default();
        let resources =
            terminal_resources(&stage, &queue, &assets, Duration::from_millis(500));
        (stage, queue, roots, resources)
    }

    #[test]
    fn preloader_reports_missing_images_as_failures() {
        let (_, queue, roots, mut resources) = fixture();
        let ticket = Ticket { generation: 2 };
        resources.preloader.preload(&roots.image_path("hall.png"), ticket);
        resources.preloader.preload(&roots.image_path("gone.png"), ticket);

        let events = queue.borrow_mut().take_due();
        assert!(matches!(events[0], MediaEvent::ImageLoaded { .. }));
        assert!(matches!(
            &events[1],
            MediaEvent::ImageFailed { error: MediaError::Missing(_), .. }
        ));
        assert_eq!(queue.borrow().next_deadline(), None);
    }

    #[test]
    fn effect_finishes_after_nominal_duration() {
        let (stage, queue, roots, mut resources) = fixture();
        let ticket = Ticket { generation: 1 };
        resources.effect.load(&roots.audio_path("door.wav"));
        resources.effect.set_volume(0.8);
        resources.effect.play(ticket).expect("indexed effect should play");
        assert!(stage.borrow().effect.playing);
        assert_eq!(stage.borrow().effect.volume, 0.8);

        queue.borrow_mut().set_now(Duration::from_millis(499));
        assert!(queue.borrow_mut().take_due().is_empty());
        queue.borrow_mut().set_now(Duration::from_millis(500));
        assert_eq!(
            queue.borrow_mut().take_due(),
            vec![MediaEvent::EffectFinished { ticket }]
        );
    }

    #[test]
    fn only_the_playing_ticket_finishes_the_effect() {
        let (stage, _, roots, mut resources) = fixture();
        resources.effect.load(&roots.audio_path("door.wav"));
        resources.effect.play(Ticket { generation: 1 }).expect("first play");
        resources.effect.stop_and_rewind();
        resources.effect.play(Ticket { generation: 2 }).expect("second play");

        let mut view = stage.borrow_mut();
        assert!(!view.effect.finish(Ticket { generation: 1 }));
        assert!(view.effect.playing);
        assert!(view.effect.finish(Ticket { generation: 2 }));
        assert!(!view.effect.playing);
        assert_eq!(view.effect.ticket, None);
    }

    #[test]
    fn music_without_a_file_stays_paused() {
        let (stage, _, roots, mut resources) = fixture();
        let path = roots.audio_path("theme.ogg");
        resources.music.set_source(&path);
        let error = resources.music.play().expect_err("missing file should fail");
        assert_eq!(error, MediaError::Missing(path));
        assert!(resources.music.is_paused());
        assert!(!stage.borrow().music.playing);
    }

    #[test]
    fn layers_write_into_their_own_slot() {
        let (stage, _, roots, mut resources) = fixture();
        let [primary, secondary] = &mut resources.layers;
        secondary.assign_image(&roots.image_path("hall.png"));
        secondary.restart_entrance();
        secondary.set_visible(true);
        primary.fill("#000");
        primary.set_visible(false);

        let view = stage.borrow();
        assert_eq!(view.front(), Some(LayerSlot::Secondary));
        assert_eq!(view.layer(LayerSlot::Secondary).entrances, 1);
        assert_eq!(
            view.layer(LayerSlot::Primary).content,
            LayerContent::Fill("#000".to_string())
        );
    }

    #[test]
    fn diagnostic_replaces_text_until_next_scene() {
        let (stage, _, _, mut resources) = fixture();
        resources.panel.set_text("Hello");
        resources.panel.show_diagnostic("Error: Scene 'x' not found.");
        assert_eq!(stage.borrow().text, "");
        assert!(stage.borrow().diagnostic.is_some());
        resources.panel.set_text("Again");
        assert_eq!(stage.borrow().diagnostic, None);
    }
}
