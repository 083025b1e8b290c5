use std::sync::Arc;

use vn_core::{MixLevels, NovelError, SceneRecord};

use super::{
    BackgroundPlan, CrossfadeStage, EffectPlan, MusicPlan, NotFoundReport, PresentationPhase,
    ScenePresentation, Sequencer, ShowOutcome,
};
use crate::ducking::duck;
use crate::media::Ticket;
use crate::timers::TimerKind;

impl Sequencer {
    /// Shows the first scene in table order.
    pub fn start(&mut self) -> Result<ShowOutcome, NovelError> {
        let Some(entry_id) = self.graph.entry().map(|record| record.id().to_string()) else {
            return Err(NovelError::new(
                "LOAD_EMPTY",
                "The story table contains no scenes.",
            ));
        };
        Ok(self.show(&entry_id))
    }

    /// Follows the choice at `index` of the scene currently shown.
    pub fn choose(&mut self, index: usize) -> Result<ShowOutcome, NovelError> {
        if self.choices.is_empty() {
            return Err(NovelError::new(
                "SCENE_NO_CHOICE",
                "The current scene offers no choices.",
            ));
        }
        let Some(choice) = self.choices.get(index) else {
            return Err(NovelError::new(
                "SCENE_CHOICE_INDEX",
                format!("Choice index \"{}\" is out of range.", index),
            ));
        };
        let target = choice.target.clone();
        Ok(self.show(&target))
    }

    /// Starts a transition to `scene_id`. Earlier transitions are superseded,
    /// not cancelled.
    pub fn show(&mut self, scene_id: &str) -> ShowOutcome {
        self.phase = PresentationPhase::Resolving {
            scene_id: scene_id.to_string(),
        };
        self.state = self.state.replaced_for(scene_id);
        let ticket = Ticket {
            generation: self.state.generation,
        };

        let graph = Arc::clone(&self.graph);
        let scene = match graph.resolve(scene_id) {
            Ok(scene) => scene,
            Err(missing) => return self.halt_not_found(missing.to_string(), scene_id, ticket),
        };
        tracing::info!(scene = scene_id, generation = ticket.generation, "presenting scene");

        self.resources.panel.set_revealed(false);
        let background = self.begin_background(scene, ticket);
        let mix = duck(scene.sfx_volume(), self.config.base_music_volume);
        let music = self.apply_music(scene, mix);

        self.resources.panel.set_text(scene.text());
        self.choices = scene.choices();
        self.resources.panel.set_choices(&self.choices);
        self.phase = PresentationPhase::Presenting {
            scene_id: scene_id.to_string(),
        };

        let effect = self.start_effect(scene, mix, ticket);

        ShowOutcome::Presented(ScenePresentation {
            scene_id: scene_id.to_string(),
            generation: ticket.generation,
            text: scene.text().to_string(),
            background,
            mix,
            music,
            effect,
            choices: self.choices.clone(),
        })
    }

    fn halt_not_found(&mut self, diagnostic: String, scene_id: &str, ticket: Ticket) -> ShowOutcome {
        tracing::warn!(scene = scene_id, "scene not found");
        let diagnostic = format!("Error: {}", diagnostic);
        self.choices.clear();
        self.resources.panel.set_choices(&[]);
        self.resources.panel.show_diagnostic(&diagnostic);
        self.resources.panel.set_revealed(true);
        self.state.revealed = true;
        self.phase = PresentationPhase::NotFound {
            scene_id: scene_id.to_string(),
        };
        ShowOutcome::NotFound(NotFoundReport {
            scene_id: scene_id.to_string(),
            generation: ticket.generation,
            diagnostic,
        })
    }

    fn begin_background(&mut self, scene: &SceneRecord, ticket: Ticket) -> BackgroundPlan {
        match scene.image() {
            Some(name) => {
                let path = self.config.assets.image_path(name);
                tracing::debug!(path = %path.display(), "preloading background");
                self.state.crossfade = CrossfadeStage::Preloading { path: path.clone() };
                self.resources.preloader.preload(&path, ticket);
                BackgroundPlan::Preloading { path }
            }
            None => {
                let incoming = self.state.front.other();
                let color = self.config.fallback_fill.clone();
                self.resources.layers[incoming.index()].fill(&color);
                self.swap_layers(incoming, ticket);
                BackgroundPlan::Fill {
                    layer: incoming,
                    color,
                }
            }
        }
    }

    /// Music only changes when the scene names a track; scenes without one
    /// keep whatever is playing. The ducked level applies either way.
    fn apply_music(&mut self, scene: &SceneRecord, mix: MixLevels) -> MusicPlan {
        let music = &mut self.resources.music;
        music.set_volume(mix.music);

        let Some(name) = scene.audio() else {
            return MusicPlan::Unchanged;
        };
        let path = self.config.assets.audio_path(name);

        if music.source() != Some(path.as_path()) {
            music.set_source(&path);
            if let Err(error) = music.play() {
                tracing::warn!(path = %path.display(), %error, "music playback failed");
            }
            MusicPlan::Switched { path }
        } else if music.is_paused() {
            if let Err(error) = music.play() {
                tracing::warn!(path = %path.display(), %error, "music resume failed");
            }
            MusicPlan::Resumed { path }
        } else {
            MusicPlan::Continued { path }
        }
    }

    fn start_effect(&mut self, scene: &SceneRecord, mix: MixLevels, ticket: Ticket) -> EffectPlan {
        self.resources.effect.stop_and_rewind();

        let Some(name) = scene.sfx() else {
            let deadline = self.now + self.config.reveal_delay;
            self.timers.schedule(deadline, ticket, TimerKind::Reveal);
            return EffectPlan::Silent;
        };

        let path = self.config.assets.audio_path(name);
        let effect = &mut self.resources.effect;
        effect.load(&path);
        effect.set_volume(mix.effect);
        match effect.play(ticket) {
            Ok(()) => {
                tracing::debug!(
                    path = %path.display(),
                    effect = mix.effect,
                    music = mix.music,
                    "effect playing"
                );
                EffectPlan::Playing { path }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "effect playback failed, revealing now");
                self.reveal();
                EffectPlan::Failed { path, error }
            }
        }
    }
}
