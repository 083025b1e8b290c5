use std::path::Path;
use std::time::Duration;

use vn_core::{FocalPoint, LayerSlot};

use super::{CrossfadeStage, PresentationPhase, Sequencer, StalePolicy};
use crate::media::{MediaEvent, Ticket};
use crate::rng::random_focal_point;
use crate::timers::{PendingTimer, TimerKind};

impl Sequencer {
    /// Applies a completion reported by the host. Returns whether it was
    /// applied.
    pub fn dispatch(&mut self, event: MediaEvent) -> bool {
        if !self.accepts(event.ticket()) {
            tracing::debug!(?event, current = self.state.generation, "dropping stale completion");
            return false;
        }

        match event {
            MediaEvent::ImageLoaded { ticket, path } => self.present_image(&path, ticket),
            MediaEvent::ImageFailed {
                ticket,
                path,
                error,
            } => {
                tracing::warn!(path = %path.display(), %error, "background failed to load");
                let incoming = self.state.front.other();
                let color = self.config.fallback_fill.clone();
                self.resources.layers[incoming.index()].fill(&color);
                self.swap_layers(incoming, ticket);
            }
            MediaEvent::EffectFinished { .. } => self.reveal(),
        }
        true
    }

    /// Moves the clock to `now` and fires every timer that has come due.
    /// Returns how many were applied.
    pub fn advance(&mut self, now: Duration) -> usize {
        if now > self.now {
            self.now = now;
        }
        let mut applied = 0usize;
        for timer in self.timers.take_due(self.now) {
            if self.fire(timer) {
                applied += 1;
            }
        }
        applied
    }

    fn fire(&mut self, timer: PendingTimer) -> bool {
        if !self.accepts(timer.ticket) {
            tracing::debug!(kind = ?timer.kind, generation = timer.ticket.generation, "dropping stale timer");
            return false;
        }
        match timer.kind {
            TimerKind::ClearLayer(layer) => {
                self.resources.layers[layer.index()].clear();
                if matches!(self.state.crossfade, CrossfadeStage::Settling { outgoing, .. } if outgoing == layer)
                {
                    self.state.crossfade = CrossfadeStage::Idle;
                }
            }
            TimerKind::Reveal => self.reveal(),
        }
        true
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        ticket.generation == self.state.generation || self.config.stale_policy == StalePolicy::Apply
    }

    fn present_image(&mut self, path: &Path, ticket: Ticket) {
        let incoming = self.state.front.other();
        let focal_point = if self.config.randomize_focal_point {
            random_focal_point(&mut self.rng_state)
        } else {
            FocalPoint::CENTER
        };

        let layer = &mut self.resources.layers[incoming.index()];
        layer.assign_image(path);
        layer.set_focal_point(focal_point);
        layer.restart_entrance();
        self.swap_layers(incoming, ticket);
    }

    /// Brings `incoming` to the front and schedules the outgoing layer to be
    /// cleared once the crossfade has settled.
    pub(super) fn swap_layers(&mut self, incoming: LayerSlot, ticket: Ticket) {
        let outgoing = incoming.other();
        self.resources.layers[incoming.index()].set_visible(true);
        self.resources.layers[outgoing.index()].set_visible(false);
        self.state.front = incoming;

        let deadline = self.now + self.config.crossfade_settle;
        self.timers
            .schedule(deadline, ticket, TimerKind::ClearLayer(outgoing));
        self.state.crossfade = CrossfadeStage::Settling { outgoing, deadline };
        tracing::debug!(front = incoming.name(), "layers swapped");
    }

    pub(super) fn reveal(&mut self) {
        if self.state.revealed {
            return;
        }
        self.resources.panel.set_revealed(true);
        self.state.revealed = true;
        if let PresentationPhase::Presenting { scene_id } = &self.phase {
            self.phase = PresentationPhase::Revealed {
                scene_id: scene_id.clone(),
            };
        }
    }
}
