use std::path::{Path, PathBuf};

use thiserror::Error;
use vn_core::FocalPoint;

/// Identifies the transition an asynchronous operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub generation: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("asset not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("playback rejected: {0}")]
    Rejected(String),
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Completions reported back by the host for work started by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    ImageLoaded {
        ticket: Ticket,
        path: PathBuf,
    },
    ImageFailed {
        ticket: Ticket,
        path: PathBuf,
        error: MediaError,
    },
    EffectFinished {
        ticket: Ticket,
    },
}

impl MediaEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::ImageLoaded { ticket, .. }
            | Self::ImageFailed { ticket, .. }
            | Self::EffectFinished { ticket } => *ticket,
        }
    }
}

/// One of the two stacked background surfaces.
pub trait BackgroundLayer {
    fn assign_image(&mut self, path: &Path);
    fn fill(&mut self, color: &str);
    fn set_focal_point(&mut self, point: FocalPoint);
    /// Restarts the entrance animation from its first frame, even when it is
    /// already running on this layer.
    fn restart_entrance(&mut self);
    fn set_visible(&mut self, visible: bool);
    /// Drops the image and any animation state.
    fn clear(&mut self);
}

/// Text and choice area of the scene.
pub trait ContentPanel {
    fn set_text(&mut self, text: &str);
    fn set_choices(&mut self, choices: &[vn_core::ChoiceControl]);
    fn set_revealed(&mut self, revealed: bool);
    fn show_diagnostic(&mut self, message: &str);
}

pub trait MusicChannel {
    fn source(&self) -> Option<&Path>;
    fn is_paused(&self) -> bool;
    fn set_source(&mut self, path: &Path);
    fn play(&mut self) -> Result<(), MediaError>;
    fn set_volume(&mut self, volume: f64);
}

/// One-shot effect player. A successful `play` must later be answered with
/// `MediaEvent::EffectFinished` carrying the same ticket.
pub trait EffectChannel {
    fn stop_and_rewind(&mut self);
    fn load(&mut self, path: &Path);
    fn set_volume(&mut self, volume: f64);
    fn play(&mut self, ticket: Ticket) -> Result<(), MediaError>;
}

/// Starts loading an image; the outcome arrives as `ImageLoaded` or
/// `ImageFailed` with the same ticket.
pub trait ImagePreloader {
    fn preload(&mut self, path: &Path, ticket: Ticket);
}

/// Output handles owned by the sequencer. The layers are a fixed pair indexed
/// by `LayerSlot::index`.
pub struct PresentationResources {
    pub layers: [Box<dyn BackgroundLayer>; 2],
    pub panel: Box<dyn ContentPanel>,
    pub music: Box<dyn MusicChannel>,
    pub effect: Box<dyn EffectChannel>,
    pub preloader: Box<dyn ImagePreloader>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoots {
    pub images: PathBuf,
    pub audio: PathBuf,
}

impl Default for AssetRoots {
    fn default() -> Self {
        Self {
            images: PathBuf::from("images"),
            audio: PathBuf::from("audio"),
        }
    }
}

impl AssetRoots {
    pub fn under(base: &Path) -> Self {
        Self {
            images: base.join("images"),
            audio: base.join("audio"),
        }
    }

    pub fn image_path(&self, name: &str) -> PathBuf {
        self.images.join(name)
    }

    pub fn audio_path(&self, name: &str) -> PathBuf {
        self.audio.join(name)
    }
}

#[cfg(test)]
mod media_tests {
    use super::*;

    #[test]
    fn asset_roots_join_declared_names() {
        let roots = AssetRoots::under(Path::new("/story"));
        assert_eq!(roots.image_path("hall.png"), PathBuf::from("/story/images/hall.png"));
        assert_eq!(roots.audio_path("door.wav"), PathBuf::from("/story/audio/door.wav"));
        assert_eq!(
            AssetRoots::default().image_path("a.png"),
            PathBuf::from("images/a.png")
        );
    }

    #[test]
    fn missing_asset_error_names_the_path() {
        let error = MediaError::Missing(PathBuf::from("audio/x.ogg"));
        assert_eq!(error.to_string(), "asset not found: audio/x.ogg");
    }
}
