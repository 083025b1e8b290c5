use vn_core::MixLevels;

/// Maps a requested effect volume (percent) onto effect and music levels.
///
/// Up to 100% the effect is scaled linearly and the music bed is untouched.
/// Above 100% the effect is pinned at full volume and the music is attenuated
/// by the overdrive ratio, so 200% halves the music and 400% quarters it.
/// A missing request plays the effect at full volume without ducking.
pub fn duck(requested_percent: Option<f64>, base_music_volume: f64) -> MixLevels {
    let (effect, music) = match requested_percent.filter(|value| value.is_finite()) {
        None => (1.0, base_music_volume),
        Some(percent) if percent > 100.0 => (1.0, base_music_volume * (100.0 / percent)),
        Some(percent) => (percent / 100.0, base_music_volume),
    };

    MixLevels {
        effect: effect.max(0.0),
        music: music.max(0.0),
    }
}
