use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ChoiceControl;

pub const FIELD_ID: &str = "id";
pub const FIELD_TEXT: &str = "text";
pub const FIELD_IMAGE: &str = "image";
pub const FIELD_AUDIO: &str = "audio";
pub const FIELD_SFX: &str = "sfx";
pub const FIELD_SFX_VOL: &str = "sfx_vol";

/// Label/target column pairs, in the order choices are offered.
pub const CHOICE_FIELDS: [(&str, &str); 2] = [("option1", "target1"), ("option2", "target2")];

/// One row of the story table.
///
/// Stores every column verbatim (lower-cased name, trimmed value) and exposes
/// the known columns through accessors that make absence explicit: a blank
/// cell reads as `None`, never as an empty string that callers must check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRecord {
    fields: BTreeMap<String, String>,
}

impl SceneRecord {
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Raw cell value, including blank cells.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Non-blank cell value.
    pub fn present(&self, name: &str) -> Option<&str> {
        self.field(name).filter(|value| !value.trim().is_empty())
    }

    pub fn id(&self) -> &str {
        self.field(FIELD_ID).unwrap_or_default()
    }

    /// Text is shown verbatim; a missing column reads as empty text.
    pub fn text(&self) -> &str {
        self.field(FIELD_TEXT).unwrap_or_default()
    }

    pub fn image(&self) -> Option<&str> {
        self.present(FIELD_IMAGE)
    }

    pub fn audio(&self) -> Option<&str> {
        self.present(FIELD_AUDIO)
    }

    pub fn sfx(&self) -> Option<&str> {
        self.present(FIELD_SFX)
    }

    /// Requested effect volume in percent. `None` when the cell is blank or
    /// not a finite number; the ducking calculator owns the default.
    pub fn sfx_volume(&self) -> Option<f64> {
        self.present(FIELD_SFX_VOL).and_then(parse_percent)
    }

    /// Choice controls for every label/target pair where both cells are
    /// filled. Pairs are independent, so the second pair may produce the only
    /// control.
    pub fn choices(&self) -> Vec<ChoiceControl> {
        CHOICE_FIELDS
            .iter()
            .filter_map(|(label_field, target_field)| {
                let label = self.present(label_field)?;
                let target = self.present(target_field)?;
                Some((label, target))
            })
            .enumerate()
            .map(|(index, (label, target))| ChoiceControl {
                index,
                label: label.to_string(),
                target: target.to_string(),
            })
            .collect()
    }

    /// Targets of every declared choice, used to report dangling links.
    pub fn choice_targets(&self) -> Vec<&str> {
        CHOICE_FIELDS
            .iter()
            .filter_map(|(_, target_field)| self.present(target_field))
            .collect()
    }
}

/// Accepts `250`, `250.5`, ` 80 ` and `80%`. Rejects NaN and infinities so
/// spreadsheet junk falls back to the default mix.
pub fn parse_percent(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    number.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod record_tests {
    use super::*;

    fn record(entries: &[(&str, &str)]) -> SceneRecord {
        SceneRecord::from_fields(
            entries
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        )
    }

    #[test]
    fn blank_media_cells_read_as_absent() {
        let scene = record(&[("id", "start"), ("image", "  "), ("audio", "theme.mp3")]);
        assert_eq!(scene.image(), None);
        assert_eq!(scene.audio(), Some("theme.mp3"));
        assert_eq!(scene.sfx(), None);
    }

    #[test]
    fn missing_id_and_text_read_as_empty() {
        let scene = record(&[("image", "a.png")]);
        assert_eq!(scene.id(), "");
        assert_eq!(scene.text(), "");
    }

    #[test]
    fn sfx_volume_parses_numbers_and_rejects_junk() {
        assert_eq!(record(&[("sfx_vol", "250")]).sfx_volume(), Some(250.0));
        assert_eq!(record(&[("sfx_vol", "80%")]).sfx_volume(), Some(80.0));
        assert_eq!(record(&[("sfx_vol", "loud")]).sfx_volume(), None);
        assert_eq!(record(&[("sfx_vol", "NaN")]).sfx_volume(), None);
        assert_eq!(record(&[("sfx_vol", "")]).sfx_volume(), None);
    }

    #[test]
    fn second_choice_pair_can_stand_alone() {
        let scene = record(&[
            ("option1", ""),
            ("target1", ""),
            ("option2", "Leave"),
            ("target2", "exit"),
        ]);
        let choices = scene.choices();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].index, 0);
        assert_eq!(choices[0].label, "Leave");
        assert_eq!(choices[0].target, "exit");
    }

    #[test]
    fn half_filled_pair_produces_no_control() {
        let scene = record(&[("option1", "Go"), ("target1", "")]);
        assert!(scene.choices().is_empty());
    }

    #[test]
    fn unknown_columns_are_preserved() {
        let scene = record(&[("id", "a"), ("mood", "tense")]);
        assert_eq!(scene.field("mood"), Some("tense"));
    }

    #[test]
    fn record_serializes_as_plain_map() {
        let scene = record(&[("id", "a"), ("text", "Hi")]);
        let json = serde_json::to_string(&scene).expect("record should serialize");
        assert_eq!(json, r#"{"fields":{"id":"a","text":"Hi"}}"#);
    }
}
