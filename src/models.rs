use serde::{Deserialize, Serialize};

/// Practice material: a kanji-mixed line and its kana reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kana: String,
}

impl Prompt {
    pub fn new(text: impl Into<String>, kana: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kana: kana.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DurationPreset {
    #[default]
    OneMinute,
    OneHour,
    Custom,
}

impl DurationPreset {
    pub fn seconds(self, custom_seconds: u64) -> u64 {
        match self {
            DurationPreset::OneMinute => 60,
            DurationPreset::OneHour => 60 * 60,
            DurationPreset::Custom => custom_seconds,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationPreset::OneMinute => "1分",
            DurationPreset::OneHour => "1時間",
            DurationPreset::Custom => "カスタム",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DurationPreset::OneMinute => DurationPreset::OneHour,
            DurationPreset::OneHour => DurationPreset::Custom,
            DurationPreset::Custom => DurationPreset::OneMinute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_cycle_through_all_three() {
        let start = DurationPreset::OneMinute;
        assert_eq!(start.next(), DurationPreset::OneHour);
        assert_eq!(start.next().next(), DurationPreset::Custom);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn custom_preset_uses_supplied_seconds() {
        assert_eq!(DurationPreset::OneMinute.seconds(5), 60);
        assert_eq!(DurationPreset::OneHour.seconds(5), 3600);
        assert_eq!(DurationPreset::Custom.seconds(5), 5);
    }

    #[test]
    fn prompt_fields_default_to_empty() {
        let p: Prompt = serde_json::from_str(r#"{"text": "漢字"}"#).unwrap();
        assert_eq!(p, Prompt::new("漢字", ""));
    }
}
