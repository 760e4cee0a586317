//! Startup configuration loaded from `config.json`
//!
//! Every key falls back to its default on its own; a bad value never takes
//! the others down with it and never aborts startup.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_PATH_ENV: &str = "OVERLAY_TRANSLATE_CONFIG";

const DEFAULT_API_KEY: &str = "YOUR_API_KEY_HERE";
const DEFAULT_DURATION_SECS: f64 = 5.0;
const DEFAULT_TRIGGER_HOTKEY: &str = "`";
const DEFAULT_QUIT_HOTKEY: &str = "Escape";
const DEFAULT_TARGET_LANGUAGE: &str = "Korean";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TESSERACT_PATH: &str = "tesseract";

/// Immutable settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub display_duration: Duration,
    pub trigger_hotkey: String,
    pub quit_hotkey: String,
    pub target_language: String,
    pub model: String,
    pub tesseract_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            display_duration: Duration::from_secs_f64(DEFAULT_DURATION_SECS),
            trigger_hotkey: DEFAULT_TRIGGER_HOTKEY.to_string(),
            quit_hotkey: DEFAULT_QUIT_HOTKEY.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            tesseract_path: DEFAULT_TESSERACT_PATH.to_string(),
        }
    }
}

impl Config {
    /// `$OVERLAY_TRANSLATE_CONFIG`, else `config.json` next to the executable
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load from `path`, falling back to defaults with a warning
    pub fn load(path: &Path) -> Config {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::from_json_str(&contents);
                info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file not readable, using defaults");
                Config::default()
            }
        }
    }

    pub fn from_json_str(contents: &str) -> Config {
        match serde_json::from_str::<Value>(contents) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            Ok(_) => {
                warn!("config root is not an object, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!(error = %e, "config file is malformed, using defaults");
                Config::default()
            }
        }
    }

    /// True while the shipped placeholder key is still in place
    pub fn has_placeholder_api_key(&self) -> bool {
        let key = self.api_key.trim();
        key.is_empty() || key == DEFAULT_API_KEY
    }

    fn from_map(map: &Map<String, Value>) -> Config {
        let defaults = Config::default();
        Config {
            api_key: string_field(map, &["apiKey", "gemini_api_key"], defaults.api_key, false),
            display_duration: duration_field(
                map,
                &["translationDurationSeconds", "translation_duration_seconds"],
                defaults.display_duration,
            ),
            trigger_hotkey: string_field(
                map,
                &["showTranslationHotkey", "show_translation_hotkey"],
                defaults.trigger_hotkey,
                true,
            ),
            quit_hotkey: string_field(map, &["quitHotkey", "quit_hotkey"], defaults.quit_hotkey, true),
            target_language: string_field(
                map,
                &["targetLanguage", "target_language"],
                defaults.target_language,
                true,
            ),
            model: string_field(map, &["model"], defaults.model, true),
            tesseract_path: string_field(
                map,
                &["tesseractPath", "tesseract_path"],
                defaults.tesseract_path,
                true,
            ),
        }
    }
}

/// First present spelling of a key
fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<(&'a Value, String)> {
    keys.iter()
        .find_map(|k| map.get(*k).map(|v| (v, (*k).to_string())))
}

fn string_field(
    map: &Map<String, Value>,
    keys: &[&str],
    default: String,
    non_empty: bool,
) -> String {
    let Some((value, key)) = lookup(map, keys) else {
        return default;
    };
    match value.as_str() {
        Some(s) if non_empty && s.trim().is_empty() => {
            warn!(key = %key, "config value is empty, using default {default:?}");
            default
        }
        Some(s) => s.to_string(),
        None => {
            warn!(key = %key, "config value is not a string, using default {default:?}");
            default
        }
    }
}

fn duration_field(map: &Map<String, Value>, keys: &[&str], default: Duration) -> Duration {
    let Some((value, key)) = lookup(map, keys) else {
        return default;
    };
    match value.as_f64() {
        Some(secs) if secs.is_finite() && secs > 0.0 => Duration::from_secs_f64(secs),
        _ => {
            warn!(key = %key, "config value is not a positive number, using default {default:?}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load(Path::new("/definitely/not/here/config.json"));
        assert_eq!(config, Config::default());
        assert_eq!(config.display_duration, Duration::from_secs(5));
        assert_eq!(config.trigger_hotkey, "`");
    }

    #[test]
    fn camel_case_keys() {
        let config = Config::from_json_str(
            r#"{"apiKey": "k-123", "translationDurationSeconds": 2.5, "showTranslationHotkey": "F9"}"#,
        );
        assert_eq!(config.api_key, "k-123");
        assert_eq!(config.display_duration, Duration::from_millis(2500));
        assert_eq!(config.trigger_hotkey, "F9");
        assert_eq!(config.quit_hotkey, "Escape");
    }

    #[test]
    fn snake_case_keys_are_accepted() {
        let config = Config::from_json_str(
            r#"{"gemini_api_key": "abc", "translation_duration_seconds": 8, "show_translation_hotkey": "F2"}"#,
        );
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.display_duration, Duration::from_secs(8));
        assert_eq!(config.trigger_hotkey, "F2");
    }

    #[test]
    fn invalid_values_fall_back_per_key() {
        let config = Config::from_json_str(
            r#"{"apiKey": "kept", "translationDurationSeconds": -3, "showTranslationHotkey": "  ", "targetLanguage": 7}"#,
        );
        assert_eq!(config.api_key, "kept");
        assert_eq!(config.display_duration, Duration::from_secs(5));
        assert_eq!(config.trigger_hotkey, "`");
        assert_eq!(config.target_language, "Korean");
    }

    #[test]
    fn zero_and_string_durations_are_rejected() {
        for raw in [r#"{"translationDurationSeconds": 0}"#, r#"{"translationDurationSeconds": "5"}"#] {
            assert_eq!(Config::from_json_str(raw).display_duration, Duration::from_secs(5));
        }
    }

    #[test]
    fn malformed_or_non_object_root_uses_defaults() {
        assert_eq!(Config::from_json_str("{ not json"), Config::default());
        assert_eq!(Config::from_json_str("[1, 2, 3]"), Config::default());
    }

    #[test]
    fn placeholder_key_is_detected() {
        assert!(Config::default().has_placeholder_api_key());
        assert!(Config::from_json_str(r#"{"apiKey": ""}"#).has_placeholder_api_key());
        assert!(!Config::from_json_str(r#"{"apiKey": "real"}"#).has_placeholder_api_key());
    }

    #[test]
    fn supplementary_keys() {
        let config = Config::from_json_str(
            r#"{"quitHotkey": "ctrl+q", "model": "gemini-2.0-flash", "tesseractPath": "C:\\OCR\\tesseract.exe"}"#,
        );
        assert_eq!(config.quit_hotkey, "ctrl+q");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.tesseract_path, "C:\\OCR\\tesseract.exe");
    }
}
