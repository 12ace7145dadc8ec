//! Sound playback

use crate::handler::ValueAction;
use async_trait::async_trait;
use gs_core::{keys, ActionError, ActionOutcome, ActionResult, Actor, DEFAULT_DELIMITER};
use gs_services::{SoundService, SoundSpec};
use std::sync::Arc;

/// `sound:<name>[:<volume>[:<pitch>]]`
pub struct SoundAction {
    sounds: Arc<dyn SoundService>,
}

impl SoundAction {
    pub fn new(sounds: Arc<dyn SoundService>) -> Self {
        Self { sounds }
    }
}

/// Parse a sound value
///
/// Up to two trailing numbers are volume and pitch, so namespaced names
/// (`minecraft:ui.button.click`) keep their colon.
pub fn parse_sound(value: &str) -> Option<SoundSpec> {
    let mut parts: Vec<&str> = value.split(DEFAULT_DELIMITER).map(str::trim).collect();
    let mut numbers: Vec<f32> = Vec::new();

    while numbers.len() < 2 && parts.len() > 1 {
        let Some(number) = parts.last().and_then(|p| p.parse::<f32>().ok()) else {
            break;
        };
        numbers.insert(0, number);
        parts.pop();
    }

    let name = parts.join(":");
    if name.is_empty() {
        return None;
    }

    let (volume, pitch) = match numbers.as_slice() {
        [] => (1.0, 1.0),
        [volume] => (*volume, 1.0),
        [volume, pitch, ..] => (*volume, *pitch),
    };
    if !volume.is_finite() || volume < 0.0 || !pitch.is_finite() || pitch <= 0.0 {
        return None;
    }

    Some(SoundSpec::new(name, volume, pitch))
}

#[async_trait]
impl ValueAction for SoundAction {
    fn type_name(&self) -> &'static str {
        "sound"
    }

    fn describe(&self) -> &'static str {
        "Play a sound to the player"
    }

    fn usage_examples(&self) -> &'static [&'static str] {
        &[
            "sound:ui.button.click",
            "sound:entity.player.levelup:0.5:1.2",
            r#"sound { - "ui.click:0.5:1.2" - "block.note:1.0:0.8" }"#,
        ]
    }

    fn is_valid_value(&self, value: &str) -> bool {
        parse_sound(value).is_some()
    }

    async fn run(&self, actor: &Actor, value: &str) -> ActionOutcome {
        let sound = parse_sound(value)
            .ok_or_else(|| ActionError::validation("sound", format!("invalid sound '{}'", value)))?;

        self.sounds
            .play_sound(actor, &sound)
            .await
            .map_err(|e| e.into_action_error("sound"))?;

        Ok(ActionResult::success(keys::SOUND_PLAYED)
            .with("sound", sound.name)
            .with("volume", f64::from(sound.volume))
            .with("pitch", f64::from(sound.pitch)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sound() {
        let sound = parse_sound("ui.click:0.5:1.2").unwrap();
        assert_eq!(sound, SoundSpec::new("ui.click", 0.5, 1.2));

        let sound = parse_sound("block.note").unwrap();
        assert_eq!(sound, SoundSpec::new("block.note", 1.0, 1.0));
    }

    #[test]
    fn test_namespaced_sound() {
        let sound = parse_sound("minecraft:ui.button.click:0.3").unwrap();
        assert_eq!(sound.name, "minecraft:ui.button.click");
        assert_eq!(sound.volume, 0.3);
    }

    #[test]
    fn test_invalid_sounds() {
        assert!(parse_sound("").is_none());
        assert!(parse_sound("ui.click:-1").is_none());
        assert!(parse_sound("ui.click:1:0").is_none());
    }
}
