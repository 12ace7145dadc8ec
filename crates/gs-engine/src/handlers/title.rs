//! Title and subtitle display

use crate::handler::ValueAction;
use async_trait::async_trait;
use gs_core::{keys, ActionError, ActionOutcome, ActionResult, Actor, DEFAULT_DELIMITER};
use gs_services::{Title, TitleService};
use std::sync::Arc;

/// `title:<title>[:<subtitle>[:<fadeIn>:<stay>:<fadeOut>]]`, timings in ticks
pub struct TitleAction {
    titles: Arc<dyn TitleService>,
}

impl TitleAction {
    pub fn new(titles: Arc<dyn TitleService>) -> Self {
        Self { titles }
    }
}

/// Parse a title value
///
/// Three trailing numbers after a subtitle are the timings; any other
/// colons belong to the subtitle.
pub fn parse_title(value: &str) -> Option<Title> {
    let parts: Vec<&str> = value.split(DEFAULT_DELIMITER).collect();
    let n = parts.len();

    let timings = if n >= 5 {
        let parsed: Vec<u32> = parts[n - 3..]
            .iter()
            .filter_map(|p| p.trim().parse().ok())
            .collect();
        (parsed.len() == 3).then_some(parsed)
    } else {
        None
    };

    let text_parts = match timings {
        Some(_) => &parts[..n - 3],
        None => &parts[..],
    };
    let title = text_parts[0].trim().to_string();
    let subtitle = text_parts[1..].join(":").trim().to_string();
    if title.is_empty() && subtitle.is_empty() {
        return None;
    }

    let mut parsed = Title::new(title, subtitle);
    if let Some(t) = timings {
        parsed.fade_in = t[0];
        parsed.stay = t[1];
        parsed.fade_out = t[2];
    }
    Some(parsed)
}

#[async_trait]
impl ValueAction for TitleAction {
    fn type_name(&self) -> &'static str {
        "title"
    }

    fn describe(&self) -> &'static str {
        "Show a title and optional subtitle on the player's screen"
    }

    fn usage_examples(&self) -> &'static [&'static str] {
        &[
            "title:&6Welcome",
            "title:&6Welcome:&7to the server",
            "title:&6Level up!:&7Now level {level}:10:70:20",
        ]
    }

    fn is_valid_value(&self, value: &str) -> bool {
        parse_title(value).is_some()
    }

    async fn run(&self, actor: &Actor, value: &str) -> ActionOutcome {
        let title = parse_title(value)
            .ok_or_else(|| ActionError::validation("title", "title and subtitle are empty"))?;

        self.titles
            .send_title(actor, &title)
            .await
            .map_err(|e| e.into_action_error("title"))?;

        Ok(ActionResult::success(keys::TITLE_SENT)
            .with("title", title.title)
            .with("subtitle", title.subtitle))
    }
}
