//! Weighted entries for random selection

use gs_core::DEFAULT_DELIMITER;

/// An action string with its selection weight
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedAction {
    pub action: String,
    /// Strictly positive and finite
    pub weight: f64,
}

impl WeightedAction {
    pub fn new(action: impl Into<String>, weight: f64) -> Self {
        Self {
            action: action.into(),
            weight,
        }
    }
}

/// Parse `"<action>[:<weight>]"`
///
/// A trailing numeric token is taken as the weight only when the action left
/// after removing it contains exactly one `:` and `is_valid` accepts that
/// action. `economy:add:50` therefore keeps `50` as the amount, because
/// `economy:add` alone is not a valid economy action. Without a weight the
/// entry weighs 1.
///
/// Returns `None` for entries that must not take part in selection: empty
/// actions and weights that are zero, negative or not finite.
pub fn parse_weighted_entry<F>(entry: &str, is_valid: F) -> Option<WeightedAction>
where
    F: Fn(&str) -> bool,
{
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    if let Some((action, tail)) = entry.rsplit_once(DEFAULT_DELIMITER) {
        let action = action.trim();
        if let Ok(weight) = tail.trim().parse::<f64>() {
            let one_delimiter = action.matches(DEFAULT_DELIMITER).count() == 1;
            if one_delimiter && is_valid(action) {
                if weight > 0.0 && weight.is_finite() {
                    return Some(WeightedAction::new(action, weight));
                }
                return None;
            }
        }
    }

    Some(WeightedAction::new(entry, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &str) -> bool {
        true
    }

    #[test]
    fn test_weight_suffix() {
        assert_eq!(
            parse_weighted_entry("message:Lucky!:3", always),
            Some(WeightedAction::new("message:Lucky!", 3.0))
        );
        assert_eq!(
            parse_weighted_entry("message:Plain", always),
            Some(WeightedAction::new("message:Plain", 1.0))
        );
    }

    #[test]
    fn test_numeric_argument_is_not_a_weight() {
        let economy_valid = |action: &str| {
            let parts: Vec<_> = action.split(':').collect();
            parts.len() == 3 && parts[2].parse::<f64>().is_ok()
        };
        assert_eq!(
            parse_weighted_entry("economy:add:50", economy_valid),
            Some(WeightedAction::new("economy:add:50", 1.0))
        );
    }

    #[test]
    fn test_more_than_one_delimiter_keeps_number() {
        assert_eq!(
            parse_weighted_entry("sound:ui.click:0.5:1.2", always),
            Some(WeightedAction::new("sound:ui.click:0.5:1.2", 1.0))
        );
    }

    #[test]
    fn test_excluded_entries() {
        assert_eq!(parse_weighted_entry("message:never:0", always), None);
        assert_eq!(parse_weighted_entry("message:never:-2", always), None);
        assert_eq!(parse_weighted_entry("message:never:NaN", always), None);
        assert_eq!(parse_weighted_entry("   ", always), None);
    }
}
