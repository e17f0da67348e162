//! Active preset selection

use tracing::debug;

use super::DEV_PRESET;

// Deployment targets recognizable from their build environment.
const TARGET_SIGNALS: &[(&str, &str)] = &[("NETLIFY", "netlify"), ("VERCEL", "vercel")];

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The explicitly requested preset, if any.
///
/// A development build always gets [`DEV_PRESET`]. Otherwise the programmatic
/// value wins over the environment signal.
pub fn explicit_preset(explicit: Option<&str>, env_signal: Option<&str>, dev: bool) -> Option<String> {
    if dev {
        return Some(DEV_PRESET.to_string());
    }
    non_empty(explicit)
        .or_else(|| non_empty(env_signal))
        .map(str::to_string)
}

/// Choose the active preset: explicit (or dev) > detected target > fallback.
///
/// Never returns an empty identifier; an empty `fallback` falls back to
/// [`super::DEFAULT_PRESET`].
pub fn select_preset(
    explicit: Option<&str>,
    env_signal: Option<&str>,
    dev: bool,
    detected: Option<&str>,
    fallback: &str,
) -> String {
    let selected = explicit_preset(explicit, env_signal, dev)
        .or_else(|| non_empty(detected).map(str::to_string))
        .or_else(|| non_empty(Some(fallback)).map(str::to_string))
        .unwrap_or_else(|| super::DEFAULT_PRESET.to_string());
    debug!(preset = %selected, dev, "selected preset");
    selected
}

/// Detect the deployment target from environment signals.
///
/// `lookup` returns the value of an environment variable; a set, non-empty
/// variable counts as a signal.
pub fn detect_target<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    TARGET_SIGNALS
        .iter()
        .find(|(var, _)| lookup(var).is_some_and(|v| !v.is_empty()))
        .map(|(_, target)| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::DEFAULT_PRESET;

    #[test]
    fn test_dev_forces_dev_preset() {
        assert_eq!(
            select_preset(Some("vercel"), Some("netlify"), true, Some("netlify"), DEFAULT_PRESET),
            DEV_PRESET
        );
        assert_eq!(
            explicit_preset(Some("vercel"), None, true),
            Some(DEV_PRESET.to_string())
        );
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            select_preset(Some("vercel"), Some("netlify"), false, Some("static"), DEFAULT_PRESET),
            "vercel"
        );
        assert_eq!(
            select_preset(None, Some("netlify"), false, Some("static"), DEFAULT_PRESET),
            "netlify"
        );
        assert_eq!(
            select_preset(None, None, false, Some("static"), DEFAULT_PRESET),
            "static"
        );
        assert_eq!(select_preset(None, None, false, None, DEFAULT_PRESET), DEFAULT_PRESET);
    }

    #[test]
    fn test_empty_values_are_absent() {
        assert_eq!(
            select_preset(Some(""), Some("  "), false, Some(""), "node-server"),
            "node-server"
        );
        assert_eq!(select_preset(None, None, false, None, ""), DEFAULT_PRESET);
        assert_eq!(explicit_preset(Some(""), None, false), None);
    }

    #[test]
    fn test_detect_target() {
        let netlify = |var: &str| (var == "NETLIFY").then(|| "true".to_string());
        assert_eq!(detect_target(netlify), Some("netlify".to_string()));

        let vercel = |var: &str| (var == "VERCEL").then(|| "1".to_string());
        assert_eq!(detect_target(vercel), Some("vercel".to_string()));

        let empty = |var: &str| (var == "VERCEL").then(String::new);
        assert_eq!(detect_target(empty), None);

        assert_eq!(detect_target(|_| None), None);
    }
}
