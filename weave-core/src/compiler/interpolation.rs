//! Text interpolation: `{{ expression }}`.

use std::sync::LazyLock;

use regex::Regex;

/// One greedy `{{ ... }}` group per text node.
static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*)\}\}").expect("interpolation pattern is valid"));

/// The trimmed expression inside the first `{{ ... }}`, if any.
///
/// The whole text node becomes the binding target; text around the braces is
/// replaced on render.
pub fn capture(text: &str) -> Option<&str> {
    INTERPOLATION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}
