use std::sync::LazyLock;

use regex::Regex;

/// Longest raw banner returned when no known pattern matches.
pub const MAX_BANNER_CHARS: usize = 60;

static CAMERA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(hikvision|dahua)[^\s<>]{0,40}").expect("static regex"));
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(iphone|android[^\s<>]*)").expect("static regex"));

/// Turns the first bytes a service sent into a short device name.
///
/// Camera vendor strings win over handset strings; anything else is returned
/// trimmed and cut to [`MAX_BANNER_CHARS`] characters.
pub fn name_hint(banner: &str) -> Option<String> {
    if let Some(m) = CAMERA_RE.find(banner) {
        return Some(m.as_str().trim().to_string());
    }
    if let Some(m) = MOBILE_RE.find(banner) {
        return Some(m.as_str().trim().to_string());
    }

    let trimmed = banner.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_BANNER_CHARS).collect())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
