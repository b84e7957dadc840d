use std::sync::LazyLock;

use regex::Regex;

/// Lines of the body searched for a `<title>` before giving up.
pub const TITLE_SCAN_LINES: usize = 20;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("static regex"));

/// What a web front page says about the device behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHints {
    pub server: Option<String>,
    pub title: Option<String>,
}

impl HttpHints {
    pub fn from_response(server: Option<&str>, body: &str) -> Self {
        Self {
            server: server
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            title: extract_title(body),
        }
    }

    /// The best name for the device: the page title, else the `Server` header.
    pub fn display_name(&self) -> Option<&str> {
        self.title.as_deref().or(self.server.as_deref())
    }

    /// Lower-cased `"<server> <title>"`, the text vendor tokens are matched against.
    pub fn fingerprint_text(&self) -> String {
        format!(
            "{} {}",
            self.server.as_deref().unwrap_or_default(),
            self.title.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }

    pub fn is_empty(&self) -> bool {
        self.server.is_none() && self.title.is_none()
    }
}

/// Finds the first `<title>` that opens and closes on the same line within
/// the first [`TITLE_SCAN_LINES`] lines of `body`.
pub fn extract_title(body: &str) -> Option<String> {
    body.lines()
        .take(TITLE_SCAN_LINES)
        .find_map(|line| TITLE_RE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_extracted_case_insensitively() {
        let body = "<html>\n<HEAD><TITLE lang=\"en\"> HP LaserJet M404 </TITLE></HEAD>";
        assert_eq!(extract_title(body).as_deref(), Some("HP LaserJet M404"));
    }

    #[test]
    fn title_beyond_scan_window_is_ignored() {
        let mut body = "\n".repeat(TITLE_SCAN_LINES);
        body.push_str("<title>late</title>");
        assert_eq!(extract_title(&body), None);
    }

    #[test]
    fn title_split_across_lines_is_not_matched() {
        assert_eq!(extract_title("<title>\nSplit\n</title>"), None);
    }

    #[test]
    fn display_name_prefers_title() {
        let hints = HttpHints::from_response(Some("lighttpd"), "<title>Web Login</title>");
        assert_eq!(hints.display_name(), Some("Web Login"));

        let hints = HttpHints::from_response(Some("App-webs/"), "");
        assert_eq!(hints.display_name(), Some("App-webs/"));

        let hints = HttpHints::from_response(Some("  "), "no title here");
        assert!(hints.is_empty());
        assert_eq!(hints.display_name(), None);
    }

    #[test]
    fn fingerprint_text_is_lowercase() {
        let hints = HttpHints::from_response(Some("DNVRS-Webs"), "<title>Hikvision</title>");
        assert_eq!(hints.fingerprint_text(), "dnvrs-webs hikvision");
    }
}
