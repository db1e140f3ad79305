//! User-Agent classification, used as a metric dimension.

const BROWSER_TOKENS: [&str; 6] = [
    "Mozilla", "Chrome", "Safari", "Firefox", "Edg", "Opera",
];

/// Classify the request source from its User-Agent.
///
/// Browsers map to `"browser"`; the automated probe
/// `SearchBlitz (<tag>)` maps to `"searchblitz_<tag>"`; everything else
/// is `"other"`.
pub fn classify(user_agent: Option<&str>) -> String {
    let Some(ua) = user_agent else {
        return "other".to_string();
    };
    if let Some(tag) = searchblitz_tag(ua) {
        return format!("searchblitz_{tag}");
    }
    if BROWSER_TOKENS.iter().any(|token| ua.contains(token)) {
        return "browser".to_string();
    }
    "other".to_string()
}

fn searchblitz_tag(ua: &str) -> Option<&str> {
    let rest = ua.strip_prefix("SearchBlitz (")?;
    let (tag, _) = rest.split_once(')')?;
    if tag.is_empty() {
        return None;
    }
    Some(tag)
}
