//! Input cleanup for text, email and URL fields taken from inbound payloads.

/// Trim, drop markup tags and control characters, collapse whitespace runs.
pub fn text(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_control() => stripped.push(' '),
            c => stripped.push(c),
        }
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep only characters legal in an address; empty unless it looks like
/// `local@domain.tld`.
pub fn email(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.@".contains(*c))
        .collect();

    let Some((local, domain)) = cleaned.split_once('@') else {
        return String::new();
    };
    let valid = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..");
    if valid { cleaned } else { String::new() }
}

/// Absolute http(s) URLs only; anything else becomes empty.
pub fn url(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let has_scheme = lower.starts_with("https://") || lower.starts_with("http://");
    if !has_scheme || trimmed.chars().any(|c| c.is_whitespace() || c == '"' || c == '<' || c == '>') {
        return String::new();
    }
    trimmed.to_string()
}
