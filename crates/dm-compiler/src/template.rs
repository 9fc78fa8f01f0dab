use crate::*;

pub fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").expect("placeholder regex")
    })
}

/// Trims and collapses whitespace runs to a single space. Keywords and user
/// input both go through this so they compare on the same footing.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn template_placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    for captures in placeholder_regex().captures_iter(template) {
        let Some(name) = captures.get(1) else {
            continue;
        };
        if !names.contains(&name.as_str()) {
            names.push(name.as_str());
        }
    }
    names
}
