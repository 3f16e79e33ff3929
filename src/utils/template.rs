//! Placeholder rendering for packaging command templates.

/// Placeholder names understood by packaging commands
pub struct TemplateVars;

impl TemplateVars {
    pub const VERSION: &'static str = "version";
    pub const BASE: &'static str = "base";
    pub const ARCHIVE: &'static str = "archive";
    pub const TEMP_DIR: &'static str = "temp_dir";
    pub const STAGING_DIR: &'static str = "staging_dir";
    pub const EXCLUDE_FILE: &'static str = "exclude_file";
    pub const RELEASES_DIR: &'static str = "releases_dir";
}

/// Replace every `{{key}}` in `template` with its value
pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

/// Placeholders still present after rendering
pub fn unresolved(rendered: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = rendered;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                names.push(after[..end].to_string());
                rest = &after[end + 2..];
            }
            None => break,
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_all_occurrences() {
        let rendered = render(
            "{{temp_dir}}/{{archive}} {{temp_dir}}",
            &[(TemplateVars::TEMP_DIR, "../temp"), (TemplateVars::ARCHIVE, "A-v3.tar")],
        );
        assert_eq!(rendered, "../temp/A-v3.tar ../temp");
    }

    #[test]
    fn test_unknown_placeholder_is_left_and_reported() {
        let rendered = render("{{base}}-{{nope}}", &[(TemplateVars::BASE, "A-v3")]);
        assert_eq!(rendered, "A-v3-{{nope}}");
        assert_eq!(unresolved(&rendered), vec!["nope".to_string()]);
        assert!(unresolved("plain {{ open").is_empty());
    }
}
