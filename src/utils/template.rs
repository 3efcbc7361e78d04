//! String template rendering utilities.

pub struct TemplateVars;

impl TemplateVars {
    pub const ROOT: &'static str = "ROOT";
    pub const DOMAIN: &'static str = "DOMAIN";
}

/// Replace every `%KEY%` placeholder with its value.
pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("%{}%", key);
        result = result.replace(&placeholder, value);
    }

    result
}

pub fn is_present(template: &str, key: &str) -> bool {
    template.contains(&format!("%{}%", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_all_occurrences() {
        let template = "directory=%ROOT%/%DOMAIN%\ncommand=%ROOT%/bin/celery\n";
        let rendered = render(
            template,
            &[(TemplateVars::ROOT, "/srv/lutris"), (TemplateVars::DOMAIN, "lutris.net")],
        );
        assert_eq!(
            rendered,
            "directory=/srv/lutris/lutris.net\ncommand=/srv/lutris/bin/celery\n"
        );
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        assert_eq!(render("%USER%", &[(TemplateVars::ROOT, "/srv")]), "%USER%");
    }

    #[test]
    fn is_present_detects_placeholder() {
        assert!(is_present("[program:%DOMAIN%-celery]", TemplateVars::DOMAIN));
        assert!(!is_present("[program:celery]", TemplateVars::DOMAIN));
    }
}
