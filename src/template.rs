use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{PrKitError, Result};

/// Default pull request body, in the upstream contribution-guide layout.
pub const DEFAULT_BODY_TEMPLATE: &str = "\
##### SUMMARY
{{summary}}

##### ISSUE TYPE
- {{issue_type}}
{{#if component}}
##### COMPONENT NAME
{{component}}
{{/if}}";

/// Context for rendering the pull request body template.
#[derive(Debug, Serialize)]
pub struct PrDescription {
    pub summary: String,
    pub issue_type: String,
    pub component: Option<String>,
}

pub fn render_body(template: &str, description: &PrDescription) -> Result<String> {
    let handlebars = Handlebars::new();

    handlebars
        .render_template(template, description)
        .map_err(|e| PrKitError::Template(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> PrDescription {
        PrDescription {
            summary: "Fix the frobnicator timeout handling".to_string(),
            issue_type: "Bugfix Pull Request".to_string(),
            component: Some("frobnicator".to_string()),
        }
    }

    #[test]
    fn test_render_default_template() {
        let body = render_body(DEFAULT_BODY_TEMPLATE, &description()).unwrap();

        assert!(body.contains("##### SUMMARY"));
        assert!(body.contains("Fix the frobnicator timeout handling"));
        assert!(body.contains("- Bugfix Pull Request"));
        assert!(body.contains("##### COMPONENT NAME"));
        assert!(body.contains("frobnicator"));
    }

    #[test]
    fn test_render_without_component_omits_section() {
        let mut desc = description();
        desc.component = None;

        let body = render_body(DEFAULT_BODY_TEMPLATE, &desc).unwrap();

        assert!(!body.contains("##### COMPONENT NAME"));
    }

    #[test]
    fn test_render_custom_template() {
        let body = render_body("{{summary}} ({{issue_type}})", &description()).unwrap();

        assert_eq!(
            body,
            "Fix the frobnicator timeout handling (Bugfix Pull Request)"
        );
    }

    #[test]
    fn test_render_invalid_template_is_template_error() {
        let result = render_body("{{#if}}", &description());

        assert!(matches!(result, Err(PrKitError::Template(_))));
    }
}
