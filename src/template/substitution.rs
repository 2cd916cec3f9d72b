//! Variable substitution engine for email templates

use serde_json::{Map, Value};

use super::types::{RenderedEmail, StoredEmailTemplate, TemplateError, TemplateResult};

/// Render subject, HTML and text of a stored template.
///
/// Declared defaults fill in for absent variables; an absent variable
/// declared as required is an error. Undeclared variables are substituted
/// too.
pub fn render_template(
    template: &StoredEmailTemplate,
    variables: &Value,
) -> TemplateResult<RenderedEmail> {
    let empty = Map::new();
    let supplied = match variables {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(TemplateError::InvalidVariables(
                "Variables must be an object".to_string(),
            ))
        }
    };

    let mut resolved = supplied.clone();
    for variable in &template.variables {
        if resolved.contains_key(&variable.name) {
            continue;
        }
        match &variable.default_value {
            Some(default) => {
                resolved.insert(variable.name.clone(), Value::String(default.clone()));
            }
            None if variable.required => {
                return Err(TemplateError::MissingVariable(variable.name.clone()));
            }
            None => {}
        }
    }

    Ok(RenderedEmail {
        subject: substitute_string(&template.subject, &resolved),
        html: substitute_html(&template.html_content, &resolved),
        text: template
            .text_content
            .as_deref()
            .map(|text| substitute_string(text, &resolved)),
    })
}

/// Replace every `{{key}}` in `template` with its value.
///
/// The template is scanned once, so placeholders inside substituted values
/// are left as they are. Unknown keys keep their placeholder.
pub fn substitute_string(template: &str, variables: &Map<String, Value>) -> String {
    substitute_with(template, variables, |value| value.to_string())
}

/// Like [`substitute_string`], with values HTML-escaped.
pub fn substitute_html(template: &str, variables: &Map<String, Value>) -> String {
    substitute_with(template, variables, html_escape)
}

fn substitute_with(
    template: &str,
    variables: &Map<String, Value>,
    encode: impl Fn(&str) -> String,
) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let Some(close) = after.find("}}") else {
            result.push_str(&rest[open..]);
            return result;
        };

        let key = &after[..close];
        match variables.get(key) {
            Some(value) => result.push_str(&encode(&display_value(value))),
            None => {
                result.push_str("{{");
                result.push_str(key);
                result.push_str("}}");
            }
        }
        rest = &after[close + 2..];
    }

    result.push_str(rest);
    result
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For arrays and objects, use JSON representation
        _ => value.to_string(),
    }
}

/// Simple HTML escaping for substituted values.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::types::{NewEmailTemplate, TemplateStatus, VariableSpec};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn template() -> StoredEmailTemplate {
        StoredEmailTemplate::from_new(
            NewEmailTemplate {
                name: "OTP".to_string(),
                description: String::new(),
                subject: "Your {{app_name}} code".to_string(),
                html_content: "<p>Code: <b>{{otp}}</b>, valid {{minutes}} min</p>".to_string(),
                text_content: Some("Code: {{otp}}".to_string()),
                tags: vec!["auth".to_string(), "otp".to_string()],
                variables: vec![
                    VariableSpec::required("otp", "One-time code"),
                    VariableSpec::optional("app_name", "Product name", Some("Acme")),
                    VariableSpec::optional("minutes", "Validity", None),
                ],
                status: TemplateStatus::Active,
            },
            Uuid::new_v4(),
            Utc::now(),
        )
    }

    #[test]
    fn test_render_with_defaults() {
        let rendered = render_template(&template(), &json!({"otp": "482913", "minutes": 10})).unwrap();
        assert_eq!(rendered.subject, "Your Acme code");
        assert_eq!(rendered.html, "<p>Code: <b>482913</b>, valid 10 min</p>");
        assert_eq!(rendered.text.as_deref(), Some("Code: 482913"));
    }

    #[test]
    fn test_supplied_value_overrides_default() {
        let rendered =
            render_template(&template(), &json!({"otp": "1", "app_name": "Ara"})).unwrap();
        assert_eq!(rendered.subject, "Your Ara code");
        // Optional variable without default stays as a placeholder
        assert!(rendered.html.contains("{{minutes}}"));
    }

    #[test]
    fn test_missing_required_variable() {
        assert_eq!(
            render_template(&template(), &json!({})),
            Err(TemplateError::MissingVariable("otp".to_string()))
        );
    }

    #[test]
    fn test_variables_must_be_object() {
        assert!(matches!(
            render_template(&template(), &json!(["otp"])),
            Err(TemplateError::InvalidVariables(_))
        ));
    }

    #[test]
    fn test_substitute_value_kinds() {
        let vars = json!({"n": 3, "flag": true, "none": null, "list": [1, 2]});
        let Value::Object(map) = vars else { unreachable!() };
        assert_eq!(
            substitute_string("{{n}} {{flag}} [{{none}}] {{list}}", &map),
            "3 true [] [1,2]"
        );
    }

    #[test]
    fn test_html_values_are_escaped() {
        let rendered = render_template(
            &template(),
            &json!({"otp": "<img src=x onerror=alert(1)>", "app_name": "Tom & Jerry's"}),
        )
        .unwrap();
        assert_eq!(
            rendered.html,
            "<p>Code: <b>&lt;img src=x onerror=alert(1)&gt;</b>, valid {{minutes}} min</p>"
        );
        // Subject and text are plain text
        assert_eq!(rendered.subject, "Your Tom & Jerry's code");
        assert_eq!(rendered.text.as_deref(), Some("Code: <img src=x onerror=alert(1)>"));
    }

    #[test]
    fn test_substituted_values_are_not_expanded_again() {
        let vars = json!({"a": "{{b}}", "b": "{{a}}", "url": "https://x/verify?t=1"});
        let Value::Object(map) = vars else { unreachable!() };
        assert_eq!(
            substitute_string("{{a}} {{b}} {{url}}", &map),
            "{{b}} {{a}} https://x/verify?t=1"
        );
    }

    #[test]
    fn test_unknown_and_unclosed_placeholders_are_kept() {
        let vars = json!({"n": 1});
        let Value::Object(map) = vars else { unreachable!() };
        assert_eq!(substitute_string("{{x}} {{n}} {{n", &map), "{{x}} 1 {{n");
    }

    #[test]
    fn test_builtin_template_escapes_user_name() {
        let definition = crate::template::AUTH_EMAIL_TEMPLATES
            .iter()
            .find(|d| d.metadata.tags.iter().any(|t| t == "email-verification"))
            .unwrap();
        let stored = StoredEmailTemplate::from_new(
            NewEmailTemplate::from(definition),
            Uuid::new_v4(),
            Utc::now(),
        );
        let mut variables = serde_json::Map::new();
        for variable in &stored.variables {
            variables.insert(variable.name.clone(), json!("v"));
        }
        variables.insert("user_name".to_string(), json!("<script>x</script>"));
        variables.insert("app_name".to_string(), json!("{{url}}"));
        variables.insert("url".to_string(), json!("https://x/verify?t=1"));

        let rendered = render_template(&stored, &Value::Object(variables)).unwrap();
        assert!(!rendered.html.contains("<script>"));
        assert!(!rendered.subject.contains("https://x/verify"));
        let text = rendered.text.unwrap();
        assert_eq!(text.matches("https://x/verify?t=1").count(), stored_url_count(&stored));
    }

    fn stored_url_count(template: &StoredEmailTemplate) -> usize {
        template
            .text_content
            .as_deref()
            .unwrap_or_default()
            .matches("{{url}}")
            .count()
    }
}
