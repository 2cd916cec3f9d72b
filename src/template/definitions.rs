//! Built-in authentication email templates.
//!
//! Every template carries the `auth` tag plus one tag naming its flow; the
//! pair is the template's identity in the repository.

use lazy_static::lazy_static;

use super::types::{TemplateContent, TemplateDefinition, TemplateMetadata, VariableSpec};

const LAYOUT_HEAD: &str = r#"<!DOCTYPE html>
<html>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; background: #f5f6f8; padding: 24px;">
<table role="presentation" width="100%" style="max-width: 560px; margin: 0 auto; background: #ffffff; border-radius: 8px; padding: 32px;">
<tr><td>"#;

const LAYOUT_FOOT: &str = r#"<p style="color: #8a8f98; font-size: 12px; margin-top: 32px;">If you did not request this email you can safely ignore it.<br>{{app_name}}</p>
</td></tr>
</table>
</body>
</html>"#;

fn layout(body: &str) -> String {
    format!("{LAYOUT_HEAD}\n{body}\n{LAYOUT_FOOT}")
}

fn button(label: &str) -> String {
    format!(
        r#"<p><a href="{{{{url}}}}" style="display: inline-block; background: #2f6fed; color: #ffffff; padding: 12px 20px; border-radius: 6px; text-decoration: none;">{label}</a></p>
<p style="font-size: 13px; color: #5b616b;">Or paste this link into your browser: {{{{url}}}}</p>"#
    )
}

fn tags(flow: &str) -> Vec<String> {
    vec!["auth".to_string(), flow.to_string()]
}

fn app_name() -> VariableSpec {
    VariableSpec::optional("app_name", "Product name shown in the footer", Some("Ara"))
}

fn user_name() -> VariableSpec {
    VariableSpec::optional("user_name", "Recipient display name", Some("there"))
}

fn email_verification() -> TemplateDefinition {
    TemplateDefinition {
        metadata: TemplateMetadata {
            name: "Email verification".to_string(),
            description: "Sent after sign-up to confirm the address".to_string(),
            subject: "Verify your email address".to_string(),
            tags: tags("email-verification"),
            variables: vec![
                user_name(),
                VariableSpec::required("url", "Verification link"),
                app_name(),
            ],
        },
        content: TemplateContent {
            html: layout(&format!(
                "<h1>Confirm your email</h1>\n<p>Hi {{{{user_name}}}}, please confirm your email address to finish setting up your account.</p>\n{}",
                button("Verify email")
            )),
            text: Some(
                "Hi {{user_name}},\n\nConfirm your email address: {{url}}\n\n{{app_name}}"
                    .to_string(),
            ),
        },
    }
}

fn password_reset() -> TemplateDefinition {
    TemplateDefinition {
        metadata: TemplateMetadata {
            name: "Password reset".to_string(),
            description: "Link to choose a new password".to_string(),
            subject: "Reset your password".to_string(),
            tags: tags("password-reset"),
            variables: vec![
                user_name(),
                VariableSpec::required("url", "Password reset link"),
                VariableSpec::optional("expires_minutes", "Link lifetime", Some("60")),
                app_name(),
            ],
        },
        content: TemplateContent {
            html: layout(&format!(
                "<h1>Reset your password</h1>\n<p>Hi {{{{user_name}}}}, we received a request to reset your password. The link expires in {{{{expires_minutes}}}} minutes.</p>\n{}",
                button("Choose a new password")
            )),
            text: Some(
                "Hi {{user_name}},\n\nReset your password: {{url}}\nThe link expires in {{expires_minutes}} minutes.\n\n{{app_name}}"
                    .to_string(),
            ),
        },
    }
}

fn magic_link() -> TemplateDefinition {
    TemplateDefinition {
        metadata: TemplateMetadata {
            name: "Magic link sign-in".to_string(),
            description: "Passwordless sign-in link".to_string(),
            subject: "Your sign-in link".to_string(),
            tags: tags("magic-link"),
            variables: vec![VariableSpec::required("url", "Sign-in link"), app_name()],
        },
        content: TemplateContent {
            html: layout(&format!(
                "<h1>Sign in</h1>\n<p>Use the button below to sign in. The link can be used once.</p>\n{}",
                button("Sign in")
            )),
            text: Some("Sign in with this link: {{url}}\n\n{{app_name}}".to_string()),
        },
    }
}

fn one_time_code() -> TemplateDefinition {
    TemplateDefinition {
        metadata: TemplateMetadata {
            name: "One-time code".to_string(),
            description: "Numeric code for email OTP sign-in".to_string(),
            subject: "Your verification code is {{otp}}".to_string(),
            tags: tags("email-otp"),
            variables: vec![
                VariableSpec::required("otp", "One-time code"),
                VariableSpec::optional("expires_minutes", "Code lifetime", Some("5")),
                app_name(),
            ],
        },
        content: TemplateContent {
            html: layout(
                "<h1>Your code</h1>\n<p style=\"font-size: 28px; letter-spacing: 6px; font-weight: bold;\">{{otp}}</p>\n<p>The code expires in {{expires_minutes}} minutes.</p>",
            ),
            text: Some(
                "Your code is {{otp}}. It expires in {{expires_minutes}} minutes.\n\n{{app_name}}"
                    .to_string(),
            ),
        },
    }
}

fn change_email() -> TemplateDefinition {
    TemplateDefinition {
        metadata: TemplateMetadata {
            name: "Email change confirmation".to_string(),
            description: "Confirms a request to change the account email".to_string(),
            subject: "Confirm your new email address".to_string(),
            tags: tags("change-email"),
            variables: vec![
                user_name(),
                VariableSpec::required("new_email", "Requested address"),
                VariableSpec::required("url", "Confirmation link"),
                app_name(),
            ],
        },
        content: TemplateContent {
            html: layout(&format!(
                "<h1>Confirm email change</h1>\n<p>Hi {{{{user_name}}}}, confirm that you want to use <b>{{{{new_email}}}}</b> for your account.</p>\n{}",
                button("Confirm change")
            )),
            text: Some(
                "Hi {{user_name}},\n\nConfirm {{new_email}} as your new address: {{url}}\n\n{{app_name}}"
                    .to_string(),
            ),
        },
    }
}

fn organization_invitation() -> TemplateDefinition {
    TemplateDefinition {
        metadata: TemplateMetadata {
            name: "Organization invitation".to_string(),
            description: "Invites a user to join an organization".to_string(),
            subject: "{{inviter_name}} invited you to {{organization_name}}".to_string(),
            tags: tags("organization-invitation"),
            variables: vec![
                VariableSpec::required("inviter_name", "Who sent the invitation"),
                VariableSpec::required("organization_name", "Organization being joined"),
                VariableSpec::optional("role", "Role granted on acceptance", Some("member")),
                VariableSpec::required("url", "Invitation acceptance link"),
                app_name(),
            ],
        },
        content: TemplateContent {
            html: layout(&format!(
                "<h1>You're invited</h1>\n<p>{{{{inviter_name}}}} invited you to join <b>{{{{organization_name}}}}</b> as {{{{role}}}}.</p>\n{}",
                button("Accept invitation")
            )),
            text: Some(
                "{{inviter_name}} invited you to join {{organization_name}} as {{role}}.\nAccept: {{url}}\n\n{{app_name}}"
                    .to_string(),
            ),
        },
    }
}

lazy_static! {
    /// Templates the auth service sends, in registration order
    pub static ref AUTH_EMAIL_TEMPLATES: Vec<TemplateDefinition> = vec![
        email_verification(),
        password_reset(),
        magic_link(),
        one_time_code(),
        change_email(),
        organization_invitation(),
    ];
}
