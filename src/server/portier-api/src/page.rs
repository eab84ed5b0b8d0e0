//! Login page rendering and redirect targets.

use tera::{Context, Tera};

/// Fallback redirect target.
pub const DEFAULT_TARGET: &str = "/";

const LOGIN_TEMPLATE_NAME: &str = "login.html";

const LOGIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<h1>Sign in</h1>
{% if error %}<p class="error">{{ error }}</p>
{% endif %}<form method="POST" action="/login">
<input type="hidden" name="url" value="{{ target }}">
<label>Username <input type="text" name="username" autocomplete="username" required></label>
<label>Password <input type="password" name="password" autocomplete="current-password" required></label>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#;

/// Restricts a redirect target to a local absolute path.
///
/// Anything else (absent, scheme-relative `//host`, absolute URLs, control
/// characters) falls back to [`DEFAULT_TARGET`].
pub fn safe_target(url: Option<&str>) -> &str {
    match url {
        Some(target)
            if target.starts_with('/')
                && !target.starts_with("//")
                && !target.contains('\\')
                && target.bytes().all(|b| b.is_ascii_graphic()) =>
        {
            target
        },
        _ => DEFAULT_TARGET,
    }
}

/// The login form template, autoescaped as HTML.
#[derive(Debug)]
pub struct LoginPage {
    templates: Tera,
}

impl LoginPage {
    /// Compiles the login template.
    pub fn new() -> Result<Self, tera::Error> {
        let mut templates = Tera::default();
        templates.add_raw_template(LOGIN_TEMPLATE_NAME, LOGIN_TEMPLATE)?;
        Ok(Self { templates })
    }

    /// Renders the form, posting back to `/login` with `target` preserved.
    pub fn render(&self, target: &str, error: Option<&str>) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("target", target);
        context.insert("error", &error);
        self.templates.render(LOGIN_TEMPLATE_NAME, &context)
    }
}
