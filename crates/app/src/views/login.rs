use super::{escape, layout};

/// Sign-in form, optionally showing the message from a failed attempt.
pub fn page(email: &str, message: Option<&str>) -> String {
    let message = message
        .map(|text| {
            format!(
                r#"<p class="error" aria-live="polite" aria-atomic="true">{}</p>"#,
                escape(text)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Please log in to continue.</h1>
<form method="post" action="/login">
<div class="field">
<label for="email">Email</label>
<input id="email" name="email" type="email" placeholder="Enter your email address" value="{email}" required>
</div>
<div class="field">
<label for="password">Password</label>
<input id="password" name="password" type="password" placeholder="Enter password" minlength="6" required>
</div>
<button type="submit">Log in</button>
{message}
</form>"#,
        email = escape(email),
    );
    layout("Login", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_attempt_keeps_email_and_shows_message() {
        let html = page("user@nextmail.com", Some("Invalid credentials."));
        assert!(html.contains(r#"value="user@nextmail.com""#));
        assert!(html.contains("Invalid credentials."));
        assert!(!page("", None).contains(r#"class="error""#));
    }
}
