use crate::errors::AppError;
use crate::models::Submission;
use regex::Regex;
use serde_json::Value;

/// Validate email address
///
/// Conservative shape check only: `local@domain.tld`, no embedded whitespace,
/// at least one dot in the domain. Deliverability is not verified.
pub fn is_valid_email(email: &str) -> bool {
    let email_regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    email_regex.is_match(email)
}

/// Parse and normalize a raw contact-form body into a [`Submission`].
///
/// The boundary is untyped: each known field is taken as its trimmed text
/// value when textual and treated as absent (empty string) otherwise. The
/// honeypot field `company` is coerced to text unconditionally so that
/// non-string junk from automated submitters still trips it.
///
/// Pure function of the body bytes; no side effects.
pub fn parse_submission(body: &[u8]) -> Result<Submission, AppError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest("Invalid JSON payload.".to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| AppError::BadRequest("Invalid JSON payload.".to_string()))?;

    let text = |field: &str| -> String {
        obj.get(field)
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let company = match obj.get("company") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    };

    let submission = Submission {
        name: text("name"),
        email: text("email"),
        role: text("role"),
        message: text("message"),
        company,
        client_timezone: text("client_timezone"),
    };

    // A tripped honeypot bypasses the email rejections: the submission is
    // deflected upstream with a success response and never persisted, so
    // whatever junk the bot put in the other fields is irrelevant.
    if !submission.company.is_empty() {
        return Ok(submission);
    }

    if submission.email.is_empty() {
        return Err(AppError::BadRequest("Email is required.".to_string()));
    }

    if !is_valid_email(&submission.email) {
        return Err(AppError::BadRequest(
            "Enter a valid email address.".to_string(),
        ));
    }

    Ok(submission)
}
