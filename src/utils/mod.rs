//! Request validation helpers shared by the modules.

use serde_json::{json, Value};
use shelf_http::AppError;

/// Accumulates per-field failures so one response reports all of them.
#[derive(Debug, Default)]
pub struct FieldValidator {
    details: Vec<Value>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, error: &str) {
        self.details.push(json!({ "field": field, "error": error }));
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "required");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !is_valid_email(value) {
            self.fail(field, "must be a valid email address");
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if !value.is_empty() && value.chars().count() < min {
            self.fail(field, &format!("must be at least {min} characters"));
        }
        self
    }

    pub fn finish(&mut self, message: &str) -> Result<(), AppError> {
        if self.details.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(std::mem::take(&mut self.details), message))
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Parse a path id, answering 400 in the standard error format.
pub fn parse_id(raw: &str) -> Result<u64, AppError> {
    raw.parse::<u64>()
        .map_err(|_| AppError::bad_request(format!("invalid id '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failure() {
        let err = FieldValidator::new()
            .required("name", "")
            .email("email", "nope")
            .min_len("password", "short", 8)
            .finish("invalid user")
            .unwrap_err();

        match err {
            AppError::Validation { details, .. } => {
                let fields: Vec<_> = details.iter().map(|d| d["field"].clone()).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn passes_good_input() {
        assert!(FieldValidator::new()
            .required("name", "alice")
            .email("email", "a@x.com")
            .min_len("password", "longenough", 8)
            .finish("invalid")
            .is_ok());
    }

    #[test]
    fn email_shapes() {
        for good in ["a@x.com", "first.last@mail.example.org"] {
            assert!(is_valid_email(good), "{good}");
        }
        for bad in ["", "a", "@x.com", "a@", "a@x", "a@.com", "a b@x.com", "a@x@y.com"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn parse_id_rejects_non_numbers() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("-1"), Err(AppError::BadRequest { .. })));
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest { .. })));
    }
}
