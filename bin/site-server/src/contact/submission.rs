//! Inbound payload parsing and validation.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::error::ContactError;

/// Raw `POST /api/contact` body, before any checks.
///
/// Fields are optional so that an absent key and an explicit `null` both
/// surface as "missing" rather than as a decode failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Honeypot. Hidden on the form, so people leave it empty.
    #[serde(default)]
    pub hp: Option<String>,
}

/// A submission that passed every check. Values are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl SubmissionRequest {
    /// Decode a request body. Anything other than a JSON object whose
    /// known fields are strings or `null` is an [`ContactError::InvalidPayload`],
    /// except that a filled honeypot of any type is [`ContactError::Rejected`].
    pub fn from_json(body: &[u8]) -> Result<Self, ContactError> {
        let invalid = |e: serde_json::Error| {
            tracing::debug!(error = %e, "contact payload failed to decode");
            ContactError::InvalidPayload
        };
        // Derived struct impls also accept JSON arrays; only objects are valid here.
        let value: serde_json::Value = serde_json::from_slice(body).map_err(invalid)?;
        let Some(object) = value.as_object() else {
            return Err(ContactError::InvalidPayload);
        };
        if honeypot_filled(object.get("hp")) {
            return Err(ContactError::Rejected);
        }
        serde_json::from_value(value).map_err(invalid)
    }

    /// Run the honeypot, required-field and email checks in that order.
    pub fn validate(self) -> Result<Submission, ContactError> {
        if self.hp.as_deref().is_some_and(|v| !v.is_empty()) {
            return Err(ContactError::Rejected);
        }

        let name = trimmed(self.name);
        let email = trimmed(self.email);
        let message = trimmed(self.message);

        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(ContactError::MissingFields);
        }

        if !is_valid_email(&email) {
            return Err(ContactError::InvalidEmail);
        }

        Ok(Submission { name, email, message })
    }
}

/// Anything but an absent key, `null` or `""` counts as filled.
fn honeypot_filled(hp: Option<&serde_json::Value>) -> bool {
    match hp {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// HTML5 address grammar, plus a dotted domain: `ada@localhost` is refused.
fn is_valid_email(email: &str) -> bool {
    email.validate_email()
        && email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'))
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_owned()).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn parse(body: &str) -> Result<Submission, ContactError> {
        SubmissionRequest::from_json(body.as_bytes())?.validate()
    }

    #[test]
    fn accepts_and_trims_a_complete_payload() {
        let s = parse(r#"{"name":"  Ada ","email":" ada@example.com","message":"Hello\n"}"#)
            .unwrap();
        assert_eq!(s.name, "Ada");
        assert_eq!(s.email, "ada@example.com");
        assert_eq!(s.message, "Hello");
    }

    #[test]
    fn non_object_bodies_are_invalid_payloads() {
        for body in ["", "not json", "[]", "[1,2]", "\"text\"", "42", "null", "{\"name\":"] {
            assert!(
                matches!(parse(body), Err(ContactError::InvalidPayload)),
                "{body:?} should be rejected as invalid JSON"
            );
        }
    }

    #[test]
    fn wrongly_typed_field_is_an_invalid_payload() {
        let err = parse(r#"{"name":7,"email":"a@b.co","message":"x"}"#).unwrap_err();
        assert!(matches!(err, ContactError::InvalidPayload));
    }

    #[test]
    fn null_and_absent_fields_are_missing() {
        let err = parse(r#"{"name":null,"email":"a@b.co","message":"x"}"#).unwrap_err();
        assert!(matches!(err, ContactError::MissingFields));
        let err = parse(r#"{"email":"a@b.co","message":"x"}"#).unwrap_err();
        assert!(matches!(err, ContactError::MissingFields));
    }

    #[test]
    fn honeypot_wins_over_other_errors() {
        let err = parse(r#"{"hp":"http://spam.example"}"#).unwrap_err();
        assert!(matches!(err, ContactError::Rejected));
        let err = parse(r#"{"name":"Ada","email":"nope","message":"x","hp":"1"}"#).unwrap_err();
        assert!(matches!(err, ContactError::Rejected));
    }

    #[test]
    fn honeypot_of_any_type_is_rejected() {
        for hp in [json!(1), json!(true), json!({ "a": 1 }), json!(["x"]), json!(" ")] {
            let body = json!({ "name": "Ada", "email": "ada@example.com", "message": "Hi", "hp": hp });
            assert!(
                matches!(parse(&body.to_string()), Err(ContactError::Rejected)),
                "hp = {hp} should be rejected"
            );
        }
    }

    #[test]
    fn honeypot_wins_over_mistyped_fields() {
        let err = parse(r#"{"name":7,"email":"ada@example.com","message":"Hi","hp":"spam"}"#)
            .unwrap_err();
        assert!(matches!(err, ContactError::Rejected));
    }

    #[test]
    fn null_honeypot_is_ignored() {
        let s = parse(r#"{"name":"Ada","email":"ada@example.com","message":"x","hp":null}"#);
        assert!(s.is_ok());
    }

    #[test]
    fn accepts_dotted_domains() {
        for email in ["ada@example.com", "ada.lovelace+site@mail.example.edu", "a@b.co"] {
            assert!(is_valid_email(email), "{email:?} should be accepted");
        }
    }

    #[test]
    fn empty_honeypot_is_ignored() {
        let s = parse(r#"{"name":"Ada","email":"ada@example.com","message":"x","hp":""}"#);
        assert!(s.is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "ada",
            "ada@",
            "@example.com",
            "ada example@x.org",
            "a@b@c.org",
            "ada@localhost",
            "ada@example",
        ] {
            let body = json!({ "name": "Ada", "email": email, "message": "x" });
            assert!(
                matches!(parse(&body.to_string()), Err(ContactError::InvalidEmail)),
                "{email:?} should be an invalid email"
            );
        }
    }

    #[test]
    fn rejects_header_injection_in_email() {
        let body = json!({
            "name": "Ada",
            "email": "ada@example.com\r\nBcc: victim@example.org",
            "message": "x",
        });
        assert!(matches!(parse(&body.to_string()), Err(ContactError::InvalidEmail)));
    }

    proptest! {
        #[test]
        fn whitespace_only_name_is_missing(ws in "[ \t\r\n]{0,8}") {
            let body = json!({ "name": ws, "email": "ada@example.com", "message": "x" });
            prop_assert!(matches!(parse(&body.to_string()), Err(ContactError::MissingFields)));
        }
    }
}
