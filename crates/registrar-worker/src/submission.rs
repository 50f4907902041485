use serde::Deserialize;
use url::Host;

use crate::error::{FieldError, RegistrarError};

pub const FIRST_NAME_MAX: usize = 50;
pub const LAST_NAME_MAX: usize = 50;
pub const INSTITUTION_NAME_MAX: usize = 100;
pub const ROLE_MAX: usize = 50;
pub const EMAIL_MAX: usize = 254;

const LOCAL_PART_MAX: usize = 64;
const DOMAIN_LABEL_MAX: usize = 63;

// RFC 5322 atext, minus alphanumerics.
const LOCAL_PART_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

/// Body of `POST /submit-verification/` as received.
///
/// Every field is optional at the wire level so that a missing key is reported as a
/// field error rather than a JSON parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitVerification {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub institution_name: Option<String>,
    #[serde(default)]
    pub institution_address: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A submission that passed validation. Only [`SubmitVerification::validate`] builds one,
/// so anything a store receives already satisfies the field constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NewVerificationRequest {
    pub first_name: String,
    pub last_name: String,
    pub institution_name: String,
    pub institution_address: String,
    pub role: String,
    pub email: String,
}

fn required(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<String>,
    max_len: Option<usize>,
) -> Option<String> {
    let value = value.as_deref().map(str::trim).unwrap_or("");
    if value.is_empty() {
        errors.push(FieldError::new(field, "This field is required."));
        return None;
    }

    if let Some(max) = max_len {
        let len = value.chars().count();
        if len > max {
            errors.push(FieldError::new(
                field,
                format!("Ensure this field has no more than {max} characters (it has {len})."),
            ));
            return None;
        }
    }

    Some(value.to_string())
}

impl SubmitVerification {
    /// Checks every field and reports all failures together.
    pub fn validate(self) -> Result<NewVerificationRequest, RegistrarError> {
        let mut errors = Vec::new();

        let first_name = required(&mut errors, "first_name", self.first_name, Some(FIRST_NAME_MAX));
        let last_name = required(&mut errors, "last_name", self.last_name, Some(LAST_NAME_MAX));
        let institution_name = required(
            &mut errors,
            "institution_name",
            self.institution_name,
            Some(INSTITUTION_NAME_MAX),
        );
        let institution_address =
            required(&mut errors, "institution_address", self.institution_address, None);
        let role = required(&mut errors, "role", self.role, Some(ROLE_MAX));
        let email = required(&mut errors, "email", self.email, Some(EMAIL_MAX));

        if let Some(email) = email.as_deref() {
            if !is_valid_email(email) {
                errors.push(FieldError::new("email", "Enter a valid email address."));
            }
        }

        let (
            true,
            Some(first_name),
            Some(last_name),
            Some(institution_name),
            Some(institution_address),
            Some(role),
            Some(email),
        ) = (
            errors.is_empty(),
            first_name,
            last_name,
            institution_name,
            institution_address,
            role,
            email,
        )
        else {
            return Err(RegistrarError::Validation(errors));
        };

        Ok(NewVerificationRequest {
            first_name,
            last_name,
            institution_name,
            institution_address,
            role,
            email,
        })
    }
}

/// Syntactic email check: `local@domain` with an ASCII dot-atom local part and a
/// hostname domain (or `localhost`). Internationalized domains are checked in their
/// punycode form; IP literals are rejected.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > LOCAL_PART_MAX {
        return false;
    }

    local.split('.').all(|atom| {
        !atom.is_empty()
            && atom
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SPECIALS.contains(c))
    })
}

fn is_valid_domain_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= DOMAIN_LABEL_MAX
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_domain(domain: &str) -> bool {
    // IDNA mapping yields the lowercase ASCII form; anything that parses as an IP is out.
    let ascii = match Host::parse(domain) {
        Ok(Host::Domain(ascii)) => ascii,
        _ => return false,
    };
    if ascii == "localhost" {
        return true;
    }

    let labels: Vec<&str> = ascii.split('.').collect();
    if labels.len() < 2 || !labels.iter().all(|l| is_valid_domain_label(l)) {
        return false;
    }

    let Some(tld) = labels.last() else {
        return false;
    };
    tld.len() >= 2 && !tld.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> SubmitVerification {
        SubmitVerification {
            first_name: Some("Ana".to_string()),
            last_name: Some("Lee".to_string()),
            institution_name: Some("Acme Lab".to_string()),
            institution_address: Some("1 Main St".to_string()),
            role: Some("researcher".to_string()),
            email: Some("ana@acme.org".to_string()),
        }
    }

    fn failing_fields(payload: SubmitVerification) -> Vec<&'static str> {
        match payload.validate() {
            Err(RegistrarError::Validation(errors)) => errors.iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn complete_payload_validates() {
        let request = complete().validate().unwrap();
        assert_eq!(request.first_name, "Ana");
        assert_eq!(request.email, "ana@acme.org");
        assert_eq!(request.institution_address, "1 Main St");
    }

    #[test]
    fn values_are_trimmed() {
        let mut payload = complete();
        payload.role = Some("  researcher \n".to_string());
        assert_eq!(payload.validate().unwrap().role, "researcher");
    }

    #[test]
    fn every_missing_field_is_reported() {
        let fields = failing_fields(SubmitVerification::default());
        assert_eq!(
            fields,
            vec![
                "first_name",
                "last_name",
                "institution_name",
                "institution_address",
                "role",
                "email"
            ]
        );
    }

    #[test]
    fn blank_field_counts_as_missing() {
        let mut payload = complete();
        payload.last_name = Some("   ".to_string());
        assert_eq!(failing_fields(payload), vec!["last_name"]);
    }

    #[test]
    fn overlong_field_is_rejected() {
        let mut payload = complete();
        payload.institution_name = Some("x".repeat(INSTITUTION_NAME_MAX + 1));
        assert_eq!(failing_fields(payload), vec!["institution_name"]);

        let mut payload = complete();
        payload.institution_address = Some("x".repeat(10_000));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut payload = complete();
        payload.email = Some("not-an-email".to_string());
        assert_eq!(failing_fields(payload), vec!["email"]);
    }

    #[test]
    fn email_syntax() {
        for ok in [
            "ana@acme.org",
            "first.last+tag@sub.example.co",
            "o'brien@example.ie",
            "admin@localhost",
            "x@a-b.io",
            "ana@acmé.org",
            "ana@ACME.ORG",
            "li@例え.jp",
        ] {
            assert!(is_valid_email(ok), "{ok} should be accepted");
        }

        for bad in [
            "",
            "@acme.org",
            "ana@",
            "ana@acme",
            "ana@@acme.org",
            "ana@acme..org",
            ".ana@acme.org",
            "ana.@acme.org",
            "an..a@acme.org",
            "ana lee@acme.org",
            "ana@-acme.org",
            "ana@acme.o",
            "ana@10.0.0.1",
            "ana@[::1]",
            "ana@acme .org",
            "anä@acme.org",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn length_limits_are_inclusive() {
        let cases: [(&str, usize, fn(&mut SubmitVerification, String)); 3] = [
            ("first_name", FIRST_NAME_MAX, |p, v| p.first_name = Some(v)),
            ("last_name", LAST_NAME_MAX, |p, v| p.last_name = Some(v)),
            ("role", ROLE_MAX, |p, v| p.role = Some(v)),
        ];

        for (field, max, set) in cases {
            let mut payload = complete();
            set(&mut payload, "x".repeat(max));
            assert!(payload.validate().is_ok(), "{field} at {max} chars");

            let mut payload = complete();
            set(&mut payload, "x".repeat(max + 1));
            assert_eq!(failing_fields(payload), vec![field]);
        }

        // Limits count characters, not bytes.
        let mut payload = complete();
        payload.first_name = Some("é".repeat(FIRST_NAME_MAX));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn email_length_limits() {
        let labels = format!("{}.{}", "a".repeat(63), "b".repeat(63));
        let domain = format!("{labels}.{}.org", "c".repeat(57));
        let local = "l".repeat(LOCAL_PART_MAX);
        let longest = format!("{local}@{domain}");
        assert_eq!(longest.len(), EMAIL_MAX);

        let mut payload = complete();
        payload.email = Some(longest.clone());
        assert_eq!(payload.validate().unwrap().email, longest);

        let mut payload = complete();
        payload.email = Some(format!("{local}@{labels}.{}.org", "c".repeat(58)));
        assert_eq!(failing_fields(payload), vec!["email"]);

        assert!(is_valid_email(&format!("{local}@acme.org")));
        assert!(!is_valid_email(&format!("{local}l@acme.org")));
    }
}
