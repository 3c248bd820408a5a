//! Field validation and normalization for incoming professional payloads
//!
//! A payload is a partial record: every key is optional, and a key set to
//! JSON null (or an empty string) is an explicit request to clear the
//! field. Validation runs against the *effective* record, the matched
//! entity's fields overridden by whatever the payload names. All rule
//! failures for one record are collected and reported together.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::professionals::{Professional, Source};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;
const MAX_TEXT_LENGTH: usize = 255;

/// Incoming record as received on the wire
///
/// Outer `None` means the key was absent; `Some(None)` means it was an
/// explicit JSON null. The two are not interchangeable for an update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalPayload {
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub company_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub job_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub source: Option<Option<String>>,
}

/// Keep JSON null distinguishable from an absent key
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl ProfessionalPayload {
    /// Email exactly as received, if a non-null value was supplied
    pub fn raw_email(&self) -> Option<&str> {
        self.email.as_ref().and_then(|inner| inner.as_deref())
    }

    /// Phone exactly as received, if a non-null value was supplied
    pub fn raw_phone(&self) -> Option<&str> {
        self.phone.as_ref().and_then(|inner| inner.as_deref())
    }
}

/// What a validated payload asks to do with one optional column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch<T> {
    Keep,
    Clear,
    Set(T),
}

/// Validated, normalized field set ready to persist
///
/// `full_name` and `source` carry `None` for "leave as is"; they cannot
/// be cleared.
#[derive(Debug, Clone)]
pub struct CleanFields {
    pub full_name: Option<String>,
    pub email: FieldPatch<String>,
    pub phone: FieldPatch<String>,
    pub company_name: FieldPatch<String>,
    pub job_title: FieldPatch<String>,
    pub source: Option<Source>,
}

/// Field-keyed validation messages, ordered for stable responses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validate one payload against the entity it matched, if any
///
/// `existing` is `Some` exactly when the record is an update. Returns the
/// normalized patch set, or every rule failure keyed by field name.
pub fn validate(
    payload: &ProfessionalPayload,
    existing: Option<&Professional>,
) -> Result<CleanFields, FieldErrors> {
    let mut errors = FieldErrors::default();

    let full_name = match &payload.full_name {
        None => {
            if existing.is_none() {
                errors.push("fullName", "This field is required.");
            }
            None
        }
        Some(None) => {
            errors.push("fullName", "This field may not be null.");
            None
        }
        Some(Some(value)) => {
            if value.is_empty() {
                errors.push("fullName", "This field may not be blank.");
                None
            } else {
                if value.chars().count() > MAX_TEXT_LENGTH {
                    errors.push(
                        "fullName",
                        "Ensure this field has no more than 255 characters.",
                    );
                }
                Some(value.clone())
            }
        }
    };

    let email = match string_patch(&payload.email) {
        FieldPatch::Set(value) => {
            if !EMAIL_RE.is_match(&value) {
                errors.push("email", "Enter a valid email address.");
            }
            FieldPatch::Set(value)
        }
        patch => patch,
    };

    // A phone that strips to nothing is a clear, not a value
    let phone = match string_patch(&payload.phone) {
        FieldPatch::Set(raw) => {
            let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                FieldPatch::Clear
            } else {
                FieldPatch::Set(digits)
            }
        }
        patch => patch,
    };

    let effective_email = match &email {
        FieldPatch::Set(value) => Some(value.as_str()),
        FieldPatch::Clear => None,
        FieldPatch::Keep => existing.and_then(|entity| entity.email.as_deref()),
    };
    let effective_phone = match &phone {
        FieldPatch::Set(value) => Some(value.as_str()),
        FieldPatch::Clear => None,
        FieldPatch::Keep => existing.and_then(|entity| entity.phone.as_deref()),
    };

    if effective_email.is_none() && effective_phone.is_none() {
        errors.push("nonFieldErrors", "Either email or phone must be provided.");
    }

    // Phone length only matters for a record reachable by phone alone; a
    // record with an effective email may carry a short phone
    if let FieldPatch::Set(digits) = &phone {
        if effective_email.is_none()
            && !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len())
        {
            errors.push("phone", "Phone number must be between 10 and 15 digits.");
        }
    }

    let company_name = string_patch(&payload.company_name);
    if let FieldPatch::Set(value) = &company_name {
        if value.chars().count() > MAX_TEXT_LENGTH {
            errors.push(
                "companyName",
                "Ensure this field has no more than 255 characters.",
            );
        }
    }

    let job_title = string_patch(&payload.job_title);
    if let FieldPatch::Set(value) = &job_title {
        if value.chars().count() > MAX_TEXT_LENGTH {
            errors.push(
                "jobTitle",
                "Ensure this field has no more than 255 characters.",
            );
        }
    }

    let source = match &payload.source {
        Some(Some(value)) => match Source::parse(value) {
            Some(source) => Some(source),
            None => {
                errors.push("source", format!("\"{}\" is not a valid choice.", value));
                None
            }
        },
        _ => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CleanFields {
        full_name,
        email,
        phone,
        company_name,
        job_title,
        source,
    })
}

fn string_patch(field: &Option<Option<String>>) -> FieldPatch<String> {
    match field {
        None => FieldPatch::Keep,
        Some(None) => FieldPatch::Clear,
        Some(Some(value)) if value.is_empty() => FieldPatch::Clear,
        Some(Some(value)) => FieldPatch::Set(value.clone()),
    }
}
