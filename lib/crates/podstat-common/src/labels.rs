use thiserror::Error;

/// Label keys the workload controllers stamp on instance pods
pub mod keys {
    /// Application the instance belongs to.
    /// Format: cloudfoundry.org/app_guid={app_guid}
    pub const APP_GUID: &str = "cloudfoundry.org/app_guid";
}

/// Environment variables declared on instance containers
pub mod env {
    /// Zero-based slot number of the instance, as a decimal string.
    pub const INSTANCE_INDEX: &str = "CF_INSTANCE_INDEX";
}

/// Maximum length of a label value and of a namespace name.
const MAX_NAME_LEN: usize = 63;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at most 63 characters")]
    TooLong { field: &'static str },

    #[error("{field} contains invalid characters: {value}")]
    InvalidCharacters { field: &'static str, value: String },
}

/// Label selector matching every instance of an application.
///
/// The GUID must already have passed [`validate_label_value`]; a value
/// containing `,` or `=` would otherwise widen the selector.
#[must_use]
pub fn app_selector(app_guid: &str) -> String {
    format!("{}={}", keys::APP_GUID, app_guid)
}

/// Validate a value used inside a label selector.
///
/// Accepts `[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?`, at most 63 chars.
pub fn validate_label_value(field: &'static str, value: &str) -> Result<(), LabelError> {
    check_length(field, value)?;
    let bytes = value.as_bytes();
    let edges_ok = bytes.first().is_some_and(u8::is_ascii_alphanumeric)
        && bytes.last().is_some_and(u8::is_ascii_alphanumeric);
    let body_ok = bytes
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if edges_ok && body_ok {
        Ok(())
    } else {
        Err(LabelError::InvalidCharacters {
            field,
            value: value.to_string(),
        })
    }
}

/// Validate a namespace name (RFC 1123 label).
pub fn validate_namespace(namespace: &str) -> Result<(), LabelError> {
    const FIELD: &str = "namespace";
    check_length(FIELD, namespace)?;
    let bytes = namespace.as_bytes();
    let is_lower_alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let edges_ok = bytes.first().is_some_and(is_lower_alnum)
        && bytes.last().is_some_and(is_lower_alnum);
    let body_ok = bytes.iter().all(|b| is_lower_alnum(b) || *b == b'-');
    if edges_ok && body_ok {
        Ok(())
    } else {
        Err(LabelError::InvalidCharacters {
            field: FIELD,
            value: namespace.to_string(),
        })
    }
}

fn check_length(field: &'static str, value: &str) -> Result<(), LabelError> {
    if value.is_empty() {
        return Err(LabelError::Empty { field });
    }
    if value.len() > MAX_NAME_LEN {
        return Err(LabelError::TooLong { field });
    }
    Ok(())
}
