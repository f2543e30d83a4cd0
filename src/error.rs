//! Error types for certificate generation.
//!
//! Every fatal failure maps to a distinct process exit code so that callers
//! can tell which stage failed. Text overflow is not an error: it is reported
//! as a [`RenderWarning`] and the field is drawn anyway.

use std::path::PathBuf;

/// Result type alias for certificate operations.
pub type Result<T> = std::result::Result<T, CertificateError>;

#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    /// Profile file missing, unreadable or not valid JSON
    #[error("Failed to read profile at {path:?}")]
    ProfileRead {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Template file missing or unreadable
    #[error("Failed to read template at {path:?}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template corrupt or without a usable first page
    #[error("Failed to load template: {reason}")]
    TemplateLoad {
        reason: String,
        #[source]
        source: Option<lopdf::Error>,
    },

    #[error("Missing required profile field(s): {}", .0.join(", "))]
    ProfileField(Vec<&'static str>),

    /// Outing time does not start with `HHxMM`
    #[error("Invalid outing time {0:?}: expected HHhMM (e.g. 14h37)")]
    InvalidOutingTime(String),

    #[error("Failed to generate QR code")]
    QrGeneration(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to edit template")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to serialize certificate")]
    Serialize(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to write certificate to {path:?}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CertificateError {
    pub fn template(reason: impl Into<String>) -> Self {
        CertificateError::TemplateLoad {
            reason: reason.into(),
            source: None,
        }
    }

    /// Process exit code for this failure kind
    pub fn exit_code(&self) -> i32 {
        match self {
            CertificateError::ProfileRead { .. } => 3,
            CertificateError::TemplateRead { .. } | CertificateError::TemplateLoad { .. } => 4,
            CertificateError::ProfileField(_) => 5,
            CertificateError::InvalidOutingTime(_) => 6,
            CertificateError::QrGeneration(_) => 7,
            CertificateError::OutputWrite { .. } => 8,
            CertificateError::Pdf(_) | CertificateError::Serialize(_) => 9,
        }
    }
}

/// Text that does not fit its box even at the smallest allowed size.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "{field} {text:?} may not display correctly because of its length \
     (drawn at {size}pt); try abbreviations, e.g. \"St.\" for \"Saint\""
)]
pub struct RenderWarning {
    pub field: &'static str,
    pub text: String,
    pub size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let io = || std::io::Error::other("boom");
        let errors = [
            CertificateError::ProfileRead {
                path: PathBuf::from("profile.json"),
                source: Box::new(io()),
            },
            CertificateError::template("no pages"),
            CertificateError::ProfileField(vec!["town"]),
            CertificateError::InvalidOutingTime("1h".to_string()),
            CertificateError::QrGeneration(Box::new(io())),
            CertificateError::OutputWrite {
                path: PathBuf::from("out.pdf"),
                source: io(),
            },
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|&c| c > 2));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());

        let unreadable = CertificateError::TemplateRead {
            path: PathBuf::from("certificate.pdf"),
            source: io(),
        };
        assert_eq!(unreadable.exit_code(), errors[1].exit_code());
    }

    #[test]
    fn test_profile_field_message_lists_fields() {
        let err = CertificateError::ProfileField(vec!["lastname", "town"]);
        assert_eq!(
            err.to_string(),
            "Missing required profile field(s): lastname, town"
        );
    }
}
