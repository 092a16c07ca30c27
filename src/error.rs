//! Error types for certificate decoding and info extraction.
//!
//! [`DecodeError`] is what a [`CertificateDecoder`](crate::CertificateDecoder)
//! reports for a single field. [`CertificateParseError`] is what callers of
//! [`extract_certificate_info`](crate::extract_certificate_info) see: either
//! the input could not be decoded at all, or one named field failed.

use std::fmt;

use strum_macros::Display;

/// Certificate field an extraction failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CertificateField {
    #[strum(serialize = "issuer")]
    Issuer,
    #[strum(serialize = "subject")]
    Subject,
    #[strum(serialize = "basicConstraints")]
    BasicConstraints,
    #[strum(serialize = "notBefore")]
    NotBefore,
    #[strum(serialize = "notAfter")]
    NotAfter,
}

/// Failure reported by a certificate decoder while reading one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The distinguished name holds no relative distinguished names.
    MalformedRdn,

    /// A name attribute could not be decoded
    Name {
        /// What went wrong
        details: String,
    },

    /// A validity timestamp could not be converted
    Time {
        /// What went wrong
        details: String,
    },

    /// An extension value failed to parse
    Extension {
        /// Extension short name, e.g. `basicConstraints`
        name: &'static str,
        /// Offset of the extension value inside the DER certificate
        offset: usize,
        /// Raw extension value as seen by the decoder
        value: Vec<u8>,
        /// Decoder message
        details: String,
    },

    /// The DER structure around the requested data is invalid
    Der {
        /// What went wrong
        details: String,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRdn => write!(f, "malformed RDN"),
            Self::Name { details } => write!(f, "name decode error: {}", details),
            Self::Time { details } => write!(f, "time decode error: {}", details),
            Self::Extension {
                name,
                offset,
                value,
                details,
            } => write!(
                f,
                "{} extension parse error at offset {}: {} ({})",
                name,
                offset,
                details,
                hex(value)
            ),
            Self::Der { details } => write!(f, "DER error: {}", details),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Error type for certificate info extraction.
#[derive(Debug)]
pub enum CertificateParseError {
    /// The input is not a PEM certificate the decoder can read
    MalformedInput {
        /// Decoder message
        details: String,
    },

    /// A specific certificate field could not be extracted
    Field {
        /// The field that failed
        field: CertificateField,
        /// The underlying decoder failure
        source: DecodeError,
    },
}

impl CertificateParseError {
    pub(crate) fn field(field: CertificateField, source: DecodeError) -> Self {
        Self::Field { field, source }
    }
}

impl fmt::Display for CertificateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput { details } => {
                write!(f, "Malformed certificate input: {}", details)
            }
            Self::Field { field, source } => {
                write!(f, "Failed to read certificate {}: {}", field, source)
            }
        }
    }
}

impl std::error::Error for CertificateParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Field { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<openssl::error::ErrorStack> for CertificateParseError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        let details = if e.errors().is_empty() {
            "no PEM certificate found".to_string()
        } else {
            e.to_string()
        };
        Self::MalformedInput { details }
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = CertificateParseError::field(CertificateField::Subject, DecodeError::MalformedRdn);
        assert_eq!(
            err.to_string(),
            "Failed to read certificate subject: malformed RDN"
        );
    }

    #[test]
    fn test_extension_error_shows_raw_value() {
        let err = DecodeError::Extension {
            name: "basicConstraints",
            offset: 412,
            value: vec![0x30, 0x03, 0x01, 0x01, 0x00],
            details: "hExtV parse error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "basicConstraints extension parse error at offset 412: hExtV parse error (3003010100)"
        );
    }

    #[test]
    fn test_field_error_exposes_source() {
        let err = CertificateParseError::field(
            CertificateField::NotAfter,
            DecodeError::Time {
                details: "out of range".to_string(),
            },
        );
        let source = err.source().expect("field errors carry a source");
        assert_eq!(source.to_string(), "time decode error: out of range");
    }

    #[test]
    fn test_field_names() {
        assert_eq!(CertificateField::BasicConstraints.to_string(), "basicConstraints");
        assert_eq!(CertificateField::NotBefore.to_string(), "notBefore");
    }
}
