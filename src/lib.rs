//! Descriptive metadata for PEM-encoded X.509 attestation certificates.
//!
//! [`extract_certificate_info`] turns the leaf certificate of an attestation
//! chain (`x5c[0]`, already converted to PEM) into a [`CertificateInfo`]
//! record: issuer and subject attributes, version, the Basic Constraints CA
//! flag and the validity window.
//!
//! ```no_run
//! # fn main() -> Result<(), certinfo::CertificateParseError> {
//! let pem = std::fs::read_to_string("leaf.pem").unwrap();
//! let info = certinfo::extract_certificate_info(&pem)?;
//! assert_eq!(info.version, 3);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod decoder;
pub mod error;
pub mod name;
pub mod output;

#[cfg(test)]
mod testutil;

pub use decoder::{CertificateDecoder, OpensslDecoder};
pub use error::{CertificateField, CertificateParseError, DecodeError};
pub use name::{parse_distinguished_name, EmptySegments};

/// DER of `BasicConstraints { cA: FALSE }` with the default value written
/// out. Some decoders reject it; it is the only extension failure that is
/// recovered from.
pub const EXPLICIT_CA_FALSE: [u8; 5] = [0x30, 0x03, 0x01, 0x01, 0x00];

/// Metadata extracted from a single certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub issuer: BTreeMap<String, String>,
    pub subject: BTreeMap<String, String>,
    pub version: i32,
    #[serde(rename = "basicConstraintsCA")]
    pub basic_constraints_ca: bool,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.not_after < now
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }

    /// Whole days from `now` until `not_after`; negative once expired.
    pub fn validity_days_at(&self, now: DateTime<Utc>) -> i64 {
        (self.not_after - now).num_days()
    }
}

/// Decodes a PEM certificate and extracts its [`CertificateInfo`].
pub fn extract_certificate_info(pem: &str) -> Result<CertificateInfo, CertificateParseError> {
    let decoder = OpensslDecoder::from_pem(pem)?;
    extract_from_decoder(&decoder)
}

/// Extracts a [`CertificateInfo`] from an already decoded certificate.
///
/// Two decoder failures are tolerated: an empty subject and the
/// [`EXPLICIT_CA_FALSE`] Basic Constraints encoding. Everything else fails
/// with the field it came from.
pub fn extract_from_decoder<D>(decoder: &D) -> Result<CertificateInfo, CertificateParseError>
where
    D: CertificateDecoder + ?Sized,
{
    let issuer_string = decoder
        .issuer_string()
        .map_err(|e| CertificateParseError::field(CertificateField::Issuer, e))?;
    // Issuer names are expected to be well-formed, so every segment is kept.
    let issuer = parse_distinguished_name(&issuer_string, EmptySegments::Keep);

    // An empty subject is valid when a subjectAltName carries the identity.
    let subject_string = match decoder.subject_string() {
        Ok(subject) => subject,
        Err(DecodeError::MalformedRdn) => {
            debug!("certificate subject is empty");
            "/".to_string()
        }
        Err(e) => return Err(CertificateParseError::field(CertificateField::Subject, e)),
    };
    let subject = parse_distinguished_name(&subject_string, EmptySegments::Skip);

    let version = decoder.version();
    let basic_constraints_ca = read_basic_constraints_ca(decoder)?;

    let not_before = decoder
        .not_before()
        .map_err(|e| CertificateParseError::field(CertificateField::NotBefore, e))?;
    let not_after = decoder
        .not_after()
        .map_err(|e| CertificateParseError::field(CertificateField::NotAfter, e))?;

    Ok(CertificateInfo {
        issuer,
        subject,
        version,
        basic_constraints_ca,
        not_before,
        not_after,
    })
}

fn read_basic_constraints_ca<D>(decoder: &D) -> Result<bool, CertificateParseError>
where
    D: CertificateDecoder + ?Sized,
{
    let err = match decoder.basic_constraints_ca() {
        Ok(ca) => return Ok(ca),
        Err(err) => err,
    };

    if let DecodeError::Extension { offset, value, .. } = &err {
        if contains_explicit_ca_false(value) {
            match decoder.raw_extension_value_at(*offset) {
                Ok(raw) if raw == EXPLICIT_CA_FALSE => {
                    debug!(
                        "basicConstraints at offset {} is an explicit cA FALSE, treating as not a CA",
                        offset
                    );
                    return Ok(false);
                }
                Ok(_) => {}
                Err(refetch) => warn!(
                    "could not re-read basicConstraints at offset {}: {}",
                    offset, refetch
                ),
            }
        }
    }

    Err(CertificateParseError::field(
        CertificateField::BasicConstraints,
        err,
    ))
}

fn contains_explicit_ca_false(value: &[u8]) -> bool {
    value
        .windows(EXPLICIT_CA_FALSE.len())
        .any(|window| window == EXPLICIT_CA_FALSE)
}
