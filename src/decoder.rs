//! Certificate decoding capability.
//!
//! The extractor only needs a handful of operations from an X.509 library.
//! They are collected in [`CertificateDecoder`] so that all library-specific
//! behavior, including how extension parse failures are reported, lives in
//! one place. [`OpensslDecoder`] is the production implementation.

use chrono::{DateTime, Utc};
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::nid::Nid;
use openssl::x509::{X509NameRef, X509};
use x509_parser::der_parser::asn1_rs::{Any, FromDer};
use x509_parser::extensions::ParsedExtension;
use x509_parser::oid_registry::OID_X509_EXT_BASIC_CONSTRAINTS;
use x509_parser::prelude::X509Certificate;

use crate::error::{CertificateParseError, DecodeError};

/// Field access over a single decoded certificate.
pub trait CertificateDecoder {
    /// Issuer name in slash-delimited form, e.g. `/C=US/O=Acme/CN=Root`.
    fn issuer_string(&self) -> Result<String, DecodeError>;

    /// Subject name in slash-delimited form.
    ///
    /// Returns [`DecodeError::MalformedRdn`] when the subject is an empty
    /// RDN sequence.
    fn subject_string(&self) -> Result<String, DecodeError>;

    /// X.509 version number: 1, 2 or 3.
    fn version(&self) -> i32;

    fn not_before(&self) -> Result<DateTime<Utc>, DecodeError>;

    fn not_after(&self) -> Result<DateTime<Utc>, DecodeError>;

    /// The Basic Constraints `cA` flag, `false` when the extension is absent.
    ///
    /// A value the decoder cannot parse is reported as
    /// [`DecodeError::Extension`] carrying the offset and raw bytes of the
    /// extension value.
    fn basic_constraints_ca(&self) -> Result<bool, DecodeError>;

    /// The complete TLV found at `offset` in the DER certificate.
    fn raw_extension_value_at(&self, offset: usize) -> Result<Vec<u8>, DecodeError>;
}

/// [`CertificateDecoder`] backed by OpenSSL, with extension inspection
/// done by `x509-parser` over the same DER bytes.
pub struct OpensslDecoder {
    cert: X509,
    der: Vec<u8>,
}

impl OpensslDecoder {
    /// Decodes the first certificate of a PEM string.
    pub fn from_pem(pem: &str) -> Result<OpensslDecoder, CertificateParseError> {
        let cert = X509::from_pem(pem.as_bytes())?;
        let der = cert.to_der()?;
        Ok(OpensslDecoder { cert, der })
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    fn offset_of(&self, value: &[u8]) -> usize {
        value.as_ptr() as usize - self.der.as_ptr() as usize
    }
}

impl CertificateDecoder for OpensslDecoder {
    fn issuer_string(&self) -> Result<String, DecodeError> {
        one_line(self.cert.issuer_name())
    }

    fn subject_string(&self) -> Result<String, DecodeError> {
        one_line(self.cert.subject_name())
    }

    fn version(&self) -> i32 {
        self.cert.version() + 1
    }

    fn not_before(&self) -> Result<DateTime<Utc>, DecodeError> {
        to_datetime(self.cert.not_before())
    }

    fn not_after(&self) -> Result<DateTime<Utc>, DecodeError> {
        to_datetime(self.cert.not_after())
    }

    fn basic_constraints_ca(&self) -> Result<bool, DecodeError> {
        let (_, cert) = X509Certificate::from_der(&self.der).map_err(|e| DecodeError::Der {
            details: e.to_string(),
        })?;

        let extension = match cert
            .extensions()
            .iter()
            .find(|ext| ext.oid == OID_X509_EXT_BASIC_CONSTRAINTS)
        {
            Some(extension) => extension,
            None => return Ok(false),
        };

        match extension.parsed_extension() {
            ParsedExtension::BasicConstraints(constraints) => Ok(constraints.ca),
            ParsedExtension::ParseError { error } => Err(DecodeError::Extension {
                name: "basicConstraints",
                offset: self.offset_of(extension.value),
                value: extension.value.to_vec(),
                details: error.to_string(),
            }),
            other => Err(DecodeError::Der {
                details: format!("unexpected basicConstraints content: {:?}", other),
            }),
        }
    }

    fn raw_extension_value_at(&self, offset: usize) -> Result<Vec<u8>, DecodeError> {
        let input = self.der.get(offset..).ok_or_else(|| DecodeError::Der {
            details: format!(
                "offset {} is outside the {} byte certificate",
                offset,
                self.der.len()
            ),
        })?;
        let (rest, _) = Any::from_der(input).map_err(|e| DecodeError::Der {
            details: e.to_string(),
        })?;
        Ok(input[..input.len() - rest.len()].to_vec())
    }
}

/// Renders a name the way `X509_NAME_oneline` does: `/SN=value` per entry.
fn one_line(name: &X509NameRef) -> Result<String, DecodeError> {
    if name.entries().next().is_none() {
        return Err(DecodeError::MalformedRdn);
    }

    let mut line = String::new();
    for entry in name.entries() {
        let object = entry.object();
        let nid = object.nid();
        let key = if nid == Nid::UNDEF {
            object.to_string()
        } else {
            nid.short_name()
                .map(str::to_string)
                .unwrap_or_else(|_| object.to_string())
        };
        let value = entry.data().to_string();
        // A slash inside a value would read back as an extra attribute.
        if value.contains('/') {
            return Err(DecodeError::Name {
                details: format!("{} value contains '/': {:?}", key, value),
            });
        }
        line.push('/');
        line.push_str(&key);
        line.push('=');
        line.push_str(&value);
    }
    Ok(line)
}

fn to_datetime(time: &Asn1TimeRef) -> Result<DateTime<Utc>, DecodeError> {
    let epoch = Asn1Time::from_unix(0).map_err(|e| DecodeError::Time {
        details: e.to_string(),
    })?;
    let diff = epoch.diff(time).map_err(|e| DecodeError::Time {
        details: format!("{}: {}", time, e),
    })?;
    let seconds = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| DecodeError::Time {
        details: format!("{} is out of range", time),
    })
}
