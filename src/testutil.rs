//! Test certificate generation.
//!
//! Shared by the unit tests and, through `#[path]`, the integration tests.

#![allow(dead_code)]

use openssl::asn1::{Asn1Object, Asn1OctetString, Asn1Time};
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509Builder, X509Extension, X509Name, X509NameBuilder};

/// DER of `BasicConstraints { cA: FALSE }` with the default value encoded.
pub const EXPLICIT_CA_FALSE_EXT: &[u8] = &[0x30, 0x03, 0x01, 0x01, 0x00];

/// 2020-01-01T00:00:00Z
pub const NOT_BEFORE: i64 = 1_577_836_800;
/// 2030-01-01T00:00:00Z
pub const NOT_AFTER: i64 = 1_893_456_000;

pub struct CertificateTemplate {
    /// Raw version field: 0 for v1, 2 for v3.
    pub version: i32,
    pub issuer: Vec<(&'static str, &'static str)>,
    pub subject: Vec<(&'static str, &'static str)>,
    pub not_before: i64,
    pub not_after: i64,
    /// `Some(ca)` adds a Basic Constraints extension built by OpenSSL.
    pub basic_constraints: Option<bool>,
    /// Adds a Basic Constraints extension with these exact value bytes.
    pub raw_basic_constraints: Option<&'static [u8]>,
}

impl Default for CertificateTemplate {
    fn default() -> Self {
        CertificateTemplate {
            version: 2,
            issuer: vec![("C", "US"), ("O", "Acme"), ("CN", "Acme Root")],
            subject: vec![("O", "Acme"), ("CN", "Leaf")],
            not_before: NOT_BEFORE,
            not_after: NOT_AFTER,
            basic_constraints: Some(false),
            raw_basic_constraints: None,
        }
    }
}

impl CertificateTemplate {
    pub fn to_pem(&self) -> String {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(self.version).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_issuer_name(&build_name(&self.issuer)).unwrap();
        builder.set_subject_name(&build_name(&self.subject)).unwrap();
        builder
            .set_not_before(&Asn1Time::from_unix(self.not_before).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::from_unix(self.not_after).unwrap())
            .unwrap();
        builder.set_pubkey(&key).unwrap();

        if let Some(ca) = self.basic_constraints {
            let mut constraints = BasicConstraints::new();
            if ca {
                constraints.critical().ca();
            }
            builder.append_extension(constraints.build().unwrap()).unwrap();
        }
        if let Some(raw) = self.raw_basic_constraints {
            let oid = Asn1Object::from_str("2.5.29.19").unwrap();
            let value = Asn1OctetString::new_from_bytes(raw).unwrap();
            let extension = X509Extension::new_from_der(&oid, false, &value).unwrap();
            builder.append_extension(extension).unwrap();
        }

        builder.sign(&key, MessageDigest::sha256()).unwrap();
        let pem = builder.build().to_pem().unwrap();
        String::from_utf8(pem).unwrap()
    }
}

fn build_name(entries: &[(&str, &str)]) -> X509Name {
    let mut name = X509NameBuilder::new().unwrap();
    for (field, value) in entries {
        name.append_entry_by_text(field, value).unwrap();
    }
    name.build()
}
