//! Distinguished-name string parsing.
//!
//! Decoders hand names over in the OpenSSL one-line form, e.g.
//! `/C=US/O=Acme/CN=Root`. This module turns that string into an
//! attribute map.

use std::collections::BTreeMap;

/// How segments that carry no attribute are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptySegments {
    /// Every segment becomes an entry. A segment without `=` maps to an
    /// empty value. Used for issuer names.
    Keep,
    /// Empty segments and segments without `=` are dropped. Used for
    /// subject names, which may legitimately be empty.
    Skip,
}

/// Parses a slash-delimited distinguished name into `key -> value`.
///
/// The leading slash is optional. Each segment is split on its first `=`,
/// so values may themselves contain `=`. Repeated keys keep the last value.
pub fn parse_distinguished_name(dn: &str, segments: EmptySegments) -> BTreeMap<String, String> {
    let body = dn.strip_prefix('/').unwrap_or(dn);
    let mut attributes = BTreeMap::new();

    for segment in body.split('/') {
        match (segment.split_once('='), segments) {
            (Some((key, value)), _) => {
                attributes.insert(key.to_string(), value.to_string());
            }
            (None, EmptySegments::Keep) => {
                attributes.insert(segment.to_string(), String::new());
            }
            (None, EmptySegments::Skip) => {}
        }
    }

    attributes
}
