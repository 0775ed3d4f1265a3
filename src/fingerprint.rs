//! Request fingerprinting
//!
//! A fingerprint identifies a logical request independent of its
//! continuation fields, and names its resume record on disk.

use crate::error::Result;
use crate::request::RequestDescriptor;
use crate::types::{BodyMode, Method, StringMap};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Canonical form hashed into a fingerprint. Field order is fixed and
/// `params` is key-sorted.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    method: Method,
    url: &'a str,
    body: Option<BodyMode>,
    params: &'a StringMap,
}

/// SHA-256 hex digest of a logical request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a request descriptor
    pub fn of(request: &RequestDescriptor) -> Result<Self> {
        let input = FingerprintInput {
            method: request.method,
            url: &request.url,
            body: request.effective_body_mode(),
            params: &request.params,
        };
        let canonical = serde_json::to_vec(&input)?;
        Ok(Self(hex::encode(Sha256::digest(&canonical))))
    }

    /// The hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
