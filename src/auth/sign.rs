//! Request signatures used by vendor token endpoints.
//!
//! Vendors sign the plain concatenation of their credentials and a millisecond timestamp
//! (no separators) and expect the digest as lower-case hex.

// crates.io
use md5::Md5;
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Digest algorithm a vendor expects over its signing string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
	/// MD5, 32 hex characters.
	Md5,
	/// SHA-256, 64 hex characters.
	Sha256,
}
impl SignatureAlgorithm {
	/// Length of the hex-encoded signature.
	pub const fn hex_len(self) -> usize {
		match self {
			Self::Md5 => 32,
			Self::Sha256 => 64,
		}
	}

	/// Signs the concatenation of `parts` and returns lower-case hex.
	pub fn sign(self, parts: &[&str]) -> String {
		match self {
			Self::Md5 => digest_hex::<Md5>(parts),
			Self::Sha256 => digest_hex::<Sha256>(parts),
		}
	}
}

/// Formats `instant` as milliseconds since the Unix epoch in decimal.
pub fn timestamp_millis(instant: OffsetDateTime) -> String {
	(instant.unix_timestamp_nanos() / 1_000_000).to_string()
}

fn digest_hex<D>(parts: &[&str]) -> String
where
	D: Digest,
{
	let mut hasher = D::new();

	for part in parts {
		hasher.update(part.as_bytes());
	}

	hex::encode(hasher.finalize())
}
