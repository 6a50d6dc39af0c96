//! Immutable token values and the single-slot cache that holds them.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Duration after issuance during which every observed vendor accepts a token.
pub const FRESHNESS_WINDOW: Duration = Duration::hours(24);

/// Access credential issued by a vendor token endpoint.
///
/// Tokens are never mutated; a refresh replaces the whole value.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
	/// Opaque bearer value; callers must avoid logging it.
	pub value: TokenSecret,
	/// Instant the token was obtained.
	pub issued_at: OffsetDateTime,
}
impl Token {
	/// Creates a token issued at `issued_at`.
	pub fn new(value: impl Into<String>, issued_at: OffsetDateTime) -> Self {
		Self { value: TokenSecret::new(value), issued_at }
	}

	/// Returns `true` while `now - issued_at` is strictly below `window`.
	///
	/// Pure function of the two instants; a token issued in the future counts as fresh.
	pub fn is_fresh_at(&self, now: OffsetDateTime, window: Duration) -> bool {
		now - self.issued_at < window
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

/// Thread-safe slot holding the current [`Token`], if any.
///
/// Readers see either the previous pair of value and issue time or the complete new one;
/// writes happen only through [`TokenCache::replace`].
#[derive(Debug, Default)]
pub struct TokenCache(RwLock<Option<Token>>);
impl TokenCache {
	/// Returns a snapshot of the cached token.
	pub fn current(&self) -> Option<Token> {
		self.0.read().clone()
	}

	/// Atomically replaces the cached token.
	pub fn replace(&self, token: Token) {
		*self.0.write() = Some(token);
	}

	/// Returns `true` when a token exists and is within `window` at `now`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, window: Duration) -> bool {
		self.0.read().as_ref().is_some_and(|token| token.is_fresh_at(now, window))
	}

	/// Returns `true` when no token was ever stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_none()
	}
}
