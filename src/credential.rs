//! Credential strategy hooks implemented once per token-issuing vendor.
//!
//! A strategy owns the vendor's long-lived secrets and its [`TokenCache`]. It knows how to
//! build and sign the refresh call and how to read the refresh response; the
//! [`AuthCoordinator`](crate::coordinator::AuthCoordinator) decides when to call it and which
//! transport to use, so the strategy never touches the network itself.

// self
use crate::{
	_prelude::*,
	auth::{FRESHNESS_WINDOW, Token, TokenCache},
	error::AuthError,
	http::{HeaderList, HttpMethod},
	vendor::Vendor,
};

/// Vendor-specific token refresh contract.
///
/// Secrets are fixed at construction; the token cache is the only mutable state and is
/// written only by [`CredentialStrategy::parse_refresh_response`] on success.
pub trait CredentialStrategy
where
	Self: Send + Sync,
{
	/// Vendor label used in observability output.
	fn vendor(&self) -> Vendor;

	/// Token endpoint.
	fn refresh_url(&self) -> &Url;

	/// Verb used for the refresh call. Every observed vendor uses `POST`.
	fn refresh_method(&self) -> HttpMethod {
		HttpMethod::Post
	}

	/// Headers the refresh call requires (content type and similar).
	fn refresh_headers(&self) -> HeaderList;

	/// Builds the refresh payload, signing it with the timestamp derived from `now`.
	fn build_refresh_request_body(&self, now: OffsetDateTime) -> Result<Vec<u8>, AuthError>;

	/// Decodes a 200 refresh response and, when the vendor code signals success, stores the
	/// new token issued at `now`.
	///
	/// Any failure leaves the cached token untouched.
	fn parse_refresh_response(&self, body: &[u8], now: OffsetDateTime) -> Result<(), AuthError>;

	/// Cache holding the current token.
	fn token_cache(&self) -> &TokenCache;

	/// Duration a token stays usable after issuance.
	fn freshness_window(&self) -> Duration {
		FRESHNESS_WINDOW
	}

	/// Returns the cached token, if one was ever issued.
	fn current_token(&self) -> Option<Token> {
		self.token_cache().current()
	}

	/// Returns `true` when a token exists and is still inside the freshness window at `now`.
	fn is_fresh(&self, now: OffsetDateTime) -> bool {
		self.token_cache().is_fresh_at(now, self.freshness_window())
	}
}
