//! Dispatch-level error types shared across transport, authentication, and vendor clients.

// self
use crate::{_prelude::*, vendor::Vendor};

/// Dispatch-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Outgoing message failed vendor validation; nothing was sent.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Transport failure (DNS, TCP, TLS, timeout) on the notification call.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token acquisition failed.
	#[error("Authentication failed: {0}")]
	Auth(#[source] AuthError),
	/// Vendor payload could not be encoded or decoded.
	#[error(transparent)]
	Codec(#[from] CodecError),

	/// Vendor returned a non-success HTTP status for the notification call.
	#[error("Notification endpoint returned HTTP {status}: {body}.")]
	Notify {
		/// HTTP status code returned by the vendor.
		status: u16,
		/// Raw response body kept for diagnostics.
		body: String,
	},
	/// Caller cancelled the operation while a network call was in flight.
	#[error("Operation was cancelled.")]
	Cancelled,
}
impl Error {
	/// Returns `true` when the message was rejected before reaching the network.
	pub fn is_validation(&self) -> bool {
		matches!(self, Self::Validation(_))
	}

	/// Returns `true` for transport failures on the notification call itself.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport(_))
	}

	/// Returns `true` when the token refresh failed at the HTTP layer.
	pub fn is_auth_transport(&self) -> bool {
		matches!(self, Self::Auth(err) if err.is_transport())
	}

	/// Returns `true` when the token endpoint answered but signalled failure.
	pub fn is_auth_response(&self) -> bool {
		matches!(self, Self::Auth(err) if err.is_response())
	}

	/// Returns `true` when the vendor rejected the notification with a non-success status.
	pub fn is_notify(&self) -> bool {
		matches!(self, Self::Notify { .. })
	}

	/// Returns `true` when the caller cancelled the operation.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}
impl From<AuthError> for Error {
	fn from(e: AuthError) -> Self {
		match e {
			AuthError::Cancelled => Self::Cancelled,
			other => Self::Auth(other),
		}
	}
}

/// Configuration failures raised while constructing vendor clients.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required credential or identifier is empty.
	#[error("The {vendor} configuration is missing `{field}`.")]
	MissingField {
		/// Vendor whose configuration failed validation.
		vendor: Vendor,
		/// Name of the empty field.
		field: &'static str,
	},
	/// An endpoint is not an absolute HTTP(S) URL.
	#[error("The {vendor} {endpoint} endpoint must be an absolute HTTP(S) URL: {url}.")]
	InvalidEndpoint {
		/// Vendor whose configuration failed validation.
		vendor: Vendor,
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Configuration document could not be parsed.
	#[error("Push configuration is malformed.")]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Outgoing message rejected by a vendor validation rule.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// A mandatory field is empty.
	#[error("Message field `{field}` must not be empty.")]
	MissingField {
		/// Wire name of the empty field.
		field: &'static str,
	},
	/// A field carries a value the vendor does not accept.
	#[error("Message field `{field}` is invalid: {reason}.")]
	InvalidValue {
		/// Wire name of the invalid field.
		field: &'static str,
		/// Human-readable explanation.
		reason: String,
	},
}
impl ValidationError {
	/// Fails with [`ValidationError::MissingField`] when `value` is empty.
	pub fn require(field: &'static str, value: &str) -> Result<(), Self> {
		if value.is_empty() { Err(Self::MissingField { field }) } else { Ok(()) }
	}
}

/// Transport-level failures (network, IO, deadline).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the vendor endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The per-call deadline elapsed before the response was read.
	#[error("Request timed out while calling the vendor endpoint.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the vendor endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Failures raised while obtaining a vendor access token.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The refresh call never produced an HTTP response.
	#[error("Token endpoint could not be reached.")]
	Transport(#[from] TransportError),
	/// Token endpoint answered with a non-200 status.
	#[error("Token endpoint returned HTTP {status}: {body}.")]
	Status {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Raw response body kept for diagnostics.
		body: String,
	},
	/// Token endpoint answered 200 but its embedded result code signalled failure.
	#[error("Token endpoint rejected the request with code {code}: {message}.")]
	Response {
		/// Vendor-defined result code.
		code: String,
		/// Vendor-supplied description.
		message: String,
	},
	/// Token endpoint answered 200 with a body that could not be decoded.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint reported success without issuing a token.
	#[error("Token endpoint reported success but issued no token.")]
	MissingToken,
	/// Refresh request body could not be encoded.
	#[error("Token request could not be encoded.")]
	Encode(#[from] CodecError),
	/// Caller cancelled the refresh while it was in flight.
	#[error("Token refresh was cancelled.")]
	Cancelled,
}
impl AuthError {
	/// Returns `true` when the refresh failed at the HTTP layer (no response or non-200).
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport(_) | Self::Status { .. })
	}

	/// Returns `true` when the token endpoint answered but the payload signalled failure.
	pub fn is_response(&self) -> bool {
		matches!(self, Self::Response { .. } | Self::MalformedResponse { .. } | Self::MissingToken)
	}
}

/// Vendor payload encoding and decoding failures.
#[derive(Debug, ThisError)]
pub enum CodecError {
	/// Outgoing payload could not be serialized.
	#[error("Payload could not be encoded as JSON.")]
	Encode {
		/// Serializer failure.
		#[source]
		source: serde_json::Error,
	},
	/// Vendor response could not be decoded.
	#[error("Vendor response is malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Decodes a JSON body while keeping the path of the failing field.
pub(crate) fn decode_json<T>(body: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
}
