//! Transport primitives for vendor token exchanges and notification calls.
//!
//! The module exposes [`PushHttpClient`] alongside the ephemeral [`HttpRequest`] and
//! [`HttpResponse`] values so downstream crates can plug in custom HTTP stacks. A transport
//! performs exactly one round trip per call, reads the whole body before resolving, and
//! reports HTTP statuses as data: only failures that prevent a response from being read
//! surface as [`TransportError`].

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`PushHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports used for both token refreshes and notification calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// client that needs it, and the returned future must be `Send` so callers can hop executors.
/// Dropping the future must abort the in-flight request; cancellation relies on it.
pub trait PushHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes a single request and returns the status code and full body.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP verbs used by vendor endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`.
	Get,
	#[default]
	/// `POST`.
	Post,
}
impl HttpMethod {
	/// Returns the verb as it appears on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Ordered header list applied verbatim to a request.
pub type HeaderList = Vec<(String, String)>;

/// Outbound request handed to a [`PushHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
	/// Request verb.
	pub method: HttpMethod,
	/// Absolute target URL.
	pub url: Url,
	/// Headers applied in order; every entry is sent.
	pub headers: HeaderList,
	/// Opaque body bytes, possibly empty.
	pub body: Vec<u8>,
	/// Optional deadline for the whole round trip.
	pub timeout: Option<StdDuration>,
}
impl HttpRequest {
	/// Creates a body-less request without headers.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: Vec::new(), timeout: None }
	}

	/// Appends a single header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Appends several headers, keeping their order.
	pub fn headers<I>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = (String, String)>,
	{
		self.headers.extend(headers);

		self
	}

	/// Replaces the body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Sets or clears the per-request deadline.
	pub fn timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.timeout = timeout;

		self
	}

	/// Returns the first value recorded for `name`, compared case-insensitively.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Fully buffered response returned by a [`PushHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Complete response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Status code every vendor uses to signal success.
	pub const SUCCESS: u16 = 200;

	/// Creates a response from its parts.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for the vendors' success status (exactly 200).
	pub fn is_success(&self) -> bool {
		self.status == Self::SUCCESS
	}

	/// Returns the body as text, replacing invalid UTF-8 sequences.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirect handling follows whatever the wrapped client is configured to do; no retries are
/// performed.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests default to `timeout` when the call context sets none.
	pub fn with_default_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(timeout).build()?))
	}

	async fn send(client: ReqwestClient, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let method = match request.method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
		};
		let mut builder = client.request(method, request.url);

		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(timeout) = request.timeout {
			builder = builder.timeout(timeout);
		}

		let response = builder.body(request.body).send().await?;
		let status = response.status().as_u16();
		let body = response.bytes().await?.to_vec();

		Ok(HttpResponse { status, body })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl PushHttpClient for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(Self::send(self.0.clone(), request))
	}
}
