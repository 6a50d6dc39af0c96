//! Token acquisition orchestration shared by every token-issuing vendor.
//!
//! [`AuthCoordinator::get_token`] serves the cached token while it is fresh and otherwise
//! drives one refresh exchange through the transport using the vendor's
//! [`CredentialStrategy`]. The coordinator holds no lock across the network call: two callers
//! that both observe a stale token may both refresh, and each refresh yields a usable token.
//! Failed refreshes never touch the cache, so the next call retries from scratch.

mod metrics;

pub use metrics::TokenMetrics;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	clock::{Clock, SystemClock},
	context::{CallContext, Interrupted},
	credential::CredentialStrategy,
	error::AuthError,
	http::{HttpRequest, PushHttpClient},
	obs::{self, CallKind, CallOutcome, CallSpan},
	vendor::Vendor,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Boxed future returned by [`Authorizer::authorize`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret, AuthError>> + 'a + Send>>;

/// Source of the credential a dispatch client injects into notification requests.
pub trait Authorizer
where
	Self: Send + Sync,
{
	/// Vendor label used in observability output.
	fn vendor(&self) -> Vendor;

	/// Returns a usable credential, refreshing it first when needed.
	fn authorize<'a>(&'a self, ctx: &'a CallContext) -> AuthFuture<'a>;
}

/// Owns one [`CredentialStrategy`] and refreshes its token on demand.
pub struct AuthCoordinator<S, C>
where
	S: CredentialStrategy,
	C: ?Sized + PushHttpClient,
{
	strategy: S,
	http_client: Arc<C>,
	clock: Arc<dyn Clock>,
	metrics: Arc<TokenMetrics>,
}
impl<S, C> AuthCoordinator<S, C>
where
	S: CredentialStrategy,
	C: ?Sized + PushHttpClient,
{
	/// Creates a coordinator that refreshes through `http_client` using the system clock.
	pub fn with_http_client(strategy: S, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			strategy,
			http_client: http_client.into(),
			clock: Arc::new(SystemClock),
			metrics: Default::default(),
		}
	}

	/// Replaces the clock used for freshness checks, signatures, and issue times.
	pub fn with_clock(mut self, clock: impl 'static + Clock) -> Self {
		self.clock = Arc::new(clock);

		self
	}

	/// Returns the owned strategy.
	pub fn strategy(&self) -> &S {
		&self.strategy
	}

	/// Returns the shared transport.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Returns the token counters for this coordinator.
	pub fn metrics(&self) -> &TokenMetrics {
		&self.metrics
	}

	/// Returns a usable token, refreshing it when the cached one is missing or stale.
	pub async fn get_token(&self, ctx: &CallContext) -> Result<TokenSecret, AuthError> {
		const KIND: CallKind = CallKind::Refresh;

		self.metrics.record_request();

		if let Some(token) = self.fresh_token(self.clock.now()) {
			self.metrics.record_cache_hit();

			return Ok(token);
		}

		let vendor = self.strategy.vendor();
		let span = CallSpan::new(vendor, KIND, "get_token");

		obs::record_call_outcome(vendor, KIND, CallOutcome::Attempt);

		let result = span.instrument(self.refresh(ctx)).await;

		match &result {
			Ok(_) => {
				self.metrics.record_refresh();
				obs::record_call_outcome(vendor, KIND, CallOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_call_outcome(vendor, KIND, CallOutcome::Failure);
			},
		}

		result
	}

	fn fresh_token(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		if !self.strategy.is_fresh(now) {
			return None;
		}

		self.strategy.current_token().map(|token| token.value)
	}

	async fn refresh(&self, ctx: &CallContext) -> Result<TokenSecret, AuthError> {
		// Signature timestamp and issue time share one instant.
		let requested_at = self.clock.now();
		let body = self.strategy.build_refresh_request_body(requested_at)?;
		let request =
			HttpRequest::new(self.strategy.refresh_method(), self.strategy.refresh_url().clone())
				.headers(self.strategy.refresh_headers())
				.body(body);
		let response =
			ctx.execute(self.http_client.as_ref(), request).await.map_err(|err| match err {
				Interrupted::Cancelled => AuthError::Cancelled,
				Interrupted::Transport(source) => AuthError::Transport(source),
			})?;

		if !response.is_success() {
			return Err(AuthError::Status { status: response.status, body: response.body_text() });
		}

		self.strategy.parse_refresh_response(&response.body, requested_at)?;
		self.strategy.current_token().map(|token| token.value).ok_or(AuthError::MissingToken)
	}
}
#[cfg(feature = "reqwest")]
impl<S> AuthCoordinator<S, ReqwestHttpClient>
where
	S: CredentialStrategy,
{
	/// Creates a coordinator backed by a default reqwest transport.
	pub fn new(strategy: S) -> Self {
		Self::with_http_client(strategy, ReqwestHttpClient::default())
	}
}
impl<S, C> Authorizer for AuthCoordinator<S, C>
where
	S: CredentialStrategy,
	C: ?Sized + PushHttpClient,
{
	fn vendor(&self) -> Vendor {
		self.strategy.vendor()
	}

	fn authorize<'a>(&'a self, ctx: &'a CallContext) -> AuthFuture<'a> {
		Box::pin(self.get_token(ctx))
	}
}
impl<S, C> Debug for AuthCoordinator<S, C>
where
	S: CredentialStrategy,
	C: ?Sized + PushHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthCoordinator")
			.field("vendor", &self.strategy.vendor())
			.field("token", &self.strategy.current_token())
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// Static API key authorizer; never touches the network and never goes stale.
#[derive(Clone)]
pub struct StaticKey {
	vendor: Vendor,
	key: TokenSecret,
}
impl StaticKey {
	/// Wraps a long-lived vendor key.
	pub fn new(vendor: Vendor, key: impl Into<String>) -> Self {
		Self { vendor, key: TokenSecret::new(key) }
	}
}
impl Authorizer for StaticKey {
	fn vendor(&self) -> Vendor {
		self.vendor
	}

	fn authorize<'a>(&'a self, _ctx: &'a CallContext) -> AuthFuture<'a> {
		let key = self.key.clone();

		Box::pin(async move { Ok(key) })
	}
}
impl Debug for StaticKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StaticKey").field("vendor", &self.vendor).field("key", &self.key).finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		collections::VecDeque,
		io,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::{
		auth::{Token, TokenCache, timestamp_millis},
		clock::MockClock,
		error::{TransportError, decode_json},
		http::{HeaderList, HttpResponse, TransportFuture},
	};

	const T0: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

	enum Reply {
		Status(u16, &'static str),
		Unreachable,
		Hang,
	}

	#[derive(Default)]
	struct ScriptedClient {
		replies: Mutex<VecDeque<Reply>>,
		calls: AtomicUsize,
		bodies: Mutex<Vec<Vec<u8>>>,
	}
	impl ScriptedClient {
		fn new<I>(replies: I) -> Self
		where
			I: IntoIterator<Item = Reply>,
		{
			Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() }
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl PushHttpClient for ScriptedClient {
		fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.bodies.lock().push(request.body);

			let reply = self.replies.lock().pop_front().unwrap_or(Reply::Unreachable);

			Box::pin(async move {
				match reply {
					Reply::Status(status, body) => Ok(HttpResponse::new(status, body)),
					Reply::Unreachable => Err(TransportError::Io(io::Error::new(
						io::ErrorKind::ConnectionRefused,
						"connection refused",
					))),
					Reply::Hang => std::future::pending().await,
				}
			})
		}
	}

	struct TestStrategy {
		url: Url,
		cache: TokenCache,
	}
	impl Default for TestStrategy {
		fn default() -> Self {
			Self {
				url: Url::parse("https://auth.example.com/token").expect("Failed to parse test URL."),
				cache: TokenCache::default(),
			}
		}
	}
	impl CredentialStrategy for TestStrategy {
		fn vendor(&self) -> Vendor {
			Vendor::Vivo
		}

		fn refresh_url(&self) -> &Url {
			&self.url
		}

		fn refresh_headers(&self) -> HeaderList {
			vec![("Content-Type".into(), "application/json".into())]
		}

		fn build_refresh_request_body(&self, now: OffsetDateTime) -> Result<Vec<u8>, AuthError> {
			Ok(format!("{{\"timestamp\":\"{}\"}}", timestamp_millis(now)).into_bytes())
		}

		fn parse_refresh_response(
			&self,
			body: &[u8],
			now: OffsetDateTime,
		) -> Result<(), AuthError> {
			#[derive(Deserialize)]
			struct Body {
				result: i64,
				#[serde(default, rename = "authToken")]
				auth_token: String,
			}

			let parsed: Body =
				decode_json(body).map_err(|source| AuthError::MalformedResponse { source })?;

			if parsed.result != 0 {
				return Err(AuthError::Response {
					code: parsed.result.to_string(),
					message: "rejected".into(),
				});
			}

			self.cache.replace(Token::new(parsed.auth_token, now));

			Ok(())
		}

		fn token_cache(&self) -> &TokenCache {
			&self.cache
		}
	}

	fn coordinator<I>(replies: I) -> (AuthCoordinator<TestStrategy, ScriptedClient>, MockClock)
	where
		I: IntoIterator<Item = Reply>,
	{
		let clock = MockClock::new(T0);
		let coordinator =
			AuthCoordinator::with_http_client(TestStrategy::default(), ScriptedClient::new(replies))
				.with_clock(clock.clone());

		(coordinator, clock)
	}

	#[tokio::test]
	async fn second_call_is_served_from_cache() {
		let (coordinator, _clock) =
			coordinator([Reply::Status(200, r#"{"result":0,"authToken":"T1"}"#)]);
		let ctx = CallContext::new();
		let first = coordinator.get_token(&ctx).await.expect("Initial refresh should succeed.");
		let second = coordinator.get_token(&ctx).await.expect("Cached read should succeed.");

		assert_eq!(first.expose(), "T1");
		assert_eq!(second.expose(), "T1");
		assert_eq!(coordinator.http_client().calls(), 1);
		assert_eq!(coordinator.metrics().requests(), 2);
		assert_eq!(coordinator.metrics().cache_hits(), 1);
		assert_eq!(coordinator.metrics().refreshes(), 1);
	}

	#[tokio::test]
	async fn refresh_body_is_signed_with_clock_time() {
		let (coordinator, _clock) =
			coordinator([Reply::Status(200, r#"{"result":0,"authToken":"T1"}"#)]);

		coordinator.get_token(&CallContext::new()).await.expect("Refresh should succeed.");

		let bodies = coordinator.http_client().bodies.lock().clone();

		assert_eq!(bodies, vec![br#"{"timestamp":"1704067200000"}"#.to_vec()]);
		assert_eq!(
			coordinator.strategy().current_token().map(|token| token.issued_at),
			Some(T0)
		);
	}

	#[tokio::test]
	async fn token_goes_stale_after_window_and_refreshes_again() {
		let (coordinator, clock) = coordinator([
			Reply::Status(200, r#"{"result":0,"authToken":"T1"}"#),
			Reply::Status(200, r#"{"result":0,"authToken":"T2"}"#),
		]);
		let ctx = CallContext::new();

		coordinator.get_token(&ctx).await.expect("Initial refresh should succeed.");

		assert!(coordinator.strategy().is_fresh(clock.now()));

		clock.advance(Duration::hours(23) + Duration::minutes(59));

		assert!(coordinator.strategy().is_fresh(clock.now()));
		assert_eq!(
			coordinator.get_token(&ctx).await.expect("Cached read should succeed.").expose(),
			"T1"
		);

		clock.advance(Duration::minutes(1));

		assert!(!coordinator.strategy().is_fresh(clock.now()));

		clock.advance(Duration::hours(48));

		assert!(!coordinator.strategy().is_fresh(clock.now()));

		let refreshed = coordinator.get_token(&ctx).await.expect("Second refresh should succeed.");

		assert_eq!(refreshed.expose(), "T2");
		assert_eq!(coordinator.http_client().calls(), 2);
	}

	#[tokio::test]
	async fn token_issued_an_hour_ago_needs_no_network() {
		let (coordinator, _clock) = coordinator([]);

		coordinator.strategy().token_cache().replace(Token::new("T0", T0 - Duration::hours(1)));

		let token = coordinator
			.get_token(&CallContext::new())
			.await
			.expect("Fresh token should be served from cache.");

		assert_eq!(token.expose(), "T0");
		assert_eq!(coordinator.http_client().calls(), 0);
	}

	#[tokio::test]
	async fn non_200_refresh_is_a_hard_failure() {
		let (coordinator, _clock) = coordinator([Reply::Status(500, "upstream exploded")]);
		let err = coordinator
			.get_token(&CallContext::new())
			.await
			.expect_err("HTTP 500 must not yield a token.");

		match err {
			AuthError::Status { status, body } => {
				assert_eq!(status, 500);
				assert_eq!(body, "upstream exploded");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert!(coordinator.strategy().token_cache().is_empty());
		assert_eq!(coordinator.metrics().failures(), 1);
	}

	#[tokio::test]
	async fn failed_refreshes_leave_the_cached_token_untouched() {
		let (coordinator, _clock) = coordinator([
			Reply::Unreachable,
			Reply::Status(503, "busy"),
			Reply::Status(200, r#"{"result":10000,"desc":"invalid sign"}"#),
			Reply::Status(200, "not json"),
		]);
		let stale = Token::new("T0", T0 - Duration::hours(30));
		let ctx = CallContext::new();

		coordinator.strategy().token_cache().replace(stale.clone());

		let transport = coordinator.get_token(&ctx).await.expect_err("Transport must fail.");

		assert!(matches!(transport, AuthError::Transport(_)));
		assert!(transport.is_transport());
		assert_eq!(coordinator.strategy().current_token(), Some(stale.clone()));

		let status = coordinator.get_token(&ctx).await.expect_err("HTTP 503 must fail.");

		assert!(matches!(status, AuthError::Status { status: 503, .. }));
		assert_eq!(coordinator.strategy().current_token(), Some(stale.clone()));

		let code = coordinator.get_token(&ctx).await.expect_err("Vendor code must fail.");

		assert!(matches!(code, AuthError::Response { .. }));
		assert!(code.is_response());
		assert_eq!(coordinator.strategy().current_token(), Some(stale.clone()));

		let malformed = coordinator.get_token(&ctx).await.expect_err("Malformed body must fail.");

		assert!(matches!(malformed, AuthError::MalformedResponse { .. }));
		assert_eq!(coordinator.strategy().current_token(), Some(stale));
		assert_eq!(coordinator.http_client().calls(), 4);
		assert_eq!(coordinator.metrics().failures(), 4);
	}

	#[tokio::test]
	async fn cancellation_aborts_refresh_without_touching_cache() {
		let (coordinator, _clock) = coordinator([Reply::Hang]);
		let coordinator = Arc::new(coordinator);
		let ctx = CallContext::new();
		let task = {
			let coordinator = Arc::clone(&coordinator);
			let ctx = ctx.clone();

			tokio::spawn(async move { coordinator.get_token(&ctx).await })
		};

		tokio::time::sleep(std::time::Duration::from_millis(20)).await;
		ctx.cancel();

		let outcome = task.await.expect("Refresh task should not panic.");

		assert!(matches!(outcome, Err(AuthError::Cancelled)));
		assert!(coordinator.strategy().token_cache().is_empty());
	}

	#[tokio::test]
	async fn shared_coordinator_serves_concurrent_callers() {
		let replies = (0..4).map(|_| Reply::Status(200, r#"{"result":0,"authToken":"T1"}"#));
		let (coordinator, _clock) = coordinator(replies);
		let coordinator = Arc::new(coordinator);
		let tasks = (0..4)
			.map(|_| {
				let coordinator = Arc::clone(&coordinator);

				tokio::spawn(async move { coordinator.get_token(&CallContext::new()).await })
			})
			.collect::<Vec<_>>();

		for task in tasks {
			let token = task.await.expect("Task should not panic.").expect("Token should resolve.");

			assert_eq!(token.expose(), "T1");
		}

		let calls = coordinator.http_client().calls();

		assert!((1..=4).contains(&calls), "Redundant refreshes are bounded by callers: {calls}.");
	}

	#[tokio::test]
	async fn static_key_never_calls_the_network() {
		let key = StaticKey::new(Vendor::Xiaomi, "app-secret");
		let ctx = CallContext::new();

		ctx.cancel();

		let token = key.authorize(&ctx).await.expect("Static keys always resolve.");

		assert_eq!(token.expose(), "app-secret");
		assert_eq!(key.vendor(), Vendor::Xiaomi);
		assert!(!format!("{key:?}").contains("app-secret"));
	}
}
