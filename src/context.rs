//! Per-call context carrying cooperative cancellation and an optional deadline.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{HttpRequest, HttpResponse, PushHttpClient},
};

/// Context threaded through token refreshes and notification calls.
///
/// Cloning a context shares its cancellation token and its deadline, so cancelling any clone
/// aborts every in-flight network call that was started with it. No default deadline is
/// imposed; callers set one with [`CallContext::with_timeout`]. The deadline is absolute and
/// spans every round trip made with the context, including a token refresh that precedes a
/// notification.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
	cancellation: CancellationToken,
	deadline: Option<Instant>,
}
impl CallContext {
	/// Creates a context with a fresh cancellation token and no deadline.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reuses a caller-owned cancellation token.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = token;

		self
	}

	/// Attaches a deadline `timeout` from now shared by every network call made with this context.
	pub fn with_timeout(self, timeout: StdDuration) -> Self {
		self.with_deadline(Instant::now() + timeout)
	}

	/// Attaches an absolute deadline.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Returns the configured deadline, if any.
	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Time left before the deadline, or `None` when no deadline is set.
	pub fn remaining(&self) -> Option<StdDuration> {
		self.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
	}

	/// Returns the cancellation token observed by this context.
	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancellation
	}

	/// Cancels every in-flight call started with this context (or its clones).
	pub fn cancel(&self) {
		self.cancellation.cancel();
	}

	/// Returns `true` once the context has been cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancellation.is_cancelled()
	}

	/// Executes `request` unless the context is cancelled or its deadline passes first.
	///
	/// Both cancellation and deadline expiry drop the transport future, aborting the in-flight
	/// request. Expiry surfaces as [`TransportError::Timeout`] whether or not the transport
	/// honors [`HttpRequest::timeout`].
	pub(crate) async fn execute<C>(
		&self,
		client: &C,
		request: HttpRequest,
	) -> Result<HttpResponse, Interrupted>
	where
		C: ?Sized + PushHttpClient,
	{
		if self.is_cancelled() {
			return Err(Interrupted::Cancelled);
		}

		let request = request.timeout(self.remaining());
		let call = async {
			match self.deadline {
				Some(deadline) => tokio::time::timeout_at(deadline, client.execute(request))
					.await
					.unwrap_or_else(|elapsed| Err(TransportError::timeout(elapsed))),
				None => client.execute(request).await,
			}
		};

		match self.cancellation.run_until_cancelled(call).await {
			Some(result) => result.map_err(Interrupted::Transport),
			None => Err(Interrupted::Cancelled),
		}
	}
}

/// Why a network call produced no response.
#[derive(Debug)]
pub(crate) enum Interrupted {
	Cancelled,
	Transport(TransportError),
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::{HttpMethod, TransportFuture};

	struct PendingClient;
	impl PushHttpClient for PendingClient {
		fn execute(&self, _request: HttpRequest) -> TransportFuture<'_> {
			Box::pin(std::future::pending())
		}
	}

	fn request() -> HttpRequest {
		HttpRequest::new(
			HttpMethod::Post,
			Url::parse("https://push.example.com/send").expect("Failed to parse test URL."),
		)
	}

	#[tokio::test]
	async fn cancelled_context_short_circuits() {
		let ctx = CallContext::new();

		ctx.cancel();

		let outcome = ctx.execute(&PendingClient, request()).await;

		assert!(matches!(outcome, Err(Interrupted::Cancelled)));
	}

	#[tokio::test]
	async fn cancellation_aborts_in_flight_call() {
		let ctx = CallContext::new().with_timeout(StdDuration::from_secs(5));
		let canceller = ctx.clone();
		let handle = tokio::spawn(async move {
			tokio::time::sleep(StdDuration::from_millis(20)).await;
			canceller.cancel();
		});
		let outcome = ctx.execute(&PendingClient, request()).await;

		handle.await.expect("Canceller task should finish.");

		assert!(matches!(outcome, Err(Interrupted::Cancelled)));
		assert!(ctx.deadline().is_some());
	}

	#[tokio::test]
	async fn deadline_bounds_a_transport_that_never_answers() {
		let ctx = CallContext::new().with_timeout(StdDuration::from_millis(50));
		let outcome = tokio::time::timeout(
			StdDuration::from_secs(2),
			ctx.execute(&PendingClient, request()),
		)
		.await
		.expect("Deadline should end the call well before the guard.");

		assert!(matches!(outcome, Err(Interrupted::Transport(TransportError::Timeout { .. }))));
	}

	#[tokio::test]
	async fn elapsed_deadline_fails_without_waiting() {
		let ctx = CallContext::new().with_deadline(Instant::now());

		tokio::time::sleep(StdDuration::from_millis(5)).await;

		let outcome = ctx.execute(&PendingClient, request()).await;

		assert!(matches!(outcome, Err(Interrupted::Transport(TransportError::Timeout { .. }))));
		assert_eq!(ctx.remaining(), Some(StdDuration::ZERO));
	}

	#[test]
	fn context_without_deadline_reports_none() {
		let ctx = CallContext::new();

		assert!(ctx.deadline().is_none());
		assert!(ctx.remaining().is_none());
	}
}
