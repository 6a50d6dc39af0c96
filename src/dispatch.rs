//! Vendor-agnostic notification pipeline.
//!
//! A [`Dispatcher`] validates the message, obtains a credential from its [`Authorizer`],
//! encodes the message with the vendor's [`VendorApi`], and performs one notification call.
//! Vendors only describe their wire format; the control flow lives here once.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	clock::Clock,
	context::{CallContext, Interrupted},
	coordinator::{AuthCoordinator, Authorizer},
	credential::CredentialStrategy,
	error::{CodecError, ValidationError, decode_json},
	http::{HttpMethod, HttpRequest, PushHttpClient},
	obs::{self, CallKind, CallOutcome, CallSpan},
	vendor::Vendor,
};

/// Boxed future returned by [`PushClient::notify`].
pub type NotifyFuture<'a, R> = Pin<Box<dyn Future<Output = Result<R>> + 'a + Send>>;

/// Outgoing vendor message.
pub trait PushMessage
where
	Self: Send + Sync,
{
	/// Checks the vendor's mandatory-field rules before anything is sent.
	fn validate(&self) -> Result<(), ValidationError>;
}

/// Decoded vendor response exposed uniformly across vendors.
pub trait PushResponse
where
	Self: Send,
{
	/// Vendor's result indicator as text.
	fn result(&self) -> String;

	/// Vendor-specific key/value details; empty when the vendor returns none.
	fn data(&self) -> BTreeMap<String, String>;
}

/// Encoded request body plus its content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBody {
	/// Value sent in the `Content-Type` header.
	pub content_type: &'static str,
	/// Body bytes.
	pub bytes: Vec<u8>,
}
impl EncodedBody {
	/// Content type for raw JSON bodies.
	pub const JSON: &'static str = "application/json";
	/// Content type for form-encoded bodies.
	pub const FORM: &'static str = "application/x-www-form-urlencoded";

	/// Serializes `value` as a JSON body.
	pub fn json<T>(value: &T) -> Result<Self, CodecError>
	where
		T: ?Sized + Serialize,
	{
		let bytes = serde_json::to_vec(value).map_err(|source| CodecError::Encode { source })?;

		Ok(Self { content_type: Self::JSON, bytes })
	}

	/// Form-encodes `pairs` in order.
	pub fn form<'a, I>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let mut serializer = url::form_urlencoded::Serializer::new(String::new());

		serializer.extend_pairs(pairs);

		Self { content_type: Self::FORM, bytes: serializer.finish().into_bytes() }
	}
}

/// Wire-format description of one vendor's notification endpoint.
pub trait VendorApi
where
	Self: Send + Sync,
{
	/// Message type accepted by the vendor.
	type Message: PushMessage;
	/// Response type returned by the vendor.
	type Response: PushResponse + DeserializeOwned;

	/// Vendor label used in observability output.
	fn vendor(&self) -> Vendor;

	/// Notification endpoint.
	fn push_url(&self) -> &Url;

	/// Encodes `message` into the exact bytes the vendor expects.
	fn encode(&self, message: &Self::Message) -> Result<EncodedBody, CodecError>;

	/// Header carrying the credential on notification calls.
	fn auth_header(&self, token: &TokenSecret) -> (String, String);

	/// Decodes a 200 notification response.
	fn decode(&self, body: &[u8]) -> Result<Self::Response, CodecError> {
		decode_json(body).map_err(|source| CodecError::Decode { source })
	}
}

/// Uniform notification interface implemented by every vendor client.
pub trait PushClient
where
	Self: Send + Sync,
{
	/// Message type accepted by the client.
	type Message: PushMessage;
	/// Response type returned by the client.
	type Response: PushResponse;

	/// Vendor served by the client.
	fn vendor(&self) -> Vendor;

	/// Validates, authenticates, and sends one notification.
	fn notify<'a>(
		&'a self,
		ctx: &'a CallContext,
		message: &'a Self::Message,
	) -> NotifyFuture<'a, Self::Response>;
}

/// Composes a vendor API description, an authorizer, and a transport.
pub struct Dispatcher<V, A, C>
where
	V: VendorApi,
	A: Authorizer,
	C: ?Sized + PushHttpClient,
{
	api: V,
	authorizer: A,
	http_client: Arc<C>,
}
impl<V, A, C> Dispatcher<V, A, C>
where
	V: VendorApi,
	A: Authorizer,
	C: ?Sized + PushHttpClient,
{
	/// Creates a dispatcher that sends through `http_client`.
	pub fn with_http_client(api: V, authorizer: A, http_client: impl Into<Arc<C>>) -> Self {
		Self { api, authorizer, http_client: http_client.into() }
	}

	/// Returns the vendor API description.
	pub fn api(&self) -> &V {
		&self.api
	}

	/// Returns the authorizer.
	pub fn authorizer(&self) -> &A {
		&self.authorizer
	}

	/// Returns the shared transport.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Validates, authenticates, and sends one notification.
	///
	/// Validation failures return before any network call. A non-200 notification response
	/// yields [`Error::Notify`] and leaves the cached token alone.
	pub async fn notify(&self, ctx: &CallContext, message: &V::Message) -> Result<V::Response> {
		const KIND: CallKind = CallKind::Notify;

		message.validate()?;

		let vendor = self.api.vendor();
		let span = CallSpan::new(vendor, KIND, "notify");

		obs::record_call_outcome(vendor, KIND, CallOutcome::Attempt);

		let result = span.instrument(self.deliver(ctx, message)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(vendor, KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(vendor, KIND, CallOutcome::Failure),
		}

		result
	}

	async fn deliver(&self, ctx: &CallContext, message: &V::Message) -> Result<V::Response> {
		let token = self.authorizer.authorize(ctx).await?;
		let encoded = self.api.encode(message)?;
		let (name, value) = self.api.auth_header(&token);
		let request = HttpRequest::new(HttpMethod::Post, self.api.push_url().clone())
			.header("Content-Type", encoded.content_type)
			.header(name, value)
			.body(encoded.bytes);
		let response =
			ctx.execute(self.http_client.as_ref(), request).await.map_err(|err| match err {
				Interrupted::Cancelled => Error::Cancelled,
				Interrupted::Transport(source) => Error::Transport(source),
			})?;

		if !response.is_success() {
			return Err(Error::Notify { status: response.status, body: response.body_text() });
		}

		Ok(self.api.decode(&response.body)?)
	}
}
impl<V, S, C> Dispatcher<V, AuthCoordinator<S, C>, C>
where
	V: VendorApi,
	S: CredentialStrategy,
	C: ?Sized + PushHttpClient,
{
	/// Replaces the clock the token coordinator uses.
	pub fn with_clock(self, clock: impl 'static + Clock) -> Self {
		let Self { api, authorizer, http_client } = self;

		Self { api, authorizer: authorizer.with_clock(clock), http_client }
	}

	/// Returns the token coordinator.
	pub fn coordinator(&self) -> &AuthCoordinator<S, C> {
		&self.authorizer
	}

	/// Returns a usable token without sending a notification.
	pub async fn get_token(&self, ctx: &CallContext) -> Result<TokenSecret> {
		Ok(self.authorizer.get_token(ctx).await?)
	}
}
impl<V, A, C> PushClient for Dispatcher<V, A, C>
where
	V: VendorApi,
	A: Authorizer,
	C: ?Sized + PushHttpClient,
{
	type Message = V::Message;
	type Response = V::Response;

	fn vendor(&self) -> Vendor {
		self.api.vendor()
	}

	fn notify<'a>(
		&'a self,
		ctx: &'a CallContext,
		message: &'a Self::Message,
	) -> NotifyFuture<'a, Self::Response> {
		Box::pin(Dispatcher::notify(self, ctx, message))
	}
}
impl<V, A, C> Debug for Dispatcher<V, A, C>
where
	V: VendorApi,
	A: Authorizer,
	C: ?Sized + PushHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher")
			.field("vendor", &self.api.vendor())
			.field("push_url", &self.api.push_url().as_str())
			.finish()
	}
}
