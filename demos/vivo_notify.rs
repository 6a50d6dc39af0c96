//! Sends a vivo notification against a local mock of the vivo endpoints.
//!
//! The first call exchanges the signed credentials for a token; the second reuses the cached
//! token, so the token endpoint is hit exactly once. The mock serves a self-signed certificate,
//! so the demo trusts it explicitly; production clients use [`VivoClient::new`].

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use push_dispatch::{
	config::VivoConfig,
	context::CallContext,
	dispatch::PushResponse,
	http::ReqwestHttpClient,
	reqwest::Client,
	vendor::{VivoClient, vivo::VivoMessage},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let auth_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/message/auth");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"result":0,"desc":"ok","authToken":"demo-token"}"#);
		})
		.await;
	let push_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/message/send").header("authToken", "demo-token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"result":0,"desc":"ok","requestId":"demo-1","taskId":"task-1"}"#);
		})
		.await;
	let config = VivoConfig::new("com.example.app", "10001", "demo-key", "demo-secret")
		.with_auth_url(server.url("/message/auth"))
		.with_push_url(server.url("/message/send"));
	let http_client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let client: VivoClient =
		VivoClient::from_config(&config, ReqwestHttpClient::with_client(http_client))?;
	let ctx = CallContext::new().with_timeout(Duration::from_secs(5));

	for request_id in ["demo-1", "demo-2"] {
		let message = VivoMessage::new("reg-demo", "Hello", "Sent through push-dispatch.")
			.with_request_id(request_id);
		let response = client.notify(&ctx, &message).await?;

		println!("result={} data={:?}", response.result(), response.data());
	}

	auth_mock.assert_calls_async(1).await;
	push_mock.assert_calls_async(2).await;

	println!("token refreshes: {}", client.coordinator().metrics().refreshes());

	Ok(())
}
