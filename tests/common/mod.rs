#![allow(dead_code)]

// crates.io
use httpmock::prelude::*;
use push_dispatch::{
	config::{OppoConfig, VivoConfig, XiaomiConfig},
	http::ReqwestHttpClient,
	reqwest::Client,
};
use time::{OffsetDateTime, macros::datetime};

pub const PACKAGE: &str = "com.example.app";
pub const VIVO_AUTH_PATH: &str = "/message/auth";
pub const VIVO_PUSH_PATH: &str = "/message/send";
pub const OPPO_AUTH_PATH: &str = "/server/v1/auth";
pub const OPPO_PUSH_PATH: &str = "/server/v1/message/notification/unicast";
pub const XIAOMI_PUSH_PATH: &str = "/v4/message/regid";
pub const T0: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

/// Reqwest transport that trusts the self-signed certificate served by `httpmock`.
pub fn test_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn vivo_config(server: &MockServer) -> VivoConfig {
	VivoConfig::new(PACKAGE, "10001", "vivo-key", "vivo-secret")
		.with_auth_url(server.url(VIVO_AUTH_PATH))
		.with_push_url(server.url(VIVO_PUSH_PATH))
}

pub fn oppo_config(server: &MockServer) -> OppoConfig {
	OppoConfig::new(PACKAGE, "oppo-key", "oppo-master")
		.with_auth_url(server.url(OPPO_AUTH_PATH))
		.with_push_url(server.url(OPPO_PUSH_PATH))
}

pub fn xiaomi_config(server: &MockServer) -> XiaomiConfig {
	XiaomiConfig::new(PACKAGE, "mi-secret").with_push_url(server.url(XIAOMI_PUSH_PATH))
}
