//! Serde-backed vendor configuration with production endpoint defaults.
//!
//! A [`PushConfig`] document carries one optional block per vendor. Blocks are validated
//! before any client is built, so a bad configuration fails without touching the network.

// self
use crate::{_prelude::*, error::ConfigError, vendor::Vendor};

/// Xiaomi production notification endpoint.
pub const XIAOMI_PUSH_URL: &str = "https://api.xmpush.xiaomi.com/v4/message/regid";
/// OPPO production notification endpoint.
pub const OPPO_PUSH_URL: &str =
	"https://api.push.oppomobile.com/server/v1/message/notification/unicast";
/// OPPO production token endpoint.
pub const OPPO_AUTH_URL: &str = "https://api.push.oppomobile.com/server/v1/auth";
/// vivo production notification endpoint.
pub const VIVO_PUSH_URL: &str = "https://api-push.vivo.com.cn/message/send";
/// vivo production token endpoint.
pub const VIVO_AUTH_URL: &str = "https://api-push.vivo.com.cn/message/auth";

/// Configuration document holding one optional block per vendor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConfig {
	/// Xiaomi credentials.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub xiaomi: Option<XiaomiConfig>,
	/// OPPO credentials.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub oppo: Option<OppoConfig>,
	/// vivo credentials.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vivo: Option<VivoConfig>,
}
impl PushConfig {
	/// Parses and validates a JSON document.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		Self::from_json_slice(json.as_bytes())
	}

	/// Parses and validates a JSON document from raw bytes.
	pub fn from_json_slice(json: &[u8]) -> Result<Self, ConfigError> {
		let config: Self =
			crate::error::decode_json(json).map_err(|source| ConfigError::Malformed { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Validates every present vendor block.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if let Some(xiaomi) = &self.xiaomi {
			xiaomi.validate()?;
		}
		if let Some(oppo) = &self.oppo {
			oppo.validate()?;
		}
		if let Some(vivo) = &self.vivo {
			vivo.validate()?;
		}

		Ok(())
	}
}

/// Xiaomi credentials. Xiaomi authenticates with the app secret directly.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XiaomiConfig {
	/// Application package name, used when a message leaves its own empty.
	#[serde(rename = "appPkgName")]
	pub app_package_name: String,
	/// App secret sent as `Authorization: key=<secret>`.
	pub app_secret: String,
	/// Notification endpoint.
	#[serde(default = "xiaomi_push_url")]
	pub push_url: String,
}
impl XiaomiConfig {
	/// Creates a configuration targeting the production endpoint.
	pub fn new(app_package_name: impl Into<String>, app_secret: impl Into<String>) -> Self {
		Self {
			app_package_name: app_package_name.into(),
			app_secret: app_secret.into(),
			push_url: xiaomi_push_url(),
		}
	}

	/// Overrides the notification endpoint.
	pub fn with_push_url(mut self, push_url: impl Into<String>) -> Self {
		self.push_url = push_url.into();

		self
	}

	/// Checks that credentials are present and the endpoint is usable.
	pub fn validate(&self) -> Result<(), ConfigError> {
		require(Vendor::Xiaomi, "appPkgName", &self.app_package_name)?;
		require(Vendor::Xiaomi, "appSecret", &self.app_secret)?;
		self.push_endpoint()?;

		Ok(())
	}

	pub(crate) fn push_endpoint(&self) -> Result<Url, ConfigError> {
		parse_endpoint(Vendor::Xiaomi, "pushUrl", &self.push_url)
	}
}
impl Debug for XiaomiConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("XiaomiConfig")
			.field("app_package_name", &self.app_package_name)
			.field("app_secret", &"<redacted>")
			.field("push_url", &self.push_url)
			.finish()
	}
}

/// OPPO credentials for the SHA-256 signed token exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OppoConfig {
	/// Application package name.
	#[serde(rename = "appPkgName")]
	pub app_package_name: String,
	/// App key sent with every token request.
	pub app_key: String,
	/// Master secret used only inside the signature.
	pub master_secret: String,
	/// Notification endpoint.
	#[serde(default = "oppo_push_url")]
	pub push_url: String,
	/// Token endpoint.
	#[serde(default = "oppo_auth_url")]
	pub auth_url: String,
}
impl OppoConfig {
	/// Creates a configuration targeting the production endpoints.
	pub fn new(
		app_package_name: impl Into<String>,
		app_key: impl Into<String>,
		master_secret: impl Into<String>,
	) -> Self {
		Self {
			app_package_name: app_package_name.into(),
			app_key: app_key.into(),
			master_secret: master_secret.into(),
			push_url: oppo_push_url(),
			auth_url: oppo_auth_url(),
		}
	}

	/// Overrides the notification endpoint.
	pub fn with_push_url(mut self, push_url: impl Into<String>) -> Self {
		self.push_url = push_url.into();

		self
	}

	/// Overrides the token endpoint.
	pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
		self.auth_url = auth_url.into();

		self
	}

	/// Checks that credentials are present and both endpoints are usable.
	pub fn validate(&self) -> Result<(), ConfigError> {
		require(Vendor::Oppo, "appPkgName", &self.app_package_name)?;
		require(Vendor::Oppo, "appKey", &self.app_key)?;
		require(Vendor::Oppo, "masterSecret", &self.master_secret)?;
		self.push_endpoint()?;
		self.auth_endpoint()?;

		Ok(())
	}

	pub(crate) fn push_endpoint(&self) -> Result<Url, ConfigError> {
		parse_endpoint(Vendor::Oppo, "pushUrl", &self.push_url)
	}

	pub(crate) fn auth_endpoint(&self) -> Result<Url, ConfigError> {
		parse_endpoint(Vendor::Oppo, "authUrl", &self.auth_url)
	}
}
impl Debug for OppoConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OppoConfig")
			.field("app_package_name", &self.app_package_name)
			.field("app_key", &self.app_key)
			.field("master_secret", &"<redacted>")
			.field("push_url", &self.push_url)
			.field("auth_url", &self.auth_url)
			.finish()
	}
}

/// vivo credentials for the MD5 signed token exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VivoConfig {
	/// Application package name.
	#[serde(rename = "appPkgName")]
	pub app_package_name: String,
	/// Numeric app id issued by vivo, kept as text.
	pub app_id: String,
	/// App key sent with every token request.
	pub app_key: String,
	/// App secret used only inside the signature.
	pub app_secret: String,
	/// Notification endpoint.
	#[serde(default = "vivo_push_url")]
	pub push_url: String,
	/// Token endpoint.
	#[serde(default = "vivo_auth_url")]
	pub auth_url: String,
}
impl VivoConfig {
	/// Creates a configuration targeting the production endpoints.
	pub fn new(
		app_package_name: impl Into<String>,
		app_id: impl Into<String>,
		app_key: impl Into<String>,
		app_secret: impl Into<String>,
	) -> Self {
		Self {
			app_package_name: app_package_name.into(),
			app_id: app_id.into(),
			app_key: app_key.into(),
			app_secret: app_secret.into(),
			push_url: vivo_push_url(),
			auth_url: vivo_auth_url(),
		}
	}

	/// Overrides the notification endpoint.
	pub fn with_push_url(mut self, push_url: impl Into<String>) -> Self {
		self.push_url = push_url.into();

		self
	}

	/// Overrides the token endpoint.
	pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
		self.auth_url = auth_url.into();

		self
	}

	/// Checks that credentials are present and both endpoints are usable.
	pub fn validate(&self) -> Result<(), ConfigError> {
		require(Vendor::Vivo, "appPkgName", &self.app_package_name)?;
		require(Vendor::Vivo, "appId", &self.app_id)?;
		require(Vendor::Vivo, "appKey", &self.app_key)?;
		require(Vendor::Vivo, "appSecret", &self.app_secret)?;
		self.push_endpoint()?;
		self.auth_endpoint()?;

		Ok(())
	}

	pub(crate) fn push_endpoint(&self) -> Result<Url, ConfigError> {
		parse_endpoint(Vendor::Vivo, "pushUrl", &self.push_url)
	}

	pub(crate) fn auth_endpoint(&self) -> Result<Url, ConfigError> {
		parse_endpoint(Vendor::Vivo, "authUrl", &self.auth_url)
	}
}
impl Debug for VivoConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("VivoConfig")
			.field("app_package_name", &self.app_package_name)
			.field("app_id", &self.app_id)
			.field("app_key", &self.app_key)
			.field("app_secret", &"<redacted>")
			.field("push_url", &self.push_url)
			.field("auth_url", &self.auth_url)
			.finish()
	}
}

fn require(vendor: Vendor, field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::MissingField { vendor, field }) } else { Ok(()) }
}

fn parse_endpoint(vendor: Vendor, endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let invalid = || ConfigError::InvalidEndpoint { vendor, endpoint, url: raw.to_owned() };
	let url = Url::parse(raw).map_err(|_| invalid())?;

	if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
		return Err(invalid());
	}

	Ok(url)
}

fn xiaomi_push_url() -> String {
	XIAOMI_PUSH_URL.into()
}

fn oppo_push_url() -> String {
	OPPO_PUSH_URL.into()
}

fn oppo_auth_url() -> String {
	OPPO_AUTH_URL.into()
}

fn vivo_push_url() -> String {
	VIVO_PUSH_URL.into()
}

fn vivo_auth_url() -> String {
	VIVO_AUTH_URL.into()
}
