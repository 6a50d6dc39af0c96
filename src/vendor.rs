//! Vendor integrations built on the shared dispatch core.

pub mod oppo;
pub mod vivo;
pub mod xiaomi;

pub use oppo::{OppoApi, OppoClient, OppoCredentials};
pub use vivo::{VivoApi, VivoClient, VivoCredentials};
pub use xiaomi::{XiaomiApi, XiaomiClient};

// self
use crate::_prelude::*;

/// Push vendors supported by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vendor {
	/// Xiaomi push (static API key).
	Xiaomi,
	/// OPPO push (SHA-256 signed token exchange).
	Oppo,
	/// vivo push (MD5 signed token exchange).
	Vivo,
}
impl Vendor {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Xiaomi => "xiaomi",
			Self::Oppo => "oppo",
			Self::Vivo => "vivo",
		}
	}
}
impl Display for Vendor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
