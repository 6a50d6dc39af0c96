// self
use crate::{
	obs::{CallKind, CallOutcome},
	vendor::Vendor,
};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(vendor: Vendor, kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"push_dispatch_call_total",
			"vendor" => vendor.as_str(),
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (vendor, kind, outcome);
	}
}
