use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use scout_config::Verify;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
	pub base_url: String,
	pub health_status: u16,
	/// Number of paths listed in the OpenAPI document.
	pub registered: usize,
	pub missing: Vec<String>,
}
impl ProbeReport {
	pub fn is_healthy(&self) -> bool {
		self.missing.is_empty()
	}
}

/// Checks `/health` and compares `/openapi.json` against the expected paths.
///
/// A revision that builds and deploys can still serve without some routes. This reports the
/// routes the live document is missing without guessing at the cause.
pub async fn probe(base_url: &str, verify: &Verify) -> Result<ProbeReport> {
	let base_url = base_url.trim().trim_end_matches('/').to_string();
	let client = Client::builder()
		.timeout(Duration::from_millis(verify.timeout_ms))
		.build()
		.map_err(|err| Error::Probe { message: format!("Failed to build HTTP client: {err}.") })?;
	let health = client
		.get(format!("{base_url}/health"))
		.send()
		.await
		.map_err(|err| Error::Probe { message: format!("Health request failed: {err}.") })?;
	let health_status = health.status();

	if !health_status.is_success() {
		return Err(Error::Probe {
			message: format!("{base_url}/health returned {health_status}."),
		});
	}

	let openapi: Value = client
		.get(format!("{base_url}/openapi.json"))
		.send()
		.await
		.and_then(|response| response.error_for_status())
		.map_err(|err| Error::Probe { message: format!("OpenAPI request failed: {err}.") })?
		.json()
		.await
		.map_err(|err| Error::Probe { message: format!("OpenAPI document is invalid: {err}.") })?;
	let registered = openapi.get("paths").and_then(Value::as_object).map_or(0, |paths| paths.len());
	let missing = missing_paths(&openapi, &verify.expected_paths);

	tracing::info!(
		base_url = %base_url,
		registered,
		missing = missing.len(),
		"Probed deployed service."
	);

	Ok(ProbeReport { base_url, health_status: health_status.as_u16(), registered, missing })
}

/// Expected paths absent from the document's `paths` object, in the given order.
pub fn missing_paths(openapi: &Value, expected: &[String]) -> Vec<String> {
	let paths = openapi.get("paths").and_then(Value::as_object);

	expected
		.iter()
		.filter(|path| !paths.is_some_and(|paths| paths.contains_key(path.as_str())))
		.cloned()
		.collect()
}
