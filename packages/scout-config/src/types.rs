use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_PROJECT_ID: &str = "topic-scout-prod";
pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_SERVICE: &str = "topic-analysis-api";
pub const DEFAULT_FALLBACK_URL: &str = "https://topic-analysis-api-uc.a.run.app";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	/// Optional. Only the schema tooling needs a database.
	pub storage: Option<Storage>,
	#[serde(default)]
	pub deploy: Deploy,
	#[serde(default)]
	pub setup: Setup,
	#[serde(default)]
	pub verify: Verify,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
}

/// Where the service is deployed. `PROJECT_ID` and `REGION` from the environment take
/// precedence over these values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Deploy {
	pub project_id: String,
	pub region: String,
	pub service: String,
	/// Used for the follow-up links when the live service address cannot be resolved.
	pub fallback_url: String,
}
impl Deploy {
	/// Applies `PROJECT_ID` (or `GOOGLE_CLOUD_PROJECT`) and `REGION` overrides.
	pub fn apply_env<F>(&mut self, lookup: F)
	where
		F: Fn(&str) -> Option<String>,
	{
		let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

		if let Some(project_id) = non_empty("PROJECT_ID").or_else(|| non_empty("GOOGLE_CLOUD_PROJECT"))
		{
			self.project_id = project_id.trim().to_string();
		}
		if let Some(region) = non_empty("REGION") {
			self.region = region.trim().to_string();
		}
	}
}
impl Default for Deploy {
	fn default() -> Self {
		Self {
			project_id: DEFAULT_PROJECT_ID.to_string(),
			region: DEFAULT_REGION.to_string(),
			service: DEFAULT_SERVICE.to_string(),
			fallback_url: DEFAULT_FALLBACK_URL.to_string(),
		}
	}
}

/// Paths are relative to the project root unless absolute.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Setup {
	/// A file whose presence proves the orchestrator runs from the project root.
	pub marker_file: PathBuf,
	pub env_file: PathBuf,
	pub infra_script: PathBuf,
	pub database_script: PathBuf,
	pub deploy_script: PathBuf,
	pub verify_script: PathBuf,
	pub venv_dir: PathBuf,
	pub requirements: Option<PathBuf>,
	pub python: String,
}
impl Default for Setup {
	fn default() -> Self {
		Self {
			marker_file: PathBuf::from("Dockerfile"),
			env_file: PathBuf::from(".env"),
			infra_script: PathBuf::from("scripts/setup_infrastructure.sh"),
			database_script: PathBuf::from("scripts/setup_database.py"),
			deploy_script: PathBuf::from("scripts/deploy.sh"),
			verify_script: PathBuf::from("scripts/verify_deployment.sh"),
			venv_dir: PathBuf::from(".venv"),
			requirements: Some(PathBuf::from("requirements.txt")),
			python: "python3".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Verify {
	/// OpenAPI paths the deployed revision must expose.
	pub expected_paths: Vec<String>,
	pub timeout_ms: u64,
}
impl Default for Verify {
	fn default() -> Self {
		Self { expected_paths: vec!["/health".to_string()], timeout_ms: 5_000 }
	}
}

fn default_pool_max_conns() -> u32 {
	4
}
