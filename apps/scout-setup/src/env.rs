use std::{collections::BTreeMap, env, path::Path};

use scout_config::Deploy;

use crate::{Error, Result};

/// Variables exported to every script for the rest of the run.
///
/// Loaded once from the optional env file. The parent process environment is never mutated;
/// the overlay is applied to each child process instead.
#[derive(Debug, Clone, Default)]
pub struct Environment {
	vars: BTreeMap<String, String>,
}
impl Environment {
	pub fn load(path: &Path) -> Result<Self> {
		if !path.is_file() {
			tracing::debug!(path = %path.display(), "No environment file.");

			return Ok(Self::default());
		}

		let iter = dotenvy::from_path_iter(path)
			.map_err(|err| Error::EnvFile { path: path.to_path_buf(), source: err })?;
		let mut vars = BTreeMap::new();

		for item in iter {
			let (key, value) =
				item.map_err(|err| Error::EnvFile { path: path.to_path_buf(), source: err })?;

			vars.insert(key, value);
		}

		tracing::info!(path = %path.display(), count = vars.len(), "Loaded environment file.");

		Ok(Self { vars })
	}

	/// Process environment first, then the env file.
	pub fn lookup(&self, key: &str) -> Option<String> {
		env::var(key).ok().or_else(|| self.vars.get(key).cloned())
	}

	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.vars.insert(key.into(), value.into());
	}

	/// Exports the resolved deployment identity so every script sees the same values.
	pub fn export_deploy(&mut self, deploy: &Deploy) {
		self.set("PROJECT_ID", deploy.project_id.as_str());
		self.set("REGION", deploy.region.as_str());
		self.set("SERVICE_NAME", deploy.service.as_str());
	}

	pub fn vars(&self) -> Vec<(String, String)> {
		self.vars.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
	}
}
