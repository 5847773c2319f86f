mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_FALLBACK_URL, DEFAULT_PROJECT_ID, DEFAULT_REGION, DEFAULT_SERVICE, Deploy,
	Postgres, Service, Setup, Storage, Verify,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	if let Some(storage) = cfg.storage.as_ref() {
		if storage.postgres.dsn.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.postgres.dsn must be non-empty.".to_string(),
			});
		}
		if storage.postgres.pool_max_conns == 0 {
			return Err(Error::Validation {
				message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
			});
		}
	}

	for (label, value) in [
		("deploy.project_id", &cfg.deploy.project_id),
		("deploy.region", &cfg.deploy.region),
		("deploy.service", &cfg.deploy.service),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	let fallback = cfg.deploy.fallback_url.as_str();

	if !(fallback.starts_with("http://") || fallback.starts_with("https://")) {
		return Err(Error::Validation {
			message: "deploy.fallback_url must start with http:// or https://.".to_string(),
		});
	}

	for (label, path) in [
		("setup.marker_file", &cfg.setup.marker_file),
		("setup.infra_script", &cfg.setup.infra_script),
		("setup.database_script", &cfg.setup.database_script),
		("setup.deploy_script", &cfg.setup.deploy_script),
		("setup.verify_script", &cfg.setup.verify_script),
		("setup.venv_dir", &cfg.setup.venv_dir),
	] {
		if path.as_os_str().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.setup.python.trim().is_empty() {
		return Err(Error::Validation { message: "setup.python must be non-empty.".to_string() });
	}
	if cfg.verify.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "verify.timeout_ms must be greater than zero.".to_string(),
		});
	}

	if let Some(path) = cfg.verify.expected_paths.iter().find(|path| !path.starts_with('/')) {
		return Err(Error::Validation {
			message: format!("verify.expected_paths entry {path:?} must start with '/'."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.deploy.fallback_url = cfg.deploy.fallback_url.trim().trim_end_matches('/').to_string();

	if cfg.setup.requirements.as_ref().map(|path| path.as_os_str().is_empty()).unwrap_or(false) {
		cfg.setup.requirements = None;
	}

	cfg.verify.expected_paths.retain(|path| !path.trim().is_empty());
}
