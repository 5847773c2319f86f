use std::fmt;

use tokio::process::Command;

use scout_config::Deploy;

use crate::runner::BoxFuture;

/// Looks up the live address of the deployed service.
pub trait ServiceUrlResolver
where
	Self: Send + Sync,
{
	fn resolve<'a>(&'a self, deploy: &'a Deploy) -> BoxFuture<'a, Option<String>>;
}

/// Asks `gcloud` for the service URL. Any failure resolves to `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GcloudResolver;
impl ServiceUrlResolver for GcloudResolver {
	fn resolve<'a>(&'a self, deploy: &'a Deploy) -> BoxFuture<'a, Option<String>> {
		Box::pin(async move {
			let output = Command::new("gcloud")
				.args(["run", "services", "describe", deploy.service.as_str()])
				.args(["--region", deploy.region.as_str()])
				.args(["--project", deploy.project_id.as_str()])
				.args(["--format", "value(status.url)"])
				.output()
				.await;
			let output = match output {
				Ok(output) => output,
				Err(err) => {
					tracing::debug!(error = %err, "gcloud is unavailable.");

					return None;
				},
			};

			if !output.status.success() {
				tracing::debug!(
					status = ?output.status.code(),
					stderr = %String::from_utf8_lossy(&output.stderr).trim(),
					"gcloud could not describe the service."
				);

				return None;
			}

			parse_service_url(&String::from_utf8_lossy(&output.stdout))
		})
	}
}

/// First line of `gcloud` output that looks like an HTTP(S) URL.
pub fn parse_service_url(stdout: &str) -> Option<String> {
	stdout
		.lines()
		.map(str::trim)
		.find(|line| line.starts_with("https://") || line.starts_with("http://"))
		.map(|line| line.trim_end_matches('/').to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpLinks {
	pub app: String,
	pub health: String,
	pub docs: String,
	/// Whether `app` came from the live service rather than the configured fallback.
	pub resolved: bool,
}
impl FollowUpLinks {
	pub fn from_base(base: &str, resolved: bool) -> Self {
		let app = base.trim().trim_end_matches('/').to_string();

		Self { health: format!("{app}/health"), docs: format!("{app}/docs"), app, resolved }
	}

	pub async fn resolve(resolver: &dyn ServiceUrlResolver, deploy: &Deploy) -> Self {
		match resolver.resolve(deploy).await {
			Some(url) => Self::from_base(&url, true),
			None => {
				tracing::warn!(
					fallback = %deploy.fallback_url,
					"Could not resolve the service URL. Using the fallback address."
				);

				Self::from_base(&deploy.fallback_url, false)
			},
		}
	}
}
impl fmt::Display for FollowUpLinks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Application:  {}", self.app)?;
		writeln!(f, "Health check: {}", self.health)?;
		write!(f, "API docs:     {}", self.docs)
	}
}
