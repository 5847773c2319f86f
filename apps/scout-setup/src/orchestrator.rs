use std::path::{Path, PathBuf};

use scout_config::{Deploy, Setup};

use crate::{
	Error, Result,
	env::Environment,
	resolve::{FollowUpLinks, ServiceUrlResolver},
	runner::{Invocation, ScriptRunner},
	stage::Stage,
	venv::Venv,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
	pub completed: Vec<Stage>,
	pub warnings: Vec<String>,
	pub links: FollowUpLinks,
}

/// Runs the fixed setup sequence: prerequisites, infrastructure, database, deploy, verify.
///
/// Every step runs to completion before the next one starts. The first error stops the run.
pub struct Orchestrator<R, U> {
	root: PathBuf,
	setup: Setup,
	deploy: Deploy,
	env: Environment,
	runner: R,
	resolver: U,
}
impl<R, U> Orchestrator<R, U>
where
	R: ScriptRunner,
	U: ServiceUrlResolver,
{
	pub fn new(
		root: impl Into<PathBuf>,
		setup: Setup,
		deploy: Deploy,
		env: Environment,
		runner: R,
		resolver: U,
	) -> Self {
		let root = root.into();
		// Script paths are joined onto the root and the root is also each child's cwd, so a
		// relative root would be resolved twice.
		let root = std::path::absolute(&root).unwrap_or(root);

		Self { root, setup, deploy, env, runner, resolver }
	}

	pub fn runner(&self) -> &R {
		&self.runner
	}

	pub async fn run(&self) -> Result<SetupReport> {
		let mut completed = Vec::new();
		let mut warnings = Vec::new();

		self.check_prereqs()?;
		completed.push(Stage::CheckPrereqs);

		self.run_script(Stage::Infra, &self.setup.infra_script).await?;
		completed.push(Stage::Infra);

		self.run_database().await?;
		completed.push(Stage::Database);

		self.run_script(Stage::Deploy, &self.setup.deploy_script).await?;
		completed.push(Stage::Deploy);

		match self.run_verify().await? {
			Some(warning) => warnings.push(warning),
			None => completed.push(Stage::Verify),
		}

		let links = FollowUpLinks::resolve(&self.resolver, &self.deploy).await;

		completed.push(Stage::Done);

		tracing::info!(stages = completed.len(), warnings = warnings.len(), "Setup finished.");

		Ok(SetupReport { completed, warnings, links })
	}

	fn check_prereqs(&self) -> Result<()> {
		let marker = self.root.join(&self.setup.marker_file);

		if !marker.is_file() {
			return Err(Error::MissingMarker { path: marker });
		}

		tracing::info!(
			root = %self.root.display(),
			project_id = %self.deploy.project_id,
			region = %self.deploy.region,
			"Prerequisites satisfied."
		);

		Ok(())
	}

	fn require_script(&self, stage: Stage, script: &Path) -> Result<PathBuf> {
		let path = self.root.join(script);

		if !path.is_file() {
			return Err(Error::MissingScript { stage, path });
		}

		Ok(path)
	}

	async fn run_script(&self, stage: Stage, script: &Path) -> Result<()> {
		let path = self.require_script(stage, script)?;
		let invocation = Invocation::for_script(stage, &path, &self.setup.python, &self.root)
			.envs(self.env.vars());

		self.execute(invocation).await
	}

	async fn run_database(&self) -> Result<()> {
		let script = self.require_script(Stage::Database, &self.setup.database_script)?;
		let venv = Venv::new(&self.root, &self.setup.venv_dir);

		if venv.exists() {
			tracing::info!(venv = %venv.dir().display(), "Reusing virtual environment.");
		} else {
			tracing::info!(venv = %venv.dir().display(), "Creating virtual environment.");

			self.execute(venv.creation(&self.setup.python, &self.root).envs(self.env.vars()))
				.await?;
		}

		let activation = venv.activate();
		let overlay = self.env.vars().into_iter().chain(activation.vars()).collect::<Vec<_>>();
		let venv_python = venv.python().display().to_string();

		if let Some(requirements) = self.setup.requirements.as_ref() {
			let requirements = self.root.join(requirements);

			if requirements.is_file() {
				let install = Invocation::new(Stage::Database, venv_python.as_str(), &self.root)
					.envs(overlay.clone())
					.arg("-m")
					.arg("pip")
					.arg("install")
					.arg("-r")
					.arg(requirements.display().to_string());

				self.execute(install).await?;
			}
		}

		let invocation = Invocation::for_script(Stage::Database, &script, &venv_python, &self.root)
			.envs(overlay);

		// `activation` drops on every path out of this function, including errors.
		self.execute(invocation).await
	}

	/// Returns a warning instead of failing when the verify script is absent.
	async fn run_verify(&self) -> Result<Option<String>> {
		let path = self.root.join(&self.setup.verify_script);

		if !path.is_file() {
			let warning = format!(
				"Verification script {} not found. Skipping deployment verification.",
				path.display()
			);

			tracing::warn!(path = %path.display(), "Verification script not found.");

			return Ok(Some(warning));
		}

		self.run_script(Stage::Verify, &self.setup.verify_script).await?;

		Ok(None)
	}

	async fn execute(&self, invocation: Invocation) -> Result<()> {
		let stage = invocation.stage;

		tracing::info!(stage = %stage, program = %invocation.program, "Running step.");

		let exit = self.runner.run(&invocation).await?;

		if !exit.success() {
			tracing::error!(stage = %stage, code = ?exit.code, "Step failed.");

			return Err(Error::StepFailed { stage, code: exit.code });
		}

		tracing::info!(stage = %stage, next = ?stage.next(), "Step completed.");

		Ok(())
	}
}
