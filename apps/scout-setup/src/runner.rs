use std::{
	future::Future,
	path::{Path, PathBuf},
	pin::Pin,
};

use tokio::process::Command;

use crate::{Error, Result, stage::Stage};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One external program run on behalf of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
	pub stage: Stage,
	pub program: String,
	pub args: Vec<String>,
	pub cwd: PathBuf,
	pub env: Vec<(String, String)>,
}
impl Invocation {
	pub fn new(stage: Stage, program: impl Into<String>, cwd: &Path) -> Self {
		Self { stage, program: program.into(), args: Vec::new(), cwd: cwd.to_path_buf(), env: Vec::new() }
	}

	pub fn arg(mut self, arg: impl Into<String>) -> Self {
		self.args.push(arg.into());

		self
	}

	pub fn envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
		self.env.extend(vars);

		self
	}

	/// Later entries win, matching how the child process would see repeated keys.
	pub fn env_value(&self, key: &str) -> Option<&str> {
		self.env.iter().rev().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
	}

	/// Picks an interpreter from the script extension.
	pub fn for_script(stage: Stage, script: &Path, python: &str, cwd: &Path) -> Self {
		let path = script.display().to_string();

		match script.extension().and_then(|ext| ext.to_str()) {
			Some("sh") => Self::new(stage, "bash", cwd).arg(path),
			Some("py") => Self::new(stage, python, cwd).arg(path),
			_ => Self::new(stage, path, cwd),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepExit {
	/// `None` when the child was terminated by a signal.
	pub code: Option<i32>,
}
impl StepExit {
	pub fn success(self) -> bool {
		self.code == Some(0)
	}
}

pub trait ScriptRunner
where
	Self: Send + Sync,
{
	fn run<'a>(&'a self, invocation: &'a Invocation) -> BoxFuture<'a, Result<StepExit>>;
}

/// Runs invocations as child processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;
impl ScriptRunner for ProcessRunner {
	fn run<'a>(&'a self, invocation: &'a Invocation) -> BoxFuture<'a, Result<StepExit>> {
		Box::pin(async move {
			tracing::debug!(
				stage = %invocation.stage,
				program = %invocation.program,
				args = ?invocation.args,
				"Spawning step process."
			);

			let status = Command::new(&invocation.program)
				.args(&invocation.args)
				.current_dir(&invocation.cwd)
				.envs(invocation.env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
				.status()
				.await
				.map_err(|err| Error::Spawn {
					stage: invocation.stage,
					program: invocation.program.clone(),
					source: err,
				})?;

			Ok(StepExit { code: status.code() })
		})
	}
}
