use std::{
	env,
	ffi::OsString,
	iter,
	path::{Path, PathBuf},
};

use crate::{runner::Invocation, stage::Stage};

#[cfg(windows)]
const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const BIN_DIR: &str = "bin";

/// A Python virtual environment scoped to the database step.
#[derive(Debug, Clone)]
pub struct Venv {
	dir: PathBuf,
}
impl Venv {
	pub fn new(root: &Path, dir: &Path) -> Self {
		Self { dir: root.join(dir) }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn exists(&self) -> bool {
		self.dir.is_dir()
	}

	pub fn bin_dir(&self) -> PathBuf {
		self.dir.join(BIN_DIR)
	}

	pub fn python(&self) -> PathBuf {
		self.bin_dir().join("python")
	}

	pub fn creation(&self, python: &str, cwd: &Path) -> Invocation {
		Invocation::new(Stage::Database, python, cwd)
			.arg("-m")
			.arg("venv")
			.arg(self.dir.display().to_string())
	}

	/// Builds the `VIRTUAL_ENV` and `PATH` overlay for child processes.
	///
	/// The parent environment is never changed. Dropping the guard only logs that the scope ended.
	pub fn activate(&self) -> Activation<'_> {
		self.activate_with_path(env::var_os("PATH"))
	}

	pub fn activate_with_path(&self, base_path: Option<OsString>) -> Activation<'_> {
		let existing = base_path.unwrap_or_default();
		let paths = iter::once(self.bin_dir()).chain(env::split_paths(&existing));
		let path = env::join_paths(paths)
			.map(|joined| joined.to_string_lossy().into_owned())
			.unwrap_or_else(|_| self.bin_dir().display().to_string());

		tracing::info!(venv = %self.dir.display(), "Virtual environment activated.");

		Activation {
			venv: self,
			vars: vec![
				("VIRTUAL_ENV".to_string(), self.dir.display().to_string()),
				("PATH".to_string(), path),
			],
		}
	}
}

pub struct Activation<'a> {
	venv: &'a Venv,
	vars: Vec<(String, String)>,
}
impl Activation<'_> {
	pub fn vars(&self) -> Vec<(String, String)> {
		self.vars.clone()
	}
}
impl Drop for Activation<'_> {
	fn drop(&mut self) {
		tracing::info!(venv = %self.venv.dir.display(), "Virtual environment deactivated.");
	}
}
