use std::path::PathBuf;

use crate::stage::Stage;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Marker file {path:?} not found. Run scout-setup from the project root.")]
	MissingMarker { path: PathBuf },
	#[error("The {stage} script {path:?} was not found.")]
	MissingScript { stage: Stage, path: PathBuf },
	#[error("The {stage} step {}.", exit_label(.code))]
	StepFailed { stage: Stage, code: Option<i32> },
	#[error("Failed to spawn {program:?} for the {stage} step.")]
	Spawn { stage: Stage, program: String, source: std::io::Error },
	#[error("Failed to read environment file {path:?}.")]
	EnvFile { path: PathBuf, source: dotenvy::Error },
	#[error("Probe failed: {message}")]
	Probe { message: String },
	#[error(transparent)]
	Config(#[from] scout_config::Error),
}

fn exit_label(code: &Option<i32>) -> String {
	match code {
		Some(code) => format!("exited with status {code}"),
		None => "was terminated by a signal".to_string(),
	}
}
