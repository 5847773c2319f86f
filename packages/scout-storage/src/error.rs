#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Conflict: {0}")]
	Conflict(String),
}
impl Error {
	/// Classifies constraint violations raised by Postgres on a write.
	pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
		let sqlx::Error::Database(db_err) = &err else {
			return Self::Sqlx(err);
		};

		if db_err.is_unique_violation() {
			Self::Conflict(format!("{what} already exists."))
		} else if db_err.is_foreign_key_violation() {
			Self::NotFound(format!("{what} references an unknown topic session."))
		} else if db_err.is_check_violation() {
			let constraint = db_err.constraint().unwrap_or("check");

			Self::InvalidArgument(format!("{what} violates constraint {constraint}."))
		} else {
			Self::Sqlx(err)
		}
	}
}
