use std::fmt;

/// Steps of the setup sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
	CheckPrereqs,
	Infra,
	Database,
	Deploy,
	Verify,
	Done,
}
impl Stage {
	pub const ORDER: [Self; 6] =
		[Self::CheckPrereqs, Self::Infra, Self::Database, Self::Deploy, Self::Verify, Self::Done];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::CheckPrereqs => "prerequisite check",
			Self::Infra => "infrastructure",
			Self::Database => "database",
			Self::Deploy => "deploy",
			Self::Verify => "verify",
			Self::Done => "done",
		}
	}

	pub fn next(self) -> Option<Self> {
		let index = Self::ORDER.iter().position(|stage| *stage == self)?;

		Self::ORDER.get(index + 1).copied()
	}
}
impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
