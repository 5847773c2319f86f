use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result};

macro_rules! string_enum {
	($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		pub enum $name {
			$(#[serde(rename = $text)] $variant),+
		}
		impl $name {
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];

			pub fn as_str(self) -> &'static str {
				match self {
					$(Self::$variant => $text),+
				}
			}
		}
		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}
		impl FromStr for $name {
			type Err = Error;

			fn from_str(s: &str) -> Result<Self> {
				match s {
					$($text => Ok(Self::$variant),)+
					other => Err(Error::InvalidArgument(format!(
						"Unknown {} {other:?}.",
						$label
					))),
				}
			}
		}
	};
}

string_enum!(
	/// Lifecycle of a topic analysis session.
	TopicStatus, "topic status" {
		Created => "CREATED",
		Processing => "PROCESSING",
		Completed => "COMPLETED",
		Failed => "FAILED",
	}
);

string_enum!(
	AnalysisType, "analysis type" {
		Comprehensive => "comprehensive",
		Quick => "quick",
		Detailed => "detailed",
	}
);

string_enum!(
	/// Scrape state of a collected URL.
	UrlStatus, "URL status" {
		Pending => "pending",
		Scraped => "scraped",
		Failed => "failed",
	}
);

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Topic {
	pub id: Uuid,
	pub session_id: String,
	pub topic_name: String,
	pub description: Option<String>,
	pub user_id: String,
	pub status: String,
	pub analysis_type: String,
	pub metadata: Value,
	pub search_queries: Vec<String>,
	pub seed_urls: Vec<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl Topic {
	pub fn status(&self) -> Result<TopicStatus> {
		self.status.parse()
	}

	pub fn analysis_type(&self) -> Result<AnalysisType> {
		self.analysis_type.parse()
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopicUrl {
	pub id: Uuid,
	pub session_id: String,
	pub url: String,
	pub source: String,
	pub status: String,
	pub quality_score: Option<f32>,
	pub scraped_at: Option<OffsetDateTime>,
	pub title: Option<String>,
	pub content_preview: Option<String>,
	pub word_count: i32,
	pub created_at: OffsetDateTime,
}
impl TopicUrl {
	pub fn status(&self) -> Result<UrlStatus> {
		self.status.parse()
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisResult {
	pub id: Uuid,
	pub session_id: String,
	pub analysis_id: String,
	pub analysis_type: String,
	pub user_id: String,
	pub overall_score: Option<f32>,
	pub confidence_score: Option<f32>,
	pub results: Value,
	pub processing_metadata: Value,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserActivity {
	pub id: Uuid,
	pub user_id: String,
	pub activity_type: String,
	pub activity_data: Value,
	pub session_id: Option<String>,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTopic {
	pub session_id: String,
	pub topic_name: String,
	pub description: Option<String>,
	pub user_id: String,
	pub status: TopicStatus,
	pub analysis_type: AnalysisType,
	pub metadata: Value,
	pub search_queries: Vec<String>,
	pub seed_urls: Vec<String>,
}
impl NewTopic {
	pub fn new(
		session_id: impl Into<String>,
		topic_name: impl Into<String>,
		user_id: impl Into<String>,
	) -> Self {
		Self {
			session_id: session_id.into(),
			topic_name: topic_name.into(),
			description: None,
			user_id: user_id.into(),
			status: TopicStatus::Created,
			analysis_type: AnalysisType::Comprehensive,
			metadata: Value::Object(Default::default()),
			search_queries: Vec::new(),
			seed_urls: Vec::new(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct NewTopicUrl {
	pub session_id: String,
	pub url: String,
	/// Where the URL came from, e.g. `search`, `seed`, or `manual`.
	pub source: String,
	pub status: UrlStatus,
	pub quality_score: Option<f32>,
	pub title: Option<String>,
	pub content_preview: Option<String>,
	pub word_count: i32,
}
impl NewTopicUrl {
	pub fn new(
		session_id: impl Into<String>,
		url: impl Into<String>,
		source: impl Into<String>,
	) -> Self {
		Self {
			session_id: session_id.into(),
			url: url.into(),
			source: source.into(),
			status: UrlStatus::Pending,
			quality_score: None,
			title: None,
			content_preview: None,
			word_count: 0,
		}
	}
}

/// Extraction output recorded when a URL is scraped successfully.
#[derive(Debug, Clone)]
pub struct ScrapedPage {
	pub title: Option<String>,
	pub content_preview: Option<String>,
	pub word_count: i32,
	pub quality_score: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct NewAnalysisResult {
	pub session_id: String,
	pub analysis_id: String,
	pub analysis_type: AnalysisType,
	pub user_id: String,
	pub overall_score: Option<f32>,
	pub confidence_score: Option<f32>,
	pub results: Value,
	pub processing_metadata: Value,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
	pub user_id: String,
	pub activity_type: String,
	pub activity_data: Value,
	pub session_id: Option<String>,
}
