use crate::{
	Error, Result,
	db::Db,
	models::{
		AnalysisResult, NewActivity, NewAnalysisResult, NewTopic, NewTopicUrl, ScrapedPage, Topic,
		TopicStatus, TopicUrl, UrlStatus, UserActivity,
	},
};

pub async fn insert_topic(db: &Db, topic: &NewTopic) -> Result<Topic> {
	sqlx::query_as::<_, Topic>(
		"\
INSERT INTO topics (
	session_id,
	topic_name,
	description,
	user_id,
	status,
	analysis_type,
	metadata,
	search_queries,
	seed_urls
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
RETURNING *",
	)
	.bind(topic.session_id.as_str())
	.bind(topic.topic_name.as_str())
	.bind(topic.description.as_deref())
	.bind(topic.user_id.as_str())
	.bind(topic.status.as_str())
	.bind(topic.analysis_type.as_str())
	.bind(&topic.metadata)
	.bind(&topic.search_queries)
	.bind(&topic.seed_urls)
	.fetch_one(&db.pool)
	.await
	.map_err(|err| Error::from_write(err, &format!("Topic {:?}", topic.session_id)))
}

pub async fn get_topic(db: &Db, session_id: &str) -> Result<Option<Topic>> {
	let topic = sqlx::query_as::<_, Topic>("SELECT * FROM topics WHERE session_id = $1")
		.bind(session_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(topic)
}

pub async fn list_topics_for_user(db: &Db, user_id: &str, limit: i64) -> Result<Vec<Topic>> {
	let topics = sqlx::query_as::<_, Topic>(
		"\
SELECT *
FROM topics
WHERE user_id = $1
ORDER BY created_at DESC, id
LIMIT $2",
	)
	.bind(user_id)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(topics)
}

/// Fuzzy topic-name lookup backed by the trigram index.
pub async fn search_topics(db: &Db, query: &str, limit: i64) -> Result<Vec<Topic>> {
	let query = query.trim();

	if query.is_empty() {
		return Err(Error::InvalidArgument("Search query must be non-empty.".to_string()));
	}

	let topics = sqlx::query_as::<_, Topic>(
		"\
SELECT *
FROM topics
WHERE topic_name % $1 OR topic_name ILIKE '%' || $3 || '%' ESCAPE '\\'
ORDER BY similarity(topic_name, $1) DESC, created_at DESC
LIMIT $2",
	)
	.bind(query)
	.bind(limit)
	.bind(escape_like(query))
	.fetch_all(&db.pool)
	.await?;

	Ok(topics)
}

/// Makes `%`, `_`, and `\` match literally inside an `ILIKE ... ESCAPE '\'` pattern.
fn escape_like(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());

	for ch in value.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			escaped.push('\\');
		}

		escaped.push(ch);
	}

	escaped
}

pub async fn update_topic_status(db: &Db, session_id: &str, status: TopicStatus) -> Result<()> {
	let result = sqlx::query(
		"\
UPDATE topics
SET status = $1, updated_at = now()
WHERE session_id = $2",
	)
	.bind(status.as_str())
	.bind(session_id)
	.execute(&db.pool)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("Topic {session_id:?}.")));
	}

	Ok(())
}

/// Deletes a topic and, through the cascading foreign keys, its URLs and analysis results.
///
/// Returns whether a topic was removed.
pub async fn delete_topic(db: &Db, session_id: &str) -> Result<bool> {
	let result = sqlx::query("DELETE FROM topics WHERE session_id = $1")
		.bind(session_id)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected() > 0)
}

/// Returns `false` when the `(session_id, url)` pair is already stored.
pub async fn insert_topic_url(db: &Db, url: &NewTopicUrl) -> Result<bool> {
	let result = sqlx::query(
		"\
INSERT INTO topic_urls (
	session_id,
	url,
	source,
	status,
	quality_score,
	title,
	content_preview,
	word_count
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT (session_id, url) DO NOTHING",
	)
	.bind(url.session_id.as_str())
	.bind(url.url.as_str())
	.bind(url.source.as_str())
	.bind(url.status.as_str())
	.bind(url.quality_score)
	.bind(url.title.as_deref())
	.bind(url.content_preview.as_deref())
	.bind(url.word_count)
	.execute(&db.pool)
	.await
	.map_err(|err| Error::from_write(err, &format!("URL {:?}", url.url)))?;

	Ok(result.rows_affected() == 1)
}

pub async fn list_topic_urls(
	db: &Db,
	session_id: &str,
	status: Option<UrlStatus>,
) -> Result<Vec<TopicUrl>> {
	let urls = sqlx::query_as::<_, TopicUrl>(
		"\
SELECT *
FROM topic_urls
WHERE session_id = $1 AND ($2::varchar IS NULL OR status = $2)
ORDER BY created_at, url",
	)
	.bind(session_id)
	.bind(status.map(UrlStatus::as_str))
	.fetch_all(&db.pool)
	.await?;

	Ok(urls)
}

pub async fn mark_url_scraped(
	db: &Db,
	session_id: &str,
	url: &str,
	page: &ScrapedPage,
) -> Result<()> {
	let result = sqlx::query(
		"\
UPDATE topic_urls
SET
	status = $1,
	scraped_at = now(),
	title = $2,
	content_preview = $3,
	word_count = $4,
	quality_score = $5
WHERE session_id = $6 AND url = $7",
	)
	.bind(UrlStatus::Scraped.as_str())
	.bind(page.title.as_deref())
	.bind(page.content_preview.as_deref())
	.bind(page.word_count)
	.bind(page.quality_score)
	.bind(session_id)
	.bind(url)
	.execute(&db.pool)
	.await
	.map_err(|err| Error::from_write(err, &format!("URL {url:?}")))?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("URL {url:?} in session {session_id:?}.")));
	}

	Ok(())
}

pub async fn mark_url_failed(db: &Db, session_id: &str, url: &str) -> Result<()> {
	let result = sqlx::query(
		"\
UPDATE topic_urls
SET status = $1
WHERE session_id = $2 AND url = $3",
	)
	.bind(UrlStatus::Failed.as_str())
	.bind(session_id)
	.bind(url)
	.execute(&db.pool)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("URL {url:?} in session {session_id:?}.")));
	}

	Ok(())
}

/// Scores outside `[0, 1]` are rejected by the table constraints and surface as
/// [`Error::InvalidArgument`]. A repeated `(session_id, analysis_id)` is [`Error::Conflict`].
pub async fn insert_analysis_result(
	db: &Db,
	result: &NewAnalysisResult,
) -> Result<AnalysisResult> {
	sqlx::query_as::<_, AnalysisResult>(
		"\
INSERT INTO analysis_results (
	session_id,
	analysis_id,
	analysis_type,
	user_id,
	overall_score,
	confidence_score,
	results,
	processing_metadata
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
RETURNING *",
	)
	.bind(result.session_id.as_str())
	.bind(result.analysis_id.as_str())
	.bind(result.analysis_type.as_str())
	.bind(result.user_id.as_str())
	.bind(result.overall_score)
	.bind(result.confidence_score)
	.bind(&result.results)
	.bind(&result.processing_metadata)
	.fetch_one(&db.pool)
	.await
	.map_err(|err| Error::from_write(err, &format!("Analysis {:?}", result.analysis_id)))
}

pub async fn list_analysis_results(db: &Db, session_id: &str) -> Result<Vec<AnalysisResult>> {
	let results = sqlx::query_as::<_, AnalysisResult>(
		"\
SELECT *
FROM analysis_results
WHERE session_id = $1
ORDER BY created_at DESC, analysis_id",
	)
	.bind(session_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(results)
}

pub async fn record_activity(db: &Db, activity: &NewActivity) -> Result<UserActivity> {
	sqlx::query_as::<_, UserActivity>(
		"\
INSERT INTO user_activity (user_id, activity_type, activity_data, session_id)
VALUES ($1, $2, $3, $4)
RETURNING *",
	)
	.bind(activity.user_id.as_str())
	.bind(activity.activity_type.as_str())
	.bind(&activity.activity_data)
	.bind(activity.session_id.as_deref())
	.fetch_one(&db.pool)
	.await
	.map_err(|err| Error::from_write(err, "Activity"))
}

pub async fn list_recent_activity(
	db: &Db,
	user_id: &str,
	limit: i64,
) -> Result<Vec<UserActivity>> {
	let activity = sqlx::query_as::<_, UserActivity>(
		"\
SELECT *
FROM user_activity
WHERE user_id = $1
ORDER BY created_at DESC, id
LIMIT $2",
	)
	.bind(user_id)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(activity)
}

/// Row count of one of [`crate::schema::TABLES`].
pub async fn count_rows(db: &Db, table: &str) -> Result<i64> {
	if !crate::schema::TABLES.contains(&table) {
		return Err(Error::InvalidArgument(format!("Unknown table {table:?}.")));
	}

	let sql = format!("SELECT count(*) FROM {table}");
	let count: i64 = sqlx::query_scalar(&sql).fetch_one(&db.pool).await?;

	Ok(count)
}
