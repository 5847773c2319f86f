use serde_json::json;

use scout_storage::{
	Error,
	db::Db,
	models::{
		AnalysisType, NewActivity, NewAnalysisResult, NewTopic, NewTopicUrl, ScrapedPage,
		TopicStatus, UrlStatus,
	},
	queries,
};
use scout_testkit::TestDatabase;

async fn bootstrap(test_db: &TestDatabase) -> Db {
	let db = Db::connect(&test_db.postgres_config()).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn analysis(session_id: &str, analysis_id: &str, overall: Option<f32>) -> NewAnalysisResult {
	NewAnalysisResult {
		session_id: session_id.to_string(),
		analysis_id: analysis_id.to_string(),
		analysis_type: AnalysisType::Quick,
		user_id: "user-a".to_string(),
		overall_score: overall,
		confidence_score: Some(0.5),
		results: json!({ "themes": ["latency", "cost"] }),
		processing_metadata: json!({ "duration_ms": 812 }),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SCOUT_PG_DSN to run."]
async fn duplicate_topic_url_is_a_no_op() {
	let Some(base_dsn) = scout_testkit::env_dsn() else {
		eprintln!("Skipping duplicate_topic_url_is_a_no_op; set SCOUT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	queries::insert_topic(&db, &NewTopic::new("s-dup", "Edge caching", "user-a"))
		.await
		.expect("Failed to insert topic.");

	let url = NewTopicUrl::new("s-dup", "https://example.org/caching", "search");

	assert!(queries::insert_topic_url(&db, &url).await.expect("First insert failed."));
	assert!(!queries::insert_topic_url(&db, &url).await.expect("Second insert must not error."));

	let urls = queries::list_topic_urls(&db, "s-dup", None).await.expect("Failed to list URLs.");

	assert_eq!(urls.len(), 1);
	assert_eq!(urls[0].status().expect("status"), UrlStatus::Pending);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SCOUT_PG_DSN to run."]
async fn out_of_range_scores_are_rejected() {
	let Some(base_dsn) = scout_testkit::env_dsn() else {
		eprintln!("Skipping out_of_range_scores_are_rejected; set SCOUT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	queries::insert_topic(&db, &NewTopic::new("s-score", "Battery chemistry", "user-a"))
		.await
		.expect("Failed to insert topic.");

	let err = queries::insert_analysis_result(&db, &analysis("s-score", "a-1", Some(1.5)))
		.await
		.expect_err("Expected overall_score check violation.");

	assert!(matches!(err, Error::InvalidArgument(_)), "Unexpected error: {err:?}");

	let mut low_confidence = analysis("s-score", "a-2", Some(0.2));

	low_confidence.confidence_score = Some(-0.1);

	let err = queries::insert_analysis_result(&db, &low_confidence)
		.await
		.expect_err("Expected confidence_score check violation.");

	assert!(matches!(err, Error::InvalidArgument(_)), "Unexpected error: {err:?}");

	let mut bad_url = NewTopicUrl::new("s-score", "https://example.org/q", "search");

	bad_url.quality_score = Some(2.0);

	let err = queries::insert_topic_url(&db, &bad_url)
		.await
		.expect_err("Expected quality_score check violation.");

	assert!(matches!(err, Error::InvalidArgument(_)), "Unexpected error: {err:?}");

	let stored = queries::insert_analysis_result(&db, &analysis("s-score", "a-3", None))
		.await
		.expect("Missing scores are allowed.");

	assert_eq!(stored.overall_score, None);
	assert_eq!(stored.confidence_score, Some(0.5));

	let edge = queries::insert_analysis_result(&db, &analysis("s-score", "a-4", Some(1.0)))
		.await
		.expect("Boundary scores are allowed.");

	assert_eq!(edge.overall_score, Some(1.0));

	let err = queries::insert_analysis_result(&db, &analysis("s-score", "a-4", Some(0.3)))
		.await
		.expect_err("Expected duplicate analysis conflict.");

	assert!(matches!(err, Error::Conflict(_)), "Unexpected error: {err:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SCOUT_PG_DSN to run."]
async fn unknown_topic_status_is_rejected() {
	let Some(base_dsn) = scout_testkit::env_dsn() else {
		eprintln!("Skipping unknown_topic_status_is_rejected; set SCOUT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let result = sqlx::query(
		"INSERT INTO topics (session_id, topic_name, user_id, status) VALUES ($1, $2, $3, $4)",
	)
	.bind("s-status")
	.bind("Solar output")
	.bind("user-a")
	.bind("ARCHIVED")
	.execute(&db.pool)
	.await;

	assert!(result.is_err(), "Unknown status must be rejected: {result:?}");

	let result = sqlx::query(
		"INSERT INTO topics (session_id, topic_name, user_id, analysis_type) VALUES ($1, $2, $3, $4)",
	)
	.bind("s-type")
	.bind("Solar output")
	.bind("user-a")
	.bind("exhaustive")
	.execute(&db.pool)
	.await;

	assert!(result.is_err(), "Unknown analysis type must be rejected: {result:?}");

	let mut topic = NewTopic::new("s-status", "Solar output", "user-a");

	topic.status = TopicStatus::Processing;

	let stored = queries::insert_topic(&db, &topic).await.expect("Failed to insert topic.");

	assert_eq!(stored.status().expect("status"), TopicStatus::Processing);

	queries::update_topic_status(&db, "s-status", TopicStatus::Completed)
		.await
		.expect("Failed to update status.");

	let reloaded = queries::get_topic(&db, "s-status")
		.await
		.expect("Failed to reload topic.")
		.expect("Topic must exist.");

	assert_eq!(reloaded.status().expect("status"), TopicStatus::Completed);
	assert!(reloaded.updated_at >= stored.updated_at);

	let err = queries::update_topic_status(&db, "s-missing", TopicStatus::Failed)
		.await
		.expect_err("Expected missing topic.");

	assert!(matches!(err, Error::NotFound(_)));

	let err = queries::insert_topic(&db, &NewTopic::new("s-status", "Another", "user-b"))
		.await
		.expect_err("Expected duplicate session conflict.");

	assert!(matches!(err, Error::Conflict(_)));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SCOUT_PG_DSN to run."]
async fn deleting_topic_cascades_to_dependents() {
	let Some(base_dsn) = scout_testkit::env_dsn() else {
		eprintln!("Skipping deleting_topic_cascades_to_dependents; set SCOUT_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	queries::insert_topic(&db, &NewTopic::new("s-cascade", "Grid storage", "user-a"))
		.await
		.expect("Failed to insert topic.");

	for url in ["https://example.org/a", "https://example.org/b"] {
		queries::insert_topic_url(&db, &NewTopicUrl::new("s-cascade", url, "seed"))
			.await
			.expect("Failed to insert URL.");
	}

	queries::insert_analysis_result(&db, &analysis("s-cascade", "a-1", Some(0.8)))
		.await
		.expect("Failed to insert analysis.");
	queries::record_activity(
		&db,
		&NewActivity {
			user_id: "user-a".to_string(),
			activity_type: "topic_created".to_string(),
			activity_data: json!({}),
			session_id: Some("s-cascade".to_string()),
		},
	)
	.await
	.expect("Failed to record activity.");

	assert!(queries::delete_topic(&db, "s-cascade").await.expect("Failed to delete topic."));
	assert!(!queries::delete_topic(&db, "s-cascade").await.expect("Second delete must not error."));

	assert!(queries::list_topic_urls(&db, "s-cascade", None).await.expect("urls").is_empty());
	assert!(queries::list_analysis_results(&db, "s-cascade").await.expect("results").is_empty());

	// Activity has no foreign key and survives the topic.
	let activity = queries::list_recent_activity(&db, "user-a", 10).await.expect("activity");

	assert_eq!(activity.len(), 1);
	assert_eq!(activity[0].session_id.as_deref(), Some("s-cascade"));

	// The seed topic is untouched.
	assert_eq!(queries::count_rows(&db, "topics").await.expect("count"), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SCOUT_PG_DSN to run."]
async fn url_lifecycle_and_topic_lookup() {
	let Some(base_dsn) = scout_testkit::env_dsn() else {
		eprintln!("Skipping url_lifecycle_and_topic_lookup; set SCOUT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let mut topic = NewTopic::new("s-life", "Quantum networking", "user-b");

	topic.search_queries = vec!["quantum repeaters".to_string()];
	topic.seed_urls = vec!["https://example.org/qn".to_string()];

	let stored = queries::insert_topic(&db, &topic).await.expect("Failed to insert topic.");

	assert_eq!(stored.search_queries, topic.search_queries);
	assert_eq!(stored.analysis_type().expect("type"), AnalysisType::Comprehensive);

	let err = queries::insert_topic_url(&db, &NewTopicUrl::new("s-unknown", "https://x.test", "seed"))
		.await
		.expect_err("Expected unknown session error.");

	assert!(matches!(err, Error::NotFound(_)), "Unexpected error: {err:?}");

	for url in ["https://example.org/qn", "https://example.org/broken"] {
		queries::insert_topic_url(&db, &NewTopicUrl::new("s-life", url, "seed"))
			.await
			.expect("Failed to insert URL.");
	}

	queries::mark_url_scraped(
		&db,
		"s-life",
		"https://example.org/qn",
		&ScrapedPage {
			title: Some("Quantum networks".to_string()),
			content_preview: Some("Entanglement distribution ...".to_string()),
			word_count: 1_240,
			quality_score: Some(0.9),
		},
	)
	.await
	.expect("Failed to mark URL scraped.");
	queries::mark_url_failed(&db, "s-life", "https://example.org/broken")
		.await
		.expect("Failed to mark URL failed.");

	let scraped = queries::list_topic_urls(&db, "s-life", Some(UrlStatus::Scraped))
		.await
		.expect("Failed to list scraped URLs.");

	assert_eq!(scraped.len(), 1);
	assert_eq!(scraped[0].word_count, 1_240);
	assert!(scraped[0].scraped_at.is_some());

	let failed = queries::list_topic_urls(&db, "s-life", Some(UrlStatus::Failed))
		.await
		.expect("Failed to list failed URLs.");

	assert_eq!(failed.len(), 1);
	assert!(failed[0].scraped_at.is_none(), "A failed URL was never scraped.");

	let err = queries::mark_url_failed(&db, "s-life", "https://example.org/none")
		.await
		.expect_err("Expected missing URL.");

	assert!(matches!(err, Error::NotFound(_)));

	let topics = queries::list_topics_for_user(&db, "user-b", 10).await.expect("list");

	assert_eq!(topics.len(), 1);

	let found = queries::search_topics(&db, "quantum network", 5).await.expect("search");

	assert_eq!(found.first().map(|topic| topic.session_id.as_str()), Some("s-life"));
	assert!(queries::search_topics(&db, "   ", 5).await.is_err());

	for wildcard in ["%", "_", "%_%"] {
		let found = queries::search_topics(&db, wildcard, 5).await.expect("search");

		assert!(found.is_empty(), "{wildcard:?} matched as a pattern: {found:?}");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SCOUT_PG_DSN to run."]
async fn invalid_topic_url_rows_are_rejected() {
	let Some(base_dsn) = scout_testkit::env_dsn() else {
		eprintln!("Skipping invalid_topic_url_rows_are_rejected; set SCOUT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	queries::insert_topic(&db, &NewTopic::new("s-urls", "Grid storage", "user-a"))
		.await
		.expect("Failed to insert topic.");

	let result = sqlx::query(
		"INSERT INTO topic_urls (session_id, url, word_count) VALUES ($1, $2, $3)",
	)
	.bind("s-urls")
	.bind("https://example.org/negative")
	.bind(-1_i32)
	.execute(&db.pool)
	.await;

	assert!(result.is_err(), "Negative word count must be rejected: {result:?}");

	let result = sqlx::query("INSERT INTO topic_urls (session_id, url, status) VALUES ($1, $2, $3)")
		.bind("s-urls")
		.bind("https://example.org/queued")
		.bind("queued")
		.execute(&db.pool)
		.await;

	assert!(result.is_err(), "Unknown URL status must be rejected: {result:?}");

	let mut url = NewTopicUrl::new("s-urls", "https://example.org/typed", "manual");

	url.word_count = -5;

	let err = queries::insert_topic_url(&db, &url).await.expect_err("Expected constraint error.");

	assert!(matches!(err, Error::InvalidArgument(_)), "Unexpected error: {err:?}");

	let stored = queries::list_topic_urls(&db, "s-urls", None).await.expect("list");

	assert!(stored.is_empty(), "Rejected rows must not be stored: {stored:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
