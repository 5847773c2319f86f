/// Session identifier of the smoke-test topic inserted by the seed script.
pub const SEED_SESSION_ID: &str = "seed-session";

pub const TABLES: [&str; 4] = ["topics", "topic_urls", "analysis_results", "user_activity"];

pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

/// Splits the rendered schema into executable statements.
///
/// The schema files contain no function bodies, so `;` always terminates a statement.
pub fn statements(sql: &str) -> Vec<String> {
	sql.split(';')
		.map(strip_comment_lines)
		.filter(|statement| !statement.is_empty())
		.collect()
}

fn strip_comment_lines(statement: &str) -> String {
	statement
		.lines()
		.filter(|line| !line.trim_start().starts_with("--"))
		.collect::<Vec<_>>()
		.join("\n")
		.trim()
		.to_string()
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_topics.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_topics.sql")),
				"tables/002_topic_urls.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_topic_urls.sql")),
				"tables/003_analysis_results.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_analysis_results.sql")),
				"tables/004_user_activity.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_user_activity.sql")),
				"99_seed.sql" => out.push_str(include_str!("../../../sql/99_seed.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
