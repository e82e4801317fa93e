pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_organizations.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_organizations.sql")),
				"tables/002_profiles.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_profiles.sql")),
				"tables/003_contacts.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_contacts.sql")),
				"tables/004_candidates.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_candidates.sql")),
				"tables/005_events.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_events.sql")),
				"tables/006_tasks.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_tasks.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use crate::schema;

	#[test]
	fn includes_are_expanded_in_dependency_order() {
		let sql = schema::render_schema();

		assert!(!sql.contains("\\ir "));

		let organizations = sql.find("CREATE TABLE IF NOT EXISTS organizations").expect("organizations");
		let contacts = sql.find("CREATE TABLE IF NOT EXISTS contacts").expect("contacts");
		let tasks = sql.find("CREATE TABLE IF NOT EXISTS tasks").expect("tasks");

		assert!(organizations < contacts);
		assert!(contacts < tasks);
	}
}
