use crate::api_error::ApiError;
use crate::db;
use crate::schema::{benchmark, submission, user};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRef;

#[derive(Serialize, Deserialize, Queryable, Insertable)]
#[table_name = "benchmark"]
pub struct Benchmark {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub requirement_doc: Option<String>,
    pub prototype_url: Option<String>,
    pub user_stories: Option<String>,
    pub is_active: bool,
    pub created_by_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Deserialize)]
pub struct BenchmarkInput {
    pub title: String,
    pub description: Option<String>,
    pub requirement_doc: Option<String>,
    pub prototype_url: Option<String>,
    pub user_stories: Option<String>,
    pub is_active: Option<bool>,
}

pub struct BenchmarkMessage {
    pub title: String,
    pub description: Option<String>,
    pub requirement_doc: Option<String>,
    pub prototype_url: Option<String>,
    pub user_stories: Option<String>,
    pub is_active: bool,
    pub created_by_id: Uuid,
}

/// Benchmark ids are URL-safe slugs derived from the title at creation.
/// The slug never changes afterwards, even if the title is edited.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Blank or whitespace-only optionals are stored as NULL.
fn normalize(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let value = value.trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

/// Minimal benchmark reference embedded in submission views.
#[derive(Serialize, Queryable)]
pub struct BenchmarkRef {
    pub id: String,
    pub title: String,
}

/// Benchmark context for the submission detail view.
#[derive(Serialize, Queryable)]
pub struct BenchmarkContext {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct BenchmarkListing {
    pub benchmark: Benchmark,
    pub created_by: UserRef,
    pub submission_count: i64,
}

#[derive(Serialize, Queryable)]
pub struct SubmissionSummary {
    pub id: Uuid,
    pub status: String,
    pub repo_url: String,
    pub created_at: NaiveDateTime,
    pub author_name: Option<String>,
    pub base_model: String,
    pub coding_tool: String,
    pub like_count: i32,
}

#[derive(Serialize)]
pub struct BenchmarkDetail {
    pub benchmark: Benchmark,
    pub created_by: UserRef,
    pub submissions: Vec<SubmissionSummary>,
    pub submission_count: i64,
}

impl Benchmark {
    /// Public listing: active benchmarks only.
    pub fn find_active() -> Result<Vec<BenchmarkListing>, ApiError> {
        let conn = db::connection()?;

        let rows = benchmark::table
            .inner_join(user::table)
            .filter(benchmark::is_active.eq(true))
            .order(benchmark::created_at.desc())
            .select((benchmark::all_columns, (user::name, user::image)))
            .load::<(Benchmark, UserRef)>(&conn)?;

        Benchmark::with_counts(&conn, rows)
    }

    /// Admin listing: active and archived alike.
    pub fn find_all() -> Result<Vec<BenchmarkListing>, ApiError> {
        let conn = db::connection()?;

        let rows = benchmark::table
            .inner_join(user::table)
            .order(benchmark::created_at.desc())
            .select((benchmark::all_columns, (user::name, user::image)))
            .load::<(Benchmark, UserRef)>(&conn)?;

        Benchmark::with_counts(&conn, rows)
    }

    fn with_counts(
        conn: &db::DbConnection,
        rows: Vec<(Benchmark, UserRef)>,
    ) -> Result<Vec<BenchmarkListing>, ApiError> {
        let mut listings = Vec::with_capacity(rows.len());

        for (benchmark, created_by) in rows {
            let submission_count = submission::table
                .filter(submission::benchmark_id.eq(&benchmark.id))
                .count()
                .get_result::<i64>(conn)?;

            listings.push(BenchmarkListing {
                benchmark,
                created_by,
                submission_count,
            });
        }

        Ok(listings)
    }

    pub fn find(id: &str) -> Result<Self, ApiError> {
        let conn = db::connection()?;

        let benchmark = benchmark::table.filter(benchmark::id.eq(id)).first(&conn)?;

        Ok(benchmark)
    }

    pub fn find_detail(id: &str) -> Result<BenchmarkDetail, ApiError> {
        let conn = db::connection()?;

        let (benchmark, created_by) = benchmark::table
            .inner_join(user::table)
            .filter(benchmark::id.eq(id))
            .select((benchmark::all_columns, (user::name, user::image)))
            .first::<(Benchmark, UserRef)>(&conn)?;

        let submissions = submission::table
            .filter(submission::benchmark_id.eq(id))
            .order(submission::created_at.desc())
            .select((
                submission::id,
                submission::status,
                submission::repo_url,
                submission::created_at,
                submission::author_name,
                submission::base_model,
                submission::coding_tool,
                submission::like_count,
            ))
            .load::<SubmissionSummary>(&conn)?;

        let submission_count = submissions.len() as i64;

        Ok(BenchmarkDetail {
            benchmark,
            created_by,
            submissions,
            submission_count,
        })
    }

    pub fn create(input: BenchmarkInput, user_id: Uuid) -> Result<Self, ApiError> {
        let conn = db::connection()?;

        let benchmark = BenchmarkMessage {
            title: input.title,
            description: normalize(input.description),
            requirement_doc: normalize(input.requirement_doc),
            prototype_url: normalize(input.prototype_url),
            user_stories: normalize(input.user_stories),
            is_active: true,
            created_by_id: user_id,
        };

        let benchmark = Benchmark::from(benchmark);

        let benchmark = diesel::insert_into(benchmark::table)
            .values(benchmark)
            .get_result(&conn)?;

        Ok(benchmark)
    }

    pub fn update(id: &str, input: BenchmarkInput) -> Result<Self, ApiError> {
        let conn = db::connection()?;

        let benchmark = diesel::update(benchmark::table.filter(benchmark::id.eq(id)))
            .set((
                benchmark::title.eq(input.title),
                benchmark::description.eq(normalize(input.description)),
                benchmark::requirement_doc.eq(normalize(input.requirement_doc)),
                benchmark::prototype_url.eq(normalize(input.prototype_url)),
                benchmark::user_stories.eq(normalize(input.user_stories)),
                benchmark::is_active.eq(input.is_active.unwrap_or(false)),
                benchmark::updated_at.eq(Some(Utc::now().naive_utc())),
            ))
            .get_result(&conn)?;

        Ok(benchmark)
    }

    /// Deletion is blocked while submissions reference the benchmark, so
    /// leaderboard history cannot be cascaded away by an admin click.
    pub fn delete(id: &str) -> Result<usize, ApiError> {
        let conn = db::connection()?;

        conn.transaction::<_, ApiError, _>(|| {
            let submission_count: i64 = submission::table
                .filter(submission::benchmark_id.eq(id))
                .count()
                .get_result(&conn)?;

            if submission_count > 0 {
                return Err(ApiError::new(
                    409,
                    "Benchmark has existing submissions".to_string(),
                ));
            }

            let res =
                diesel::delete(benchmark::table.filter(benchmark::id.eq(id))).execute(&conn)?;

            Ok(res)
        })
    }
}

impl From<BenchmarkMessage> for Benchmark {
    fn from(benchmark: BenchmarkMessage) -> Self {
        Benchmark {
            id: slugify(&benchmark.title),
            title: benchmark.title,
            description: benchmark.description,
            requirement_doc: benchmark.requirement_doc,
            prototype_url: benchmark.prototype_url,
            user_stories: benchmark.user_stories,
            is_active: benchmark.is_active,
            created_by_id: benchmark.created_by_id,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(
            slugify("Python Data Analysis Agent"),
            "python-data-analysis-agent"
        );
    }

    #[test]
    fn slug_collapses_whitespace_runs() {
        assert_eq!(slugify("  Legacy   PHP\tMigration "), "legacy-php-migration");
    }

    #[test]
    fn normalize_drops_blank_values() {
        assert_eq!(normalize(Some("".to_string())), None);
        assert_eq!(normalize(Some("   ".to_string())), None);
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn normalize_trims_kept_values() {
        assert_eq!(
            normalize(Some("  requirement doc  ".to_string())),
            Some("requirement doc".to_string())
        );
    }

    #[test]
    fn message_becomes_row_with_slug_id() {
        let message = BenchmarkMessage {
            title: "React Dashboard Component".to_string(),
            description: Some("Generate a dashboard".to_string()),
            requirement_doc: None,
            prototype_url: None,
            user_stories: None,
            is_active: true,
            created_by_id: Uuid::new_v4(),
        };

        let benchmark = Benchmark::from(message);

        assert_eq!(benchmark.id, "react-dashboard-component");
        assert!(benchmark.is_active);
        assert!(benchmark.updated_at.is_none());
    }
}
