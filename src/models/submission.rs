use crate::api_error::ApiError;
use crate::db;
use crate::schema::{benchmark, submission, user};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;
use uuid::Uuid;

use super::benchmark::{BenchmarkContext, BenchmarkRef};
use super::user::{AuthUser, UserRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Approved => "APPROVED",
            SubmissionStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Serialize, Deserialize, Queryable, Insertable)]
#[table_name = "submission"]
pub struct Submission {
    pub id: Uuid,
    pub benchmark_id: String,
    pub user_id: Uuid,
    pub status: String,
    pub repo_url: String,
    pub base_model: String,
    pub coding_tool: String,
    pub plugins: Vec<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub chat_log_url: Option<String>,
    pub chat_log_text: Option<String>,
    pub chat_log_files: Vec<String>,
    pub like_count: i32,
    pub created_at: NaiveDateTime,
}

/// Raw intake form. Everything arrives as strings; `validate` reports
/// per-field problems and the handler echoes the whole struct back so the
/// form can re-render what was typed.
#[derive(Serialize, Deserialize)]
pub struct SubmissionInput {
    pub benchmark_id: String,
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub base_model: String,
    #[serde(default)]
    pub coding_tool: String,
    #[serde(default)]
    pub plugins: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub chat_log_url: String,
    #[serde(default)]
    pub chat_log_text: String,
    #[serde(default)]
    pub chat_log_files: Vec<String>,
}

/// Validated intake, ready to persist.
pub struct SubmissionMessage {
    pub benchmark_id: String,
    pub user_id: Uuid,
    pub repo_url: String,
    pub base_model: String,
    pub coding_tool: String,
    pub plugins: Vec<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub chat_log_url: Option<String>,
    pub chat_log_text: Option<String>,
    pub chat_log_files: Vec<String>,
}

pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

fn none_if_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl SubmissionInput {
    /// The comma list "pandas, matplotlib, " becomes ["pandas", "matplotlib"]:
    /// entries are trimmed, empties dropped, order preserved.
    pub fn parse_plugins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|plugin| !plugin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Author fields left blank fall back to the session identity, matching
    /// what the form preview shows the signed-in user.
    pub fn with_session_defaults(mut self, identity: &AuthUser) -> Self {
        if self.author_name.trim().is_empty() {
            self.author_name = identity
                .name
                .clone()
                .unwrap_or_else(|| "Anonymous".to_string());
        }
        if self.author_email.trim().is_empty() {
            self.author_email = identity.email.clone();
        }
        self
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if Url::parse(&self.repo_url).is_err() {
            errors
                .entry("repo_url")
                .or_default()
                .push("Please enter a valid URL".to_string());
        }

        if self.base_model.trim().is_empty() {
            errors
                .entry("base_model")
                .or_default()
                .push("Base model is required".to_string());
        }

        if self.coding_tool.trim().is_empty() {
            errors
                .entry("coding_tool")
                .or_default()
                .push("Coding tool is required".to_string());
        }

        if self.plugins.trim().is_empty() {
            errors
                .entry("plugins")
                .or_default()
                .push("Plugins are required (enter 'None' if applicable)".to_string());
        }

        if !self.author_email.is_empty() && !is_valid_email(&self.author_email) {
            errors
                .entry("author_email")
                .or_default()
                .push("Invalid email".to_string());
        }

        if !self.chat_log_url.is_empty() && Url::parse(&self.chat_log_url).is_err() {
            errors
                .entry("chat_log_url")
                .or_default()
                .push("Invalid URL".to_string());
        }

        if self
            .chat_log_files
            .iter()
            .any(|file| Url::parse(file).is_err())
        {
            errors
                .entry("chat_log_files")
                .or_default()
                .push("Invalid URL".to_string());
        }

        // Evidence of work: a claim of a finished run needs at least one
        // artifact. Reported on the URL field by convention.
        let has_evidence = !self.chat_log_url.is_empty()
            || !self.chat_log_text.is_empty()
            || !self.chat_log_files.is_empty();
        if !has_evidence {
            errors
                .entry("chat_log_url")
                .or_default()
                .push("At least one chat log (URL, Text, or File) is required".to_string());
        }

        errors
    }

    pub fn into_message(self, user_id: Uuid) -> SubmissionMessage {
        SubmissionMessage {
            benchmark_id: self.benchmark_id,
            user_id,
            repo_url: self.repo_url,
            base_model: self.base_model,
            coding_tool: self.coding_tool,
            plugins: SubmissionInput::parse_plugins(&self.plugins),
            author_name: none_if_empty(self.author_name),
            author_email: none_if_empty(self.author_email),
            chat_log_url: none_if_empty(self.chat_log_url),
            chat_log_text: none_if_empty(self.chat_log_text),
            chat_log_files: self.chat_log_files,
        }
    }
}

/// Approved-list and moderation-queue entry.
#[derive(Serialize)]
pub struct SubmissionListing {
    pub submission: Submission,
    pub benchmark: BenchmarkRef,
    pub user: UserRef,
}

/// Detail view with benchmark context.
#[derive(Serialize)]
pub struct SubmissionView {
    pub submission: Submission,
    pub benchmark: BenchmarkContext,
    pub user: UserRef,
}

/// Dashboard entry: the caller's own submission with its benchmark.
#[derive(Serialize)]
pub struct SubmissionWithBenchmark {
    pub submission: Submission,
    pub benchmark: BenchmarkRef,
}

impl Submission {
    pub fn create(message: SubmissionMessage) -> Result<Self, ApiError> {
        let conn = db::connection()?;

        let submission = Submission::from(message);

        let submission = diesel::insert_into(submission::table)
            .values(submission)
            .get_result(&conn)?;

        Ok(submission)
    }

    /// Moderation write. Unconditional: re-approving an already-approved
    /// submission is a no-op overwrite, not an error.
    pub fn set_status(id: Uuid, status: SubmissionStatus) -> Result<Self, ApiError> {
        let conn = db::connection()?;

        let submission = diesel::update(submission::table.filter(submission::id.eq(id)))
            .set(submission::status.eq(status.as_str()))
            .get_result(&conn)?;

        Ok(submission)
    }

    pub fn find_view(id: Uuid) -> Result<SubmissionView, ApiError> {
        let conn = db::connection()?;

        let (submission, benchmark, user) = submission::table
            .inner_join(benchmark::table)
            .inner_join(user::table)
            .filter(submission::id.eq(id))
            .select((
                submission::all_columns,
                (benchmark::id, benchmark::title, benchmark::description),
                (user::name, user::image),
            ))
            .first::<(Submission, BenchmarkContext, UserRef)>(&conn)?;

        Ok(SubmissionView {
            submission,
            benchmark,
            user,
        })
    }

    /// Public leaderboard feed: approved submissions, newest first.
    pub fn find_approved() -> Result<Vec<SubmissionListing>, ApiError> {
        let conn = db::connection()?;

        let rows = submission::table
            .inner_join(benchmark::table)
            .inner_join(user::table)
            .filter(submission::status.eq(SubmissionStatus::Approved.as_str()))
            .order(submission::created_at.desc())
            .select((
                submission::all_columns,
                (benchmark::id, benchmark::title),
                (user::name, user::image),
            ))
            .load::<(Submission, BenchmarkRef, UserRef)>(&conn)?;

        Ok(rows
            .into_iter()
            .map(|(submission, benchmark, user)| SubmissionListing {
                submission,
                benchmark,
                user,
            })
            .collect())
    }

    /// Moderation queue: pending submissions, oldest first.
    pub fn find_pending() -> Result<Vec<SubmissionListing>, ApiError> {
        let conn = db::connection()?;

        let rows = submission::table
            .inner_join(benchmark::table)
            .inner_join(user::table)
            .filter(submission::status.eq(SubmissionStatus::Pending.as_str()))
            .order(submission::created_at.asc())
            .select((
                submission::all_columns,
                (benchmark::id, benchmark::title),
                (user::name, user::image),
            ))
            .load::<(Submission, BenchmarkRef, UserRef)>(&conn)?;

        Ok(rows
            .into_iter()
            .map(|(submission, benchmark, user)| SubmissionListing {
                submission,
                benchmark,
                user,
            })
            .collect())
    }

    pub fn find_by_user(user_id: Uuid) -> Result<Vec<SubmissionWithBenchmark>, ApiError> {
        let conn = db::connection()?;

        let rows = submission::table
            .inner_join(benchmark::table)
            .filter(submission::user_id.eq(user_id))
            .order(submission::created_at.desc())
            .select((submission::all_columns, (benchmark::id, benchmark::title)))
            .load::<(Submission, BenchmarkRef)>(&conn)?;

        Ok(rows
            .into_iter()
            .map(|(submission, benchmark)| SubmissionWithBenchmark {
                submission,
                benchmark,
            })
            .collect())
    }
}

impl From<SubmissionMessage> for Submission {
    fn from(submission: SubmissionMessage) -> Self {
        Submission {
            id: Uuid::new_v4(),
            benchmark_id: submission.benchmark_id,
            user_id: submission.user_id,
            status: SubmissionStatus::Pending.as_str().to_string(),
            repo_url: submission.repo_url,
            base_model: submission.base_model,
            coding_tool: submission.coding_tool,
            plugins: submission.plugins,
            author_name: submission.author_name,
            author_email: submission.author_email,
            chat_log_url: submission.chat_log_url,
            chat_log_text: submission.chat_log_text,
            chat_log_files: submission.chat_log_files,
            like_count: 0,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> SubmissionInput {
        SubmissionInput {
            benchmark_id: "python-data-analysis-agent".to_string(),
            repo_url: "https://github.com/example/python-agent".to_string(),
            base_model: "claude-3.5-sonnet".to_string(),
            coding_tool: "cursor".to_string(),
            plugins: "None".to_string(),
            author_name: "Dev".to_string(),
            author_email: "dev@example.com".to_string(),
            chat_log_url: String::new(),
            chat_log_text: "full transcript here".to_string(),
            chat_log_files: vec![],
        }
    }

    fn identity() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "session@example.com".to_string(),
            name: Some("Session Name".to_string()),
            role: None,
        }
    }

    #[test]
    fn valid_input_has_no_errors() {
        assert!(valid_input().validate().is_empty());
    }

    #[test]
    fn plugins_are_trimmed_and_empties_dropped() {
        assert_eq!(
            SubmissionInput::parse_plugins("pandas, matplotlib, "),
            vec!["pandas".to_string(), "matplotlib".to_string()]
        );
    }

    #[test]
    fn plugins_preserve_order() {
        assert_eq!(
            SubmissionInput::parse_plugins("zeta,, alpha"),
            vec!["zeta".to_string(), "alpha".to_string()]
        );
    }

    #[test]
    fn missing_evidence_is_reported_on_chat_log_url() {
        let mut input = valid_input();
        input.chat_log_url = String::new();
        input.chat_log_text = String::new();
        input.chat_log_files = vec![];

        let errors = input.validate();

        assert_eq!(
            errors.get("chat_log_url").map(Vec::as_slice),
            Some(&["At least one chat log (URL, Text, or File) is required".to_string()][..])
        );
    }

    #[test]
    fn missing_evidence_fails_even_when_everything_else_is_valid() {
        let mut input = valid_input();
        input.chat_log_text = String::new();

        let errors = input.validate();

        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("chat_log_url"));
    }

    #[test]
    fn malformed_repo_url_is_rejected() {
        let mut input = valid_input();
        input.repo_url = "not a url".to_string();

        let errors = input.validate();

        assert!(errors.contains_key("repo_url"));
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut input = valid_input();
        input.base_model = "  ".to_string();
        input.coding_tool = String::new();
        input.plugins = String::new();

        let errors = input.validate();

        assert!(errors.contains_key("base_model"));
        assert!(errors.contains_key("coding_tool"));
        assert!(errors.contains_key("plugins"));
    }

    #[test]
    fn malformed_author_email_is_rejected_only_when_present() {
        let mut input = valid_input();
        input.author_email = "not-an-email".to_string();
        assert!(input.validate().contains_key("author_email"));

        input.author_email = String::new();
        assert!(!input.validate().contains_key("author_email"));
    }

    #[test]
    fn malformed_chat_log_url_is_rejected() {
        let mut input = valid_input();
        input.chat_log_url = "github.com/no-scheme".to_string();

        assert!(input.validate().contains_key("chat_log_url"));
    }

    #[test]
    fn malformed_chat_log_file_url_is_rejected() {
        let mut input = valid_input();
        input.chat_log_files = vec!["https://blob.example.com/a.txt".to_string(), "nope".to_string()];

        assert!(input.validate().contains_key("chat_log_files"));
    }

    #[test]
    fn session_defaults_fill_blank_author_fields() {
        let mut input = valid_input();
        input.author_name = String::new();
        input.author_email = "  ".to_string();

        let input = input.with_session_defaults(&identity());

        assert_eq!(input.author_name, "Session Name");
        assert_eq!(input.author_email, "session@example.com");
    }

    #[test]
    fn session_defaults_keep_explicit_author_fields() {
        let input = valid_input().with_session_defaults(&identity());

        assert_eq!(input.author_name, "Dev");
        assert_eq!(input.author_email, "dev@example.com");
    }

    #[test]
    fn nameless_session_defaults_to_anonymous() {
        let mut input = valid_input();
        input.author_name = String::new();
        let mut identity = identity();
        identity.name = None;

        let input = input.with_session_defaults(&identity);

        assert_eq!(input.author_name, "Anonymous");
    }

    #[test]
    fn message_becomes_pending_row_with_zero_likes() {
        let user_id = Uuid::new_v4();
        let mut input = valid_input();
        input.plugins = "pandas, matplotlib, ".to_string();
        input.chat_log_url = String::new();

        let submission = Submission::from(input.into_message(user_id));

        assert_eq!(submission.status, "PENDING");
        assert_eq!(submission.like_count, 0);
        assert_eq!(submission.user_id, user_id);
        assert_eq!(submission.plugins, vec!["pandas", "matplotlib"]);
        assert_eq!(submission.chat_log_url, None);
        assert_eq!(submission.chat_log_text, Some("full transcript here".to_string()));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("dev@example.com"));
        assert!(!is_valid_email("dev"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("dev@nodot"));
        assert!(!is_valid_email("dev@.com"));
    }
}
