//! Sample data for local development, applied with `--seed`.

use crate::api_error::ApiError;
use crate::config;
use crate::models::{
    slugify, AuthUser, Benchmark, BenchmarkInput, Submission, SubmissionMessage, SubmissionStatus,
    User,
};
use uuid::Uuid;

struct SampleBenchmark {
    title: &'static str,
    description: &'static str,
    is_active: bool,
}

struct SampleSubmission {
    base_model: &'static str,
    coding_tool: &'static str,
    repo_url: &'static str,
    author_name: &'static str,
}

const BENCHMARKS: [SampleBenchmark; 5] = [
    SampleBenchmark {
        title: "Python Data Analysis Agent",
        description: "Build a Python agent capable of loading a CSV, cleaning data, and generating matplotlib visualizations based on natural language queries.",
        is_active: true,
    },
    SampleBenchmark {
        title: "React Dashboard Component",
        description: "Generate a responsive dashboard component using Tailwind CSS, including a sidebar, header, and data charts (Recharts). Must be fully typed.",
        is_active: true,
    },
    SampleBenchmark {
        title: "Golang REST API Service",
        description: "Implement a high-performance REST API in Go using Gin or Chi. Requirements: JWT Auth, PostgreSQL integration, and >80% test coverage.",
        is_active: true,
    },
    SampleBenchmark {
        title: "Legacy PHP Migration",
        description: "Refactor a legacy PHP 5.6 script to modern PHP 8.2, maintaining functionality while fixing security vulnerabilities.",
        is_active: false,
    },
    SampleBenchmark {
        title: "Prompt Engineering Challenge",
        description: "Optimize a system prompt to make a local Llama 3 model output valid JSON consistently for complex reasoning tasks.",
        is_active: true,
    },
];

const SUBMISSIONS: [SampleSubmission; 2] = [
    SampleSubmission {
        base_model: "gpt-4-turbo",
        coding_tool: "cursor",
        repo_url: "https://github.com/example/python-agent",
        author_name: "DevOne",
    },
    SampleSubmission {
        base_model: "claude-3.5-sonnet",
        coding_tool: "windsurf",
        repo_url: "https://github.com/example/sonnet-agent",
        author_name: "DevTwo",
    },
];

pub fn run() -> Result<(), ApiError> {
    let config = config::get();

    let admin_email = config
        .admin_emails
        .first()
        .cloned()
        .unwrap_or_else(|| "admin@vibebench.ai".to_string());

    info!("Ensuring system admin: {}", admin_email);

    let identity = AuthUser {
        id: Uuid::new_v4(),
        email: admin_email.clone(),
        name: Some("VibeBench System".to_string()),
        role: None,
    };
    // The system account is an admin even when ADMIN_EMAILS is unset.
    let admin = User::ensure(&identity, &[admin_email])?;

    for sample in &BENCHMARKS {
        let id = slugify(sample.title);
        match Benchmark::find(&id) {
            Ok(_) => {
                info!("Benchmark exists, skipping: {}", sample.title);
                continue;
            }
            Err(err) if err.status_code == 404 => {}
            Err(err) => return Err(err),
        }

        let input = BenchmarkInput {
            title: sample.title.to_string(),
            description: Some(sample.description.to_string()),
            requirement_doc: None,
            prototype_url: None,
            user_stories: None,
            is_active: None,
        };

        // Creation always starts active; the archived sample is flipped below.
        let benchmark = Benchmark::create(input, admin.id)?;
        info!("Benchmark created: {}", benchmark.title);

        if !sample.is_active {
            let archived = BenchmarkInput {
                title: sample.title.to_string(),
                description: Some(sample.description.to_string()),
                requirement_doc: None,
                prototype_url: None,
                user_stories: None,
                is_active: Some(false),
            };
            Benchmark::update(&benchmark.id, archived)?;
        }

        if benchmark.id == "python-data-analysis-agent" {
            for sample in &SUBMISSIONS {
                let submission = Submission::create(SubmissionMessage {
                    benchmark_id: benchmark.id.clone(),
                    user_id: admin.id,
                    repo_url: sample.repo_url.to_string(),
                    base_model: sample.base_model.to_string(),
                    coding_tool: sample.coding_tool.to_string(),
                    plugins: vec![],
                    author_name: Some(sample.author_name.to_string()),
                    author_email: None,
                    chat_log_url: None,
                    chat_log_text: None,
                    chat_log_files: vec![],
                })?;
                Submission::set_status(submission.id, SubmissionStatus::Approved)?;
                info!("Sample submission approved: {}", sample.author_name);
            }
        }
    }

    info!("Seed finished");

    Ok(())
}
