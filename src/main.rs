//! CodeJudge - Command Line Entry Point
//!
//! Reads a judge request (or an array of them) as JSON from the file given as
//! the first argument, or from stdin, and prints the verdicts as JSON.
//! Requests in an array are judged concurrently. A request that cannot be
//! judged is printed as an `{"error": {"code", "message"}}` record in place
//! of its verdict, for single requests and arrays alike.

use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use code_judge::{
    config::{Config, LogConfig, LogFormat},
    DockerSandbox, Judge, JudgeError, JudgeRequest, JudgeVerdict,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Many(Vec<JudgeRequest>),
    One(JudgeRequest),
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Verdict(JudgeVerdict),
    Error { error: ErrorDetails },
}

#[derive(Serialize)]
struct ErrorDetails {
    code: String,
    message: String,
}

impl From<Result<JudgeVerdict, JudgeError>> for Output {
    fn from(result: Result<JudgeVerdict, JudgeError>) -> Self {
        match result {
            Ok(verdict) => Output::Verdict(verdict),
            Err(e) => {
                if e.is_client_error() {
                    tracing::warn!("Judge request rejected: {}", e);
                } else {
                    tracing::error!("Judge request failed: {}", e);
                }
                Output::Error {
                    error: ErrorDetails {
                        code: e.error_code().to_string(),
                        message: e.to_string(),
                    },
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log);

    let raw = read_input().await?;
    let input: Input = serde_json::from_str(&raw).context("Malformed judge request")?;

    let sandbox = DockerSandbox::connect(&config).await?;
    let judge = Judge::new(Arc::new(sandbox), &config);

    let rendered = match input {
        Input::One(request) => {
            let output = Output::from(judge.judge(request).await);
            serde_json::to_string_pretty(&output)?
        }
        Input::Many(requests) => {
            tracing::info!("Judging {} requests", requests.len());
            let outputs: Vec<Output> =
                futures::future::join_all(requests.into_iter().map(|r| judge.judge(r)))
                    .await
                    .into_iter()
                    .map(Output::from)
                    .collect();
            serde_json::to_string_pretty(&outputs)?
        }
    };

    println!("{}", rendered);
    Ok(())
}

async fn read_input() -> anyhow::Result<String> {
    match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Could not read {}", path)),
        None => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            Ok(raw)
        }
    }
}

/// Logs go to stderr; stdout carries only the verdict
fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log.rust_log.clone().into());

    match log.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_output_shape() {
        let output = Output::from(Err(JudgeError::UnsupportedLanguage("java".into())));
        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["error"]["code"], "UNSUPPORTED_LANGUAGE");
        assert_eq!(json["error"]["message"], "Unsupported language: java");
    }

    #[test]
    fn test_verdict_output_is_unwrapped() {
        let verdict = JudgeVerdict::from_results(Vec::new(), None);
        let json = serde_json::to_value(Output::from(Ok(verdict))).unwrap();

        assert_eq!(json["status"], "accepted");
        assert!(json.get("error").is_none());
    }
}
