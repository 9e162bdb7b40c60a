//! End-to-end judging against a real Docker daemon.
//!
//! Needs the judge image (python3, gcc, g++) to be built locally:
//! `cargo test -- --ignored`

use std::sync::Arc;

use code_judge::{
    models::TestCaseInput, Config, DockerSandbox, Judge, JudgeError, JudgeRequest, Verdict,
};

fn case(input: &str, expected: &str) -> TestCaseInput {
    TestCaseInput {
        input: input.to_string(),
        expected_output: expected.to_string(),
        is_hidden: false,
    }
}

async fn judge(timeout_secs: u64) -> Judge {
    let mut config = Config::default();
    if let Ok(image) = std::env::var("JUDGE_IMAGE") {
        config.docker.image = image;
    }
    config.sandbox.timeout_secs = timeout_secs;
    // Docker Desktop only shares some host paths
    if let Ok(root) = std::env::var("JUDGE_WORK_ROOT") {
        config.judge.work_root = root.into();
    }

    let sandbox = DockerSandbox::connect(&config)
        .await
        .expect("Docker daemon and judge image must be available");
    Judge::new(Arc::new(sandbox), &config)
}

#[tokio::test]
#[ignore = "requires a Docker daemon and the judge image"]
async fn python_submission_is_accepted() {
    let judge = judge(10).await;
    let request = JudgeRequest::new(
        "print(int(input())+1)",
        "python",
        vec![case("1", "2"), case("5", "6")],
    );

    let verdict = judge.judge(request).await.unwrap();

    assert_eq!(verdict.overall_status, Verdict::Accepted);
    assert!(verdict.results.iter().all(|r| r.passed));
}

#[tokio::test]
#[ignore = "requires a Docker daemon and the judge image"]
async fn c_and_cpp_submissions_are_accepted() {
    let judge = judge(10).await;

    let c = JudgeRequest::new(
        "#include <stdio.h>\nint main(){int n;scanf(\"%d\",&n);printf(\"%d\\n\",n*2);}",
        "c",
        vec![case("21", "42")],
    );
    let cpp = JudgeRequest::new(
        "#include <iostream>\nint main(){int n;std::cin>>n;std::cout<<n*2<<std::endl;}",
        "cpp",
        vec![case("4", "8"), case("0", "0")],
    );

    assert!(judge.judge(c).await.unwrap().is_accepted());
    assert!(judge.judge(cpp).await.unwrap().is_accepted());
}

#[tokio::test]
#[ignore = "requires a Docker daemon and the judge image"]
async fn cpp_syntax_error_is_compile_error() {
    let judge = judge(10).await;
    let request = JudgeRequest::new(
        "int main() { return 0 }",
        "cpp",
        vec![case("1", "2"), case("5", "6")],
    );

    let verdict = judge.judge(request).await.unwrap();

    assert_eq!(verdict.overall_status, Verdict::CompileError);
    assert_eq!(verdict.results.len(), 2);
    assert!(!verdict.results[0].error_message.is_empty());
    assert_eq!(
        verdict.results[0].error_message,
        verdict.results[1].error_message
    );
    assert!(verdict.results.iter().all(|r| !r.passed && r.elapsed_seconds == 0.0));
}

#[tokio::test]
#[ignore = "requires a Docker daemon and the judge image"]
async fn sleeping_past_timeout_is_time_limit_exceeded() {
    let judge = judge(5).await;
    let request = JudgeRequest::new(
        "import time\nn = int(input())\nif n > 1:\n    time.sleep(30)\nprint(n + 1)",
        "python",
        vec![case("1", "2"), case("5", "6")],
    );

    let verdict = judge.judge(request).await.unwrap();

    assert!(verdict.results[0].passed);
    assert_eq!(verdict.results[1].status, Verdict::TimeLimitExceeded);
    assert_eq!(verdict.overall_status, Verdict::TimeLimitExceeded);
}

#[tokio::test]
#[ignore = "requires a Docker daemon and the judge image"]
async fn allocating_past_ceiling_is_memory_limit_exceeded() {
    let judge = judge(10).await;
    let request = JudgeRequest::new(
        "blocks = []\nwhile True:\n    blocks.append(bytearray(16 * 1024 * 1024))",
        "python",
        vec![case("", "")],
    );

    let verdict = judge.judge(request).await.unwrap();

    assert_eq!(verdict.results[0].status, Verdict::MemoryLimitExceeded);
}

#[tokio::test]
#[ignore = "requires a Docker daemon and the judge image"]
async fn network_is_unreachable() {
    let judge = judge(10).await;
    let request = JudgeRequest::new(
        "import socket\ntry:\n    socket.create_connection(('1.1.1.1', 53), timeout=2)\n    print('online')\nexcept OSError:\n    print('offline')",
        "python",
        vec![case("", "offline")],
    );

    assert!(judge.judge(request).await.unwrap().is_accepted());
}

#[tokio::test]
#[ignore = "requires a Docker daemon and the judge image"]
async fn unsupported_language_is_rejected() {
    let judge = judge(10).await;
    let request = JudgeRequest::new("fn main() {}", "rust", vec![case("", "")]);

    let err = judge.judge(request).await.unwrap_err();
    assert!(matches!(err, JudgeError::UnsupportedLanguage(_)));
}
