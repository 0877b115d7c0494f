use rankrun::config::ShellConfig;
use rankrun::worker::{CommandRunner, CommandStatus, ShellRunner};

/// Create a runner with the default `sh` shell
fn test_runner() -> ShellRunner {
    ShellRunner::new(ShellConfig::default())
}

#[tokio::test]
async fn test_run_simple_command() {
    let status = test_runner().run("true").await;
    assert_eq!(status, CommandStatus::Exited(0));
    assert!(status.is_success());
}

#[tokio::test]
async fn test_run_command_failure() {
    let status = test_runner().run("false").await;
    assert_eq!(status, CommandStatus::Exited(1));
    assert!(!status.is_success());
}

#[tokio::test]
async fn test_run_preserves_exit_code() {
    let status = test_runner().run("exit 42").await;
    assert_eq!(status.exit_code(), Some(42));
}

#[tokio::test]
async fn test_run_unknown_command() {
    // The shell starts fine and reports 127 for the missing program
    let status = test_runner().run("nonexistent_command_12345").await;
    assert_eq!(status, CommandStatus::Exited(127));
}

#[tokio::test]
async fn test_run_shell_syntax() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let command = format!("echo 'hello world' | wc -w > {}", out.display());

    let status = test_runner().run(&command).await;

    assert!(status.is_success());
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.trim(), "2");
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_killed_by_signal() {
    let status = test_runner().run("kill -TERM $$").await;
    assert_eq!(status, CommandStatus::Terminated { signal: Some(15) });
    assert!(!status.is_success());
}

#[tokio::test]
async fn test_run_missing_shell() {
    let runner = ShellRunner::new(ShellConfig {
        program: "/nonexistent/shell-12345".to_string(),
    });

    let status = runner.run("true").await;

    assert!(matches!(status, CommandStatus::NotStarted(_)));
    assert!(!status.is_success());
}

#[tokio::test]
async fn test_run_waits_for_completion() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("done");
    let command = format!("sleep 0.2 && touch {}", marker.display());

    let status = test_runner().run(&command).await;

    assert!(status.is_success());
    assert!(marker.exists(), "command must have finished when run returns");
}
