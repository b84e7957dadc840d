use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

async fn run(program: &str, args: &[&str], limit: Duration) -> Option<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match timeout(limit, cmd.output()).await {
        Ok(Ok(output)) => Some(output),
        Ok(Err(e)) => {
            debug!("could not run {program}: {e}");
            None
        }
        Err(_elapsed) => {
            debug!("{program} {} timed out after {limit:?}", args.join(" "));
            None
        }
    }
}

/// Stdout of a command that exited successfully and printed something.
pub async fn capture(program: &str, args: &[&str], limit: Duration) -> Option<String> {
    let output = run(program, args, limit).await?;
    if !output.status.success() || output.stdout.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `true` if the command ran to completion within `limit` and exited with 0.
pub async fn succeeds(program: &str, args: &[&str], limit: Duration) -> bool {
    run(program, args, limit)
        .await
        .is_some_and(|output| output.status.success())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const LIMIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn capture_returns_stdout() {
        let out = capture("echo", &["hello"], LIMIT).await;
        assert_eq!(out.as_deref().map(str::trim), Some("hello"));
    }

    #[tokio::test]
    async fn failing_or_missing_commands_yield_nothing() {
        assert_eq!(capture("false", &[], LIMIT).await, None);
        assert_eq!(capture("definitely-not-a-real-binary", &[], LIMIT).await, None);
        assert!(!succeeds("false", &[], LIMIT).await);
        assert!(succeeds("true", &[], LIMIT).await);
    }

    #[tokio::test]
    async fn slow_commands_are_cut_off() {
        let start = std::time::Instant::now();
        assert!(!succeeds("sleep", &["5"], Duration::from_millis(100)).await);
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
