//! Subprocess invocation for external stages.
//!
//! A stage command is a plain argv vector. The child is run to completion,
//! its output is echoed into the run log, and a non-zero exit code is the
//! only failure signal.

use std::process::{Command, Stdio};

use super::errors::{StageError, StageResult};
use super::types::Context;

/// Captured output of a finished stage command.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Run an external stage command and log its output.
///
/// `tool` names the stage in log and error messages. The command is
/// considered successful exactly when the child exits with code zero;
/// anything on stdout or stderr is advisory.
pub fn run_stage_command(ctx: &Context, tool: &str, argv: &[String]) -> StageResult<CommandOutput> {
    if argv.is_empty() {
        return Err(StageError::invalid_input(format!(
            "empty command configured for stage '{}'",
            tool
        )));
    }

    ctx.logger.command(&argv.join(" "));
    tracing::debug!(stage = tool, command = ?argv, "running stage command");

    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .current_dir(ctx.layout.root())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| StageError::command_failed(tool, -1, format!("failed to spawn: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        ctx.logger.output_line(line, false);
    }
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        ctx.logger.output_line(line, true);
    }

    if !output.status.success() {
        // A signal-terminated child has no code; report -1.
        return Err(StageError::command_failed(
            tool,
            output.status.code().unwrap_or(-1),
            failure_excerpt(&stderr, &stdout),
        ));
    }

    Ok(CommandOutput {
        stdout,
        stderr,
        success: true,
    })
}

/// Pick the most useful few lines to carry in a failure message.
fn failure_excerpt(stderr: &str, stdout: &str) -> String {
    let source = if stderr.trim().is_empty() { stdout } else { stderr };
    let lines: Vec<&str> = source
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return "no output".to_string();
    }
    let start = lines.len().saturating_sub(3);
    lines[start..].join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::{LogConfig, RunLogger};
    use crate::project::ProjectLayout;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn test_context(root: &std::path::Path) -> Context {
        let logger =
            Arc::new(RunLogger::new("test_run", root, LogConfig::default(), None).unwrap());
        let layout = ProjectLayout::at_root(root, "movie.mp4");
        Context::new(Settings::default(), layout, "test_run", logger)
    }

    #[test]
    fn empty_argv_is_rejected() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());

        let err = run_stage_command(&ctx, "plot", &[]).unwrap_err();
        assert!(matches!(err, StageError::InvalidInput(_)));
    }

    #[test]
    fn zero_exit_is_success_even_with_stderr() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());

        let argv = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo warning >&2; echo done".to_string(),
        ];
        let out = run_stage_command(&ctx, "frames", &argv).unwrap();
        assert!(out.success);
        assert!(out.stdout.contains("done"));
        assert!(out.stderr.contains("warning"));
    }

    #[test]
    fn nonzero_exit_is_failure() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());

        let argv = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo boom >&2; exit 3".to_string(),
        ];
        let err = run_stage_command(&ctx, "voice", &argv).unwrap_err();
        match err {
            StageError::CommandFailed {
                tool,
                exit_code,
                message,
            } => {
                assert_eq!(tool, "voice");
                assert_eq!(exit_code, 3);
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failure_excerpt_prefers_stderr_tail() {
        let excerpt = failure_excerpt("a\nb\nc\nd\n", "ignored");
        assert_eq!(excerpt, "b | c | d");
        assert_eq!(failure_excerpt("", "from stdout"), "from stdout");
        assert_eq!(failure_excerpt("", ""), "no output");
    }
}
