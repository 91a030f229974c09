// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bounded execution of local helper binaries (`minikube`, `snap`).

use crate::constants::COMMAND_TIMEOUT_SECS;
use crate::errors::DetectionError;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a helper command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandOutput {
    pub success: bool,
    pub stdout: String,
}

/// Run `program args...` with a bounded timeout.
///
/// Returns `Ok(None)` when the binary is not installed. The child is killed if
/// the timeout elapses.
pub(crate) async fn run_helper(
    program: &str,
    args: &[&str],
) -> Result<Option<CommandOutput>, DetectionError> {
    run_helper_with_timeout(program, args, Duration::from_secs(COMMAND_TIMEOUT_SECS)).await
}

pub(crate) async fn run_helper_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Option<CommandOutput>, DetectionError> {
    let command_line = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, child).await {
        Err(_) => Err(DetectionError::Command {
            command: command_line,
            reason: format!("timed out after {}s", timeout.as_secs()),
        }),
        Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
            debug!(command = %command_line, "Helper binary not installed");
            Ok(None)
        }
        Ok(Err(e)) => Err(DetectionError::Command {
            command: command_line,
            reason: e.to_string(),
        }),
        Ok(Ok(output)) => {
            debug!(
                command = %command_line,
                status = ?output.status.code(),
                "Helper command finished"
            );
            Ok(Some(CommandOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            }))
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod command_tests;
