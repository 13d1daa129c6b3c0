//! Sandboxed execution of learner code.
//!
//! Executable code-ide questions are graded by output comparison, which means
//! actually running both the learner's code and the reference solution. The
//! interpreter is an external collaborator: we shell out to a Python binary in
//! isolated mode with a hard timeout, and every way that can go wrong folds
//! into [`ExecError`] — grading maps those to "incorrect" (or falls back to
//! source comparison when no interpreter exists at all) and never crashes the
//! scoring pass.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::ExecError;

/// Runs a piece of source code and returns its raw standard output.
pub trait CodeRunner: Send + Sync {
    fn run(&self, code: &str) -> Result<String, ExecError>;
}

/// Shells out to a Python interpreter with a scratch file per run.
pub struct PythonRunner {
    python_bin: String,
    timeout: Duration,
}

impl PythonRunner {
    pub fn new(python_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python_bin: python_bin.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.python_bin.clone(), config.python_timeout())
    }
}

impl CodeRunner for PythonRunner {
    fn run(&self, code: &str) -> Result<String, ExecError> {
        let dir = tempfile::tempdir()?;
        let script = dir.path().join("main.py");
        std::fs::write(&script, code)?;

        // -I: isolated mode, no site-packages or env var influence.
        let mut child = Command::new(&self.python_bin)
            .arg("-I")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ExecError::Unavailable(format!("{}: {e}", self.python_bin))
                }
                _ => ExecError::Io(e),
            })?;

        // Drain pipes on reader threads so a chatty script can't deadlock the
        // timeout loop on a full pipe.
        let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
            ExecError::Failed("child stdout not captured".to_string())
        })?;
        let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
            ExecError::Failed("child stderr not captured".to_string())
        })?;
        let stdout_reader = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout_pipe.read_to_string(&mut buf);
            buf
        });
        let stderr_reader = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr_pipe.read_to_string(&mut buf);
            buf
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ExecError::Timeout(self.timeout));
                    }
                    thread::sleep(Duration::from_millis(25));
                }
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if status.success() {
            Ok(stdout)
        } else {
            let detail = stderr.lines().last().unwrap_or("nonzero exit").to_string();
            Err(ExecError::Failed(detail))
        }
    }
}

/// A runner for contexts with no interpreter: always reports
/// [`ExecError::Unavailable`], which grading turns into a normalized source
/// comparison.
pub struct NoopRunner;

impl CodeRunner for NoopRunner {
    fn run(&self, _code: &str) -> Result<String, ExecError> {
        Err(ExecError::Unavailable("execution disabled".to_string()))
    }
}

/// Test/bench double with canned outputs keyed by an exact source match.
pub struct ScriptedRunner {
    entries: Vec<(String, Result<String, String>)>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn on(mut self, code: &str, output: &str) -> Self {
        self.entries.push((code.to_string(), Ok(output.to_string())));
        self
    }

    pub fn failing_on(mut self, code: &str, error: &str) -> Self {
        self.entries.push((code.to_string(), Err(error.to_string())));
        self
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeRunner for ScriptedRunner {
    fn run(&self, code: &str) -> Result<String, ExecError> {
        for (source, outcome) in &self.entries {
            if source == code {
                return match outcome {
                    Ok(out) => Ok(out.clone()),
                    Err(e) => Err(ExecError::Failed(e.clone())),
                };
            }
        }
        Err(ExecError::Failed("no scripted output for source".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_interpreter_is_unavailable() {
        let runner = PythonRunner::new("definitely-not-a-python", Duration::from_secs(2));
        match runner.run("print('hi')") {
            Err(ExecError::Unavailable(_)) => {}
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_scripted_runner_replays_outputs() {
        let runner = ScriptedRunner::new()
            .on("print(1)", "1\n")
            .failing_on("boom", "NameError");
        assert_eq!(runner.run("print(1)").unwrap(), "1\n");
        assert!(matches!(runner.run("boom"), Err(ExecError::Failed(_))));
        assert!(matches!(runner.run("other"), Err(ExecError::Failed(_))));
    }
}
