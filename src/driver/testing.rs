//! In-memory stand-ins for the HTTP server and adb, used by unit tests

use crate::driver::android::adb::ShellRunner;
use crate::driver::webdriver::transport::{HttpResponse, HttpTransport};
use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Call {
    line: String,
    body: Option<Value>,
}

/// Records every request and answers like a well-behaved WebDriver server.
///
/// `POST .../session` hands out `session-1`, `session-2`, ...; everything else
/// answers `200 {"value": null}` unless a rule from [`FakeTransport::respond`]
/// matches.
pub struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    rules: Mutex<Vec<(String, u16, String)>>,
    next_session: AtomicUsize,
    delete_delay: Mutex<Option<Duration>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rules: Mutex::new(Vec::new()),
            next_session: AtomicUsize::new(1),
            delete_delay: Mutex::new(None),
        }
    }

    /// Hold every DELETE for `delay` before it counts as received
    pub fn delay_deletes(&self, delay: Duration) {
        *self.delete_delay.lock().unwrap() = Some(delay);
    }

    /// Answer matching requests with `status`/`body`.
    ///
    /// `key` matches the full "METHOD URL" line, a bare method, or a URL suffix.
    /// Later rules take precedence.
    pub fn respond(&self, key: &str, status: u16, body: &str) {
        self.rules
            .lock()
            .unwrap()
            .push((key.to_string(), status, body.to_string()));
    }

    /// "METHOD URL" for every request, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.line.clone())
            .collect()
    }

    /// Number of requests whose line contains `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    /// JSON body of the first request with exactly this line
    pub fn body_of(&self, line: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.line == line)
            .and_then(|c| c.body.clone())
    }

    /// JSON body of the first request whose URL ends with `suffix`
    pub fn body_ending_with(&self, suffix: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.line.ends_with(suffix))
            .and_then(|c| c.body.clone())
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<HttpResponse> {
        if method == Method::DELETE {
            let delay = *self.delete_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }

        let line = format!("{} {}", method, url);
        self.calls.lock().unwrap().push(Call {
            line: line.clone(),
            body: body.cloned(),
        });

        let rule = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(key, _, _)| *key == line || *key == method.as_str() || url.ends_with(key))
            .cloned();
        if let Some((_, status, body)) = rule {
            return Ok(HttpResponse { status, body });
        }

        if method == Method::POST && url.ends_with("/session") {
            let id = self.next_session.fetch_add(1, Ordering::SeqCst);
            return Ok(HttpResponse {
                status: 200,
                body: format!(r#"{{"value": {{"sessionId": "session-{}"}}}}"#, id),
            });
        }

        Ok(HttpResponse {
            status: 200,
            body: r#"{"value": null}"#.to_string(),
        })
    }
}

/// Records adb invocations and replays scripted output.
///
/// Invocations are recorded as `shell <cmd>`, `exec-out <cmd>` or
/// `exec <args...>`. Unmatched commands succeed with empty output.
pub struct FakeShell {
    commands: Mutex<Vec<String>>,
    rules: Mutex<Vec<(String, VecDeque<std::result::Result<String, String>>)>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            rules: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `output` to invocations starting with `prefix`
    pub fn respond(&self, prefix: &str, output: &str) {
        self.push_rule(prefix, vec![Ok(output.to_string())]);
    }

    /// Fail invocations starting with `prefix`
    pub fn fail(&self, prefix: &str, detail: &str) {
        self.push_rule(prefix, vec![Err(detail.to_string())]);
    }

    /// Reply with each output in turn; the last one repeats
    pub fn respond_sequence(&self, prefix: &str, outputs: &[&str]) {
        self.push_rule(prefix, outputs.iter().map(|o| Ok(o.to_string())).collect());
    }

    fn push_rule(&self, prefix: &str, replies: Vec<std::result::Result<String, String>>) {
        self.rules
            .lock()
            .unwrap()
            .push((prefix.to_string(), replies.into()));
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    fn run(&self, line: String) -> Result<String> {
        self.commands.lock().unwrap().push(line.clone());

        let mut rules = self.rules.lock().unwrap();
        let reply = rules
            .iter_mut()
            .rev()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, replies)| {
                if replies.len() > 1 {
                    replies.pop_front().unwrap_or(Ok(String::new()))
                } else {
                    replies.front().cloned().unwrap_or(Ok(String::new()))
                }
            });

        match reply {
            Some(Ok(output)) => Ok(output),
            Some(Err(detail)) => Err(RemoteError::Shell {
                command: line,
                detail,
            }),
            None => Ok(String::new()),
        }
    }
}

#[async_trait]
impl ShellRunner for FakeShell {
    async fn shell(&self, command: &str) -> Result<String> {
        self.run(format!("shell {}", command))
    }

    async fn exec_out(&self, command: &str) -> Result<String> {
        self.run(format!("exec-out {}", command))
    }

    async fn exec(&self, args: &[&str]) -> Result<String> {
        self.run(format!("exec {}", args.join(" ")))
    }
}
