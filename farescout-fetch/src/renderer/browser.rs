//! Headless Chromium renderer.
//!
//! Each session is one Node.js process running a small Playwright driver
//! (`driver.js`). The two sides exchange one JSON line per call over
//! stdin/stdout. Pages run their scripts, so client-rendered result lists
//! show up the way they do for a person.
//!
//! Needs `node` on `PATH` (or configured) with the `playwright` package and
//! a Chromium build installed.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, instrument};
use url::Url;

use super::{
    DocumentRenderer, ReadySignal, RenderOptions, RenderSession, booking_domains, check_domain,
};
use crate::error::RenderError;

const DRIVER_SCRIPT: &str = include_str!("driver.js");

/// Time allowed for the browser to start.
const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);

/// How long past a page timeout the driver may take to answer.
const DEFAULT_REPLY_GRACE: Duration = Duration::from_secs(5);

const CONTENT_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Driver protocol
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum DriverCommand<'a> {
    Launch {
        headless: bool,
        stealth: bool,
        profile_dir: Option<String>,
        user_agent: &'a str,
        viewport: (u32, u32),
        headers: BTreeMap<&'a str, &'a str>,
    },
    Goto {
        url: &'a str,
        timeout_ms: u64,
    },
    WaitSelector {
        selector: &'a str,
        timeout_ms: u64,
    },
    WaitText {
        text: &'a str,
        timeout_ms: u64,
    },
    Content,
    Close,
}

#[derive(Debug, Default, Deserialize)]
struct DriverReply {
    ok: bool,
    #[serde(default)]
    timeout: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl DriverReply {
    fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "unknown driver error".to_string())
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn driver_gone(e: std::io::Error) -> RenderError {
    RenderError::Session(format!("Browser driver unavailable: {e}"))
}

// ============================================================================
// Browser Renderer
// ============================================================================

/// Renderer backed by Playwright-driven Chromium.
#[derive(Debug, Clone)]
pub struct BrowserRenderer {
    program: PathBuf,
    args: Vec<String>,
    profile_root: Option<PathBuf>,
    headless: bool,
    allowed_domains: Option<Vec<String>>,
    launch_timeout: Duration,
    reply_grace: Duration,
}

impl BrowserRenderer {
    /// Creates a headless renderer using `node` from `PATH`, with no domain
    /// restrictions and no persistent profiles.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("node"),
            args: vec!["-e".to_string(), DRIVER_SCRIPT.to_string()],
            profile_root: None,
            headless: true,
            allowed_domains: None,
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
            reply_grace: DEFAULT_REPLY_GRACE,
        }
    }

    /// Creates a renderer restricted to the booking sites.
    pub fn for_booking_sites() -> Self {
        Self {
            allowed_domains: Some(booking_domains()),
            ..Self::new()
        }
    }

    /// Runs the bundled driver with a specific Node.js binary.
    #[must_use]
    pub fn with_node(mut self, node: impl Into<PathBuf>) -> Self {
        self.program = node.into();
        self
    }

    /// Replaces the driver command line entirely.
    #[must_use]
    pub fn with_driver(mut self, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.args = args;
        self
    }

    /// Keeps named profiles under `root`, one directory per profile.
    #[must_use]
    pub fn with_profile_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.profile_root = Some(root.into());
        self
    }

    /// Shows the browser window.
    #[must_use]
    pub fn headed(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Sets how long the browser may take to start.
    #[must_use]
    pub fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    /// Sets how long past a page timeout the driver may take to answer.
    #[must_use]
    pub fn with_reply_grace(mut self, grace: Duration) -> Self {
        self.reply_grace = grace;
        self
    }

    /// Directory for the profile `options` asks for, if profiles are enabled.
    pub fn profile_dir(&self, options: &RenderOptions) -> Option<PathBuf> {
        match (&self.profile_root, &options.profile) {
            (Some(root), Some(name)) => Some(root.join(name)),
            _ => None,
        }
    }

    fn spawn(&self) -> Result<BrowserSession, RenderError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RenderError::Session(format!(
                    "Could not start browser driver {}: {e}",
                    self.program.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::Session("Browser driver has no stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RenderError::Session("Browser driver has no stdout".to_string()))?;

        Ok(BrowserSession {
            allowed_domains: self.allowed_domains.clone(),
            reply_grace: self.reply_grace,
            child,
            stdin,
            replies: BufReader::new(stdout).lines(),
            url: None,
            desynced: false,
            closed: false,
        })
    }
}

impl Default for BrowserRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentRenderer for BrowserRenderer {
    fn name(&self) -> &str {
        "browser"
    }

    #[instrument(skip(self, options), fields(profile = ?options.profile))]
    async fn open(&self, options: &RenderOptions) -> Result<Box<dyn RenderSession>, RenderError> {
        let mut session = self.spawn()?;

        let profile_dir = self.profile_dir(options);
        let launch = DriverCommand::Launch {
            headless: self.headless,
            stealth: options.stealth,
            profile_dir: profile_dir.map(|dir| dir.display().to_string()),
            user_agent: &options.user_agent,
            viewport: options.viewport,
            headers: options
                .extra_headers
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect(),
        };

        let failure = match session.call(&launch, self.launch_timeout).await {
            Ok(Some(reply)) if reply.ok => {
                debug!("Browser launched");
                return Ok(Box::new(session));
            }
            Ok(Some(reply)) => {
                RenderError::Session(format!("Browser launch failed: {}", reply.error_message()))
            }
            Ok(None) => RenderError::Session(format!(
                "Browser did not start within {}ms",
                self.launch_timeout.as_millis()
            )),
            Err(e) => e,
        };
        session.kill().await;
        Err(failure)
    }
}

// ============================================================================
// Browser Session
// ============================================================================

struct BrowserSession {
    allowed_domains: Option<Vec<String>>,
    reply_grace: Duration,
    child: Child,
    stdin: ChildStdin,
    replies: Lines<BufReader<ChildStdout>>,
    url: Option<Url>,
    /// Set once a reply went missing; later replies can't be matched up.
    desynced: bool,
    closed: bool,
}

impl BrowserSession {
    /// Sends one command. `Ok(None)` means no reply arrived within `limit`.
    async fn call(
        &mut self,
        command: &DriverCommand<'_>,
        limit: Duration,
    ) -> Result<Option<DriverReply>, RenderError> {
        if self.desynced {
            return Err(RenderError::Session(
                "Browser driver stopped answering".to_string(),
            ));
        }

        let mut line = serde_json::to_string(command)
            .map_err(|e| RenderError::Session(format!("Bad driver command: {e}")))?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(driver_gone)?;
        self.stdin.flush().await.map_err(driver_gone)?;

        let Ok(next) = tokio::time::timeout(limit, self.replies.next_line()).await else {
            self.desynced = true;
            return Ok(None);
        };
        let reply = next
            .map_err(driver_gone)?
            .ok_or_else(|| RenderError::Session("Browser driver exited".to_string()))?;
        serde_json::from_str(&reply)
            .map(Some)
            .map_err(|e| RenderError::Session(format!("Unreadable driver reply: {e}")))
    }

    async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(error = %e, "Browser driver already gone");
        }
    }
}

#[async_trait]
impl RenderSession for BrowserSession {
    #[instrument(skip(self, url), fields(url = %url))]
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<(), RenderError> {
        check_domain(self.allowed_domains.as_deref(), url)?;

        let command = DriverCommand::Goto {
            url: url.as_str(),
            timeout_ms: millis(timeout),
        };
        let limit = timeout + self.reply_grace;
        let timed_out = || RenderError::NavigationTimeout {
            url: url.to_string(),
            timeout,
        };

        match self.call(&command, limit).await? {
            Some(reply) if reply.ok => {
                self.url = Some(url.clone());
                Ok(())
            }
            Some(reply) if reply.timeout => Err(timed_out()),
            Some(reply) => Err(RenderError::Navigation(reply.error_message())),
            None => Err(timed_out()),
        }
    }

    async fn wait_for(
        &mut self,
        signal: &ReadySignal,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        if self.url.is_none() {
            return Err(RenderError::NoPage);
        }

        let timeout_ms = millis(timeout);
        let command = match signal {
            ReadySignal::Selector(selector) => DriverCommand::WaitSelector {
                selector,
                timeout_ms,
            },
            ReadySignal::Text(text) => DriverCommand::WaitText { text, timeout_ms },
        };
        let limit = timeout + self.reply_grace;
        let timed_out = || RenderError::WaitTimeout {
            signal: signal.describe(),
            timeout,
        };

        match self.call(&command, limit).await? {
            Some(reply) if reply.ok => Ok(()),
            Some(reply) if reply.timeout => Err(timed_out()),
            Some(reply) => Err(RenderError::Session(format!(
                "Waiting for {signal} failed: {}",
                reply.error_message()
            ))),
            None => Err(timed_out()),
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        if self.url.is_none() {
            return Err(RenderError::NoPage);
        }

        match self.call(&DriverCommand::Content, CONTENT_TIMEOUT).await? {
            Some(DriverReply {
                ok: true,
                content: Some(content),
                ..
            }) => Ok(content),
            Some(reply) => Err(RenderError::Session(format!(
                "Could not read page: {}",
                reply.error_message()
            ))),
            None => Err(RenderError::Session(
                "Browser did not return the page in time".to_string(),
            )),
        }
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.url = None;

        if self.desynced {
            self.kill().await;
            return Ok(());
        }

        let failure = match self.call(&DriverCommand::Close, CLOSE_TIMEOUT).await {
            Ok(Some(reply)) if reply.ok => {
                match tokio::time::timeout(CLOSE_TIMEOUT, self.child.wait()).await {
                    Ok(Ok(status)) => debug!(%status, "Browser driver exited"),
                    Ok(Err(e)) => debug!(error = %e, "Browser driver wait failed"),
                    Err(_) => self.kill().await,
                }
                return Ok(());
            }
            Ok(Some(reply)) => {
                RenderError::Session(format!("Browser close failed: {}", reply.error_message()))
            }
            Ok(None) => RenderError::Session("Browser did not close in time".to_string()),
            Err(e) => e,
        };
        self.kill().await;
        Err(failure)
    }
}

// ============================================================================
// Tests
// ============================================================================
