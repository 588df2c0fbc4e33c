//! Process execution capability
//!
//! Both the compiler and the test binaries are run through [`ProcessRunner`],
//! so the pipeline can be driven by a scripted runner in tests.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::common::{Error, Result};

/// Status reported for a child killed by a segmentation violation
#[cfg(unix)]
pub const SIGSEGV_STATUS: i32 = -libc::SIGSEGV;
#[cfg(not(unix))]
pub const SIGSEGV_STATUS: i32 = -11;

/// A program to run and how to run it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Added on top of the harness environment
    pub env: Vec<(String, String)>,
    /// Written to stdin, which is then closed; `None` gives an empty stdin
    pub stdin: Option<String>,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    pub fn stdin(mut self, input: Option<String>) -> Self {
        self.stdin = input;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command line as typed in a shell, for diagnostics
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What a finished (or killed) child left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or the negated signal number if a signal ended the process
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
    /// The child outlived its timeout and was killed
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == 0 && !self.timed_out
    }
}

/// Runs a program to completion and captures its output
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let mut std_cmd = std::process::Command::new(&invocation.program);
        std_cmd
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so a timeout can take down everything the test forked
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            std_cmd.process_group(0);
        }

        let mut cmd = Command::from(std_cmd);
        cmd.kill_on_drop(true);

        let deadline = invocation.timeout.map(|limit| Instant::now() + limit);
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::spawn(&invocation.program, e))?;
        let pid = child.id();

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("Failed to get child stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Internal("Failed to get child stderr".to_string()))?;

        // Drain both pipes while feeding stdin so no side can fill up and block
        let mut stdout = Capture::spawn(stdout);
        let mut stderr = Capture::spawn(stderr);

        if let (Some(input), Some(mut stdin)) = (invocation.stdin.clone(), child.stdin.take()) {
            tokio::spawn(async move {
                // A child that exits without reading everything closes the pipe
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    tracing::debug!("stdin write stopped early: {}", e);
                }
                let _ = stdin.shutdown().await;
            });
        }

        let (status, mut timed_out) = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, child.wait()).await {
                Ok(status) => (status?, false),
                Err(_) => {
                    tracing::debug!(
                        "{} exceeded {:?}, killing",
                        invocation.program.display(),
                        invocation.timeout
                    );
                    kill_process_group(pid);
                    let _ = child.start_kill();
                    (child.wait().await?, true)
                }
            },
            None => (child.wait().await?, false),
        };

        // Descendants may still hold the pipes after the child itself is gone
        if let Some(deadline) = deadline {
            let until = if timed_out {
                Instant::now() + PIPE_GRACE
            } else {
                deadline
            };
            let out_closed = stdout.settle(Some(until)).await;
            let err_closed = stderr.settle(Some(until)).await;

            if !(out_closed && err_closed) && !timed_out {
                tracing::debug!(
                    "{} left processes holding its output past {:?}, killing",
                    invocation.program.display(),
                    invocation.timeout
                );
                kill_process_group(pid);
                timed_out = true;
                let until = Instant::now() + PIPE_GRACE;
                stdout.settle(Some(until)).await;
                stderr.settle(Some(until)).await;
            }
        } else {
            stdout.settle(None).await;
            stderr.settle(None).await;
        }

        Ok(ProcessOutput {
            status: encode_status(status),
            stdout: stdout.finish()?,
            stderr: stderr.finish()?,
            timed_out,
        })
    }
}

/// How long pipes may stay open once the process group has been killed
const PIPE_GRACE: Duration = Duration::from_millis(500);

/// SIGKILL every process in the group led by `pid`
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        // The child was spawned with process_group(0), so its pid is the group id
        let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if rc != 0 {
            tracing::debug!(
                "killpg({}) failed: {}",
                pid,
                std::io::Error::last_os_error()
            );
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// Output pipe drained by a background task into a shared buffer
///
/// The buffer survives the task, so output read before an abort is kept.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<std::io::Result<()>>,
    done: Option<Result<()>>,
}

impl Capture {
    fn spawn<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(pump(reader, Arc::clone(&buf)));
        Self {
            buf,
            task,
            done: None,
        }
    }

    /// Wait for EOF, giving up at `until`; true once the pipe is closed
    async fn settle(&mut self, until: Option<Instant>) -> bool {
        if self.done.is_some() {
            return true;
        }

        let joined = match until {
            Some(until) => match tokio::time::timeout_at(until, &mut self.task).await {
                Ok(joined) => joined,
                Err(_) => return false,
            },
            None => (&mut self.task).await,
        };

        self.done = Some(match joined {
            Ok(read) => read.map_err(Error::from),
            Err(e) => Err(Error::Internal(format!("Output reader task failed: {}", e))),
        });
        true
    }

    /// Everything read so far; an unfinished reader is abandoned
    fn finish(self) -> Result<String> {
        match self.done {
            Some(Err(e)) => return Err(e),
            Some(Ok(())) => {}
            None => self.task.abort(),
        }

        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        let bytes = std::mem::take(&mut *buf);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

async fn pump<R>(mut reader: R, buf: Arc<Mutex<Vec<u8>>>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(&chunk[..n]);
    }
}

/// Fold an exit status into a single integer, signals as negative values
pub fn encode_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
