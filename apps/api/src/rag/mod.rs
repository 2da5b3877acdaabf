//! Process bridge to the retrieval worker.
//!
//! The bridge owns a single long-lived subprocess speaking line-delimited
//! JSON on stdin/stdout. Requests are multiplexed over a FIFO pending queue:
//! the worker processes commands strictly in arrival order, so each output
//! line resolves the oldest pending request. The bridge relies on that
//! ordering contract and does not verify it.
//!
//! Lifecycle: Uninitialized → Initializing → Ready → (worker exit) →
//! Uninitialized. A crashed worker is never restarted eagerly; the next
//! `send()` performs a fresh spawn and handshake.

pub mod protocol;

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::rag::protocol::{WorkerCommand, WorkerResponse};

/// Handshake deadline: the worker builds embeddings and loads the vector
/// store on first start, which can take tens of seconds.
const INIT_TIMEOUT: Duration = Duration::from_secs(60);
/// Per-request deadline: generous enough to ride out upstream rate-limit
/// backoff inside the worker.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Error)]
pub enum RagError {
    #[error("worker request timed out")]
    Timeout,

    #[error("worker terminated unexpectedly")]
    Terminated,

    #[error("bridge is shutting down")]
    ShuttingDown,

    #[error("worker error: {0}")]
    Worker(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("failed to spawn worker: {0}")]
    Spawn(std::io::Error),

    #[error("worker I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How to start the worker and what to hand it at initialization.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub command: String,
    pub args: Vec<String>,
    pub careers_json_path: String,
    pub chroma_persist_dir: String,
    pub provider: String,
}

struct Pending {
    id: u64,
    tx: oneshot::Sender<Result<WorkerResponse, RagError>>,
}

type PendingQueue = Arc<Mutex<VecDeque<Pending>>>;

struct WorkerHandle {
    child: Child,
    stdin: ChildStdin,
    pending: PendingQueue,
    /// Set by the reader task when the worker's stdout reaches EOF.
    dead: Arc<AtomicBool>,
}

/// Async request/response façade over the retrieval worker subprocess.
///
/// One bridge instance owns at most one worker at a time. All state mutation
/// happens under the bridge mutex; in-flight requests await their reply
/// outside it, so many requests can be pending concurrently.
pub struct RagBridge {
    config: WorkerConfig,
    worker: Mutex<Option<WorkerHandle>>,
    next_request_id: AtomicU64,
    init_timeout: Duration,
    request_timeout: Duration,
}

impl RagBridge {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            worker: Mutex::new(None),
            next_request_id: AtomicU64::new(0),
            init_timeout: INIT_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Overrides the handshake and per-request deadlines.
    pub fn with_timeouts(mut self, init: Duration, request: Duration) -> Self {
        self.init_timeout = init;
        self.request_timeout = request;
        self
    }

    /// Spawns and handshakes the worker if it is not already running.
    /// Concurrent callers serialize on the bridge mutex, so at most one
    /// spawn is ever in flight. Failure leaves the bridge uninitialized.
    pub async fn initialize(&self) -> Result<(), RagError> {
        let mut worker = self.worker.lock().await;
        self.ensure_worker(&mut worker).await.map(|_| ())
    }

    /// Sends one command and awaits its reply.
    ///
    /// Implicitly initializes the worker. The command is written as a single
    /// UTF-8 JSON line; the reply is matched FIFO by the reader task. On
    /// timeout the pending record is removed by id, so a later reply for a
    /// different request is never misattributed.
    pub async fn send(&self, command: &WorkerCommand) -> Result<WorkerResponse, RagError> {
        let line = serde_json::to_string(command)
            .map_err(|e| RagError::Protocol(format!("failed to encode command: {e}")))?;

        let (id, rx, pending) = {
            let mut worker = self.worker.lock().await;
            let handle = self.ensure_worker(&mut worker).await?;

            let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
            let rx = enqueue(&handle.pending, id).await;
            if let Err(e) = write_line(&mut handle.stdin, &line).await {
                remove_pending(&handle.pending, id).await;
                return Err(RagError::Io(e));
            }
            (id, rx, Arc::clone(&handle.pending))
        };

        match timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result.and_then(WorkerResponse::into_result),
            // Sender dropped without a reply: the reader task is gone.
            Ok(Err(_)) => Err(RagError::Terminated),
            Err(_) => {
                remove_pending(&pending, id).await;
                Err(RagError::Timeout)
            }
        }
    }

    /// Kills the worker and rejects every pending request. Idempotent.
    pub async fn shutdown(&self) {
        let mut worker = self.worker.lock().await;
        if let Some(mut handle) = worker.take() {
            info!("shutting down retrieval worker");
            let drained: Vec<Pending> = handle.pending.lock().await.drain(..).collect();
            for pending in drained {
                let _ = pending.tx.send(Err(RagError::ShuttingDown));
            }
            if let Err(e) = handle.child.start_kill() {
                warn!("failed to signal retrieval worker: {e}");
            }
        }
    }

    async fn ensure_worker<'a>(
        &self,
        worker: &'a mut Option<WorkerHandle>,
    ) -> Result<&'a mut WorkerHandle, RagError> {
        let needs_spawn = worker
            .as_ref()
            .map_or(true, |h| h.dead.load(Ordering::SeqCst));
        if needs_spawn {
            *worker = Some(self.spawn_worker().await?);
        }
        worker
            .as_mut()
            .ok_or_else(|| RagError::Protocol("worker state lost after spawn".to_string()))
    }

    /// Spawns the worker and performs the `initialize` handshake.
    async fn spawn_worker(&self) -> Result<WorkerHandle, RagError> {
        info!(command = %self.config.command, "spawning retrieval worker");
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            // The worker must treat its streams as UTF-8 regardless of host
            // locale; chat content spans six languages.
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONUNBUFFERED", "1")
            .env("LANG", "C.UTF-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(RagError::Spawn)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RagError::Protocol("worker stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RagError::Protocol("worker stdout unavailable".to_string()))?;

        let pending: PendingQueue = Arc::new(Mutex::new(VecDeque::new()));
        let dead = Arc::new(AtomicBool::new(false));
        tokio::spawn(read_worker_output(
            stdout,
            Arc::clone(&pending),
            Arc::clone(&dead),
        ));

        let mut handle = WorkerHandle {
            child,
            stdin,
            pending,
            dead,
        };

        let init = WorkerCommand::Initialize {
            careers_json_path: self.config.careers_json_path.clone(),
            chroma_persist_dir: self.config.chroma_persist_dir.clone(),
            provider: self.config.provider.clone(),
        };
        let init_line = serde_json::to_string(&init)
            .map_err(|e| RagError::Protocol(format!("failed to encode init command: {e}")))?;

        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let rx = enqueue(&handle.pending, id).await;
        write_line(&mut handle.stdin, &init_line).await?;

        // kill_on_drop reaps the child on every failure path below.
        match timeout(self.init_timeout, rx).await {
            Ok(Ok(result)) => {
                result.and_then(WorkerResponse::into_result)?;
                info!("retrieval worker initialized");
                Ok(handle)
            }
            Ok(Err(_)) => Err(RagError::Terminated),
            Err(_) => {
                remove_pending(&handle.pending, id).await;
                Err(RagError::Timeout)
            }
        }
    }
}

async fn enqueue(
    queue: &PendingQueue,
    id: u64,
) -> oneshot::Receiver<Result<WorkerResponse, RagError>> {
    let (tx, rx) = oneshot::channel();
    queue.lock().await.push_back(Pending { id, tx });
    rx
}

/// Removes a pending record by identity; other requests ahead of or behind
/// it in the queue are untouched.
async fn remove_pending(queue: &PendingQueue, id: u64) {
    queue.lock().await.retain(|p| p.id != id);
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> std::io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

/// Reader task: buffers worker stdout into complete lines, parses each as a
/// response, and resolves the oldest pending request. Runs until EOF, then
/// marks the worker dead and rejects everything still pending.
async fn read_worker_output(stdout: ChildStdout, pending: PendingQueue, dead: Arc<AtomicBool>) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<WorkerResponse>(line) {
                    Ok(response) => {
                        let front = pending.lock().await.pop_front();
                        match front {
                            Some(record) => {
                                let _ = record.tx.send(Ok(response));
                            }
                            None => warn!("worker reply with no pending request, dropping"),
                        }
                    }
                    Err(e) => warn!("dropping malformed worker output line: {e}"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("error reading worker output: {e}");
                break;
            }
        }
    }

    dead.store(true, Ordering::SeqCst);
    let drained: Vec<Pending> = pending.lock().await.drain(..).collect();
    if !drained.is_empty() {
        warn!(
            pending = drained.len(),
            "worker terminated with requests pending"
        );
    }
    for record in drained {
        let _ = record.tx.send(Err(RagError::Terminated));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::likert::Language;

    fn sh_bridge(script: &str) -> RagBridge {
        RagBridge::new(WorkerConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            careers_json_path: "careers_cleaned.json".to_string(),
            chroma_persist_dir: "/tmp/chroma".to_string(),
            provider: "google".to_string(),
        })
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
    }

    fn chat(message: &str) -> WorkerCommand {
        WorkerCommand::Chat {
            message: message.to_string(),
            chat_history: Vec::new(),
            language: Language::En,
        }
    }

    async fn pending_len(bridge: &RagBridge) -> usize {
        let worker = bridge.worker.lock().await;
        match worker.as_ref() {
            Some(handle) => handle.pending.lock().await.len(),
            None => 0,
        }
    }

    /// Worker that numbers every reply, so tests can observe FIFO matching.
    const COUNTING_WORKER: &str = r#"
n=0
while IFS= read -r line; do
  n=$((n+1))
  printf '{"status":"success","message":"reply-%s"}\n' "$n"
done
"#;

    /// Worker that acknowledges init, then swallows everything.
    const SILENT_WORKER: &str = r#"
read -r line
printf '{"status":"success"}\n'
while IFS= read -r line; do :; done
"#;

    #[tokio::test]
    async fn test_initialize_is_memoized() {
        let bridge = sh_bridge(COUNTING_WORKER);
        bridge.initialize().await.unwrap();
        bridge.initialize().await.unwrap();

        // The handshake consumed reply-1; a second initialize must not have
        // consumed reply-2.
        let resp = bridge.send(&chat("hello")).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("reply-2"));
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_sends_match_responses_in_request_order() {
        let bridge = sh_bridge(COUNTING_WORKER);
        bridge.initialize().await.unwrap();

        let (req_a, req_b) = (chat("first"), chat("second"));
        let (a, b) = tokio::join!(bridge.send(&req_a), bridge.send(&req_b));
        assert_eq!(a.unwrap().message.as_deref(), Some("reply-2"));
        assert_eq!(b.unwrap().message.as_deref(), Some("reply-3"));
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_timeout_removes_pending_record() {
        // Replies to init, delays the first chat reply past the deadline,
        // then serves normally.
        let script = r#"
read -r line
printf '{"status":"success"}\n'
read -r line
sleep 0.5
printf '{"status":"success","message":"late"}\n'
while IFS= read -r line; do printf '{"status":"success","message":"fresh"}\n'; done
"#;
        let bridge = sh_bridge(script)
            .with_timeouts(Duration::from_secs(5), Duration::from_millis(200));
        bridge.initialize().await.unwrap();

        let err = bridge.send(&chat("will time out")).await.unwrap_err();
        assert!(matches!(err, RagError::Timeout));
        assert_eq!(pending_len(&bridge).await, 0);

        // Let the late reply arrive while nothing is pending; it must be
        // dropped, not held for the next caller.
        tokio::time::sleep(Duration::from_millis(600)).await;
        let resp = bridge.send(&chat("after timeout")).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("fresh"));
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_worker_exit_rejects_all_pending_and_respawn_recovers() {
        let marker = std::env::temp_dir().join(format!(
            "rag-bridge-crash-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&marker);
        // First run: acknowledge init, then die with requests pending.
        // Second run: serve normally.
        let script = format!(
            r#"
read -r line
printf '{{"status":"success"}}\n'
if [ ! -f "{marker}" ]; then
  touch "{marker}"
  sleep 0.3
  exit 0
fi
while IFS= read -r line; do printf '{{"status":"success","message":"pong"}}\n'; done
"#,
            marker = marker.display()
        );
        let bridge = sh_bridge(&script);
        bridge.initialize().await.unwrap();

        let (req_a, req_b) = (chat("one"), chat("two"));
        let (a, b) = tokio::join!(bridge.send(&req_a), bridge.send(&req_b));
        assert!(matches!(a.unwrap_err(), RagError::Terminated));
        assert!(matches!(b.unwrap_err(), RagError::Terminated));

        // The next send must trigger a fresh spawn and handshake.
        let resp = bridge.send(&chat("three")).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("pong"));
        bridge.shutdown().await;
        let _ = std::fs::remove_file(&marker);
    }

    #[tokio::test]
    async fn test_malformed_output_line_is_dropped() {
        let script = r#"
read -r line
printf '{"status":"success"}\n'
read -r line
printf 'this is not json\n'
printf '{"status":"success","message":"ok"}\n'
while IFS= read -r line; do printf '{"status":"success","message":"ok"}\n'; done
"#;
        let bridge = sh_bridge(script);
        bridge.initialize().await.unwrap();

        // The garbage line is logged and dropped; the following valid line
        // still resolves the same pending request.
        let resp = bridge.send(&chat("hello")).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("ok"));
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_worker_error_status_propagates_message() {
        let script = r#"
read -r line
printf '{"status":"success"}\n'
while IFS= read -r line; do printf '{"status":"error","message":"boom"}\n'; done
"#;
        let bridge = sh_bridge(script);
        let err = bridge.send(&chat("hello")).await.unwrap_err();
        assert!(matches!(err, RagError::Worker(ref m) if m == "boom"));
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_init_error_leaves_bridge_uninitialized() {
        let script = r#"
read -r line
printf '{"status":"error","message":"vector store missing"}\n'
"#;
        let bridge = sh_bridge(script);
        let err = bridge.initialize().await.unwrap_err();
        assert!(matches!(err, RagError::Worker(_)));
        assert!(bridge.worker.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_init_timeout() {
        let script = r#"while IFS= read -r line; do :; done"#;
        let bridge =
            sh_bridge(script).with_timeouts(Duration::from_millis(200), Duration::from_secs(5));
        let err = bridge.initialize().await.unwrap_err();
        assert!(matches!(err, RagError::Timeout));
        assert!(bridge.worker.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_spawn_failure_surfaces_as_spawn_error() {
        let bridge = RagBridge::new(WorkerConfig {
            command: "/nonexistent/worker-binary".to_string(),
            args: Vec::new(),
            careers_json_path: String::new(),
            chroma_persist_dir: String::new(),
            provider: "google".to_string(),
        });
        let err = bridge.initialize().await.unwrap_err();
        assert!(matches!(err, RagError::Spawn(_)));
    }

    #[tokio::test]
    async fn test_shutdown_rejects_pending_and_is_idempotent() {
        let bridge = Arc::new(sh_bridge(SILENT_WORKER));
        bridge.initialize().await.unwrap();

        let sender = {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move { bridge.send(&chat("hanging")).await })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;

        bridge.shutdown().await;
        let result = sender.await.unwrap();
        assert!(matches!(result.unwrap_err(), RagError::ShuttingDown));

        // Second shutdown is a no-op.
        bridge.shutdown().await;
        assert!(bridge.worker.lock().await.is_none());
    }
}
