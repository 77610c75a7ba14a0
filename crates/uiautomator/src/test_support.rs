//! Recording fakes for the transport, RPC channel and artifact fetcher.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use serde_json::Value;
use uiautomator_core::error::ApiError;
use uiautomator_core::protocol::{method, PONG};

use crate::rpc::RpcChannel;
use crate::server::artifacts::ArtifactFetcher;
use crate::server::Connector;
use crate::transport::{DeviceList, ServerProcess, ShellOutput, Transport};

/// Channel that records every call and answers from a script.
///
/// Unscripted methods answer `true`; `ping` answers `"pong"`.
#[derive(Default)]
pub struct FakeChannel {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    responses: Mutex<HashMap<String, VecDeque<Result<Value, ApiError>>>>,
    failed_pings: AtomicUsize,
    always_fail: AtomicBool,
    shutdown_fails: AtomicBool,
    shutdowns: AtomicUsize,
}

impl FakeChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A channel on which every call fails.
    pub fn unreachable() -> Arc<Self> {
        let channel = Self::new();
        channel.always_fail.store(true, Ordering::SeqCst);
        channel
    }

    /// Fail the next `n` pings before answering pong.
    pub fn pong_after(self: &Arc<Self>, n: usize) -> Arc<Self> {
        self.failed_pings.store(n, Ordering::SeqCst);
        Arc::clone(self)
    }

    /// Queue a reply for `method`. The last queued reply repeats.
    pub fn respond(&self, method: &str, reply: Result<Value, ApiError>) {
        let mut responses = self.responses.lock().unwrap();
        responses.entry(method.to_string()).or_default().push_back(reply);
    }

    pub fn fail_shutdown(&self) {
        self.shutdown_fails.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Params of every call to `method`, in order.
    pub fn calls_to(&self, method: &str) -> Vec<Vec<Value>> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    /// Connector that always hands out this channel.
    pub fn connector(self: &Arc<Self>) -> Connector {
        let channel = Arc::clone(self);
        Box::new(move |_port| Ok(Arc::clone(&channel) as Arc<dyn RpcChannel>))
    }
}

impl RpcChannel for FakeChannel {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        if self.always_fail.load(Ordering::SeqCst) {
            return Err(ApiError::rpc("connection refused"));
        }

        if method == method::PING {
            let pending = self.failed_pings.load(Ordering::SeqCst);
            if pending > 0 {
                self.failed_pings.store(pending - 1, Ordering::SeqCst);
                return Err(ApiError::rpc("connection refused"));
            }
        }

        let mut responses = self.responses.lock().unwrap();
        if let Some(queue) = responses.get_mut(method) {
            if queue.len() > 1 {
                if let Some(reply) = queue.pop_front() {
                    return reply;
                }
            }
            if let Some(reply) = queue.front() {
                return reply.clone();
            }
        }

        if method == method::PING {
            Ok(Value::String(PONG.to_string()))
        } else {
            Ok(Value::Bool(true))
        }
    }

    fn shutdown(&self) -> Result<(), ApiError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.shutdown_fails.load(Ordering::SeqCst) {
            return Err(ApiError::rpc("stop request failed"));
        }
        Ok(())
    }
}

/// Shared view of the fake server process.
#[derive(Default)]
pub struct ProcessProbe {
    pub running: AtomicBool,
    /// Whether a bounded wait sees the process exit.
    pub exits_when_waited: AtomicBool,
    pub kills: AtomicUsize,
    pub waits: AtomicUsize,
}

pub struct FakeProcess {
    probe: Arc<ProcessProbe>,
}

impl ServerProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    fn is_running(&mut self) -> bool {
        self.probe.running.load(Ordering::SeqCst)
    }

    fn wait_timeout(&mut self, _timeout: Duration) -> Result<bool> {
        self.probe.waits.fetch_add(1, Ordering::SeqCst);
        if self.probe.exits_when_waited.load(Ordering::SeqCst) {
            self.probe.running.store(false, Ordering::SeqCst);
            return Ok(true);
        }
        Ok(!self.probe.running.load(Ordering::SeqCst))
    }

    fn kill(&mut self) -> Result<()> {
        self.probe.kills.fetch_add(1, Ordering::SeqCst);
        self.probe.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct TransportState {
    devices: Mutex<DeviceList>,
    log: Mutex<Vec<String>>,
    spawns: AtomicUsize,
    ps_output: Mutex<String>,
    ps_all_rejected: AtomicBool,
    pull_fails: AtomicBool,
    kill_fails: AtomicBool,
    probe: Arc<ProcessProbe>,
}

/// Transport that logs every command as a single line.
///
/// Log lines look like `push <local> <remote>`, `shell ps -A`,
/// `forward 9008 9008` or `spawn uiautomator runtest ...`.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<TransportState>,
}

impl FakeTransport {
    pub fn with_devices(devices: &[(&str, &str)]) -> Self {
        let transport = Self::default();
        *transport.state.devices.lock().unwrap() = devices
            .iter()
            .map(|(serial, state)| (serial.to_string(), state.to_string()))
            .collect();
        transport
            .state
            .probe
            .exits_when_waited
            .store(true, Ordering::SeqCst);
        transport.set_ps_output("USER PID PPID NAME\n");
        transport
    }

    /// Output returned for `ps` in the device shell.
    pub fn set_ps_output(&self, output: &str) {
        *self.state.ps_output.lock().unwrap() = output.to_string();
    }

    /// Make `ps -A` fail the way toolbox `ps` does.
    pub fn reject_ps_all(&self) {
        self.state.ps_all_rejected.store(true, Ordering::SeqCst);
    }

    pub fn fail_pull(&self) {
        self.state.pull_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_kill(&self) {
        self.state.kill_fails.store(true, Ordering::SeqCst);
    }

    pub fn probe(&self) -> Arc<ProcessProbe> {
        Arc::clone(&self.state.probe)
    }

    pub fn spawn_count(&self) -> usize {
        self.state.spawns.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<String> {
        self.state.log.lock().unwrap().clone()
    }

    pub fn logged(&self, prefix: &str) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|line| line.starts_with(prefix))
            .collect()
    }

    fn record(&self, line: String) {
        self.state.log.lock().unwrap().push(line);
    }
}

impl Transport for FakeTransport {
    fn list_devices(&self) -> Result<DeviceList> {
        self.record("devices".to_string());
        Ok(self.state.devices.lock().unwrap().clone())
    }

    fn push(&self, local: &Path, remote: &str) -> Result<()> {
        self.record(format!("push {} {}", local.display(), remote));
        Ok(())
    }

    fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        self.record(format!("pull {} {}", remote, local.display()));
        if self.state.pull_fails.load(Ordering::SeqCst) {
            bail!("remote object '{}' does not exist", remote);
        }
        std::fs::write(local, b"<hierarchy/>")?;
        Ok(())
    }

    fn shell(&self, args: &[&str]) -> Result<ShellOutput> {
        self.record(format!("shell {}", args.join(" ")));
        match args.first() {
            Some(&"ps")
                if args.get(1) == Some(&"-A")
                    && self.state.ps_all_rejected.load(Ordering::SeqCst) =>
            {
                Ok(ShellOutput {
                    stdout: "bad pid '-A'".to_string(),
                    exit_code: 1,
                })
            }
            Some(&"ps") => Ok(ShellOutput {
                stdout: self.state.ps_output.lock().unwrap().clone(),
                exit_code: 0,
            }),
            Some(&"kill") if self.state.kill_fails.load(Ordering::SeqCst) => Ok(ShellOutput {
                stdout: "Operation not permitted".to_string(),
                exit_code: 1,
            }),
            _ => Ok(ShellOutput::default()),
        }
    }

    fn forward(&self, local_port: u16, remote_port: u16) -> Result<()> {
        self.record(format!("forward {} {}", local_port, remote_port));
        Ok(())
    }

    fn spawn(&self, args: &[&str]) -> Result<Box<dyn ServerProcess>> {
        self.record(format!("spawn {}", args.join(" ")));
        self.state.spawns.fetch_add(1, Ordering::SeqCst);
        self.state.probe.running.store(true, Ordering::SeqCst);
        Ok(Box::new(FakeProcess {
            probe: Arc::clone(&self.state.probe),
        }))
    }
}

/// Fetcher that writes a placeholder file and counts downloads.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    fetches: Arc<AtomicUsize>,
}

impl FakeFetcher {
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ArtifactFetcher for FakeFetcher {
    fn fetch(&self, _url: &str, dest: &Path) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        std::fs::write(dest, b"PK")?;
        Ok(())
    }
}
