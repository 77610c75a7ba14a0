//! Lifecycle of the on-device automation server.
//!
//! [`AutomatorServer`] brings the JSON-RPC server up on demand (device
//! selection, artifact staging, launch, port forward, ping polling) and tears
//! it down again. Liveness is always derived from a ping, never cached.

pub mod artifacts;
pub mod sweep;

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uiautomator_core::error::ApiError;
use uiautomator_core::protocol::{method, PONG};

use crate::paths;
use crate::rpc::{HttpRpcChannel, RpcChannel};
use crate::transport::{AdbTransport, DeviceList, ServerProcess, Transport, DEVICE_READY};
use artifacts::{ArtifactStager, HttpFetcher};
use sweep::SERVER_PROCESS_NAME;

/// Port the stub listens on, and the default local forward.
pub const DEFAULT_PORT: u16 = 9008;

const STUB_CLASS: &str = "com.github.uiautomatorstub.Stub";

/// Builds the RPC channel for a forwarded local port.
pub type Connector = Box<dyn Fn(u16) -> Result<Arc<dyn RpcChannel>, ApiError> + Send + Sync>;

/// Connector producing [`HttpRpcChannel`]s.
pub fn http_connector() -> Connector {
    Box::new(|port| Ok(Arc::new(HttpRpcChannel::new(port)?) as Arc<dyn RpcChannel>))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub local_port: u16,
    pub device_port: u16,
    /// Explicit device target; required when several devices are attached.
    pub serial: Option<String>,
    pub startup_timeout: Duration,
    pub poll_interval: Duration,
    /// How long a gracefully stopped server gets to exit before it is killed.
    pub stop_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            local_port: DEFAULT_PORT,
            device_port: DEFAULT_PORT,
            serial: None,
            startup_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            serial: paths::get_serial(),
            ..Self::default()
        }
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Starting,
    Alive,
    Stopped,
}

/// Snapshot reported by [`AutomatorServer::status`].
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub state: SessionState,
    pub alive: bool,
    pub local_port: u16,
    pub device_port: u16,
    pub serial: Option<String>,
    pub started_at: Option<String>,
}

struct Session {
    local_port: u16,
    device_port: u16,
    process: Option<Box<dyn ServerProcess>>,
    channel: Arc<dyn RpcChannel>,
    phase: SessionState,
    started_at: Option<DateTime<Utc>>,
}

/// Manages one automation server on one device.
pub struct AutomatorServer {
    config: ServerConfig,
    transport: Box<dyn Transport>,
    stager: ArtifactStager,
    connector: Connector,
    session: Mutex<Session>,
}

impl AutomatorServer {
    /// Server wired to adb, HTTP downloads and HTTP JSON-RPC.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::with_config(ServerConfig::from_env())
    }

    pub fn with_config(config: ServerConfig) -> Result<Self, ApiError> {
        let transport = AdbTransport::from_env(config.serial.clone())?;
        let stager = ArtifactStager::new(paths::get_cache_dir(), Box::new(HttpFetcher::new()?));
        Self::new(config, Box::new(transport), stager, http_connector())
    }

    pub fn new(
        config: ServerConfig,
        transport: Box<dyn Transport>,
        stager: ArtifactStager,
        connector: Connector,
    ) -> Result<Self, ApiError> {
        let channel = connector(config.local_port)?;
        let session = Session {
            local_port: config.local_port,
            device_port: config.device_port,
            process: None,
            channel,
            phase: SessionState::Uninitialized,
            started_at: None,
        };
        Ok(Self {
            config,
            transport,
            stager,
            connector,
            session: Mutex::new(session),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>, ApiError> {
        self.session
            .lock()
            .map_err(|_| ApiError::internal("Session state mutex poisoned"))
    }

    /// Launch the server and wait until it answers ping.
    ///
    /// The session lock is held throughout, so concurrent starts serialise.
    pub fn start(&self, local_port: u16, device_port: u16) -> Result<(), ApiError> {
        let mut session = self.lock()?;

        if let Some(process) = session.process.as_mut() {
            if process.is_running() {
                return Err(ApiError::session_conflict(session.local_port));
            }
        }

        let devices = self
            .transport
            .list_devices()
            .map_err(|e| ApiError::transport(format!("Failed to list devices: {:#}", e)))?;
        let serial = select_device(&devices, self.config.serial.as_deref())?;
        info!(
            "Starting automation server on {} (tcp:{} -> tcp:{})",
            serial, local_port, device_port
        );

        session.local_port = local_port;
        session.device_port = device_port;
        session.process = None;
        session.phase = SessionState::Starting;

        match self.launch(&mut session) {
            Ok(()) => {
                session.phase = SessionState::Alive;
                session.started_at = Some(Utc::now());
                Ok(())
            }
            Err(e) => {
                warn!("Automation server failed to start: {}", e);
                if let Some(mut process) = session.process.take() {
                    force_kill(process.as_mut());
                }
                session.phase = SessionState::Stopped;
                session.started_at = None;
                Err(e)
            }
        }
    }

    fn launch(&self, session: &mut Session) -> Result<(), ApiError> {
        let files = self.stager.stage(self.transport.as_ref())?;

        let mut args = vec!["uiautomator", "runtest"];
        args.extend(files);
        args.extend(["-c", STUB_CLASS]);

        let process = self.transport.spawn(&args).map_err(|e| {
            ApiError::transport(format!("Failed to launch automation server: {:#}", e))
        })?;
        session.process = Some(process);

        self.transport
            .forward(session.local_port, session.device_port)
            .map_err(|e| ApiError::transport(format!("Failed to forward port: {:#}", e)))?;

        session.channel = (self.connector)(session.local_port)?;
        self.wait_until_alive(session)
    }

    /// Poll ping until pong, failing fast if the spawned process exits.
    fn wait_until_alive(&self, session: &mut Session) -> Result<(), ApiError> {
        let start = Instant::now();

        loop {
            if can_ping(session.channel.as_ref()) {
                info!("Automation server alive after {:?}", start.elapsed());
                return Ok(());
            }

            if let Some(process) = session.process.as_mut() {
                if !process.is_running() {
                    return Err(ApiError::transport_with_suggestion(
                        "Automation server exited before answering ping",
                        "Run 'adb shell uiautomator runtest bundle.jar uiautomator-stub.jar \
                         -c com.github.uiautomatorstub.Stub' to see why it fails",
                    ));
                }
            }

            if start.elapsed() > self.config.startup_timeout {
                return Err(ApiError::startup_timeout(self.config.startup_timeout));
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Whether the server answers ping. Never fails.
    pub fn alive(&self) -> bool {
        let channel = match self.session.lock() {
            Ok(session) => Arc::clone(&session.channel),
            Err(_) => return false,
        };
        can_ping(channel.as_ref())
    }

    /// A ready channel, starting the server first when it does not answer.
    ///
    /// A held server process that no longer answers ping is torn down before
    /// the restart.
    pub fn jsonrpc(&self) -> Result<Arc<dyn RpcChannel>, ApiError> {
        if !self.alive() {
            self.discard_unresponsive()?;
            self.start(self.config.local_port, self.config.device_port)?;
        }
        Ok(Arc::clone(&self.lock()?.channel))
    }

    fn discard_unresponsive(&self) -> Result<(), ApiError> {
        let mut session = self.lock()?;
        let Some(mut process) = session.process.take() else {
            return Ok(());
        };

        if process.is_running() {
            warn!(
                "Automation server on local port {} stopped answering ping, restarting it",
                session.local_port
            );
            self.shutdown(session.channel.as_ref(), process.as_mut());
            self.sweep();
        }
        session.phase = SessionState::Stopped;
        session.started_at = None;
        Ok(())
    }

    /// Stop the server and kill any leftover server process on the device.
    ///
    /// Shutdown failures escalate to a force-kill; leftover kills that fail
    /// are logged and skipped.
    pub fn stop(&self) -> Result<(), ApiError> {
        let mut session = self.lock()?;

        if let Some(mut process) = session.process.take() {
            if process.is_running() {
                self.shutdown(session.channel.as_ref(), process.as_mut());
            }
        }

        let killed = self.sweep();
        if killed > 0 {
            info!("Killed {} leftover server process(es)", killed);
        }

        session.phase = SessionState::Stopped;
        session.started_at = None;
        Ok(())
    }

    fn shutdown(&self, channel: &dyn RpcChannel, process: &mut dyn ServerProcess) {
        if let Err(e) = channel.shutdown() {
            warn!("Graceful stop failed ({}), killing server process", e);
            force_kill(process);
            return;
        }

        match process.wait_timeout(self.config.stop_timeout) {
            Ok(true) => info!("Automation server stopped"),
            Ok(false) => {
                warn!(
                    "Automation server still running {:?} after stop, killing it",
                    self.config.stop_timeout
                );
                force_kill(process);
            }
            Err(e) => {
                warn!("Error waiting for server exit ({:#}), killing it", e);
                force_kill(process);
            }
        }
    }

    /// Kill every device process named like the server. Returns how many died.
    fn sweep(&self) -> usize {
        let processes = match self.list_processes() {
            Ok(processes) => processes,
            Err(e) => {
                warn!("Failed to list device processes: {:#}", e);
                return 0;
            }
        };

        let mut killed = 0;
        for pid in sweep::parse_pids(&processes, SERVER_PROCESS_NAME) {
            match self.transport.kill(pid) {
                Ok(()) => killed += 1,
                Err(e) => warn!("Failed to kill device process {}: {:#}", pid, e),
            }
        }
        killed
    }

    /// Full device process table.
    ///
    /// Toybox `ps` (Android 8+) lists only the caller's processes unless given
    /// `-A`; older toolbox `ps` lists everything and may reject `-A`.
    fn list_processes(&self) -> anyhow::Result<String> {
        match self.transport.shell(&["ps", "-A"]) {
            Ok(output) if output.success() && sweep::has_pid_column(&output.stdout) => {
                return Ok(output.stdout);
            }
            Ok(output) => debug!(
                "'ps -A' unusable (exit {}), falling back to plain ps",
                output.exit_code
            ),
            Err(e) => debug!("'ps -A' failed ({:#}), falling back to plain ps", e),
        }
        Ok(self.transport.shell(&["ps"])?.stdout)
    }

    /// Current phase without touching the device.
    pub fn state(&self) -> SessionState {
        self.session
            .lock()
            .map(|session| session.phase)
            .unwrap_or(SessionState::Stopped)
    }

    pub fn status(&self) -> ServerStatus {
        let alive = self.alive();
        let (state, local_port, device_port, started_at) = match self.session.lock() {
            Ok(session) => (
                session.phase,
                session.local_port,
                session.device_port,
                session.started_at,
            ),
            Err(_) => (
                SessionState::Stopped,
                self.config.local_port,
                self.config.device_port,
                None,
            ),
        };
        ServerStatus {
            state,
            alive,
            local_port,
            device_port,
            serial: self.config.serial.clone(),
            started_at: started_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Pick the device to drive from `adb devices` output.
pub fn select_device(devices: &DeviceList, serial: Option<&str>) -> Result<String, ApiError> {
    if devices.is_empty() {
        return Err(ApiError::no_devices());
    }

    let (serial, state) = match serial {
        Some(serial) => devices
            .get_key_value(serial)
            .ok_or_else(|| ApiError::device_not_found(serial))?,
        None if devices.len() > 1 => return Err(ApiError::ambiguous_target(devices.len())),
        None => devices
            .iter()
            .next()
            .ok_or_else(ApiError::no_devices)?,
    };

    if state != DEVICE_READY {
        return Err(ApiError::device_not_ready(serial, state));
    }
    Ok(serial.clone())
}

fn can_ping(channel: &dyn RpcChannel) -> bool {
    match channel.call(method::PING, Vec::new()) {
        Ok(Value::String(reply)) if reply == PONG => true,
        Ok(other) => {
            debug!("Unexpected ping reply: {}", other);
            false
        }
        Err(e) => {
            debug!("Ping failed: {}", e);
            false
        }
    }
}

fn force_kill(process: &mut dyn ServerProcess) {
    if let Err(e) = process.kill() {
        warn!("Failed to kill server process {:?}: {:#}", process.id(), e);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::test_support::{FakeChannel, FakeFetcher, FakeTransport};
    use uiautomator_core::error::ErrorCode;

    fn fast_config() -> ServerConfig {
        ServerConfig {
            startup_timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(1),
            stop_timeout: Duration::from_millis(10),
            ..ServerConfig::default()
        }
    }

    fn server_with(
        config: ServerConfig,
        transport: &FakeTransport,
        channel: &Arc<FakeChannel>,
        cache: &tempfile::TempDir,
    ) -> AutomatorServer {
        let stager = ArtifactStager::new(
            cache.path().to_path_buf(),
            Box::new(FakeFetcher::default()),
        );
        AutomatorServer::new(
            config,
            Box::new(transport.clone()),
            stager,
            channel.connector(),
        )
        .unwrap()
    }

    fn one_device() -> FakeTransport {
        FakeTransport::with_devices(&[("emulator-5554", "device")])
    }

    #[test]
    fn test_select_device() {
        let mut devices = DeviceList::new();
        assert_eq!(
            select_device(&devices, None).unwrap_err().code,
            ErrorCode::DeviceUnavailable
        );

        devices.insert("emulator-5554".into(), "device".into());
        assert_eq!(select_device(&devices, None).unwrap(), "emulator-5554");
        assert_eq!(
            select_device(&devices, Some("emulator-5554")).unwrap(),
            "emulator-5554"
        );
        assert_eq!(
            select_device(&devices, Some("other")).unwrap_err().code,
            ErrorCode::DeviceUnavailable
        );

        devices.insert("0123456789ABCDEF".into(), "unauthorized".into());
        assert_eq!(
            select_device(&devices, None).unwrap_err().code,
            ErrorCode::AmbiguousTarget
        );
        let err = select_device(&devices, Some("0123456789ABCDEF")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DeviceUnavailable);
        assert!(err.message.contains("unauthorized"));
    }

    #[test]
    fn test_start_without_devices_spawns_nothing() {
        let cache = tempfile::tempdir().unwrap();
        let transport = FakeTransport::with_devices(&[]);
        let server = server_with(fast_config(), &transport, &FakeChannel::new(), &cache);

        let err = server.start(9008, 9008).unwrap_err();

        assert_eq!(err.code, ErrorCode::DeviceUnavailable);
        assert_eq!(transport.spawn_count(), 0);
        assert!(transport.logged("push").is_empty());
    }

    #[test]
    fn test_start_with_two_devices_and_no_serial() {
        let cache = tempfile::tempdir().unwrap();
        let transport =
            FakeTransport::with_devices(&[("emulator-5554", "device"), ("emulator-5556", "device")]);
        let server = server_with(fast_config(), &transport, &FakeChannel::new(), &cache);

        let err = server.start(9008, 9008).unwrap_err();

        assert_eq!(err.code, ErrorCode::AmbiguousTarget);
        assert_eq!(transport.spawn_count(), 0);
    }

    #[test]
    fn test_start_with_serial_among_many() {
        let cache = tempfile::tempdir().unwrap();
        let transport =
            FakeTransport::with_devices(&[("emulator-5554", "device"), ("emulator-5556", "device")]);
        let config = ServerConfig {
            serial: Some("emulator-5556".into()),
            ..fast_config()
        };
        let server = server_with(config, &transport, &FakeChannel::new(), &cache);

        server.start(9008, 9008).unwrap();
        assert_eq!(server.state(), SessionState::Alive);
    }

    #[test]
    fn test_start_launches_and_forwards() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let channel = FakeChannel::new().pong_after(3);
        let server = server_with(fast_config(), &transport, &channel, &cache);

        server.start(9010, 9008).unwrap();

        assert_eq!(server.state(), SessionState::Alive);
        assert_eq!(transport.spawn_count(), 1);
        assert_eq!(
            transport.logged("spawn"),
            vec!["spawn uiautomator runtest bundle.jar uiautomator-stub.jar -c com.github.uiautomatorstub.Stub"]
        );
        assert_eq!(transport.logged("forward"), vec!["forward 9010 9008"]);
        assert_eq!(channel.calls_to(method::PING).len(), 4);

        let status = server.status();
        assert!(status.alive);
        assert_eq!(status.local_port, 9010);
        assert!(status.started_at.is_some());
    }

    #[test]
    fn test_start_times_out_and_kills_process() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let server = server_with(fast_config(), &transport, &FakeChannel::unreachable(), &cache);

        let err = server.start(9008, 9008).unwrap_err();

        assert_eq!(err.code, ErrorCode::RpcError);
        assert_eq!(server.state(), SessionState::Stopped);
        assert_eq!(transport.probe().kills.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_start_fails_fast_when_process_exits() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let config = ServerConfig {
            startup_timeout: Duration::from_secs(30),
            ..fast_config()
        };
        let server = server_with(config, &transport, &FakeChannel::unreachable(), &cache);

        // Server crashes right after launch.
        let probe = transport.probe();
        let started = Instant::now();
        let handle = thread::spawn(move || {
            while !probe.running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
            probe.running.store(false, Ordering::SeqCst);
        });

        let err = server.start(9008, 9008).unwrap_err();
        handle.join().unwrap();

        assert_eq!(err.code, ErrorCode::TransportError);
        assert!(err.message.contains("exited"));
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_start_while_running_conflicts() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let server = server_with(fast_config(), &transport, &FakeChannel::new(), &cache);

        server.start(9008, 9008).unwrap();
        let err = server.start(9008, 9008).unwrap_err();

        assert_eq!(err.code, ErrorCode::SessionConflict);
        assert_eq!(transport.spawn_count(), 1);
    }

    #[test]
    fn test_alive_never_fails() {
        let cache = tempfile::tempdir().unwrap();
        let server = server_with(
            fast_config(),
            &one_device(),
            &FakeChannel::unreachable(),
            &cache,
        );

        assert!(!server.alive());
        assert_eq!(server.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_alive_rejects_unexpected_reply() {
        let cache = tempfile::tempdir().unwrap();
        let channel = FakeChannel::new();
        channel.respond(method::PING, Ok(Value::String("ping".into())));
        let server = server_with(fast_config(), &one_device(), &channel, &cache);

        assert!(!server.alive());
    }

    #[test]
    fn test_jsonrpc_starts_lazily() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let channel = FakeChannel::new().pong_after(1);
        let server = server_with(fast_config(), &transport, &channel, &cache);

        server.jsonrpc().unwrap();
        assert_eq!(transport.spawn_count(), 1);

        // Already alive: no second launch.
        server.jsonrpc().unwrap();
        assert_eq!(transport.spawn_count(), 1);
    }

    #[test]
    fn test_stop_without_process_still_sweeps() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        transport.set_ps_output(
            "USER     PID   PPID  VSIZE  RSS     WCHAN    PC         NAME\n\
             shell     2451  2449  430236 23812 ffffffff 40060c6c S uiautomator\n",
        );
        let server = server_with(fast_config(), &transport, &FakeChannel::new(), &cache);

        server.stop().unwrap();

        assert_eq!(transport.logged("shell ps"), vec!["shell ps -A"]);
        assert_eq!(transport.logged("shell kill"), vec!["shell kill -9 2451"]);
        assert_eq!(server.state(), SessionState::Stopped);
    }

    #[test]
    fn test_sweep_falls_back_to_plain_ps() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        transport.reject_ps_all();
        transport.set_ps_output(
            "USER     PID   PPID  VSIZE  RSS     WCHAN    PC         NAME\n\
             shell     2451  2449  430236 23812 ffffffff 40060c6c S uiautomator\n",
        );
        let server = server_with(fast_config(), &transport, &FakeChannel::new(), &cache);

        server.stop().unwrap();

        assert_eq!(
            transport.logged("shell ps"),
            vec!["shell ps -A", "shell ps"]
        );
        assert_eq!(transport.logged("shell kill"), vec!["shell kill -9 2451"]);
    }

    #[test]
    fn test_jsonrpc_restarts_after_missed_ping() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let channel = FakeChannel::new();
        let server = server_with(fast_config(), &transport, &channel, &cache);
        server.start(9008, 9008).unwrap();

        // One ping is lost while the old server process is still running.
        channel.pong_after(1);
        server.jsonrpc().unwrap();

        assert_eq!(server.state(), SessionState::Alive);
        assert_eq!(transport.spawn_count(), 2);
        assert_eq!(
            transport.logged("forward"),
            vec!["forward 9008 9008", "forward 9008 9008"]
        );
        assert_eq!(channel.shutdown_count(), 1);
        assert_eq!(transport.logged("shell ps"), vec!["shell ps -A"]);
    }

    #[test]
    fn test_stop_graceful() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let channel = FakeChannel::new();
        let server = server_with(fast_config(), &transport, &channel, &cache);
        server.start(9008, 9008).unwrap();

        server.stop().unwrap();

        let probe = transport.probe();
        assert_eq!(channel.shutdown_count(), 1);
        assert_eq!(probe.waits.load(Ordering::SeqCst), 1);
        assert_eq!(probe.kills.load(Ordering::SeqCst), 0);
        assert_eq!(server.state(), SessionState::Stopped);
    }

    #[test]
    fn test_stop_kills_when_shutdown_fails() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let channel = FakeChannel::new();
        channel.fail_shutdown();
        let server = server_with(fast_config(), &transport, &channel, &cache);
        server.start(9008, 9008).unwrap();

        server.stop().unwrap();

        let probe = transport.probe();
        assert_eq!(probe.waits.load(Ordering::SeqCst), 0);
        assert_eq!(probe.kills.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_kills_when_process_lingers() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        transport
            .probe()
            .exits_when_waited
            .store(false, Ordering::SeqCst);
        let server = server_with(fast_config(), &transport, &FakeChannel::new(), &cache);
        server.start(9008, 9008).unwrap();

        server.stop().unwrap();

        let probe = transport.probe();
        assert_eq!(probe.waits.load(Ordering::SeqCst), 1);
        assert_eq!(probe.kills.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_logs_failed_kills() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        transport.set_ps_output(
            "USER PID PPID NAME\n\
             shell 100 1 uiautomator\n\
             shell 101 1 uiautomator\n",
        );
        transport.fail_kill();
        let server = server_with(fast_config(), &transport, &FakeChannel::new(), &cache);

        server.stop().unwrap();

        assert_eq!(transport.logged("shell kill").len(), 2);
    }

    #[test]
    fn test_restart_after_stop() {
        let cache = tempfile::tempdir().unwrap();
        let transport = one_device();
        let server = server_with(fast_config(), &transport, &FakeChannel::new(), &cache);

        server.start(9008, 9008).unwrap();
        server.stop().unwrap();
        server.start(9008, 9008).unwrap();

        assert_eq!(transport.spawn_count(), 2);
        assert_eq!(server.state(), SessionState::Alive);
    }
}
