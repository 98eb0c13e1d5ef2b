//! Shared harness for black-box specs

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command as StdCommand, Output, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::Command;
use tempfile::TempDir;

/// Upper bound for polling in specs
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Poll `check` until it holds or `max_ms` elapses
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    check()
}

/// `rk` invocation with a clean environment
pub fn rk() -> CliBuilder {
    CliBuilder::new("rk")
}

/// `rkd` invocation with a clean environment
pub fn rkd() -> CliBuilder {
    CliBuilder::new("rkd")
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    fn new(bin: &str) -> Self {
        let mut cmd = Command::cargo_bin(bin).unwrap();
        cmd.env_remove("RK_NODE")
            .env_remove("RK_DATA_DIR")
            .env("RK_TIMEOUT_CONNECT_MS", "500")
            .env("RK_TIMEOUT_IPC_MS", "2000")
            .timeout(Duration::from_millis(SPEC_WAIT_MAX_MS * 2));
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require a zero exit code
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            run.output.status.code(),
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout: {}",
            run.stdout()
        );
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(needle),
            "stdout missing {:?}:\n{}",
            needle,
            stdout
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(needle),
            "stderr missing {:?}:\n{}",
            needle,
            stderr
        );
        self
    }
}

/// A running `rkd` with its own data directory, killed on drop
pub struct NodeProcess {
    child: Child,
    // Held so the pipe stays open after READY
    _stdout: BufReader<ChildStdout>,
    addr: String,
    dir: Option<TempDir>,
}

impl NodeProcess {
    pub fn leader(name: &str, followers: &[&str]) -> Self {
        let list = followers
            .iter()
            .map(|f| format!("{:?}", f))
            .collect::<Vec<_>>()
            .join(", ");
        Self::start(
            name,
            &format!(
                "role = \"leader\"\nfollowers = [{}]\nreplication_interval = \"50ms\"\n",
                list
            ),
        )
    }

    pub fn follower(name: &str, leader: Option<&str>) -> Self {
        let leader = leader
            .map(|l| format!("leader = {:?}\n", l))
            .unwrap_or_default();
        Self::start(name, &format!("role = \"follower\"\n{}", leader))
    }

    fn start(name: &str, role_section: &str) -> Self {
        let dir = TempDir::new().unwrap();
        Self::start_in(dir, name, "127.0.0.1:0", role_section)
    }

    fn start_in(dir: TempDir, name: &str, listen: &str, role_section: &str) -> Self {
        let data_dir = dir.path().join("data");
        let config = format!(
            "name = {:?}\nlisten = {:?}\ndata_dir = {:?}\n{}",
            name,
            listen,
            data_dir.display().to_string(),
            role_section
        );
        let config_path = dir.path().join("rk.toml");
        std::fs::write(&config_path, config).unwrap();

        let mut child = StdCommand::new(assert_cmd::cargo::cargo_bin("rkd"))
            .arg(&config_path)
            .env_remove("RK_DATA_DIR")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let mut stdout = BufReader::new(child.stdout.take().unwrap());
        let mut line = String::new();
        stdout.read_line(&mut line).unwrap();
        let addr = line
            .trim()
            .strip_prefix("READY ")
            .unwrap_or_else(|| panic!("rkd did not report ready: {:?}", line))
            .to_string();

        Self {
            child,
            _stdout: stdout,
            addr,
            dir: Some(dir),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn data_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.path().join("data"),
            None => PathBuf::new(),
        }
    }

    /// `rk` aimed at this node
    pub fn rk(&self) -> CliBuilder {
        rk().args(&["--node", &self.addr])
    }

    /// Stop via `rk shutdown` and wait for the process to exit
    pub fn stop(mut self) -> TempDir {
        self.rk().args(&["shutdown"]).passes();
        let exited = wait_for(SPEC_WAIT_MAX_MS, || {
            matches!(self.child.try_wait(), Ok(Some(_)))
        });
        assert!(exited, "rkd did not exit after shutdown");
        self.dir.take().unwrap()
    }

    /// Restart a stopped follower from the same data directory and address
    pub fn restart_follower(dir: TempDir, name: &str, addr: &str) -> Self {
        Self::start_in(dir, name, addr, "role = \"follower\"\n")
    }
}

impl Drop for NodeProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Read a key through `rk get`, trimmed
pub fn get(node: &NodeProcess, key: &str) -> String {
    node.rk().args(&["get", key]).passes().stdout().trim().to_string()
}

/// Whether `path` holds any quarantined WAL file
pub fn has_quarantine(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_name().to_string_lossy().contains(".corrupt."))
        })
        .unwrap_or(false)
}
