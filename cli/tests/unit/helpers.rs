//! Shared test helpers: output constructors and in-memory port fakes.

#![allow(dead_code, clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::rc::Rc;

use anyhow::Result;
use hvdriver::application::ports::{
    CommandRunner, DriverHost, Fetcher, ProgressReporter, ProgressSink,
};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Reporters and sinks ──────────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn start(&self, _: Option<u64>) {}
    fn advance(&self, _: u64) {}
    fn finish(&self) {}
}

/// Ordered record of side effects shared between fakes.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

// ── Fake host ────────────────────────────────────────────────────────────────

/// `DriverHost` resolving names from a fixed table and journaling mutations.
pub struct FakeHost {
    pub installed: HashMap<String, PathBuf>,
    pub journal: Journal,
    pub fail_remove: bool,
    pub fail_chmod: bool,
    pub modes: RefCell<HashMap<PathBuf, u32>>,
}

impl FakeHost {
    pub fn empty(journal: &Journal) -> Self {
        Self {
            installed: HashMap::new(),
            journal: Rc::clone(journal),
            fail_remove: false,
            fail_chmod: false,
            modes: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_driver(journal: &Journal, name: &str) -> Self {
        let mut host = Self::empty(journal);
        host.installed
            .insert(name.to_string(), PathBuf::from("/usr/local/bin").join(name));
        host
    }
}

impl DriverHost for FakeHost {
    fn look_path(&self, name: &str) -> Option<PathBuf> {
        self.installed.get(name).cloned()
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.journal
            .borrow_mut()
            .push(format!("remove {}", path.display()));
        if self.fail_remove {
            anyhow::bail!("permission denied");
        }
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        self.journal
            .borrow_mut()
            .push(format!("chmod {mode:o} {}", path.display()));
        if self.fail_chmod {
            anyhow::bail!("operation not permitted");
        }
        self.modes.borrow_mut().insert(path.to_path_buf(), mode);
        Ok(())
    }
}

// ── Scripted runner ──────────────────────────────────────────────────────────

/// `CommandRunner` answering every call with the same canned result.
pub struct ScriptedRunner {
    pub reply: Option<Output>,
    pub calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn prints(stdout: &str) -> Self {
        Self::replying(ok_output(stdout.as_bytes()))
    }

    pub fn replying(output: Output) -> Self {
        Self {
            reply: Some(output),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// The program cannot be spawned at all.
    pub fn unspawnable() -> Self {
        Self {
            reply: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.calls.borrow_mut().push((
            program.to_string(),
            args.iter().map(ToString::to_string).collect(),
        ));
        match &self.reply {
            Some(output) => Ok(output.clone()),
            None => anyhow::bail!("failed to spawn {program}"),
        }
    }
}

// ── Recording fetcher ────────────────────────────────────────────────────────

/// `Fetcher` that journals each request and optionally fails.
pub struct RecordingFetcher {
    pub journal: Journal,
    pub fail: bool,
    pub calls: Cell<u32>,
}

impl RecordingFetcher {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Rc::clone(journal),
            fail: false,
            calls: Cell::new(0),
        }
    }

    pub fn failing(journal: &Journal) -> Self {
        Self {
            fail: true,
            ..Self::new(journal)
        }
    }
}

impl Fetcher for RecordingFetcher {
    fn fetch(&self, url: &str, destination: &Path, progress: &dyn ProgressSink) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        self.journal
            .borrow_mut()
            .push(format!("fetch {url} -> {}", destination.display()));
        if self.fail {
            anyhow::bail!("404 Not Found");
        }
        progress.start(Some(4));
        progress.advance(4);
        progress.finish();
        Ok(())
    }
}
