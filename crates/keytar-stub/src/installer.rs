use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::probe::{LoadFailureKind, ModuleProbe, NodeProbe, ProbeResult};
use crate::stub::{is_stub, STUB_SOURCE};

/// Install locations checked in order, relative to the project root.
pub const MODULE_LOCATIONS: [&str; 2] = [
    "node_modules/keytar",
    "node_modules/@smithery/cli/node_modules/keytar",
];

/// Module entry point that gets replaced, relative to the module directory.
pub const ENTRY_FILE: &str = "lib/keytar.js";

pub const BACKUP_SUFFIX: &str = ".backup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    NotInstalled,
    LoadsCleanly { module_dir: PathBuf },
    AlreadyStubbed { entry: PathBuf },
    Stubbed { entry: PathBuf, backup: Option<PathBuf> },
    /// The loader probe could not run; the module was left alone.
    ProbeUnavailable { reason: String },
    /// Installing the stub failed; logged and otherwise ignored.
    Failed { reason: String },
}

#[derive(Debug, Error)]
enum StubError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to create {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write stub to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Setup routine that swaps an unloadable `keytar` for a stub.
///
/// Every failure ends up in the returned [`InstallOutcome`]; [`StubInstaller::run`] never
/// returns an error so it can sit in an install hook without breaking the install.
#[derive(Debug, Clone)]
pub struct StubInstaller<P = NodeProbe> {
    root: PathBuf,
    probe: P,
}

impl StubInstaller<NodeProbe> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_probe(root, NodeProbe::default())
    }
}

impl<P: ModuleProbe> StubInstaller<P> {
    pub fn with_probe(root: impl Into<PathBuf>, probe: P) -> Self {
        Self {
            root: root.into(),
            probe,
        }
    }

    pub fn locate(&self) -> Option<PathBuf> {
        MODULE_LOCATIONS
            .iter()
            .map(|location| self.root.join(location))
            .find(|candidate| candidate.is_dir())
    }

    pub fn run(&self) -> InstallOutcome {
        let Some(module_dir) = self.locate() else {
            info!(root = %self.root.display(), "keytar not found in node_modules, skipping stub creation");
            return InstallOutcome::NotInstalled;
        };

        match self.probe.probe(&module_dir) {
            ProbeResult::Loaded => {
                info!(module = %module_dir.display(), "keytar loaded successfully, no stub needed");
                return InstallOutcome::LoadsCleanly { module_dir };
            }
            ProbeResult::Unavailable(reason) => {
                warn!(%reason, "could not probe keytar, leaving it untouched");
                return InstallOutcome::ProbeUnavailable { reason };
            }
            ProbeResult::Failed(failure) => match failure.kind {
                LoadFailureKind::MissingSharedLibrary => {
                    info!(error = %failure.message, "keytar failed to load due to missing libsecret");
                }
                LoadFailureKind::Other => {
                    warn!(error = %failure.message, "keytar failed to load");
                }
            },
        }

        match self.install_stub(&module_dir) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "failed to create keytar stub; continuing");
                InstallOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn install_stub(&self, module_dir: &Path) -> Result<InstallOutcome, StubError> {
        let entry = module_dir.join(ENTRY_FILE);

        let existing = if entry.is_file() {
            let bytes = fs::read(&entry).map_err(|source| StubError::Read {
                path: entry.clone(),
                source,
            })?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            None
        };

        if existing.as_deref().is_some_and(is_stub) {
            info!(entry = %entry.display(), "keytar stub already in place");
            return Ok(InstallOutcome::AlreadyStubbed { entry });
        }

        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent).map_err(|source| StubError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let backup = if existing.is_some() {
            back_up(&entry)
        } else {
            None
        };

        fs::write(&entry, STUB_SOURCE).map_err(|source| StubError::Write {
            path: entry.clone(),
            source,
        })?;
        info!(entry = %entry.display(), "keytar stub created");

        Ok(InstallOutcome::Stubbed { entry, backup })
    }
}

/// Copy `entry` next to itself unless a backup is already there.
fn back_up(entry: &Path) -> Option<PathBuf> {
    let mut backup = entry.as_os_str().to_owned();
    backup.push(BACKUP_SUFFIX);
    let backup = PathBuf::from(backup);

    if backup.exists() {
        info!(backup = %backup.display(), "keeping existing keytar backup");
        return Some(backup);
    }

    match fs::copy(entry, &backup) {
        Ok(_) => {
            info!(backup = %backup.display(), "backed up original keytar entry");
            Some(backup)
        }
        Err(err) => {
            warn!(error = %err, backup = %backup.display(), "failed to back up keytar; stubbing anyway");
            None
        }
    }
}

/// Locate `keytar` under `root` and stub it out if it cannot load.
pub fn ensure_usable_credential_module(root: impl Into<PathBuf>) -> InstallOutcome {
    StubInstaller::new(root).run()
}
