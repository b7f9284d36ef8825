use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const MISSING_LIBRARY_SIGNATURES: &[&str] = &[
    "ERR_DLOPEN_FAILED",
    "libsecret",
    "cannot open shared object file",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailureKind {
    /// The native binding could not find `libsecret` (or another shared object).
    MissingSharedLibrary,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub kind: LoadFailureKind,
    pub message: String,
}

impl LoadFailure {
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = if MISSING_LIBRARY_SIGNATURES
            .iter()
            .any(|signature| message.contains(signature))
        {
            LoadFailureKind::MissingSharedLibrary
        } else {
            LoadFailureKind::Other
        };
        Self { kind, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Loaded,
    Failed(LoadFailure),
    /// The probe itself could not run, so nothing is known about the module.
    Unavailable(String),
}

/// Checks whether the module at a given directory can be loaded.
pub trait ModuleProbe {
    fn probe(&self, module_dir: &Path) -> ProbeResult;
}

impl<F> ModuleProbe for F
where
    F: Fn(&Path) -> ProbeResult,
{
    fn probe(&self, module_dir: &Path) -> ProbeResult {
        self(module_dir)
    }
}

/// Loads the module with `node -e "require(<dir>)"`.
#[derive(Debug, Clone)]
pub struct NodeProbe {
    node: PathBuf,
}

impl NodeProbe {
    pub fn with_binary(node: impl Into<PathBuf>) -> Self {
        Self { node: node.into() }
    }
}

impl Default for NodeProbe {
    fn default() -> Self {
        Self::with_binary("node")
    }
}

impl ModuleProbe for NodeProbe {
    fn probe(&self, module_dir: &Path) -> ProbeResult {
        let literal = match serde_json::to_string(&module_dir.to_string_lossy()) {
            Ok(literal) => literal,
            Err(err) => return ProbeResult::Unavailable(err.to_string()),
        };
        let script = format!("require({literal})");

        debug!(node = %self.node.display(), %script, "probing keytar");
        let output = match Command::new(&self.node).arg("-e").arg(&script).output() {
            Ok(output) => output,
            Err(err) => {
                return ProbeResult::Unavailable(format!(
                    "failed to run {}: {err}",
                    self.node.display()
                ))
            }
        };

        if output.status.success() {
            ProbeResult::Loaded
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            ProbeResult::Failed(LoadFailure::classify(stderr.trim()))
        }
    }
}
