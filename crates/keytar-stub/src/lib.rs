//! Replaces the native `keytar` credential store with a no-op module when it cannot load.
//!
//! `keytar` links against `libsecret`, which headless build images usually lack. Loading
//! it then fails at startup; swapping in a stub keeps the rest of the install working.

pub mod installer;
pub mod probe;
pub mod stub;

pub use installer::{ensure_usable_credential_module, InstallOutcome, StubInstaller};
pub use probe::{LoadFailure, ModuleProbe, NodeProbe, ProbeResult};
