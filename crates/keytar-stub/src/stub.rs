/// First line of every generated stub; its presence means the module is already handled.
pub const STUB_MARKER: &str = "// keytar-stub: no-op credential store";

/// Drop-in replacement for `lib/keytar.js` with the same five async functions.
pub const STUB_SOURCE: &str = r#"// keytar-stub: no-op credential store
// Replaces the native keytar binding on hosts without libsecret.
// Nothing is stored; lookups always miss.

module.exports = {
  getPassword: async () => null,
  setPassword: async () => {},
  deletePassword: async () => false,
  findPassword: async () => null,
  findCredentials: async () => []
};
"#;

pub fn is_stub(contents: &str) -> bool {
    contents.contains(STUB_MARKER)
}
