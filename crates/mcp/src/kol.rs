use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct KolAnalysisRequest {
    /// Twitter username (without @) of the KOL to analyze
    pub username: String,
}

impl KolAnalysisRequest {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
