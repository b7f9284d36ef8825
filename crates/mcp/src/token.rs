use rmcp::schemars;
use serde::{Deserialize, Serialize};

/// Arguments shared by `analyse_token`, `mindshare` and `token_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TokenRequest {
    /// Token symbol (e.g. 'bitcoin', 'ethereum', 'BTC') or contract address
    pub identifier: String,
}

impl TokenRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// `trending_tokens` takes no arguments and posts an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TrendingTokensRequest {}
