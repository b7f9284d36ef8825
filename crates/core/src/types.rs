use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix used by the hosted deployment for every tool name.
pub const TOOL_ALIAS_PREFIX: &str = "maiga_";

/// The fixed set of partner API tools.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    AnalyseToken,
    Mindshare,
    TokenInfo,
    MarketReport,
    KolAnalysis,
    TrendingTokens,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::AnalyseToken,
        ToolName::Mindshare,
        ToolName::TokenInfo,
        ToolName::MarketReport,
        ToolName::KolAnalysis,
        ToolName::TrendingTokens,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::AnalyseToken => "analyse_token",
            ToolName::Mindshare => "mindshare",
            ToolName::TokenInfo => "token_info",
            ToolName::MarketReport => "market_report",
            ToolName::KolAnalysis => "kol_analysis",
            ToolName::TrendingTokens => "trending_tokens",
        }
    }

    /// Partner API path, relative to the base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ToolName::AnalyseToken => "/partner/analyse",
            ToolName::Mindshare => "/partner/mindshare",
            ToolName::TokenInfo => "/partner/token-info",
            ToolName::MarketReport => "/partner/report",
            ToolName::KolAnalysis => "/partner/kol",
            ToolName::TrendingTokens => "/partner/trending-token",
        }
    }

    /// Prefix for failure text returned to the caller.
    pub fn error_label(&self) -> &'static str {
        match self {
            ToolName::AnalyseToken => "Error analyzing token",
            ToolName::Mindshare => "Error analyzing mindshare",
            ToolName::TokenInfo => "Error fetching token info",
            ToolName::MarketReport => "Error generating market report",
            ToolName::KolAnalysis => "Error analyzing KOL",
            ToolName::TrendingTokens => "Error fetching trending tokens",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ToolName::AnalyseToken => "Token Analysis",
            ToolName::Mindshare => "Mindshare Analysis",
            ToolName::TokenInfo => "Token Information",
            ToolName::MarketReport => "Market Reports",
            ToolName::KolAnalysis => "KOL Analysis",
            ToolName::TrendingTokens => "Trending Tokens",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::AnalyseToken => {
                "Performs comprehensive technical and fundamental analysis on a cryptocurrency token"
            }
            ToolName::Mindshare => {
                "Analyzes social media sentiment and trending discussions about a token over the last 24 hours"
            }
            ToolName::TokenInfo => {
                "Retrieves detailed token holder information and on-chain analysis"
            }
            ToolName::MarketReport => {
                "Generates specialized market reports based on different analysis modes"
            }
            ToolName::KolAnalysis => {
                "Analyzes the influence and statistics of cryptocurrency influencers on X (Twitter)"
            }
            ToolName::TrendingTokens => {
                "Retrieves the top trending tokens in the last 24 hours based on social media mentions and activity"
            }
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = ToolName::ALL.iter().map(ToolName::as_str).collect();
        write!(
            f,
            "unknown tool `{}` (expected one of: {})",
            self.0,
            known.join(", ")
        )
    }
}

impl std::error::Error for UnknownTool {}

impl FromStr for ToolName {
    type Err = UnknownTool;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let bare = trimmed.strip_prefix(TOOL_ALIAS_PREFIX).unwrap_or(trimmed);
        let normalized = bare.replace('-', "_").to_ascii_lowercase();

        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == normalized)
            .ok_or_else(|| UnknownTool(value.to_string()))
    }
}
