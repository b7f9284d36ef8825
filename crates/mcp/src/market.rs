use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Analysis mode accepted by the market report endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub enum ReportMode {
    #[serde(rename = "Market_Behavior")]
    MarketBehavior,
    #[serde(rename = "Open_Interest")]
    OpenInterest,
    #[serde(rename = "Multi_Timeframe")]
    MultiTimeframe,
    #[serde(rename = "Fund_Flow")]
    FundFlow,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::MarketBehavior => "Market_Behavior",
            ReportMode::OpenInterest => "Open_Interest",
            ReportMode::MultiTimeframe => "Multi_Timeframe",
            ReportMode::FundFlow => "Fund_Flow",
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MarketReportRequest {
    /// Analysis mode: Market_Behavior, Open_Interest, Multi_Timeframe, or Fund_Flow
    pub mode: ReportMode,
}

impl MarketReportRequest {
    pub fn new(mode: ReportMode) -> Self {
        Self { mode }
    }
}
