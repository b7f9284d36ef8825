use anyhow::{Context, Result};
use maiga::MaigaRestClient;
use maiga_core::ToolName;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::kol::KolAnalysisRequest;
use crate::market::MarketReportRequest;
use crate::token::{TokenRequest, TrendingTokensRequest};

/// A decoded tool invocation; serializes to the exact body posted upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolRequest {
    AnalyseToken(TokenRequest),
    Mindshare(TokenRequest),
    TokenInfo(TokenRequest),
    MarketReport(MarketReportRequest),
    KolAnalysis(KolAnalysisRequest),
    TrendingTokens(TrendingTokensRequest),
}

impl ToolRequest {
    /// Decode raw JSON arguments for `tool` against its typed schema.
    ///
    /// `null` is accepted as "no arguments". Only the shape is checked; values such as an
    /// empty identifier are forwarded for the partner API to judge.
    pub fn from_arguments(tool: ToolName, arguments: Value) -> Result<Self> {
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        Ok(match tool {
            ToolName::AnalyseToken => ToolRequest::AnalyseToken(decode(tool, arguments)?),
            ToolName::Mindshare => ToolRequest::Mindshare(decode(tool, arguments)?),
            ToolName::TokenInfo => ToolRequest::TokenInfo(decode(tool, arguments)?),
            ToolName::MarketReport => ToolRequest::MarketReport(decode(tool, arguments)?),
            ToolName::KolAnalysis => ToolRequest::KolAnalysis(decode(tool, arguments)?),
            ToolName::TrendingTokens => ToolRequest::TrendingTokens(decode(tool, arguments)?),
        })
    }

    pub fn tool(&self) -> ToolName {
        match self {
            ToolRequest::AnalyseToken(_) => ToolName::AnalyseToken,
            ToolRequest::Mindshare(_) => ToolName::Mindshare,
            ToolRequest::TokenInfo(_) => ToolName::TokenInfo,
            ToolRequest::MarketReport(_) => ToolName::MarketReport,
            ToolRequest::KolAnalysis(_) => ToolName::KolAnalysis,
            ToolRequest::TrendingTokens(_) => ToolName::TrendingTokens,
        }
    }
}

fn decode<T>(tool: ToolName, arguments: Value) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(arguments).with_context(|| format!("invalid arguments for `{tool}`"))
}

/// Run one tool call and wrap the outcome as a single text content item.
///
/// Failures never escape as protocol errors; they come back as labelled text.
pub async fn invoke_tool(client: &MaigaRestClient, request: &ToolRequest) -> CallToolResult {
    let text = invoke_tool_text(client, request).await;
    CallToolResult::success(vec![Content::text(text)])
}

pub async fn invoke_tool_text(client: &MaigaRestClient, request: &ToolRequest) -> String {
    let tool = request.tool();
    let outcome = client
        .post(tool.endpoint(), request)
        .await
        .map_err(anyhow::Error::from)
        .and_then(|value| render_json(&value));

    match outcome {
        Ok(text) => {
            info!(%tool, "tool call succeeded");
            text
        }
        Err(err) => {
            warn!(%tool, error = %err, "tool call failed");
            format!("{}: {err}", tool.error_label())
        }
    }
}

/// Two-space indented JSON, keys in the order the upstream sent them.
pub fn render_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to render API response")
}
