use anyhow::{anyhow, Result};
use maiga::MaigaRestClient;
use maiga_core::config::AppConfig;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use tracing::info;

use crate::dispatch::{invoke_tool, ToolRequest};
use crate::kol::KolAnalysisRequest;
use crate::market::MarketReportRequest;
use crate::token::{TokenRequest, TrendingTokensRequest};

/// MCP server exposing the Maiga partner API as six tools.
///
/// Holds no mutable state; concurrent calls share the same client.
#[derive(Clone)]
pub struct MaigaServer {
    client: MaigaRestClient,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl MaigaServer {
    pub fn new(client: MaigaRestClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(MaigaRestClient::from_config(config)?))
    }

    async fn call(&self, request: ToolRequest) -> Result<CallToolResult, McpError> {
        Ok(invoke_tool(&self.client, &request).await)
    }

    #[tool(
        name = "analyse_token",
        description = "Performs comprehensive technical and fundamental analysis on a cryptocurrency token"
    )]
    async fn analyse_token(
        &self,
        Parameters(request): Parameters<TokenRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::AnalyseToken(request)).await
    }

    #[tool(
        name = "mindshare",
        description = "Analyzes social media sentiment and trending discussions about a token over the last 24 hours"
    )]
    async fn mindshare(
        &self,
        Parameters(request): Parameters<TokenRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::Mindshare(request)).await
    }

    #[tool(
        name = "token_info",
        description = "Retrieves detailed token holder information and on-chain analysis"
    )]
    async fn token_info(
        &self,
        Parameters(request): Parameters<TokenRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::TokenInfo(request)).await
    }

    #[tool(
        name = "market_report",
        description = "Generates specialized market reports based on different analysis modes"
    )]
    async fn market_report(
        &self,
        Parameters(request): Parameters<MarketReportRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::MarketReport(request)).await
    }

    #[tool(
        name = "kol_analysis",
        description = "Analyzes the influence and statistics of cryptocurrency influencers on X (Twitter)"
    )]
    async fn kol_analysis(
        &self,
        Parameters(request): Parameters<KolAnalysisRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::KolAnalysis(request)).await
    }

    #[tool(
        name = "trending_tokens",
        description = "Retrieves the top trending tokens in the last 24 hours based on social media mentions and activity"
    )]
    async fn trending_tokens(&self) -> Result<CallToolResult, McpError> {
        self.call(ToolRequest::TrendingTokens(TrendingTokensRequest::default()))
            .await
    }
}

#[tool_handler]
impl ServerHandler for MaigaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Maiga API: token analysis, mindshare, token info, market reports, KOL stats and trending tokens."
                    .into(),
            ),
            ..ServerInfo::default()
        }
    }
}

impl MaigaServer {
    /// Run the server over stdio transport and wait until the peer disconnects.
    pub async fn serve_stdio(self) -> Result<()> {
        info!(base_url = %self.client.base_url(), "starting Maiga MCP server on stdio");

        let service = self
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|err| anyhow!(err))?;

        service.waiting().await.map_err(|err| anyhow!(err))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maiga_core::ToolName;

    #[test]
    fn router_lists_every_tool_with_its_description() {
        let client = MaigaRestClient::new("http://localhost", "t").unwrap();
        let server = MaigaServer::new(client);

        let tools = server.tool_router.list_all();
        assert_eq!(tools.len(), ToolName::ALL.len());

        for name in ToolName::ALL {
            let tool = tools
                .iter()
                .find(|tool| tool.name == name.as_str())
                .unwrap_or_else(|| panic!("missing tool {name}"));
            assert_eq!(tool.description.as_deref(), Some(name.description()));
        }
    }

    #[test]
    fn market_report_schema_lists_modes() {
        let client = MaigaRestClient::new("http://localhost", "t").unwrap();
        let server = MaigaServer::new(client);

        let tool = server
            .tool_router
            .list_all()
            .into_iter()
            .find(|tool| tool.name == "market_report")
            .unwrap();
        let schema = serde_json::to_string(&tool.input_schema).unwrap();
        for mode in ["Market_Behavior", "Open_Interest", "Multi_Timeframe", "Fund_Flow"] {
            assert!(schema.contains(mode), "{mode} missing from {schema}");
        }
    }
}
