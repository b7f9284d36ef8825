pub mod dispatch;
pub mod kol;
pub mod market;
pub mod server;
pub mod token;

pub use dispatch::{invoke_tool, invoke_tool_text, ToolRequest};
pub use server::MaigaServer;
