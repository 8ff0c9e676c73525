//! deskbridge-mcp: exposes the Deskbridge knowledge base, approval workflow
//! and request queue to MCP clients as schema-validated tools.

pub mod cli;
pub mod clients;
pub mod core;
pub mod infra;
pub mod tools;
