//! Core types & traits: tool contracts, the transport seam and the protocol
//! response shape.

pub mod content;
pub mod error;
pub mod tool;
pub mod transport;

pub use content::{ContentBlock, ProtocolResponse};
pub use error::AdapterError;
pub use tool::{Handler, HandlerFuture, ParamKind, ParameterSpec, ToolArgs, ToolResult, ToolSpec};
pub use transport::{Query, Transport, TransportResult};
