//! Tool registry and executor: the agent-facing invocation surface.

pub mod calendar_tools;
pub mod executor;
pub mod invocation;
pub mod registry;
pub mod schema;

pub use calendar_tools::register_calendar_tools;
pub use executor::{execute_tool, ExecutionResult};
pub use invocation::{InvocationStatus, ToolInvocation};
pub use registry::ToolRegistry;
pub use schema::{validate_schema, ToolContext, ToolDefinition, ToolHandler};
