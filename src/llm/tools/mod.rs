pub mod ticket_tools;
mod tool;

pub use ticket_tools::{ticket_tools, ProjectTicketsTool, SearchTicketsTool};
pub use tool::{required_str, FunctionDescriptor, LlmTool, ToolDescriptor};
