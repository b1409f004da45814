pub mod dispatcher;
pub mod tools;

pub use dispatcher::{BatchRecord, Dispatcher, PendingInvocation, PoolStatus};
pub use tools::{ToolInfo, ToolReply, ToolService};
