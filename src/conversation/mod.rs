//! Philosopher conversations: input normalization, prompts, chains, the
//! workflow state machine and the service that callers use.

pub mod chains;
pub mod normalize;
pub mod persona;
pub mod prompts;
pub mod service;
pub mod state;
pub mod workflow;

pub use chains::{ResponseChain, SummaryChain};
pub use normalize::{normalize, normalize_json, MessageInput, MessageRecord};
pub use persona::Persona;
pub use service::ConversationService;
pub use state::ConversationState;
pub use workflow::{Node, Workflow, WorkflowEvent, WorkflowEventSink, WorkflowRun};
