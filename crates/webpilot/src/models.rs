//! These models represent the objects passed around by the agent
//!
//! There are a few different related formats we need to interact with:
//! - anthropic messages/tools, sent from the agent to the LLM
//! - tool calls, sent from the agent to the browser system
//! - tool outcomes, returned by the browser system and fed back to the LLM
//!
//! We always immediately convert the wire formats into the internal structs using
//! to/from helpers, so the internal models are not an exact match to any of them.
pub mod content;
pub mod conversation;
pub mod message;
pub mod role;
pub mod tool;
