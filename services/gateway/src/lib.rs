//! Gateway for the companion-matching service
//!
//! The boundary between the publish-subscribe bus and the two engines:
//! inbound commands are decoded into a closed tagged enum, executed
//! synchronously, and answered with exactly one outbound result per
//! correlation id. The bus transport itself (subscription loop,
//! reconnect, delivery guarantees) lives outside this crate; so does the
//! relational persistence behind the repository traits.
//!
//! # Modules
//! - `commands`: inbound wire shapes
//! - `results`: outbound topics, message strings, and payload shapes
//! - `dispatcher`: command execution and result publication

pub mod commands;
pub mod dispatcher;
pub mod results;

pub use commands::{Command, InboundMessage};
pub use dispatcher::Dispatcher;
pub use results::ResultPublisher;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
