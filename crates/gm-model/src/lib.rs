//! Model clients for the Game Master
//!
//! `BedrockModel` talks to the Amazon Bedrock runtime using the Anthropic
//! messages schema. `OfflineModel` is the explicitly configured degraded
//! mode. Both implement `gm_core::ModelClient`.

pub mod bedrock;
pub mod factory;
pub mod offline;
pub mod types;

pub use bedrock::BedrockModel;
pub use factory::create_model;
pub use offline::OfflineModel;
pub use types::{BedrockSettings, InvokeRequest, InvokeResponse, build_payload, parse_response};
