//! # Anthropic Messages API Client
//!
//! Small, non-streaming client for the Anthropic Messages API. The chatbot
//! only needs a single short text reply per visitor message, so tool use and
//! streaming are not supported.
//!
//! ## Example
//!
//! ```no_run
//! use dudu_hub_anthropic::{AnthropicClient, Message, MessagesRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client from ANTHROPIC_API_KEY environment variable
//!     let client = AnthropicClient::from_env()?;
//!
//!     let request = MessagesRequest::new(vec![Message::user("Hello, Panda Bot!")])
//!         .with_max_tokens(250)
//!         .with_temperature(0.8);
//!
//!     let response = client.messages(request).await?;
//!     println!("Response: {}", response.text());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod messages;
pub mod types;

// Re-export main types for convenience
pub use client::AnthropicClient;
pub use error::ClaudeError;
pub use messages::{MessagesRequest, MessagesResponse};
pub use types::{ContentBlock, Message, Role, StopReason, Usage};
