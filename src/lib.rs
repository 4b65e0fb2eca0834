//! Async client for the OpenAI HTTP API.
//!
//! ```no_run
//! use openai_client::{ImageSize, OpenAIClient};
//!
//! # async fn run() -> openai_client::Result<()> {
//! let client = OpenAIClient::from_env()?;
//! let results = client
//!     .images()
//!     .generate_image("A house riding a velociraptor", 1, ImageSize::Small)
//!     .await?;
//! for image in &results {
//!     println!("{}", image.key);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod openai;

pub use config::{OpenAIAuthentication, OpenAIClientSettings};
pub use error::{OpenAIError, Result};
pub use models::*;
pub use openai::{ChatEndPoint, EmbeddingsEndPoint, ImagesEndPoint, ModelsEndPoint, OpenAIClient};
