pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use app::{configure, AppState};
pub use client::{ClientError, EmbedClient};
pub use config::{Config, ConfigError};
pub use error::{ApiError, ProviderError};
pub use model::{EmbedRequest, EmbedResponse, ErrorResponse, Inputs};
pub use provider::{BertProvider, EmbeddingProvider, ModelSource, PretrainedModel};
