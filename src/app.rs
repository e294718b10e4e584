use std::sync::Arc;

use actix_web::{post, web, HttpResponse};

use crate::{
    error::{ApiError, ProviderError},
    model::{EmbedRequest, EmbedResponse},
    provider::{embed_checked, EmbeddingProvider},
};

pub struct AppState {
    pub provider: Arc<dyn EmbeddingProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }
}

#[post("/embed")]
async fn embed(
    app: web::Data<AppState>,
    req: web::Json<EmbedRequest>,
) -> Result<HttpResponse, ApiError> {
    let inputs = req.into_inner().inputs.into_vec();
    tracing::debug!(inputs = inputs.len(), "embedding request");

    let provider = Arc::clone(&app.provider);
    let embeddings = web::block(move || embed_checked(provider.as_ref(), &inputs))
        .await
        .map_err(|err| ProviderError::Task(err.to_string()))??;

    Ok(HttpResponse::Ok().json(EmbedResponse { embeddings }))
}

/// JSON extractor settings for `/embed`: no `Content-Type` requirement and
/// every decoding failure reported through [`ApiError`].
pub fn json_config(max_body: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_body)
        .content_type_required(false)
        .content_type(|_| true)
        .error_handler(move |err, _req| {
            let err = ApiError::from_json_payload(err, max_body);
            tracing::debug!(error = %err, "rejected embed request");
            err.into()
        })
}

/// Registers the embedding route and its extractor config.
pub fn configure(max_body: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(json_config(max_body)).service(embed);
    }
}
