use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use rust_bert::pipelines::sentence_embeddings::{
    SentenceEmbeddingsBuilder, SentenceEmbeddingsModel, SentenceEmbeddingsModelType,
};

use crate::error::ProviderError;

/// Turns an ordered batch of texts into one vector per text, same order.
///
/// Implementations are shared by every request handler, so they must be
/// safe to call from several worker threads at once.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// Calls `provider` and checks that it produced exactly one vector per input.
pub fn embed_checked(
    provider: &dyn EmbeddingProvider,
    inputs: &[String],
) -> Result<Vec<Vec<f32>>, ProviderError> {
    let embeddings = provider.embed(inputs)?;
    if embeddings.len() != inputs.len() {
        return Err(ProviderError::CountMismatch {
            expected: inputs.len(),
            actual: embeddings.len(),
        });
    }
    Ok(embeddings)
}

/// Where the sentence-embedding weights come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// A pre-trained model fetched (and cached) by name.
    Pretrained(PretrainedModel),
    /// A directory laid out the way `SentenceEmbeddingsBuilder::local` expects.
    Local(PathBuf),
}

/// Pre-trained sentence-embedding models known to rust-bert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PretrainedModel {
    AllMiniLmL6V2,
    AllMiniLmL12V2,
    AllDistilrobertaV1,
    BertBaseNliMeanTokens,
    DistiluseBaseMultilingualCased,
    ParaphraseAlbertSmallV2,
    SentenceT5Base,
}

impl PretrainedModel {
    pub const ALL: [PretrainedModel; 7] = [
        PretrainedModel::AllMiniLmL6V2,
        PretrainedModel::AllMiniLmL12V2,
        PretrainedModel::AllDistilrobertaV1,
        PretrainedModel::BertBaseNliMeanTokens,
        PretrainedModel::DistiluseBaseMultilingualCased,
        PretrainedModel::ParaphraseAlbertSmallV2,
        PretrainedModel::SentenceT5Base,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PretrainedModel::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            PretrainedModel::AllMiniLmL12V2 => "all-MiniLM-L12-v2",
            PretrainedModel::AllDistilrobertaV1 => "all-distilroberta-v1",
            PretrainedModel::BertBaseNliMeanTokens => "bert-base-nli-mean-tokens",
            PretrainedModel::DistiluseBaseMultilingualCased => {
                "distiluse-base-multilingual-cased"
            }
            PretrainedModel::ParaphraseAlbertSmallV2 => "paraphrase-albert-small-v2",
            PretrainedModel::SentenceT5Base => "sentence-t5-base",
        }
    }

    fn model_type(self) -> SentenceEmbeddingsModelType {
        match self {
            PretrainedModel::AllMiniLmL6V2 => SentenceEmbeddingsModelType::AllMiniLmL6V2,
            PretrainedModel::AllMiniLmL12V2 => SentenceEmbeddingsModelType::AllMiniLmL12V2,
            PretrainedModel::AllDistilrobertaV1 => SentenceEmbeddingsModelType::AllDistilrobertaV1,
            PretrainedModel::BertBaseNliMeanTokens => {
                SentenceEmbeddingsModelType::BertBaseNliMeanTokens
            }
            PretrainedModel::DistiluseBaseMultilingualCased => {
                SentenceEmbeddingsModelType::DistiluseBaseMultilingualCased
            }
            PretrainedModel::ParaphraseAlbertSmallV2 => {
                SentenceEmbeddingsModelType::ParaphraseAlbertSmallV2
            }
            PretrainedModel::SentenceT5Base => SentenceEmbeddingsModelType::SentenceT5Base,
        }
    }
}

impl FromStr for PretrainedModel {
    type Err = String;

    // accepts the bare name or the hub-style "sentence-transformers/<name>"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix("sentence-transformers/").unwrap_or(name);
        PretrainedModel::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| s.to_owned())
    }
}

/// rust-bert backed provider.
pub struct BertProvider {
    model: Mutex<SentenceEmbeddingsModel>,
}

impl BertProvider {
    /// Loads the model. Blocking: downloads weights on first use of a
    /// pre-trained model, so call it off the async executor.
    pub fn load(source: &ModelSource) -> Result<Self, ProviderError> {
        let model = match source {
            ModelSource::Pretrained(m) => {
                tracing::info!(model = m.name(), "loading pre-trained sentence embeddings model");
                SentenceEmbeddingsBuilder::remote(m.model_type()).create_model()?
            }
            ModelSource::Local(path) => {
                tracing::info!(path = %path.display(), "loading local sentence embeddings model");
                SentenceEmbeddingsBuilder::local(path.clone()).create_model()?
            }
        };

        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl EmbeddingProvider for BertProvider {
    fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        // the model is never mutated, so a panic in an earlier call leaves it usable
        let model = self.model.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            tracing::warn!("recovering sentence embeddings model after a panicked inference");
            poisoned.into_inner()
        });

        Ok(model.encode(inputs)?)
    }
}
