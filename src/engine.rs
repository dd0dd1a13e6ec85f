use anyhow::Result;
use async_trait::async_trait;

/// Sequence classifier over the two triage labels.
///
/// Returns probabilities in model order: index 0 is `Improdutivo`, index 1 is
/// `Produtivo`. Implementations own truncation to their maximum input length.
#[async_trait]
pub trait Classifier {
    async fn classify(&self, text: &str) -> Result<[f32; 2]>;

    fn model_name(&self) -> &str;
}
