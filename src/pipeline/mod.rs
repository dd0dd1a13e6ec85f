//! Request pipeline: resolve the content source, build the model input,
//! classify, and format the answer.

pub mod format;
pub mod input;

use metrics::counter;
use std::sync::Arc;

use crate::engine::Classifier;
use crate::error::PipelineError;
use crate::extract::PdfPages;
use crate::types::{ClassificationResult, EmailInput, Prediction};

pub use input::EffectiveContent;

/// Text handed to the classifier. No escaping; subject may be empty.
pub fn model_input(subject: &str, body: &str) -> String {
    format!("SUBJECT: {subject} BODY: {body}")
}

/// Runs one submission through the pipeline.
///
/// Rejected input yields a rendered error message, not an `Err`. Extraction
/// and classifier failures are returned to the caller.
#[tracing::instrument(skip_all, fields(has_attachment = input.attachment.is_some()))]
pub async fn predict_email(
    classifier: &(dyn Classifier + Send + Sync),
    pdf: Arc<dyn PdfPages>,
    input: EmailInput,
) -> Result<Prediction, PipelineError> {
    let content = match input::resolve(input, pdf).await? {
        Ok(content) => content,
        Err(err) => {
            counter!("triage_validation_errors_total", "kind" => err.kind()).increment(1);
            tracing::info!(reason = err.kind(), "Submission rejected");
            return Ok(Prediction {
                output: format::render_error(&err),
                classification: None,
            });
        }
    };

    let text = model_input(&content.subject, &content.body);
    let probabilities = classifier
        .classify(&text)
        .await
        .map_err(PipelineError::Classify)?;
    let result = ClassificationResult::from_probabilities(probabilities);

    counter!("triage_predictions_total", "label" => result.label.as_str()).increment(1);
    tracing::info!(label = %result.label, probs = ?result.probabilities, "E-mail classified");

    Ok(Prediction {
        output: format::render_result(result.label, &content.subject, &content.body),
        classification: Some(result),
    })
}
