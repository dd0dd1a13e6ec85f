use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
};
use metrics::counter;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::engine::Classifier;
use crate::error::{ApiError, GENERIC_FAILURE, PipelineError};
use crate::extract::{DocumentKind, PdfExtract, PdfPages};
use crate::pipeline::{format::render_failure, predict_email};
use crate::presets::{PRESETS, Preset};
use crate::types::{Attachment, EmailInput, PredictResponse, Prediction};
use crate::ui;

#[derive(Clone)]
pub struct AppState {
    classifier: Arc<dyn Classifier + Send + Sync>,
    pdf: Arc<dyn PdfPages>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier + Send + Sync>) -> Self {
        Self {
            classifier,
            pdf: Arc::new(PdfExtract),
        }
    }

    pub fn with_pdf(mut self, pdf: Arc<dyn PdfPages>) -> Self {
        self.pdf = pdf;
        self
    }

    async fn run(&self, input: EmailInput) -> Result<Prediction, PipelineError> {
        let result = predict_email(self.classifier.as_ref(), Arc::clone(&self.pdf), input).await;
        if let Err(err) = &result {
            counter!("triage_pipeline_failures_total").increment(1);
            tracing::error!(error = %err, "Prediction failed");
        }
        result
    }
}

/// Page, inference endpoint and presets. Metrics are layered on by the binary.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_handler).post(submit_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/examples", get(examples_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Collects the `subject`, `body` and `file` parts of a form submission.
/// A file part with no name and no content means nothing was chosen.
async fn read_form(mut multipart: Multipart) -> Result<EmailInput, ApiError> {
    let mut input = EmailInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::custom(e.status(), format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "subject" | "body" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::custom(e.status(), format!("Invalid field {name}: {e}")))?;
                if name == "subject" {
                    input.subject = text;
                } else {
                    input.body = text;
                }
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::custom(e.status(), format!("Invalid upload: {e}")))?;
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                if DocumentKind::from_filename(&filename).is_none() {
                    return Err(ApiError::unsupported_media_type(format!(
                        "Envie somente arquivos .txt ou .pdf (recebido: {filename})."
                    )));
                }
                input.attachment = Some(Attachment { filename, bytes });
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(input)
}

async fn index_handler() -> Html<String> {
    Html(ui::render_page("", "", None))
}

#[tracing::instrument(skip_all)]
async fn submit_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let input = match read_form(multipart).await {
        Ok(input) => input,
        Err(err) => {
            let output = render_failure(&err.message);
            return (err.status_code, Html(ui::render_page("", "", Some(&output))));
        }
    };

    let subject = input.subject.clone();
    let body = input.body.clone();
    match state.run(input).await {
        Ok(prediction) => (
            StatusCode::OK,
            Html(ui::render_page(&subject, &body, Some(&prediction.output))),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(ui::render_page(
                &subject,
                &body,
                Some(&render_failure(GENERIC_FAILURE)),
            )),
        ),
    }
}

#[tracing::instrument(skip_all)]
async fn predict_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    counter!("triage_api_requests_total").increment(1);
    let input = read_form(multipart).await?;
    let prediction = state.run(input).await?;

    let (label, probs) = match prediction.classification {
        Some(result) => (
            Some(result.label),
            Some(result.probabilities.iter().map(|&x| x as f64).collect()),
        ),
        None => (None, None),
    };

    Ok(Json(PredictResponse {
        id: format!("predict-{}", uuid::Uuid::new_v4().simple()),
        object: "prediction".to_string(),
        created: chrono::Utc::now().timestamp(),
        model: state.classifier.model_name().to_string(),
        output: prediction.output,
        label,
        probs,
    }))
}

async fn examples_handler() -> Json<&'static [Preset]> {
    Json(&PRESETS)
}
