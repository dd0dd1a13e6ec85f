use bytes::Bytes;
use serde::Serialize;

/// The two labels the model was fine-tuned on, in the order of its output logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Improdutivo = 0,
    Produtivo = 1,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Improdutivo, Label::Produtivo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improdutivo => "Improdutivo",
            Self::Produtivo => "Produtivo",
        }
    }

    /// Index of the first maximum. An exact tie resolves to `Improdutivo`.
    pub fn from_probabilities(probs: &[f32; 2]) -> Self {
        let mut best = 0;
        for (index, &p) in probs.iter().enumerate().skip(1) {
            if p > probs[best] {
                best = index;
            }
        }
        Self::ALL[best]
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub probabilities: [f32; 2],
}

impl ClassificationResult {
    pub fn from_probabilities(probabilities: [f32; 2]) -> Self {
        Self {
            label: Label::from_probabilities(&probabilities),
            probabilities,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Bytes,
}

/// One submission from the form or the API. Typed text and attachment are
/// mutually exclusive content sources.
#[derive(Debug, Clone, Default)]
pub struct EmailInput {
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

/// What the pipeline hands back to the UI: Markdown, plus the model decision
/// when the input got as far as the classifier.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub output: String,
    pub classification: Option<ClassificationResult>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probs: Option<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_probability_wins() {
        assert_eq!(Label::from_probabilities(&[0.9, 0.1]), Label::Improdutivo);
        assert_eq!(Label::from_probabilities(&[0.1, 0.9]), Label::Produtivo);
    }

    #[test]
    fn exact_tie_goes_to_first_label() {
        assert_eq!(Label::from_probabilities(&[0.5, 0.5]), Label::Improdutivo);
    }

    #[test]
    fn nan_never_displaces_first_label() {
        assert_eq!(
            Label::from_probabilities(&[0.3, f32::NAN]),
            Label::Improdutivo
        );
    }

    #[test]
    fn result_keeps_probabilities_in_model_order() {
        let result = ClassificationResult::from_probabilities([0.2, 0.8]);
        assert_eq!(result.label, Label::Produtivo);
        assert_eq!(result.probabilities, [0.2, 0.8]);
    }

    #[test]
    fn label_serializes_as_name() {
        let json = serde_json::to_string(&Label::Produtivo).unwrap();
        assert_eq!(json, "\"Produtivo\"");
    }
}
