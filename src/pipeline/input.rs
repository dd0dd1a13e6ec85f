use std::sync::Arc;

use crate::error::{ExtractError, TriageError};
use crate::extract::{PdfPages, extract_text};
use crate::types::EmailInput;

/// Subject and body the classifier will actually see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveContent {
    pub subject: String,
    pub body: String,
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Picks the content source for a submission.
///
/// Validation failures come back in the outer `Ok` so callers can render them;
/// only extraction failures are errors.
pub async fn resolve(
    input: EmailInput,
    pdf: Arc<dyn PdfPages>,
) -> Result<Result<EffectiveContent, TriageError>, ExtractError> {
    let EmailInput {
        subject,
        mut body,
        attachment,
    } = input;

    if let Some(attachment) = attachment {
        if !is_blank(&subject) || !is_blank(&body) {
            return Ok(Err(TriageError::ConflictingInput));
        }
        body = extract_text(&attachment, pdf).await?.unwrap_or_default();
    }

    if is_blank(&body) {
        return Ok(Err(TriageError::MissingBody));
    }

    Ok(Ok(EffectiveContent { subject, body }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::fixed_pages;
    use crate::types::Attachment;
    use bytes::Bytes;

    fn typed(subject: &str, body: &str) -> EmailInput {
        EmailInput {
            subject: subject.to_string(),
            body: body.to_string(),
            attachment: None,
        }
    }

    fn with_file(subject: &str, body: &str, filename: &str, bytes: &'static [u8]) -> EmailInput {
        EmailInput {
            subject: subject.to_string(),
            body: body.to_string(),
            attachment: Some(Attachment {
                filename: filename.to_string(),
                bytes: Bytes::from_static(bytes),
            }),
        }
    }

    fn no_pdf() -> Arc<dyn PdfPages> {
        fixed_pages(Vec::new())
    }

    #[tokio::test]
    async fn typed_text_passes_through_unchanged() {
        let content = resolve(typed("  Reunião ", " Podemos marcar?\n"), no_pdf())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(content.subject, "  Reunião ");
        assert_eq!(content.body, " Podemos marcar?\n");
    }

    #[tokio::test]
    async fn blank_subject_is_allowed() {
        let content = resolve(typed("", "Corpo"), no_pdf()).await.unwrap().unwrap();
        assert_eq!(content.subject, "");
    }

    #[tokio::test]
    async fn file_and_subject_conflict() {
        let result = resolve(with_file("Assunto", "", "a.txt", b"x"), no_pdf()).await.unwrap();
        assert_eq!(result, Err(TriageError::ConflictingInput));
    }

    #[tokio::test]
    async fn file_and_body_conflict() {
        let result = resolve(with_file("", "corpo", "a.txt", b"x"), no_pdf()).await.unwrap();
        assert_eq!(result, Err(TriageError::ConflictingInput));
    }

    #[tokio::test]
    async fn whitespace_typed_text_does_not_conflict_with_file() {
        let content = resolve(with_file(" ", "\n\t", "a.txt", b"conteudo"), no_pdf())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(content.body, "conteudo");
    }

    #[tokio::test]
    async fn blank_body_is_missing() {
        assert_eq!(
            resolve(typed("Assunto", "   \n"), no_pdf()).await.unwrap(),
            Err(TriageError::MissingBody)
        );
        assert_eq!(
            resolve(typed("", ""), no_pdf()).await.unwrap(),
            Err(TriageError::MissingBody)
        );
    }

    #[tokio::test]
    async fn txt_upload_matches_typing_the_same_body() {
        let text = "Olá RH,\nPreciso de uma cópia do aditivo.";
        let uploaded = resolve(with_file("", "", "mail.txt", text.as_bytes()), no_pdf())
            .await
            .unwrap()
            .unwrap();
        let typed = resolve(typed("", text), no_pdf()).await.unwrap().unwrap();
        assert_eq!(uploaded, typed);
    }

    #[tokio::test]
    async fn pdf_upload_uses_concatenated_pages() {
        let pages = fixed_pages(vec!["Página 1\n", "Página 2"]);
        let content = resolve(with_file("", "", "mail.pdf", b"%PDF"), pages)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(content.body, "Página 1\nPágina 2");
    }

    #[tokio::test]
    async fn empty_txt_upload_is_missing_body() {
        let result = resolve(with_file("", "", "mail.txt", b"  \n"), no_pdf()).await.unwrap();
        assert_eq!(result, Err(TriageError::MissingBody));
    }

    #[tokio::test]
    async fn unsupported_upload_is_missing_body() {
        let result = resolve(with_file("", "", "mail.eml", b"Subject: x"), no_pdf()).await.unwrap();
        assert_eq!(result, Err(TriageError::MissingBody));
    }

    #[tokio::test]
    async fn broken_txt_upload_propagates() {
        let err = resolve(with_file("", "", "mail.txt", &[0xc3, 0x28]), no_pdf()).await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUtf8 { .. }));
    }
}
