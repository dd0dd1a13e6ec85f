use crate::error::TriageError;
use crate::types::Label;

const SUCCESS_MARKER: &str = "✅";
const FAILURE_MARKER: &str = "❌";
const NO_SUBJECT: &str = "Não foi enviado um assunto.";

impl Label {
    fn marker(&self) -> &'static str {
        match self {
            Self::Produtivo => SUCCESS_MARKER,
            Self::Improdutivo => FAILURE_MARKER,
        }
    }

    /// Suggested reply for an e-mail with this label.
    pub fn canned_reply(&self) -> &'static str {
        match self {
            Self::Produtivo => {
                "Obrigado pelo contato.\nEm breve a sua mensagem será respondida. Aguarde!\n\nAtenciosamente, Fulano de Tal."
            }
            Self::Improdutivo => "Olá! A sua mensagem foi recebida. Muito obrigado!",
        }
    }
}

/// Markdown shown for a classified e-mail.
pub fn render_result(label: Label, subject: &str, body: &str) -> String {
    let mut out = format!(
        "## Resultado: {} {}\n\n",
        label.marker(),
        label.as_str().to_uppercase()
    );

    if subject.trim().is_empty() {
        out.push_str(&format!("- **Assunto recebido:** {NO_SUBJECT}\n\n"));
    } else {
        out.push_str(&format!("- **Assunto recebido:** {subject}\n\n"));
    }
    out.push_str(&format!("- **Conteúdo recebido:** \n\n\"{body}\"\n\n"));
    out.push_str(&format!(
        "### Sugestão de resposta:\n{}\n\n",
        label.canned_reply()
    ));
    out
}

/// Markdown for any message shown in place of a result.
pub fn render_failure(message: &str) -> String {
    format!("## {FAILURE_MARKER} Erro: {message}")
}

/// Markdown shown when the submission was rejected.
pub fn render_error(err: &TriageError) -> String {
    render_failure(&err.to_string())
}
