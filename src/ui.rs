//! Server-rendered form page.

use pulldown_cmark::{CowStr, Event, Parser, Tag, html};

use crate::extract::ACCEPTED_EXTENSIONS;
use crate::presets::PRESETS;

const TITLE: &str = "Triage - Classificador de e-mails";
const INTRO: &str = "Olá, esse é o Triage: um classificador de e-mails produtivos e improdutivos. \
    O modelo principal foi refinado (fine-tuning) com base no modelo DistilBERT base multilingual (cased) \
    e é especializado na classificação (produtivo ou improdutivo) de e-mails ou arquivos.";

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Relative destinations and the schemes in `SAFE_SCHEMES` pass. Browsers
/// ignore ASCII whitespace and control characters inside a scheme, so those
/// are dropped before checking.
fn is_safe_destination(url: &str) -> bool {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    match cleaned.split_once(':') {
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => SAFE_SCHEMES
            .iter()
            .any(|safe| scheme.eq_ignore_ascii_case(safe)),
        _ => true,
    }
}

fn neutralize<'a>(dest_url: CowStr<'a>) -> CowStr<'a> {
    if is_safe_destination(&dest_url) {
        dest_url
    } else {
        CowStr::Borrowed("#")
    }
}

/// Renders pipeline Markdown to HTML. Raw HTML in the e-mail is shown as text
/// and links or images pointing at other schemes lose their destination.
pub fn markdown_to_html(markdown: &str) -> String {
    let events = Parser::new(markdown).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

fn preset_buttons() -> String {
    PRESETS
        .iter()
        .map(|preset| {
            format!(
                r#"<button type="button" class="preset" data-subject="{}" data-body="{}">{}</button>"#,
                escape_html(preset.subject),
                escape_html(preset.body),
                escape_html(preset.subject),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full page. `output` is the Markdown produced for the last submission.
pub fn render_page(subject: &str, body: &str, output: Option<&str>) -> String {
    let output_html = output.map(markdown_to_html).unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>{TITLE}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
.row {{ display: flex; gap: 2rem; }}
.col {{ flex: 1; }}
label {{ display: block; margin-top: 1rem; }}
input[type=text], textarea {{ width: 100%; }}
.preset {{ display: block; margin: 0.25rem 0; text-align: left; }}
</style>
</head>
<body>
<h1>{TITLE}</h1>
<h3>{INTRO}</h3>
<div class="row">
<div class="col">
<form method="post" action="/" enctype="multipart/form-data">
<label>Assunto do e-mail
<input type="text" id="subject" name="subject" placeholder="Digite o assunto do e-mail" value="{subject}">
</label>
<label>Conteúdo do e-mail
<textarea id="body" name="body" rows="5" placeholder="Digite o conteúdo do e-mail">{body}</textarea>
</label>
<label>Anexar arquivo (.txt ou .pdf)
<input type="file" name="file" accept="{ACCEPTED_EXTENSIONS}">
</label>
<p><button type="submit">Classificar</button></p>
</form>
</div>
<div class="col" id="output">
{output_html}
</div>
</div>
<h3>Exemplos</h3>
{presets}
<script>
document.querySelectorAll('.preset').forEach(function (button) {{
  button.addEventListener('click', function () {{
    document.getElementById('subject').value = button.dataset.subject;
    document.getElementById('body').value = button.dataset.body;
  }});
}});
</script>
</body>
</html>
"#,
        subject = escape_html(subject),
        body = escape_html(body),
        presets = preset_buttons(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::format::render_result;
    use crate::types::Label;

    #[test]
    fn markdown_headings_and_lists_render() {
        let html = markdown_to_html("## Resultado: ✅ PRODUTIVO\n\n- **Assunto recebido:** Oi\n");
        assert!(html.contains("<h2>Resultado: ✅ PRODUTIVO</h2>"));
        assert!(html.contains("<strong>Assunto recebido:</strong>"));
    }

    #[test]
    fn raw_html_in_email_is_escaped() {
        let html = markdown_to_html("\"<script>alert(1)</script>\"\n\n<img src=x onerror=alert(1)>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn script_links_in_email_lose_their_target() {
        let html = markdown_to_html(&render_result(
            Label::Produtivo,
            "",
            "[clique aqui](javascript:alert(document.cookie))",
        ));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("<a href=\"#\">clique aqui</a>"));
    }

    /// Values of every `href` and `src` attribute in `html`.
    fn destinations(html: &str) -> Vec<&str> {
        ["href=\"", "src=\""]
            .iter()
            .flat_map(|attr| {
                html.split(attr)
                    .skip(1)
                    .map(|rest| rest.split('"').next().unwrap_or(""))
            })
            .collect()
    }

    #[test]
    fn other_schemes_are_dropped() {
        for markdown in [
            "[x](JavaScript:alert(1))",
            "[x](data:text/html;base64,PHNjcmlwdD4=)",
            "<vbscript:msgbox(1)>",
            "![img](javascript:alert(1))",
            "[x][ref]\n\n[ref]: javascript:alert(1)",
        ] {
            let html = markdown_to_html(markdown);
            let dests = destinations(&html);
            assert!(!dests.is_empty(), "{markdown} -> {html}");
            assert!(dests.iter().all(|d| *d == "#"), "{markdown} -> {html}");
        }
    }

    #[test]
    fn whitespace_inside_scheme_does_not_hide_it() {
        assert!(!is_safe_destination("java\tscript:alert(1)"));
        assert!(!is_safe_destination(" javascript:alert(1)"));
        assert!(!is_safe_destination("java\nscript:alert(1)"));
        assert!(is_safe_destination("relatorios/2024:q1.pdf"));
    }

    #[test]
    fn web_and_mail_links_are_kept() {
        let html = markdown_to_html(
            "[site](https://example.com/a?b=1) [mail](mailto:rh@example.com) [doc](/relatorio.pdf)",
        );
        assert!(html.contains("href=\"https://example.com/a?b=1\""));
        assert!(html.contains("href=\"mailto:rh@example.com\""));
        assert!(html.contains("href=\"/relatorio.pdf\""));
    }

    #[test]
    fn form_values_are_escaped() {
        let page = render_page("\"><b>", "</textarea>", None);
        assert!(page.contains("value=\"&quot;&gt;&lt;b&gt;\""));
        assert!(page.contains("&lt;/textarea&gt;</textarea>"));
    }

    #[test]
    fn page_offers_presets_and_upload_types() {
        let page = render_page("", "", None);
        assert_eq!(page.matches("class=\"preset\"").count(), PRESETS.len());
        assert!(page.contains("accept=\".txt,.pdf\""));
    }

    #[test]
    fn output_area_holds_rendered_result() {
        let page = render_page("", "", Some("## ❌ Erro: algo"));
        assert!(page.contains("<h2>❌ Erro: algo</h2>"));
    }
}
