const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const PREDICTION_SLOT: &str = "{{ prediction }}";

/// Renders the form page, with the outcome message below the form if given.
pub fn render_index(prediction: Option<&str>) -> String {
    let block = match prediction {
        Some(message) => format!(
            "  <div class=\"result\" id=\"prediction\">{}</div>",
            escape_html(message)
        ),
        None => String::new(),
    };
    INDEX_TEMPLATE.replacen(PREDICTION_SLOT, &block, 1)
}

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_page_has_no_result_block() {
        let page = render_index(None);
        assert!(page.contains("<form action=\"/predict\" method=\"post\">"));
        assert!(!page.contains("class=\"result\""));
        assert!(!page.contains(PREDICTION_SLOT));
    }

    #[test]
    fn form_names_every_column() {
        let page = render_index(None);
        for column in crate::models::COLUMNS {
            assert!(page.contains(&format!("name=\"{column}\"")), "{column}");
        }
    }

    #[test]
    fn message_is_escaped() {
        let page = render_index(Some("<script>alert('x')</script> & more"));
        assert!(page.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
        assert!(!page.contains("<script>"));
    }
}
