//! curl rendering of outgoing requests for dev-mode logging

use crate::request::{Body, FormPart};

const SEPARATOR: &str = " \\\n  ";

/// Render a request as a shell-pasteable curl command.
///
/// Pure: the same inputs always give the same string. Headers are shown
/// exactly as sent, Authorization included.
pub fn to_curl(method: &str, url: &str, headers: &[(String, String)], body: Option<&Body>) -> String {
    let mut parts = vec![format!("curl -X {method}"), format!("\"{url}\"")];

    for (name, value) in headers {
        parts.push(format!("-H \"{name}: {value}\""));
    }

    match body {
        Some(Body::Text(text)) => {
            let data = match serde_json::from_str::<serde_json::Value>(text) {
                Ok(value) => value.to_string(),
                Err(_) => text.clone(),
            };
            parts.push(format!("-d '{}'", escape_single_quotes(&data)));
        }
        Some(Body::Json(value)) => {
            parts.push(format!("-d '{}'", escape_single_quotes(&value.to_string())));
        }
        Some(Body::Form(form)) => {
            for part in form.parts() {
                match part {
                    FormPart::Text { name, value } => parts.push(format!("-F \"{name}={value}\"")),
                    FormPart::File {
                        name, file_name, ..
                    } => parts.push(format!("-F \"{name}=@{file_name}\"")),
                }
            }
        }
        None => {}
    }

    parts.join(SEPARATOR)
}

fn escape_single_quotes(data: &str) -> String {
    data.replace('\'', "'\\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::FormPayload;
    use serde_json::json;

    fn headers() -> Vec<(String, String)> {
        vec![
            ("accept".into(), "application/json".into()),
            ("Authorization".into(), "Bearer A1".into()),
        ]
    }

    #[test]
    fn renders_method_url_and_headers() {
        let cmd = to_curl("GET", "http://localhost:3000/customers", &headers(), None);
        assert_eq!(
            cmd,
            "curl -X GET \\\n  \"http://localhost:3000/customers\" \\\n  -H \"accept: application/json\" \\\n  -H \"Authorization: Bearer A1\""
        );
    }

    #[test]
    fn json_body_rendered_compact() {
        let body = Body::Json(json!({"name": "Acme"}));
        let cmd = to_curl("POST", "http://h/customers", &[], Some(&body));
        assert!(cmd.ends_with(r#"-d '{"name":"Acme"}'"#), "got: {cmd}");
    }

    #[test]
    fn text_json_is_reserialized() {
        let body = Body::Text("{ \"a\" : 1 }".into());
        let cmd = to_curl("POST", "http://h/x", &[], Some(&body));
        assert!(cmd.ends_with(r#"-d '{"a":1}'"#), "got: {cmd}");
    }

    #[test]
    fn plain_text_kept_and_quotes_escaped() {
        let body = Body::Text("it's raw".into());
        let cmd = to_curl("POST", "http://h/x", &[], Some(&body));
        assert!(cmd.ends_with(r#"-d 'it'\''s raw'"#), "got: {cmd}");
    }

    #[test]
    fn form_parts_rendered_as_flags() {
        let body = Body::Form(
            FormPayload::new()
                .text("title", "Q3")
                .file("doc", "q3.pdf", Some("application/pdf"), vec![1]),
        );
        let cmd = to_curl("POST", "http://h/upload", &[], Some(&body));
        assert!(cmd.contains("-F \"title=Q3\""));
        assert!(cmd.contains("-F \"doc=@q3.pdf\""));
        assert!(!cmd.contains("-d "));
    }

    #[test]
    fn output_is_stable() {
        let body = Body::Json(json!({"b": 2, "a": 1}));
        let first = to_curl("PUT", "http://h/x", &headers(), Some(&body));
        let second = to_curl("PUT", "http://h/x", &headers(), Some(&body));
        assert_eq!(first, second);
    }
}
