//! Swagger UI HTML generation.

const SWAGGER_UI_CDN: &str = "https://unpkg.com/swagger-ui-dist@5";

/// Generate the Swagger UI page that loads its document from `openapi_url`.
pub fn generate_swagger_html(title: &str, openapi_url: &str) -> String {
    let mut html = String::with_capacity(1500);
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>"#,
    );
    html.push_str(&escape_html(title));
    html.push_str(
        r#"</title>
    <link rel="stylesheet" href=""#,
    );
    html.push_str(SWAGGER_UI_CDN);
    html.push_str(
        r#"/swagger-ui.css">
    <style>
        body {
            margin: 0;
            padding: 0;
        }
        .swagger-ui .topbar {
            display: none;
        }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src=""#,
    );
    html.push_str(SWAGGER_UI_CDN);
    html.push_str(
        r#"/swagger-ui-bundle.js"></script>
    <script src=""#,
    );
    html.push_str(SWAGGER_UI_CDN);
    html.push_str(
        r#"/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: ""#,
    );
    html.push_str(&escape_html(openapi_url));
    html.push_str(
        r#"",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>"#,
    );
    html
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
