use crate::server::api::{self, ApiError, AppContext};

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(context: &AppContext, method: &str, path: &str, body: &str) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(context),
        },
        ("GET", "/health") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/plain; charset=utf-8",
            body: "OK".to_string(),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/heroes") => respond(api::heroes_payload(context)),
        ("GET", "/api/config") => respond(api::config_payload(context)),
        ("POST", "/api/calculate") => respond(api::calculate_payload(context, body)),
        ("POST", "/api/sessions") => respond(api::create_session_payload(context)),
        (method, path) if path.starts_with("/api/sessions/") => {
            let rest = path.trim_start_matches("/api/sessions/");
            let mut segments = rest.split('/').filter(|segment| !segment.is_empty());
            let id = segments.next().unwrap_or("");
            let action = segments.next();
            if segments.next().is_some() {
                return error_response(404, "Not Found", "Route not found");
            }
            match (method, action) {
                ("GET", None) => respond(api::session_payload(context, id)),
                ("DELETE", None) => respond(api::delete_session_payload(context, id)),
                ("POST", Some("choose")) => respond(api::choose_payload(context, id, body)),
                ("POST", Some("back")) => respond(api::back_payload(context, id)),
                ("POST", Some("reset")) => respond(api::reset_payload(context, id)),
                ("GET", Some("result")) => respond(api::result_payload(context, id)),
                _ => error_response(404, "Not Found", "Route not found"),
            }
        }
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn respond(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(err) => {
            let (status_code, status_text) = err.status();
            if status_code >= 500 {
                log::warn!("request failed: {err}");
            }
            error_response(status_code, status_text, &err.to_string())
        }
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html(context: &AppContext) -> String {
    let heroes = context.catalog.len();
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Bear Hunt Rally Calculator</title>
</head>
<body>
  <h1>Bear Hunt Rally Calculator</h1>
  <p>Service is alive and running.</p>
  <ul>
    <li>{heroes} heroes with expedition skills</li>
    <li>Multiplicative bonuses for hero diversity</li>
    <li>Color-coded optimization results</li>
    <li>Support for duplicate heroes</li>
  </ul>
  <p>Start a rally with <code>POST /api/sessions</code>.</p>
</body>
</html>
"#
    )
}
