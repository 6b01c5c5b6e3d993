use crate::errors::ServerError;
use crate::responses::json::json_body_response;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;

pub type ResultResp = Result<Response, ServerError>;

/// HTML error page for browser routes.
pub fn html_error_response(err: ServerError) -> Response {
    let status = err.status();
    log_error(&err);

    let html = error_page(status, &public_message(&err)).into_string();
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(html))
        .unwrap_or_else(|_| fallback_response())
}

/// `{"error": message}` for API routes.
pub fn json_error_response(err: ServerError) -> Response {
    let status = err.status();
    log_error(&err);

    json_body_response(status, &json!({ "error": public_message(&err) }))
        .unwrap_or_else(|_| fallback_response())
}

fn public_message(err: &ServerError) -> String {
    match err {
        ServerError::NotFound => "Not Found".to_string(),
        ServerError::BadRequest(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn log_error(err: &ServerError) {
    if err.status() >= 500 {
        tracing::error!("request failed: {err}");
    } else {
        tracing::debug!("request rejected: {err}");
    }
}

fn fallback_response() -> Response {
    let mut resp = Response::new(Body::from("Internal Server Error"));
    *resp.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
    resp
}
