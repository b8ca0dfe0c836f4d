use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use log::error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("File not found")]
    NotFound,

    #[error("No permission to list directory")]
    ListingDenied,

    #[error("Unsupported method ({0})")]
    UnsupportedMethod(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::NotFound | ServeError::ListingDenied => StatusCode::NOT_FOUND,
            ServeError::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
            ServeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        "<!DOCTYPE HTML>\n\
         <html lang=\"en\">\n\
         \x20   <head>\n\
         \x20       <meta charset=\"utf-8\">\n\
         \x20       <title>Error response</title>\n\
         \x20   </head>\n\
         \x20   <body>\n\
         \x20       <h1>Error response</h1>\n\
         \x20       <p>Error code: {}</p>\n\
         \x20       <p>Message: {}.</p>\n\
         \x20   </body>\n\
         </html>\n",
        status.as_u16(),
        message
    )
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        if let ServeError::Io(e) = &self {
            error!("IO error while serving request: {}", e);
        }

        let status = self.status();
        let body = error_page(status, &self.to_string());

        (
            status,
            [
                (header::CONTENT_TYPE, "text/html;charset=utf-8"),
                (header::CONNECTION, "close"),
            ],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServeError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServeError::ListingDenied.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServeError::UnsupportedMethod("POST".to_string()).status(),
            StatusCode::NOT_IMPLEMENTED
        );
    }

    #[test]
    fn test_error_page() {
        let page = error_page(StatusCode::NOT_FOUND, "File not found");
        assert!(page.contains("<p>Error code: 404</p>"));
        assert!(page.contains("<p>Message: File not found.</p>"));
        assert!(page.contains("\n    <head>\n"));
    }
}
