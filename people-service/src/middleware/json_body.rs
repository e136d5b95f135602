use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap};
use serde::de::DeserializeOwned;
use service_core::error::AppError;

/// Lenient JSON body extractor.
///
/// Only bodies sent with a JSON content type are parsed; anything else, and an
/// empty body, yields `T::default()`. Malformed JSON is rejected as
/// [`AppError::Parse`] and a body of the wrong shape as [`AppError::Query`],
/// both of which render as 400.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Ok(JsonBody(T::default()));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Parse(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "Rejected request body");
            AppError::from(e)
        })?;

        Ok(JsonBody(value))
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonFields;
    use axum::body::Body;

    async fn extract(content_type: Option<&str>, body: &str) -> Result<PersonFields, AppError> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/people");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();

        JsonBody::<PersonFields>::from_request(req, &())
            .await
            .map(|JsonBody(fields)| fields)
    }

    #[tokio::test]
    async fn parses_json_body() {
        let fields = extract(Some("application/json; charset=utf-8"), r#"{"name":"Ada"}"#)
            .await
            .unwrap();
        assert_eq!(fields.name, Some(Some("Ada".to_string())));
    }

    #[tokio::test]
    async fn non_json_content_type_is_ignored() {
        let fields = extract(Some("text/plain"), "{not json").await.unwrap();
        assert!(fields.is_empty());

        let fields = extract(None, r#"{"name":"Ada"}"#).await.unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn empty_json_body_is_empty_field_set() {
        let fields = extract(Some("application/json"), "  ").await.unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let err = extract(Some("application/json"), r#"{"name": "Ada""#)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn wrong_shape_is_query_error() {
        let err = extract(Some("application/json"), r#"["Ada"]"#)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Query(_)));
    }

    #[test]
    fn vendor_json_types_are_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            "application/merge-patch+json".parse().unwrap(),
        );
        assert!(is_json_content_type(&headers));
    }
}
