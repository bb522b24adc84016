//! Request handlers for the three public routes (plus health).

use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use zver_index::ManifestFormatter;
use zver_publish::{ArtifactSubmission, Publisher, PublishError, PublishRequest};
use zver_select::{select_version, CompatibilityMode, SelectOutcome};
use zver_types::Version;

use crate::auth::{check_authorization, AuthError};
use crate::state::AppState;

/// Manifests for tagged Zig versions barely change; nightlies churn.
const CACHE_CONTROL_TAGGED: &str = "public, max-age=3600";
const CACHE_CONTROL_DEV: &str = "public, max-age=300";

/// Health probe.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "name": "zver",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SelectVersionParams {
    zig_version: Option<String>,
    compatibility: Option<String>,
}

/// `GET /v1/zls/select-version?zig_version=<v>&compatibility=<c>`
pub async fn select_version_handler(
    State(state): State<AppState>,
    Query(params): Query<SelectVersionParams>,
) -> Response {
    let Some(raw_zig) = params.zig_version else {
        return bad_request("missing query parameter: zig_version");
    };
    let Some(raw_compatibility) = params.compatibility else {
        return bad_request("missing query parameter: compatibility");
    };
    let Some(zig_version) = Version::parse(&raw_zig) else {
        return bad_request(&format!("invalid zig_version: {raw_zig:?}"));
    };
    let Some(mode) = CompatibilityMode::parse(&raw_compatibility) else {
        return bad_request(&format!(
            "invalid compatibility: {raw_compatibility:?} (expected only-runtime or full)"
        ));
    };
    let Some(public_url_base) = state.config.public_url_base() else {
        return misconfigured("public URL base is not configured");
    };

    let outcome = match select_version(state.store.as_ref(), &zig_version, mode) {
        Ok(outcome) => outcome,
        Err(err) => return internal_error(&err),
    };

    let body = match outcome {
        SelectOutcome::Selected(record) => {
            let formatter = ManifestFormatter::new(public_url_base);
            match formatter.release_manifest(&record) {
                Ok(manifest) => Value::Object(manifest),
                Err(err) => return internal_error(&err),
            }
        }
        SelectOutcome::Failed(code) => json!({
            "code": code.code(),
            "message": code.message(&zig_version),
        }),
    };

    let cache_control = if zig_version.is_tagged() {
        CACHE_CONTROL_TAGGED
    } else {
        CACHE_CONTROL_DEV
    };
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, cache_control)],
        Json(body),
    )
        .into_response()
}

/// `GET /v1/zls/index.json`: the index is served from the blob store;
/// point clients there.
pub async fn index_redirect_handler(State(state): State<AppState>) -> Response {
    let Some(public_url_base) = state.config.public_url_base() else {
        return misconfigured("public URL base is not configured");
    };
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, format!("{public_url_base}/index.json"))],
    )
        .into_response()
}

/// `POST /v1/zls/publish`. Canonical body is JSON with artifact
/// metadata; the legacy multipart shape carrying artifact bytes is
/// accepted alongside it.
pub async fn publish_handler(State(state): State<AppState>, request: Request) -> Response {
    let Some(api_token) = state.config.api_token.as_deref() else {
        return misconfigured("API token is not configured");
    };
    if let Err(err) = check_authorization(request.headers(), api_token) {
        return auth_failure(err);
    }
    let Some(public_url_base) = state.config.public_url_base() else {
        return misconfigured("public URL base is not configured");
    };
    let formatter = ManifestFormatter::new(public_url_base);

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let publish_request = if content_type.starts_with("application/json") {
        let bytes = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => return bad_request(&format!("unreadable body: {err}")),
        };
        match serde_json::from_slice::<PublishRequest>(&bytes) {
            Ok(parsed) => parsed,
            Err(err) => return bad_request(&format!("malformed publish request: {err}")),
        }
    } else if content_type.starts_with("multipart/form-data") {
        match read_multipart(request).await {
            Ok(parsed) => parsed,
            Err(response) => return *response,
        }
    } else {
        return bad_request("unsupported content type (expected application/json)");
    };

    let publisher = Publisher::new(
        state.store.clone(),
        state.blobs.clone(),
        formatter,
        state.config.force_minisign,
    );
    match publisher.commit(&publish_request) {
        Ok(outcome) => {
            // Blob and index writes outlive the response; the store
            // batch has already committed.
            if let Some(work) = outcome.deferred {
                tokio::spawn(work.run());
            }
            StatusCode::OK.into_response()
        }
        Err(err) => publish_failure(err),
    }
}

/// Fallback for unknown paths.
pub async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}

/// Assemble a [`PublishRequest`] from the legacy multipart shape: text
/// fields for the version metadata, file parts for artifact bytes.
/// Shasums are computed here, server-side.
async fn read_multipart(request: Request) -> Result<PublishRequest, Box<Response>> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|err| Box::new(bad_request(&format!("malformed multipart body: {err}"))))?;

    let mut fields = std::collections::BTreeMap::new();
    let mut artifacts = std::collections::BTreeMap::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return Err(Box::new(bad_request(&format!(
                    "malformed multipart body: {err}"
                ))))
            }
        };
        if let Some(file_name) = field.file_name().map(str::to_string) {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| Box::new(bad_request(&format!("unreadable file part: {err}"))))?;
            artifacts.insert(file_name, ArtifactSubmission::from_bytes(bytes.to_vec()));
        } else {
            let name = field.name().unwrap_or_default().to_string();
            let value = field
                .text()
                .await
                .map_err(|err| Box::new(bad_request(&format!("unreadable form field: {err}"))))?;
            fields.insert(name, value);
        }
    }

    let mut take = |key: &str| {
        fields
            .remove(key)
            .ok_or_else(|| Box::new(bad_request(&format!("missing form field: {key}"))))
    };
    Ok(PublishRequest {
        zls_version: take("zls-version")?,
        zig_version: take("zig-version")?,
        minimum_build_zig_version: take("minimum-build-zig-version")?,
        minimum_runtime_zig_version: take("minimum-runtime-zig-version")?,
        compatibility: take("compatibility")?,
        artifacts,
    })
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn misconfigured(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

fn internal_error(err: &dyn std::fmt::Display) -> Response {
    tracing::error!("request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
        .into_response()
}

fn auth_failure(err: AuthError) -> Response {
    match err {
        AuthError::MalformedScheme | AuthError::MalformedCredentials => {
            bad_request(&err.to_string())
        }
        AuthError::MissingHeader | AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"admin\"")],
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

fn publish_failure(err: PublishError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        return internal_error(&err);
    }
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
