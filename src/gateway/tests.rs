//! Tests for the gateway module
//!
//! Includes unit tests, router-level tests against real files, and
//! property-based tests for:
//! - Allow-list containment (separator-boundary exactness)
//! - NUL-byte and traversal rejection
//! - Error kind to status/message mapping
//! - File streaming metadata

use super::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use secrecy::SecretString;

use crate::auth::{AuthResult, MemoryTokenStore, SessionGate, TokenVerifier};
use crate::config::{ConfigError, GatewayConfig};

/// Verifier stub with a fixed answer
struct StaticVerifier {
    valid: bool,
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, _token: &SecretString) -> AuthResult<bool> {
        Ok(self.valid)
    }
}

fn tmp_roots() -> AllowedRoots {
    AllowedRoots::new(&[PathBuf::from("/tmp")]).unwrap()
}

fn test_server(root: &Path) -> ModelGatewayServer {
    let config = GatewayConfig {
        ply_roots: vec![root.to_path_buf()],
        ..GatewayConfig::default()
    };
    let gate = SessionGate::new(
        Arc::new(MemoryTokenStore::new()),
        Arc::new(StaticVerifier { valid: true }),
    );
    ModelGatewayServer::new(config, gate).unwrap()
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_root_set_rejects_relative_root() {
        let result = AllowedRoots::new(&[PathBuf::from("data/models")]);
        assert!(matches!(result, Err(ConfigError::RelativeRoot { .. })));
    }

    #[test]
    fn test_root_set_rejects_empty_set() {
        let result = AllowedRoots::new(&[]);
        assert!(matches!(result, Err(ConfigError::EmptyRootSet)));
    }

    #[test]
    fn test_root_set_normalizes_trailing_separator() {
        let roots = AllowedRoots::new(&[PathBuf::from("/tmp/")]).unwrap();
        let listed: Vec<&Path> = roots.roots().collect();
        assert_eq!(listed, vec![Path::new("/tmp")]);
    }

    #[test]
    fn test_parse_comma_separated_roots() {
        let roots = AllowedRoots::parse("/srv/models, /tmp ,").unwrap();
        let listed: Vec<&Path> = roots.roots().collect();
        assert_eq!(listed, vec![Path::new("/srv/models"), Path::new("/tmp")]);
    }

    #[test]
    fn test_containment_boundary() {
        let roots = tmp_roots();
        assert!(roots.contains(Path::new("/tmp")));
        assert!(roots.contains(Path::new("/tmp/model.ply")));
        assert!(roots.contains(Path::new("/tmp/nested/deep/model.ply")));
        // String prefix without a separator boundary must not match
        assert!(!roots.contains(Path::new("/tmp-evil/model.ply")));
        assert!(!roots.contains(Path::new("/tmpfoo")));
        assert!(!roots.contains(Path::new("/etc/passwd")));
    }

    #[test]
    fn test_resolve_request_empty_path() {
        assert!(matches!(
            tmp_roots().resolve_request(""),
            Err(GatewayError::MissingPath)
        ));
    }

    #[test]
    fn test_resolve_request_nul_byte() {
        assert!(matches!(
            tmp_roots().resolve_request("/tmp/model.ply\0.txt"),
            Err(GatewayError::InvalidPath)
        ));
    }

    #[test]
    fn test_resolve_request_relative_path() {
        assert!(matches!(
            tmp_roots().resolve_request("model.ply"),
            Err(GatewayError::PathNotAllowed)
        ));
        assert!(matches!(
            tmp_roots().resolve_request("./tmp/model.ply"),
            Err(GatewayError::PathNotAllowed)
        ));
    }

    #[test]
    fn test_resolve_request_traversal_escapes_root() {
        // Normalizes to /etc/passwd, outside the allow-list
        assert!(matches!(
            tmp_roots().resolve_request("/tmp/../etc/passwd"),
            Err(GatewayError::PathNotAllowed)
        ));
    }

    #[test]
    fn test_resolve_request_traversal_within_root() {
        let resolved = tmp_roots()
            .resolve_request("/tmp/nested/../model.ply")
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/model.ply"));
    }

    #[test]
    fn test_resolve_request_wrong_extension() {
        assert!(matches!(
            tmp_roots().resolve_request("/tmp/model.txt"),
            Err(GatewayError::UnsupportedFileType)
        ));
        assert!(matches!(
            tmp_roots().resolve_request("/tmp/model"),
            Err(GatewayError::UnsupportedFileType)
        ));
    }

    #[test]
    fn test_resolve_request_extension_case_insensitive() {
        assert!(tmp_roots().resolve_request("/tmp/model.PLY").is_ok());
        assert!(tmp_roots().resolve_request("/tmp/model.Ply").is_ok());
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(GatewayError::MissingPath.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::InvalidPath.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::PathNotAllowed.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            GatewayError::UnsupportedFileType.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(GatewayError::NotAFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::Internal {
                reason: "x".to_string()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_message_mapping() {
        assert_eq!(GatewayError::MissingPath.message(), "Missing path query param.");
        assert_eq!(GatewayError::InvalidPath.message(), "Invalid path.");
        assert_eq!(GatewayError::PathNotAllowed.message(), "Path not allowed.");
        assert_eq!(
            GatewayError::UnsupportedFileType.message(),
            "Only .ply files are supported."
        );
        assert_eq!(GatewayError::NotFound.message(), "File not found.");
        assert_eq!(GatewayError::NotAFile.message(), "Path is not a file.");
        // Internal kinds never leak their reason
        let internal = GatewayError::Internal {
            reason: "socket closed".to_string(),
        };
        assert_eq!(internal.message(), "Internal server error.");
    }

    #[test]
    fn test_error_classification() {
        assert!(GatewayError::PathNotAllowed.is_forbidden());
        assert!(!GatewayError::NotFound.is_forbidden());
        assert!(GatewayError::NotFound.is_not_found());
        assert!(!GatewayError::MissingPath.is_not_found());
    }
}

#[cfg(test)]
mod router_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    fn error_body(bytes: &[u8]) -> String {
        let value: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        value["error"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_serve_file_success() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("model.ply");
        let content = b"ply\nformat binary_little_endian 1.0\nend_header\n\x01\x02\x03";
        std::fs::write(&file_path, content).unwrap();

        let server = test_server(dir.path());
        let uri = format!(
            "/file?path={}",
            urlencoding::encode(file_path.to_str().unwrap())
        );
        let response = server
            .build_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["content-type"], "application/octet-stream");
        assert_eq!(
            headers["content-length"],
            content.len().to_string().as_str()
        );
        assert_eq!(headers["cache-control"], "no-store");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), content);
    }

    #[tokio::test]
    async fn test_serve_file_missing_param() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(test_server(dir.path()).build_router(), "/file").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_body(&body), "Missing path query param.");
    }

    #[tokio::test]
    async fn test_serve_file_outside_roots() {
        let dir = tempfile::tempdir().unwrap();
        let escape = format!("{}/../outside.ply", dir.path().display());
        let uri = format!("/file?path={}", urlencoding::encode(&escape));
        let (status, body) = get(test_server(dir.path()).build_router(), &uri).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error_body(&body), "Path not allowed.");
    }

    #[tokio::test]
    async fn test_serve_file_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("notes.txt");
        std::fs::write(&file_path, b"text").unwrap();

        let uri = format!(
            "/file?path={}",
            urlencoding::encode(file_path.to_str().unwrap())
        );
        let (status, body) = get(test_server(dir.path()).build_router(), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_body(&body), "Only .ply files are supported.");
    }

    #[tokio::test]
    async fn test_serve_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ply");
        let uri = format!(
            "/file?path={}",
            urlencoding::encode(missing.to_str().unwrap())
        );
        let (status, body) = get(test_server(dir.path()).build_router(), &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_body(&body), "File not found.");
    }

    #[tokio::test]
    async fn test_serve_file_directory_target() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("cloud.ply");
        std::fs::create_dir(&sub).unwrap();

        let uri = format!("/file?path={}", urlencoding::encode(sub.to_str().unwrap()));
        let (status, body) = get(test_server(dir.path()).build_router(), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_body(&body), "Path is not a file.");
    }

    #[tokio::test]
    async fn test_session_route_with_token() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(
            test_server(dir.path()).build_router(),
            "/session?token=abc123",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["authorized"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_session_route_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(test_server(dir.path()).build_router(), "/session").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["authorized"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_models_route() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(test_server(dir.path()).build_router(), "/models").await;
        assert_eq!(status, StatusCode::OK);
        let models: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(models.len(), 5);
        assert_eq!(models[0]["id"], "storeroom");
    }

    #[tokio::test]
    async fn test_map_nodes_route() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(test_server(dir.path()).build_router(), "/map/nodes").await;
        assert_eq!(status, StatusCode::OK);
        let nodes: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0]["icon"], "warehouse");
    }

    #[tokio::test]
    async fn test_health_route() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(test_server(dir.path()).build_router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Strategy for path segments that survive percent-free URIs
    fn segment_strategy() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z0-9_][a-zA-Z0-9_-]{0,11}").unwrap()
    }

    // For any raw path containing a NUL byte, resolution fails with the
    // invalid-path kind regardless of where the byte sits.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_nul_byte_always_invalid(
            prefix in segment_strategy(),
            suffix in segment_strategy()
        ) {
            let raw = format!("/tmp/{}\0{}.ply", prefix, suffix);
            prop_assert!(matches!(
                tmp_roots().resolve_request(&raw),
                Err(GatewayError::InvalidPath)
            ));
        }

        // A sibling directory sharing the root's name as a string prefix
        // must never be contained: this is the separator-boundary property.
        #[test]
        fn prop_sibling_prefix_rejected(
            sibling in segment_strategy(),
            file in segment_strategy()
        ) {
            let raw = format!("/tmp-{}/{}.ply", sibling, file);
            prop_assert!(matches!(
                tmp_roots().resolve_request(&raw),
                Err(GatewayError::PathNotAllowed)
            ));
        }

        #[test]
        fn prop_paths_under_root_accepted(
            segments in prop::collection::vec(segment_strategy(), 1..4),
            file in segment_strategy()
        ) {
            let raw = format!("/tmp/{}/{}.ply", segments.join("/"), file);
            let resolved = tmp_roots().resolve_request(&raw);
            prop_assert!(resolved.is_ok());
            prop_assert!(resolved.unwrap().starts_with("/tmp"));
        }

        #[test]
        fn prop_traversal_outside_root_rejected(
            depth in 1usize..5,
            file in segment_strategy()
        ) {
            let raw = format!("/tmp/{}etc/{}.ply", "../".repeat(depth), file);
            prop_assert!(matches!(
                tmp_roots().resolve_request(&raw),
                Err(GatewayError::PathNotAllowed)
            ));
        }

        #[test]
        fn prop_extension_case_insensitive(
            file in segment_strategy(),
            ext in prop::string::string_regex("[pP][lL][yY]").unwrap()
        ) {
            let raw = format!("/tmp/{}.{}", file, ext);
            prop_assert!(tmp_roots().resolve_request(&raw).is_ok());
        }

        // Every resolved path is normalized: no dot segments survive.
        #[test]
        fn prop_resolved_paths_have_no_dot_segments(
            segments in prop::collection::vec(
                prop_oneof![segment_strategy(), Just(".".to_string()), Just("..".to_string())],
                1..6
            ),
            file in segment_strategy()
        ) {
            let raw = format!("/tmp/{}/{}.ply", segments.join("/"), file);
            if let Ok(resolved) = tmp_roots().resolve_request(&raw) {
                let has_dots = resolved.components().any(|c| {
                    matches!(c, std::path::Component::CurDir | std::path::Component::ParentDir)
                });
                prop_assert!(!has_dots);
                prop_assert!(resolved.starts_with("/tmp"));
            }
        }
    }
}
