use std::sync::Arc;

use client::request::{BACKEND_OFFLINE_KEY, PLEASE_LOGIN_KEY, REQUEST_TIMEOUT_KEY};
use client::{ClientError, FailureKind, LOGIN_ROUTE, RequestOptions, SessionStore};
use serde_json::Value;

use crate::common::{TestApp, unreachable_config};

mod interception {
    use super::*;

    #[tokio::test]
    async fn client_error_is_a_request_error_without_side_effects() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let err = client
            .state
            .request
            .get::<Value>("status/400", RequestOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Request);
        assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
        let envelope = err.envelope().unwrap();
        assert_eq!(envelope.code, 400);
        assert_eq!(envelope.message.as_deref(), Some("stub status"));
        assert!(client.board.is_empty());
        assert!(client.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_redirects() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;
        assert!(client.state.session.is_authenticated());

        let err = client
            .state
            .request
            .get::<Value>("status/401", RequestOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Unauthorized(_)));
        assert_eq!(err.kind(), FailureKind::Auth);
        assert!(!client.state.session.is_authenticated());
        assert!(client.state.session.token().is_none());
        assert_eq!(client.navigator.routes(), vec![LOGIN_ROUTE.to_string()]);
        assert!(client.board.get(PLEASE_LOGIN_KEY).is_some());
    }

    #[tokio::test]
    async fn ignored_unauthorized_still_clears_session() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;

        let err = client
            .state
            .request
            .get::<Value>(
                "status/401",
                RequestOptions::new().ignore_unauthorized(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Auth);
        assert!(!client.state.session.is_authenticated());
        assert!(client.navigator.routes().is_empty());
        assert!(client.board.is_empty());
    }

    #[tokio::test]
    async fn repeated_unauthorized_replaces_the_notification() {
        let app = TestApp::spawn().await;
        let client = app.client();

        for _ in 0..3 {
            let _ = client
                .state
                .request
                .get::<Value>("status/401", RequestOptions::new())
                .await;
        }

        assert_eq!(client.board.len(), 1);
        assert_eq!(client.board.deliveries(PLEASE_LOGIN_KEY), 3);
        assert_eq!(client.navigator.routes().len(), 3);
    }

    #[tokio::test]
    async fn bad_gateway_shows_backend_offline() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let err = client
            .state
            .request
            .get::<Value>("status/502", RequestOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Gateway);
        assert!(client.board.get(BACKEND_OFFLINE_KEY).is_some());
        assert!(client.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_request_error() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let err = client
            .state
            .request
            .get::<Value>("garbage", RequestOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Decode { .. }));
        assert_eq!(err.kind(), FailureKind::Request);
        assert!(client.board.is_empty());
    }
}

mod transport {
    use super::*;

    #[tokio::test]
    async fn deadline_is_enforced() {
        let app = TestApp::spawn().await;
        let mut config = app.config();
        config.server.timeout_ms = 100;
        let client = app.client_with(config, Arc::new(SessionStore::in_memory()));

        let started = std::time::Instant::now();
        let err = client
            .state
            .request
            .get::<Value>("slow", RequestOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Timeout);
        assert!(started.elapsed() < std::time::Duration::from_millis(450));
        assert!(client.board.get(REQUEST_TIMEOUT_KEY).is_some());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_gateway_failure() {
        let app = TestApp::spawn().await;
        let client = app.client_with(
            unreachable_config().await,
            Arc::new(SessionStore::in_memory()),
        );

        let err = client
            .state
            .request
            .get::<Value>("status/200", RequestOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Gateway);
        assert!(client.board.get(BACKEND_OFFLINE_KEY).is_some());
    }
}
