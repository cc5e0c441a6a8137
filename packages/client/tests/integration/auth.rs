use std::sync::Arc;

use client::api::users;
use client::{FailureKind, SessionStore};
use common::Group;

use crate::common::{COOKIELESS_ACCOUNT, PASSWORD, TestApp};

mod login {
    use super::*;

    #[tokio::test]
    async fn login_installs_identity_and_token() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let user = users::login(&client.state.request, "alice", PASSWORD)
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.nickname, "ALICE");
        assert_eq!(user.group, Group::User);
        assert_eq!(client.state.session.user(), Some(user));
        assert_eq!(client.state.session.token().as_deref(), Some("tok-alice"));
    }

    #[tokio::test]
    async fn cleared_token_cookie_is_not_installed() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let user = users::login(&client.state.request, COOKIELESS_ACCOUNT, PASSWORD)
            .await
            .unwrap();

        assert_eq!(client.state.session.user(), Some(user));
        assert!(client.state.session.token().is_none());
    }

    #[tokio::test]
    async fn wrong_password_leaves_session_empty() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let err = users::login(&client.state.request, "alice", "nope")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Request);
        assert_eq!(
            err.envelope().and_then(|e| e.message.as_deref()),
            Some("invalid credentials")
        );
        assert!(!client.state.session.is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;

        users::logout(&client.state.request).await;

        assert!(!client.state.session.is_authenticated());
        assert!(client.navigator.routes().is_empty());
    }
}

mod profile {
    use super::*;

    #[tokio::test]
    async fn profile_uses_bearer_token() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("bob").await;

        let user = users::profile(&client.state.request).await.unwrap();
        assert_eq!(user.map(|u| u.username).as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn anonymous_profile_is_none_without_redirect() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let user = users::profile(&client.state.request).await.unwrap();

        assert!(user.is_none());
        assert!(client.navigator.routes().is_empty());
        assert!(client.board.is_empty());
    }
}

mod persistence {
    use super::*;

    #[tokio::test]
    async fn session_survives_a_restart() {
        let app = TestApp::spawn().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let first = app.client_with(app.config(), Arc::new(SessionStore::load(&path).unwrap()));
        first.login("carol").await;
        drop(first);

        let second = app.client_with(app.config(), Arc::new(SessionStore::load(&path).unwrap()));
        assert_eq!(
            second.state.session.user().map(|u| u.username).as_deref(),
            Some("carol")
        );
        let user = users::profile(&second.state.request).await.unwrap();
        assert!(user.is_some());
    }
}
