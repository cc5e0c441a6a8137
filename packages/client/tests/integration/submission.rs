use std::collections::BTreeSet;
use std::time::Duration;

use client::api::{challenges, submissions};
use client::{ClientError, FailureKind, LOGIN_ROUTE, PollerState, ToastLevel, ToastTag};
use common::{CreateSubmissionRequest, GetChallengeStatusRequest, GetSubmissionRequest, Verdict};
use uuid::Uuid;

use crate::common::{DUPLICATE_FLAG, RIGHT_FLAG, TestApp, WRONG_FLAG, eventually};

fn flag(content: &str) -> CreateSubmissionRequest {
    CreateSubmissionRequest {
        content: content.to_string(),
        challenge_id: Uuid::new_v4(),
        team_id: None,
        game_id: None,
    }
}

mod create {
    use super::*;

    #[tokio::test]
    async fn new_submission_is_pending_and_tracked() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;
        let request = flag(RIGHT_FLAG);

        let submission = client.state.submit_flag(&request).await.unwrap();

        assert_eq!(submission.status, Verdict::Pending);
        assert_eq!(submission.challenge_id, request.challenge_id);
        assert!(client.state.tracker.contains(submission.id));
        assert_eq!(client.state.poller.state(), PollerState::Polling);
        client.state.shutdown();
    }

    #[tokio::test]
    async fn terminal_on_create_notifies_without_tracking() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;

        let submission = client.state.submit_flag(&flag(DUPLICATE_FLAG)).await.unwrap();

        assert_eq!(submission.status, Verdict::Duplicate);
        assert!(client.state.tracker.is_empty());
        assert_eq!(client.state.poller.state(), PollerState::Idle);
        let toast = client
            .board
            .get(&format!("submission-{}", submission.id))
            .unwrap();
        assert_eq!(toast.tag, Some(ToastTag::AlreadySolved));
    }

    #[tokio::test]
    async fn anonymous_submission_is_rejected() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let err = client.state.submit_flag(&flag(RIGHT_FLAG)).await.unwrap_err();

        assert!(matches!(err, ClientError::Unauthorized(_)));
        assert_eq!(client.navigator.routes(), vec![LOGIN_ROUTE.to_string()]);
        assert!(client.state.tracker.is_empty());
    }

    #[tokio::test]
    async fn status_query_is_desensitized() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;
        let created = submissions::create(&client.state.request, &flag(WRONG_FLAG))
            .await
            .unwrap();

        let envelope =
            submissions::get(&client.state.request, &GetSubmissionRequest::by_id(created.id))
                .await
                .unwrap();

        assert_eq!(envelope.total, Some(1));
        let records = envelope.data.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, created.id);
        assert!(records[0].content.is_empty());
    }
}

mod challenge_status {
    use super::*;

    #[tokio::test]
    async fn status_is_keyed_by_challenge() {
        let app = TestApp::spawn().await;
        let client = app.client();
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];

        let statuses = challenges::status(
            &client.state.request,
            &GetChallengeStatusRequest {
                challenge_ids: ids.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(statuses.len(), 2);
        assert!(statuses[&ids[0]].is_solved);
        assert!(!statuses[&ids[1]].is_solved);
        assert_eq!(statuses[&ids[1]].pts, 490);
    }

    #[tokio::test]
    async fn unreachable_status_query_fails_as_gateway() {
        let app = TestApp::spawn().await;
        let client = app.client_with(
            crate::common::unreachable_config().await,
            std::sync::Arc::new(client::SessionStore::in_memory()),
        );

        let err = challenges::status(&client.state.request, &GetChallengeStatusRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Gateway);
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn verdicts_arrive_once_and_the_poller_goes_idle() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;

        let right = client.state.submit_flag(&flag(RIGHT_FLAG)).await.unwrap();
        let wrong = client.state.submit_flag(&flag(WRONG_FLAG)).await.unwrap();
        assert_eq!(
            client.state.tracker.snapshot(),
            BTreeSet::from([right.id, wrong.id])
        );

        let tracker = client.state.tracker.clone();
        assert!(eventually(Duration::from_secs(5), || tracker.is_empty()).await);

        let correct = client
            .board
            .get(&format!("submission-{}", right.id))
            .unwrap();
        assert_eq!(correct.level, ToastLevel::Success);
        let incorrect = client
            .board
            .get(&format!("submission-{}", wrong.id))
            .unwrap();
        assert_eq!(incorrect.level, ToastLevel::Error);

        let poller = client.state.poller.clone();
        assert!(
            eventually(Duration::from_secs(5), || poller.state() == PollerState::Idle).await
        );

        // No further queries once idle.
        let served = app.backend.queries(right.id);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(app.backend.queries(right.id), served);
        assert_eq!(client.board.deliveries(&format!("submission-{}", right.id)), 1);
        assert_eq!(client.board.deliveries(&format!("submission-{}", wrong.id)), 1);
    }

    #[tokio::test]
    async fn stopped_poller_leaves_submissions_tracked() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;

        let pending = client.state.submit_flag(&flag("flag{forever}")).await.unwrap();
        let backend = app.backend.clone();
        assert!(eventually(Duration::from_secs(5), || backend.queries(pending.id) > 0).await);

        client.state.shutdown();
        assert_eq!(client.state.poller.state(), PollerState::Idle);
        assert!(client.state.tracker.contains(pending.id));

        tokio::time::sleep(Duration::from_millis(200)).await;
        let served = app.backend.queries(pending.id);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(app.backend.queries(pending.id), served);
    }
}

mod watch {
    use super::*;

    #[tokio::test]
    async fn unknown_submission_is_not_tracked() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;

        let watched = client.state.watch(404).await.unwrap();

        assert!(watched.is_none());
        assert!(client.state.tracker.is_empty());
        assert_eq!(client.state.poller.state(), PollerState::Idle);
        assert!(client.board.is_empty());
    }

    #[tokio::test]
    async fn existing_pending_submission_is_followed() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;
        let created = submissions::create(&client.state.request, &flag(RIGHT_FLAG))
            .await
            .unwrap();

        let watched = client.state.watch(created.id).await.unwrap().unwrap();
        assert_eq!(watched.status, Verdict::Pending);
        assert!(client.state.tracker.contains(created.id));

        let tracker = client.state.tracker.clone();
        assert!(eventually(Duration::from_secs(5), || tracker.is_empty()).await);
        assert_eq!(
            client.board.deliveries(&format!("submission-{}", created.id)),
            1
        );
    }

    #[tokio::test]
    async fn decided_submission_is_notified_at_once() {
        let app = TestApp::spawn().await;
        let client = app.client();
        client.login("alice").await;
        let created = submissions::create(&client.state.request, &flag(DUPLICATE_FLAG))
            .await
            .unwrap();

        let watched = client.state.watch(created.id).await.unwrap().unwrap();

        assert_eq!(watched.status, Verdict::Duplicate);
        assert!(client.state.tracker.is_empty());
        assert!(
            client
                .board
                .get(&format!("submission-{}", created.id))
                .is_some()
        );
    }
}

mod headless {
    use super::*;
    use client::{ClientState, SessionStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn headless_state_resolves_verdicts() {
        let app = TestApp::spawn().await;
        let state =
            ClientState::headless(&app.config(), Arc::new(SessionStore::in_memory())).unwrap();

        // Anonymous submissions only reach the log-based navigator and notifier.
        let err = state.submit_flag(&flag(RIGHT_FLAG)).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Auth);

        client::api::users::login(&state.request, "dave", crate::common::PASSWORD)
            .await
            .unwrap();
        let submission = state.submit_flag(&flag(WRONG_FLAG)).await.unwrap();
        assert!(state.tracker.contains(submission.id));

        let tracker = state.tracker.clone();
        assert!(eventually(Duration::from_secs(5), || tracker.is_empty()).await);
        let poller = state.poller.clone();
        assert!(eventually(Duration::from_secs(5), || poller.state() == PollerState::Idle).await);
    }
}
