use std::sync::Arc;

use common::{CreateSubmissionRequest, Submission};
use tracing::{info, warn};

use crate::api;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::navigate::{Navigator, TracingNavigator};
use crate::notify::{NotificationDispatcher, Notifier, TracingNotifier};
use crate::poller::{VerdictPoller, VerdictSource};
use crate::request::RequestClient;
use crate::session::SessionStore;
use crate::tracker::SubmissionTracker;

/// The single shared instance of every client service.
#[derive(Clone)]
pub struct ClientState {
    pub session: Arc<SessionStore>,
    pub request: Arc<RequestClient>,
    pub tracker: Arc<SubmissionTracker>,
    pub poller: VerdictPoller,
    pub dispatcher: NotificationDispatcher,
}

impl ClientState {
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let request = Arc::new(RequestClient::new(
            &config.server,
            session.clone(),
            notifier.clone(),
            navigator,
        )?);
        let tracker = Arc::new(SubmissionTracker::new());
        let dispatcher = NotificationDispatcher::new(notifier);
        let poller = VerdictPoller::new(
            tracker.clone(),
            request.clone(),
            dispatcher.clone(),
            config.poller.cadence(),
        );

        Ok(Self {
            session,
            request,
            tracker,
            poller,
            dispatcher,
        })
    }

    /// Services for embedders without a user interface: notifications and
    /// navigation requests only go to the log.
    pub fn headless(
        config: &ClientConfig,
        session: Arc<SessionStore>,
    ) -> Result<Self, ClientError> {
        Self::new(
            config,
            session,
            Arc::new(TracingNotifier),
            Arc::new(TracingNavigator),
        )
    }

    /// Submit a flag and follow it until the verdict arrives.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn submit_flag(
        &self,
        request: &CreateSubmissionRequest,
    ) -> Result<Submission, ClientError> {
        let submission = api::submissions::create(&self.request, request).await?;
        info!(
            submission_id = submission.id,
            challenge_id = %submission.challenge_id,
            status = %submission.status,
            "Flag submitted"
        );

        if submission.status.is_terminal() {
            self.dispatcher.notify(submission.id, submission.status);
        } else {
            self.poller.track(submission.id);
        }
        Ok(submission)
    }

    /// Follow an existing submission until its verdict arrives.
    ///
    /// Returns `None`, tracking nothing, when the backend has no such
    /// submission. An already decided submission is notified at once.
    pub async fn watch(&self, submission_id: i64) -> Result<Option<Submission>, ClientError> {
        let Some(submission) = self.request.fetch(submission_id).await? else {
            warn!(submission_id, "Submission not found, not watching");
            return Ok(None);
        };

        if submission.status.is_terminal() {
            self.dispatcher.notify(submission.id, submission.status);
        } else {
            self.poller.track(submission.id);
        }
        Ok(Some(submission))
    }

    /// Stop background work. Tracked ids are kept.
    pub fn shutdown(&self) {
        self.poller.stop();
    }
}
