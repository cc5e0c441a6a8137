pub mod api;
pub mod config;
pub mod error;
pub mod navigate;
pub mod notify;
pub mod poller;
pub mod request;
pub mod session;
pub mod state;
pub mod tracker;

pub use config::ClientConfig;
pub use error::{ClientError, FailureKind};
pub use navigate::{LOGIN_ROUTE, Navigator, TracingNavigator};
pub use notify::{
    NotificationBoard, NotificationDispatcher, Notifier, Toast, ToastLevel, ToastTag,
    TracingNotifier,
};
pub use poller::{CycleReport, PollerState, VerdictPoller, VerdictSource};
pub use request::{Reply, RequestClient, RequestOptions};
pub use session::{Session, SessionError, SessionStore};
pub use state::ClientState;
pub use tracker::SubmissionTracker;
