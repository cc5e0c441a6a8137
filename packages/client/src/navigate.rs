use tracing::info;

/// Route of the sign-in surface.
pub const LOGIN_ROUTE: &str = "/account/login";

/// Moves the user to another surface, e.g. the login page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for headless embedders; records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Navigation requested");
    }
}
