use crate::session::SessionHandle;

/// Title served instead of the product page once the site has blocked the client
pub const BLOCKED_TITLE: &str = "Blocked";

/// Title of the interstitial shown when the site cannot tell a block from a network error
pub const SUSPECT_TITLE: &str = "Not sure if blocked, might also be a connection error";

/// Health of the browser session as judged from the page it was served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionHealthSignal {
    Healthy,
    Suspect,
    Blocked,
}

impl SessionHealthSignal {
    /// Classify a session by the exact title of the page it loaded
    pub fn classify(title: &str) -> Self {
        if title == BLOCKED_TITLE {
            SessionHealthSignal::Blocked
        } else if title == SUSPECT_TITLE {
            SessionHealthSignal::Suspect
        } else {
            SessionHealthSignal::Healthy
        }
    }

    /// Report the signal to the session. Healthy sessions are left to the runner, which
    /// marks them good once the request succeeds.
    pub fn apply(self, session: &mut dyn SessionHandle) {
        match self {
            SessionHealthSignal::Blocked => session.retire(),
            SessionHealthSignal::Suspect => session.mark_bad(),
            SessionHealthSignal::Healthy => {}
        }
    }
}
