//! Browser identities and their health.
//!
//! A [`Session`] stands for one browser identity (its own WebDriver client and cookie jar).
//! The page handler only sees the [`SessionHandle`] seam; the runner owns the [`SessionPool`]
//! and decides when a session's browser has to be thrown away.

/// Health feedback the page handler can give about the session that served a page
pub trait SessionHandle: Send {
    /// Invalidate the session; it is never handed out again
    fn retire(&mut self);

    /// Down-rank the session without discarding it
    fn mark_bad(&mut self);
}

/// Error score at which a session stops being handed out
pub const DEFAULT_MAX_ERROR_SCORE: u32 = 3;

/// Number of requests after which a session is rotated out
pub const DEFAULT_MAX_USAGE_COUNT: u32 = 50;

#[derive(Debug, Clone)]
pub struct Session {
    id: usize,
    error_score: u32,
    usage_count: u32,
    retired: bool,
    max_error_score: u32,
    max_usage_count: u32,
}

impl Session {
    fn new(id: usize, max_error_score: u32, max_usage_count: u32) -> Self {
        Self {
            id,
            error_score: 0,
            usage_count: 0,
            retired: false,
            max_error_score,
            max_usage_count,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn error_score(&self) -> u32 {
        self.error_score
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Whether the session may serve another request
    pub fn is_usable(&self) -> bool {
        !self.retired
            && self.error_score < self.max_error_score
            && self.usage_count < self.max_usage_count
    }

    /// Record a successful request
    pub fn mark_good(&mut self) {
        self.usage_count += 1;
        self.error_score = self.error_score.saturating_sub(1);
    }
}

impl SessionHandle for Session {
    fn retire(&mut self) {
        ::log::debug!("Session {} retired", self.id);
        self.retired = true;
    }

    fn mark_bad(&mut self) {
        self.usage_count += 1;
        self.error_score += 1;
        ::log::debug!(
            "Session {} marked bad, error score {}",
            self.id,
            self.error_score
        );
    }
}

/// Bounded set of sessions, handing out usable ones and replacing the rest
#[derive(Debug)]
pub struct SessionPool {
    sessions: Vec<Session>,
    max_pool_size: usize,
    max_error_score: u32,
    max_usage_count: u32,
    next_id: usize,
}

impl SessionPool {
    pub fn new(max_pool_size: usize) -> Self {
        Self {
            sessions: Vec::new(),
            max_pool_size: max_pool_size.max(1),
            max_error_score: DEFAULT_MAX_ERROR_SCORE,
            max_usage_count: DEFAULT_MAX_USAGE_COUNT,
            next_id: 0,
        }
    }

    pub fn with_limits(mut self, max_error_score: u32, max_usage_count: u32) -> Self {
        self.max_error_score = max_error_score;
        self.max_usage_count = max_usage_count;
        self
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Id of a usable session, creating one if the pool has none to offer
    ///
    /// When the pool is full, unusable sessions are dropped to make room.
    pub fn acquire(&mut self) -> usize {
        if let Some(session) = self.sessions.iter().find(|s| s.is_usable()) {
            return session.id;
        }

        if self.sessions.len() >= self.max_pool_size {
            self.sessions.retain(Session::is_usable);
        }

        let session = Session::new(self.next_id, self.max_error_score, self.max_usage_count);
        self.next_id += 1;
        ::log::debug!("Created session {}", session.id);
        let id = session.id;
        self.sessions.push(session);
        id
    }

    #[cfg(test)]
    fn get(&self, id: usize) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Remove sessions that can no longer be used, returning them
    pub fn evict_unusable(&mut self) -> Vec<Session> {
        let (usable, evicted): (Vec<Session>, Vec<Session>) = std::mem::take(&mut self.sessions)
            .into_iter()
            .partition(Session::is_usable);
        self.sessions = usable;
        evicted
    }
}
