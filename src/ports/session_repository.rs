//! SessionRepository port for collaboration sessions.

use crate::domain::collaboration::CollaborationSession;
use crate::domain::foundation::{ExpiringRepository, SessionId};

/// Store of collaboration sessions keyed by session id.
pub trait SessionRepository: ExpiringRepository<CollaborationSession, SessionId> {}

impl<R> SessionRepository for R where R: ExpiringRepository<CollaborationSession, SessionId> {}
