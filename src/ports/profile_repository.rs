//! ProfileRepository port for user communication profiles.

use crate::domain::context::UserProfile;
use crate::domain::foundation::{ExpiringRepository, UserId};

/// Store of user profiles keyed by user id.
pub trait ProfileRepository: ExpiringRepository<UserProfile, UserId> {}

impl<R> ProfileRepository for R where R: ExpiringRepository<UserProfile, UserId> {}
