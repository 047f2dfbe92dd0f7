//! ProgressRepository port for milestone graphs.

use crate::domain::foundation::{ExpiringRepository, TaskId};
use crate::domain::progress::ProgressGraph;

/// Store of progress graphs keyed by task id.
///
/// `save` overwrites, so re-initialising a task replaces its graph.
pub trait ProgressRepository: ExpiringRepository<ProgressGraph, TaskId> {}

impl<R> ProgressRepository for R where R: ExpiringRepository<ProgressGraph, TaskId> {}
