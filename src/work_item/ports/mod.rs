//! Port definitions for work-item persistence, sequencing, and blob storage.

mod attachment_store;
mod collaboration;
mod repository;
mod sequence;

pub use attachment_store::{AttachmentStore, AttachmentStoreError, AttachmentStoreResult};
pub use collaboration::CollaborationRepository;
pub use repository::{
    DeletedTask, SubtaskFilter, TaskFilter, WorkItemRepository, WorkItemRepositoryError,
    WorkItemRepositoryResult,
};
pub use sequence::SequenceSource;
#[cfg(test)]
pub use sequence::MockSequenceSource;
