//! Orchestration services for work items.

mod allocation;
mod collaboration;
mod lifecycle;

pub use allocation::{
    AllocationExhausted, AllocationFailure, ClaimError, ConfiguredSequence, ExternalIdAllocator,
};
pub use collaboration::{
    CollaborationError, CollaborationResult, CollaborationService, DownloadedAttachment,
    UploadAttachmentRequest,
};
pub use lifecycle::{
    CreateSubtaskRequest, CreateTaskRequest, VisibleWork, WorkItemService, WorkItemServiceError,
    WorkItemServiceResult,
};
