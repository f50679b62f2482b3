//! Domain model for work items.
//!
//! The domain keeps identifier formatting, status bookkeeping, and
//! authorisation rules free of infrastructure concerns.

pub mod access;
mod attachment;
mod comment;
mod error;
mod external_id;
mod ids;
mod status;
mod subtask;
mod task;

pub use access::{AccessError, WorkItemAction};
pub use attachment::{Attachment, AttachmentFileName, NewAttachment, PersistedAttachmentData};
pub use comment::{Comment, CommentBody, PersistedCommentData};
pub use error::{ParsePriorityError, ParseStatusError, WorkItemDomainError};
pub use external_id::{ExternalId, SequenceNumber, WorkItemKind};
pub use ids::{AttachmentId, CommentId, SubtaskId, TaskId, WorkItemRef};
pub use status::{Progress, StatusChange, WorkItemStatus};
pub use subtask::{NewSubtask, PersistedSubtaskData, Subtask};
pub use task::{NewTask, PersistedTaskData, Priority, Task, TaskDetailsUpdate};
