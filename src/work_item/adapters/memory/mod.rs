//! In-memory adapters for work-item ports.

mod attachment_store;
mod sequence;
mod work_item;

pub use attachment_store::InMemoryAttachmentStore;
pub use sequence::InMemorySequenceCounter;
pub use work_item::InMemoryWorkItemRepository;
