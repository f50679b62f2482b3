//! Application services for the actor directory.

mod directory;

pub use directory::{
    ActorDirectoryError, ActorDirectoryResult, ActorDirectoryService, RegisterActorRequest,
};
