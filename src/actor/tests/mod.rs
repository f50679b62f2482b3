//! Unit tests for the actor directory.
