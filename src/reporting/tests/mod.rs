//! Unit tests for workload reporting.
