//! Unit tests for the registry coordinator.
