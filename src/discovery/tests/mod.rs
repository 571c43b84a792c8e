//! Unit tests for the discovery module.
