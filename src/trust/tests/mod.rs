//! Unit tests for the trust module.

mod manager_tests;
