//! Tests for the purchase flow

mod mocks;

mod flow_tests;
