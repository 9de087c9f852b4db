//! Integration tests for bpgrid-bot.
//!
//! These tests verify the interaction between components:
//! - order-update stream lifecycle (subscribe, resubscribe, reconnect)
//! - event delivery into the engine-facing channel

pub mod common;
