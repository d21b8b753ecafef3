// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Entry Point
//!
//! This test suite uses proptest to verify the ledger invariants over
//! arbitrary operation sequences.

mod property;
