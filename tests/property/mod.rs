// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of the stock ledger that must hold for every sequence of
//! operations, not only the hand-picked ones.

mod reservation_invariants;
