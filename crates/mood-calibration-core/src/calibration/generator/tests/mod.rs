//! Tests for the adjustment generator.

mod helpers;
