//! Cross-crate golden-value tests for the mparith workspace.
