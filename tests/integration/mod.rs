//! Integration tests for the research assistant
//!
//! These tests drive the API router end to end, with the extractive engines
//! or a mock model, and the Ollama client against a mock HTTP server.

mod challenge_tests;
