// src/exam/mod.rs
//
// The scoring core: pure, synchronous computation over in-memory data.
// Selection, analysis, aggregation and cross-validation have no side
// effects; only `lifecycle` mutates the records handed to it.

pub mod aggregator;
pub mod analyzer;
pub mod crosscheck;
pub mod integrity;
pub mod lifecycle;
pub mod rules;
pub mod selector;
