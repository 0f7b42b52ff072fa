// src/core/chains/mod.rs
//! Call-chain construction, caching and derived analysis context.

mod builder;
mod cache;
mod context;
mod service;

pub use builder::{CallChain, CallGraphBuilder, CallNode};
pub use cache::ChainCache;
pub use context::{AnalysisContext, ContextAssembler, ElementContext};
pub use service::{CallChainService, ChainListener};
