// src/core/mod.rs
mod chains;
mod code_model;
mod discovery;
mod engine;
mod frameworks;
mod source_model;

pub use code_model::{
    Annotation, CodeModel, CodeSnapshot, MethodDecl, MethodId, ParamDecl, TypeDecl,
};
pub use source_model::{CallRecord, InMemorySourceModel, SourceModelFile};

pub use frameworks::{
    path_utils, ApiParameter, FrameworkAdapter, FrameworkRegistry, HttpMethod, JaxRsAdapter,
    SpringAdapter,
};

pub use discovery::{ApiEndpoint, EndpointDiscoverer};

pub use chains::{
    AnalysisContext, CallChain, CallChainService, CallGraphBuilder, CallNode, ChainCache,
    ChainListener, ContextAssembler, ElementContext,
};

// Export the main engine
pub use engine::Engine;
