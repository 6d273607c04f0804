use std::sync::Arc;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::config::{Capabilities, Config};
use crate::pipeline::progress::RunRegistry;
use crate::pipeline::Pipeline;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Computed once at startup; never changes for the life of the process.
    pub capabilities: Capabilities,
    pub pipeline: Arc<Pipeline>,
    /// Same analyzer the pipeline uses, exposed for the analyze-only endpoint.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub store: Arc<dyn ResumeStore>,
    pub runs: RunRegistry,
}

impl AppState {
    pub fn new(
        config: Config,
        analyzer: Arc<dyn ResumeAnalyzer>,
        matcher: Arc<dyn crate::matching::JobMatcher>,
        store: Arc<dyn ResumeStore>,
    ) -> Self {
        let capabilities = config.capabilities();
        let pipeline = Pipeline::new(capabilities, analyzer.clone(), matcher, store.clone());
        Self {
            config: Arc::new(config),
            capabilities,
            pipeline: Arc::new(pipeline),
            analyzer,
            store,
            runs: RunRegistry::default(),
        }
    }
}
