// src/core/engine.rs
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ApiscopeError, Result};
use super::chains::{CallChainService, ContextAssembler};
use super::code_model::{CodeModel, MethodId};
use super::frameworks::FrameworkRegistry;
use super::source_model::InMemorySourceModel;

/// Main orchestration engine for Apiscope
pub struct Engine {
    config: Config,
    registry: Arc<FrameworkRegistry>,
    service: Arc<CallChainService>,
    assembler: Arc<ContextAssembler>,
}

impl Engine {
    /// Create an engine over the code model file named by the CLI or the
    /// configuration.
    pub fn new(config_path: Option<&Path>, model_override: Option<PathBuf>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);

        let model_file = model_override.unwrap_or_else(|| config.project.model_file.clone());
        let model: Arc<dyn CodeModel> = Arc::new(InMemorySourceModel::from_file(model_file)?);

        Self::with_model(config, model)
    }

    /// Create an engine over any code model implementation.
    pub fn with_model(config: Config, model: Arc<dyn CodeModel>) -> Result<Self> {
        let registry = Arc::new(FrameworkRegistry::from_config(&config.discovery));
        let service = Arc::new(CallChainService::new(
            model.clone(),
            registry.clone(),
            &config.analysis,
        ));
        let assembler = Arc::new(ContextAssembler::new(model, service.cache().clone()));

        // Rebuilt chains evict the context aggregates they supersede.
        service.add_listener(Box::new(assembler.clone()));

        Ok(Self {
            config,
            registry,
            service,
            assembler,
        })
    }

    pub fn service(&self) -> &Arc<CallChainService> {
        &self.service
    }

    /// List the registered framework adapters and their annotations.
    pub async fn frameworks(&self) -> Result<()> {
        for adapter in self.registry.all() {
            println!("{}", adapter.name());
            for annotation in adapter.annotations() {
                println!("  {}", annotation);
            }
        }
        Ok(())
    }

    /// Run discovery and print the endpoint table (or JSON).
    pub async fn discover(&self, framework: Option<String>, json: bool) -> Result<()> {
        let endpoints = match &framework {
            Some(name) => self.service.discover_for(name)?,
            None => {
                self.service.refresh()?;
                self.service.endpoints()?
            }
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&endpoints)?);
            return Ok(());
        }

        if endpoints.is_empty() {
            println!("No API endpoints discovered");
            return Ok(());
        }

        for endpoint in &endpoints {
            println!(
                "{:6} {:40} {}",
                endpoint.http_method.to_string(),
                endpoint.path,
                endpoint.handler
            );
        }
        println!("{} endpoints", endpoints.len());
        Ok(())
    }

    /// Build (or fetch) the call chain for a method and print it as an
    /// indented tree.
    pub async fn chain(&self, method_ref: &str, json: bool) -> Result<()> {
        let entry_point: MethodId = method_ref.parse()?;
        let chain = self.service.build_call_chain(&entry_point)?;

        if json {
            println!("{}", serde_json::to_string_pretty(chain.as_ref())?);
            return Ok(());
        }

        match &chain.root {
            Some(root) => {
                let mut stack = vec![root];
                while let Some(node) = stack.pop() {
                    println!("{}{}", "  ".repeat(node.depth), node.method);
                    for child in node.children.iter().rev() {
                        stack.push(child);
                    }
                }
            }
            None => println!("No chain available for {}", entry_point),
        }
        Ok(())
    }

    /// Build the analysis context for a method's call chain and print it.
    pub async fn context(&self, method_ref: &str) -> Result<()> {
        let entry_point: MethodId = method_ref.parse()?;
        let chain = self.service.build_call_chain(&entry_point)?;
        let context = self.assembler.build_context(&chain)?;

        println!("{}", serde_json::to_string_pretty(&context)?);
        Ok(())
    }

    /// List all callers of a method.
    pub async fn callers(&self, method_ref: &str) -> Result<()> {
        let method: MethodId = method_ref.parse()?;
        let callers = self.service.callers_of(&method)?;

        if callers.is_empty() {
            println!("No callers found for {}", method);
        }
        for caller in callers {
            println!("{}", caller);
        }
        Ok(())
    }

    /// List direct and transitive subtypes of a type.
    pub async fn subtypes(&self, type_name: &str) -> Result<()> {
        let subtypes = self.service.subtypes_of(type_name)?;

        if subtypes.is_empty() {
            println!("No subtypes found for {}", type_name);
        }
        for subtype in subtypes {
            println!("{}", subtype);
        }
        Ok(())
    }

    /// Discover all endpoints and pre-build their call chains in the
    /// background, waiting for completion.
    pub async fn prewarm(&self) -> Result<()> {
        match self.service.refresh() {
            Ok(count) => info!("Pre-warming {} endpoints", count),
            Err(ApiscopeError::ModelNotReady) => {
                info!("Code model index not ready; deferring pre-warm");
                return Ok(());
            }
            Err(error) => return Err(error),
        }

        let built = self
            .spawn_prewarm()
            .await
            .map_err(|e| ApiscopeError::Model(e.to_string()))??;

        println!("Pre-warmed {} call chains", built);
        Ok(())
    }

    /// Background pre-warm task. The caller can await the handle for the
    /// number of chains built, or drop it and let the task run detached.
    pub fn spawn_prewarm(&self) -> JoinHandle<Result<usize>> {
        let service = self.service.clone();

        tokio::task::spawn_blocking(move || {
            let endpoints = service.endpoints()?;
            let mut built = 0;

            for endpoint in endpoints {
                match service.build_chain_for_endpoint(&endpoint.id) {
                    Ok(_) => built += 1,
                    Err(error) => {
                        // Per-endpoint failures never abort the pass.
                        warn!(
                            "Failed to build call chain for {}: {}",
                            endpoint.handler, error
                        );
                    }
                }
            }

            Ok(built)
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
