//! The pass pipeline run over every finished definition.
//!
//! Uses LLVM's new pass manager through a pipeline string, against a target
//! machine for the host.

use std::sync::Once;

use inkwell::module::Module;
use inkwell::passes::PassBuilderOptions;
use inkwell::targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::OptimizationLevel;

/// Promote slots to registers, then clean up what that exposes.
pub const DEFAULT_PIPELINE: &str = "function(mem2reg,instcombine,reassociate,gvn,simplifycfg)";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("failed to initialize the native target: {0}")]
    TargetInit(String),

    #[error("no target machine for `{triple}`: {message}")]
    TargetMachine { triple: String, message: String },

    #[error("pass pipeline `{pipeline}` failed: {message}")]
    Passes { pipeline: String, message: String },
}

static NATIVE_TARGET_INIT: Once = Once::new();

/// Safe to call multiple times; initialization happens once.
fn initialize_native_target() -> Result<(), BackendError> {
    let mut result = Ok(());

    NATIVE_TARGET_INIT.call_once(|| {
        if let Err(e) = Target::initialize_native(&InitializationConfig::default()) {
            result = Err(BackendError::TargetInit(e));
        }
    });

    result
}

pub struct Optimizer {
    machine: TargetMachine,
    pipeline: String,
}

impl Optimizer {
    /// An optimizer for the host, running [`DEFAULT_PIPELINE`].
    pub fn native() -> Result<Self, BackendError> {
        initialize_native_target()?;

        let triple = TargetMachine::get_default_triple();
        let triple_str = triple.as_str().to_string_lossy().into_owned();
        let target = Target::from_triple(&triple).map_err(|e| BackendError::TargetMachine {
            triple: triple_str.clone(),
            message: e.to_string(),
        })?;
        let machine = target
            .create_target_machine(
                &triple,
                "generic",
                "",
                OptimizationLevel::Default,
                RelocMode::Default,
                CodeModel::JITDefault,
            )
            .ok_or_else(|| BackendError::TargetMachine {
                triple: triple_str,
                message: "target refused the configuration".to_owned(),
            })?;

        Ok(Optimizer {
            machine,
            pipeline: DEFAULT_PIPELINE.to_owned(),
        })
    }

    #[must_use]
    pub fn with_pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = pipeline.into();
        self
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// Run the pipeline over every function with a body in `module`.
    pub fn run(&self, module: &Module<'_>) -> Result<(), BackendError> {
        module
            .run_passes(&self.pipeline, &self.machine, PassBuilderOptions::create())
            .map_err(|e| BackendError::Passes {
                pipeline: self.pipeline.clone(),
                message: e.to_string(),
            })
    }
}
