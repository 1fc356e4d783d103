//! Salvage Workflow - workflow definitions and analyze-step inputs
//!
//! Reads just enough of a CI workflow file to answer, for one job instance,
//! what value the analyze action's inputs (`upload`, `category`,
//! `checkout_path`) take once matrix expressions are substituted.
//!
//! # Example
//!
//! ```rust,ignore
//! use salvage_workflow::{InputResolver, WorkflowDefinition, WorkflowJobMatrix};
//!
//! let workflow = WorkflowDefinition::from_yaml_str(yaml)?;
//! let job = WorkflowJobMatrix::new("analyze").with_axis("language", "java");
//! let category = InputResolver::new(&workflow, &job).category_input()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod definition;
pub mod error;
pub mod inputs;

pub use definition::{WorkflowDefinition, WorkflowJob, WorkflowJobMatrix, WorkflowStep};
pub use error::WorkflowError;
pub use inputs::{
    InputResolver, ANALYZE_ACTION, CATEGORY_INPUT, CHECKOUT_PATH_INPUT, DEFAULT_UPLOAD_VALUE,
    UPLOAD_INPUT,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
