//! Client for the Lucidtech document API
//!
//! `Client` owns the resilient request executor; resource methods for
//! documents, predictions, workflows and the rest are implemented on it in
//! `resources`. Authentication comes from `las-auth`.

pub mod classify;
pub mod client;
pub mod content;
pub mod error;
pub mod metrics;
pub mod prediction;
pub mod resources;
pub mod retry;
pub mod strip;

pub use classify::{Classification, classify};
pub use client::{Client, ClientBuilder, DEFAULT_TIMEOUT, NO_CONTENT_KEY, Params, decode_response};
pub use content::Content;
pub use error::{Error, Result};
pub use prediction::{Field, Prediction};
pub use resources::{
    AssetOptions, AssetUpdate, Described, DocumentListOptions, DocumentOptions, ExecutionListOptions,
    ExecutionUpdate, ListOptions, PredictionOptions, TransitionListOptions, TransitionOptions, UserOptions,
    WorkflowExecutionListOptions, WorkflowOptions,
};
pub use retry::RetryPolicy;

pub use las_auth;
