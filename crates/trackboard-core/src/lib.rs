//! trackboard-core: read-only views over an experiment-tracking server.
//!
//! Every render is one synchronous pass: the view router picks a view, the
//! view queries the [`TrackingService`] and reshapes the answers into a
//! renderer-independent [`Page`]. Nothing is cached between renders.

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod preview;
pub mod surface;
pub mod tabular;
pub mod views;
pub mod walker;

pub use client::{InMemoryTracking, MlflowClient, TrackingService};
pub use config::DashConfig;
pub use error::{DashError, Result};
pub use models::{ArtifactNode, Experiment, LocalArtifactFile, RegisteredModel, Run, RunStatus};
pub use preview::PreviewKind;
pub use surface::{Block, NoticeLevel, Page};
pub use views::{DashContext, Selection, View};
