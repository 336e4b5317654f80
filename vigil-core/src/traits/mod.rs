//! Collaborator traits
//!
//! These traits define the interface between the alarm decision logic and
//! whatever stores status and looks at camera frames.

pub mod classifier;
pub mod repository;

pub use classifier::{ClassifierError, ImageClassifier};
pub use repository::{SecurityRepository, StoreError};
