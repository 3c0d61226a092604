//! # calc_core - Construction Cost Estimation Engine
//!
//! `calc_core` prices construction work items against a catalog of
//! materials, workmanship and labor, and rolls saved line items up into
//! project totals. All inputs and outputs are JSON-serializable, so the same
//! engine sits behind a CLI, a desktop shell or a web front end.
//!
//! ## Design Philosophy
//!
//! - **Total calculations**: pricing and aggregation never fail; invalid
//!   numbers count as 0 and missing reference data contributes nothing
//! - **Explicit state**: custom prices, floor surcharges, custom rates and
//!   summary cards live in [`state::ProjectState`], recomputed on every change
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types at the I/O boundaries
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use calc_core::catalog::{Catalog, Resource, ResourceType, UsageRule};
//! use calc_core::calculations::LineItemInput;
//! use calc_core::state::ProjectState;
//!
//! let catalog = Catalog::new(
//!     vec![Resource::new("بلاط HDF", "م2", 400.0, ResourceType::Material)],
//!     vec![], vec![],
//!     vec![UsageRule::new("بورسلين", "بلاط HDF", "بلاط HDF", ResourceType::Material, 1.05)],
//! );
//! let state = ProjectState::new(Arc::new(catalog));
//!
//! let input = LineItemInput::new("بورسلين", "بلاط HDF", 100.0).with_markups(10.0, 5.0);
//! let result = state.calculate(&input);
//! assert!((result.grand_total - 48300.0).abs() < 1e-6);
//! assert_eq!(result.unit, "م2");
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Resources, usage rules and resource sectors
//! - [`pricing`] - Custom prices, unit conversion and labor floor surcharges
//! - [`calculations`] - Line item calculation and work item units
//! - [`summary`] - Summary cards, totals, undo and the resource roll-up
//! - [`state`] - Working state of one open project
//! - [`session`] - Project registry, selection and change notifications
//! - [`project`] - Persisted project container
//! - [`store`] - Project storage trait with memory and file backends
//! - [`export`] - Flat view for spreadsheet and report writers
//! - [`numeric`] / [`normalize`] - Number coercion and Arabic text matching
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod calculations;
pub mod catalog;
pub mod errors;
pub mod export;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod normalize;
pub mod numeric;
pub mod pricing;
pub mod project;
pub mod session;
pub mod state;
pub mod store;
pub mod summary;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root for convenience
pub use calculations::{LineItemInput, LineItemResult};
pub use catalog::{Catalog, ResourceType};
pub use errors::{CalcError, CalcResult};
pub use export::ExportView;
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, save_project, FileLock};
pub use project::{Project, ProjectInfo};
pub use session::{EstimatorSession, StateChange};
pub use state::ProjectState;
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
pub use store::{MemoryStore, ProjectStore};
