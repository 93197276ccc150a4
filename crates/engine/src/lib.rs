#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Anchor and mark consistency engine.
//!
//! Keeps comment threads bound to the text they annotate while a rich-text
//! document is edited locally, undone, and synchronised with remote peers.
//!
//! # Main Types
//!
//! - [`EditorSession`] - Single-writer harness: dispatch, polling, thread actions
//! - [`AnchorEngine`] - Stateless operations configured once per schema
//! - [`CommentStore`] - Insertion-ordered comment records with a change log
//! - [`AnchorEvents`] - Batched liveness changes for the comments panel
//!
//! # Flow
//!
//! ```text
//! dispatch(tx)
//! ├── append_transaction   // corrective marks: ghosts, paste, typing
//! ├── state.remap          // pending selection follows the edit
//! └── run_pass             // once the stability gate has opened
//!     ├── orphan / restore / refresh root records
//!     └── AnchorEvent::{Orphaned, Restored}
//! ```

pub mod capability;
pub mod clock;
pub mod comments;
pub mod config;
pub mod context;
mod engine;
pub mod error;
pub mod events;
pub mod gate;
pub mod lifecycle;
pub mod maintain;
pub mod marks;
pub mod matcher;
mod session;
pub mod state;

pub use capability::{AnnotationCapability, CommentMarkType};
pub use clock::{Clock, ManualClock, SystemClock};
pub use comments::{AnchorKind, AnchorState, CommentRecord, CommentStore, StoreChange};
pub use config::{AnchorConfig, ScoreWeights};
pub use context::{PositionContext, capture_context};
pub use engine::AnchorEngine;
pub use error::ConfigError;
pub use events::{AnchorEvent, AnchorEvents};
pub use gate::{GateState, SelectionDebounce, StabilityGate};
pub use lifecycle::{CreatedThread, PassReport, UnresolveOutcome};
pub use maintain::{append_transaction, sweep_ghosts};
pub use marks::SelectionTarget;
pub use matcher::{Occurrence, ScoredOccurrence, find_best_match, score_occurrences};
pub use session::EditorSession;
pub use state::AnchorEngineState;
