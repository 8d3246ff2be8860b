//! # Warden Policy
//!
//! In-memory policy and group backends for the Warden.
//!
//! - [`MemoryPolicyManager`] stores [`Policy`] documents and implements
//!   [`PolicyEvaluator`](warden_core::PolicyEvaluator)
//! - [`MemoryGroupManager`] stores [`Group`]s and implements
//!   [`GroupResolver`](warden_core::GroupResolver)
//! - [`PolicyDocument`] loads both from a JSON file
//!
//! # Example
//!
//! ```
//! use warden_core::{AccessRequest, Verdict};
//! use warden_policy::{Effect, MemoryPolicyManager, Policy};
//!
//! let manager = MemoryPolicyManager::new();
//! manager
//!     .create(
//!         Policy::new("readers", Effect::Allow)
//!             .with_subjects(["<.*>"])
//!             .with_resources(["resources:articles:<[0-9]+>"])
//!             .with_actions(["read"]),
//!     )
//!     .unwrap();
//!
//! let request = AccessRequest::new("alice", "resources:articles:42", "read");
//! assert_eq!(manager.decide(&request).verdict, Verdict::Allow);
//! ```

#![doc(html_root_url = "https://docs.rs/warden-policy/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod condition;
mod document;
mod error;
mod groups;
mod manager;
pub mod matcher;
mod policy;

pub use condition::Condition;
pub use document::PolicyDocument;
pub use error::{PolicyResult, PolicyStoreError};
pub use groups::{Group, MemoryGroupManager};
pub use manager::MemoryPolicyManager;
pub use policy::{Effect, Policy};
