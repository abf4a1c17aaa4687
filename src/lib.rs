//! Organization hierarchy performance.
//!
//! Builds an organization tree from flat member records and recalculates the
//! performance of every calculated (manager) node from the operators below it.
//!
//! ```
//! use orgperf::domain::{recalculate, FlatRecord, HierarchyBuilder, Status};
//!
//! let records = vec![
//!     FlatRecord::new("1", None, "Ana", "Supervisor", 0),
//!     FlatRecord::new("2", Some("1"), "Bia", "Operador", 85),
//!     FlatRecord::new("3", Some("1"), "Caio", "Operador", 90),
//! ];
//! let tree = HierarchyBuilder::new().build(&records).expect("root");
//! let tree = recalculate(&tree);
//!
//! assert_eq!(tree.performance(), 100);
//! assert_eq!(tree.status(), Status::Success);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
