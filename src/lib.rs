//! Reshape a humanitarian-aid dataset into an appeal tree.
//!
//! Records are split by appeal status ("Yes"/"No"), then grouped by
//! continent and country, with the event years as leaves:
//!
//! ```text
//! Appealed for aid?
//! ├── Yes
//! │   └── Africa
//! │       └── Chad
//! │           └── 2000
//! └── No
//!     └── Africa
//!         └── Chad
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
