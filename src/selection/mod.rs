//! Candidate selection: pure functions, no host access.
//!
//! | Step | Function |
//! |---|---|
//! | **Density** | [`effective_multiplier`] |
//! | **Available box** | [`available_box`]: max of own and parent box |
//! | **Height source** | [`HeightPolicy`]: cover → ratio → declared |
//! | **Scan** | [`choose_candidate`]: first sufficient, else last |
//! | **Decision** | [`select`]: skip / unchanged / apply |
//! | **Report** | [`coverage()`]: candidate per width and density |
//!
//! The module is split into:
//! - **Calculations**: density, box and height math (unit testable)
//! - **Parameters**: [`SelectionRequest`] in, [`Decision`] out
//! - **Selector**: the scan itself

mod calculations;
mod coverage;
mod params;
mod selector;

pub use calculations::{HeightPolicy, available_box, effective_multiplier};
pub use coverage::{CoverageRow, coverage, width_range};
pub use params::{Decision, Selection, SelectionRequest};
pub use selector::{choose_candidate, select};
