//! Testing utilities and harness for scrollgrid.
//!
//! [`GridTestRule`] plays the host: it owns a single-threaded executor,
//! redraws when the grid asks for it, reports layout from a simulated
//! viewport and forwards scroll positions. The fetch sources in
//! [`sources`] script or hand-drive page delivery.

pub mod fixtures;
pub mod sources;
pub mod test_rule;

pub use test_rule::*;

pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::sources::*;
    pub use crate::test_rule::*;
}
