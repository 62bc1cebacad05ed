pub mod analysis;
pub mod objective;
pub mod taxonomy;

pub use analysis::*;
pub use objective::*;
