//! Track model and the file picker's directory scan.

mod model;
mod scan;

pub use model::Track;
pub use scan::{PickerEntry, scan};
