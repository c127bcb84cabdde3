pub mod error;
pub mod prober;
pub mod result;

pub use error::ProbeError;
pub use prober::{LivenessProbe, Prober};
pub use result::ProbeReport;
