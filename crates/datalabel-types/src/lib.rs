pub mod amount;
pub mod error;
pub mod id;
pub mod label;
pub mod params;

pub use amount::QuAmount;
pub use error::{ErrorKind, LabelError, Result};
pub use id::{TaskHash, WorkerId};
pub use label::Label;
pub use params::ProtocolParams;
