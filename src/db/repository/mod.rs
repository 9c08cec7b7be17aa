pub mod audit;
pub mod import_record;
pub mod question;
pub mod quiz;
pub mod snapshot;

pub use audit::*;
pub use import_record::*;
pub use question::*;
pub use quiz::*;
pub use snapshot::*;
