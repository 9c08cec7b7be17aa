pub mod enums;
pub mod import_record;
pub mod payloads;
pub mod quiz;
pub mod snapshot;

pub use enums::*;
pub use import_record::*;
pub use payloads::*;
pub use quiz::*;
pub use snapshot::*;
