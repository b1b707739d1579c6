//! Domain layer - Records, schemas and the rules that govern them

pub mod collection;
pub mod query;
pub mod record;
pub mod schema;
pub mod snapshot;
pub mod system_config;

pub use collection::{CollectionKey, EntityType};
pub use query::{Criteria, SortOrder};
pub use record::{FieldMap, Record};
pub use snapshot::Snapshot;
pub use system_config::{ConfigUpdate, SystemConfig};
