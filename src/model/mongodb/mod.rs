mod bson;
mod collection;
mod counter;
mod errors;

pub use bson::{u32_id_filter, Id};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{ensure_counters_exist, Counter, CounterId};
pub use errors::is_conflict;
