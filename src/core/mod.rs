pub mod buckets;
pub mod filters;
pub mod sessions;
pub mod timestamps;

pub use buckets::BucketEdges;
pub use filters::{FilterCriteria, PnlFilter, WeekdayFilter};
pub use sessions::Session;
pub use timestamps::TimeBasis;
