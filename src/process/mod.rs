// src/process/mod.rs

pub mod dataset;
pub mod normalize;
pub mod raw_table;

pub use dataset::{NormalizedRecord, PositionDataset, Value};
pub use normalize::{
    canonical_name, coerce_percent, flatten_header, normalize, normalize_all, strip_thousands,
};
pub use raw_table::{Header, RawTable};
