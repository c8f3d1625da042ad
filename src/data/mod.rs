pub mod dataset;
pub mod loader;
pub mod splitter;

pub use dataset::Dataset;
pub use loader::{load_dataset, load_table};
pub use splitter::{split_train_validation, DatasetSplit};
