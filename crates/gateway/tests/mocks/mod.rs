pub mod completion;
pub mod extractor;
pub mod speech;
pub mod store;
