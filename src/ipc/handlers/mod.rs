pub mod core;
pub mod lessons;
pub mod reorder;
pub mod sections;
pub mod summary;
