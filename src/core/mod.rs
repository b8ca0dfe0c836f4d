pub mod aggregator;
pub mod tree;
