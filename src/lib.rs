pub mod calendar;
pub mod config;
pub mod filter;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod records;
pub mod similarity;
