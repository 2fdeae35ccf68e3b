pub mod feed;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod resolve;
