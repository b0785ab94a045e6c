// Domain layer - Core data types and policy
pub mod format;
pub mod history;
pub mod reading;
pub mod scale;
