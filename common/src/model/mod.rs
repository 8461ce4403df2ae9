pub mod batch;
pub mod export;
pub mod pagination;
pub mod record;
pub mod upload;
