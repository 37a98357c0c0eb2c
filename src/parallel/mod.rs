pub mod lock;
pub mod work_queue;
pub mod indexer;
pub mod querier;
