pub mod event;
pub mod step;
pub mod storage;
pub mod world;
