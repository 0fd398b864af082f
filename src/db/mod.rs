pub mod editor_repo;
pub mod memory;
pub mod models;
pub mod roster_repo;
pub mod storage;
