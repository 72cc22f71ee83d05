pub mod extraction;
pub mod llm;
pub mod processor;
pub mod storage;
pub mod summary;
