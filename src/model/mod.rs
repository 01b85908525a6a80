pub mod diagram;
pub mod job;
pub mod metamodel;
pub mod transcript;
