//! Record sources and download sinks

pub mod in_memory;
pub mod sinks;

pub use in_memory::InMemoryRecordSource;
pub use sinks::{Download, FileSystemSink, MemorySink};
