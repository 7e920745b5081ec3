pub mod container;
pub mod memory;

pub use container::{ContainerError, DocumentContainer, LinkAnnotation, TextRun};
pub use memory::{InMemoryContainer, MemoryPage};
