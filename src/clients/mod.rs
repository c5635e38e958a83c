pub mod completion;

pub use completion::{Completion, CompletionClient, CompletionError, Usage};
