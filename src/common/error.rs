use thiserror::Error;

pub fn print_error_message_and_exit(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

pub type AllocResult<T> = Result<T, AllocError>;

/// Errors that can be returned from a managed heap allocation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AllocError {
    /// The request did not fit in the active semispace even after a full collection.
    #[error(
        "Ran out of heap memory: requested {requested} bytes but only {available} bytes are free \
         after collection"
    )]
    OutOfMemory { requested: usize, available: usize },
}
