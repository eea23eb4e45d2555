pub mod ivf_reader;

/// Rebuilds the underlying stream of a reader after it ran dry, given
/// how many bytes were already consumed. Used to resume readers that
/// follow a file still being written.
pub type ResetFn<R> = Box<dyn FnMut(usize) -> R>;
