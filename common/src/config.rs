#[derive(Clone, Debug)]
pub struct Config {
    /// Number of workers pulling hostnames off the dispatch queue.
    ///
    /// Also sizes the queue itself, so the producer blocks once this
    /// many hostnames are waiting.
    pub concurrency: usize,
    /// Emit one `<url>,<status>` line per completed probe and mark
    /// confirmed findings with a colored prefix.
    pub verbose: bool,
}
