// src/progress.rs
/// Lightweight status reporting for the slow pipeline steps (rendering a report).
/// Front-ends implement this to surface status lines to users.
pub trait Progress {
    /// Called once before any network work starts.
    fn begin(&mut self) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Collects every status line; handy for front-ends that reply in one message.
#[derive(Default)]
pub struct Transcript {
    pub lines: Vec<String>,
}

impl Progress for Transcript {
    fn log(&mut self, msg: &str) {
        self.lines.push(s!(msg));
    }
}
