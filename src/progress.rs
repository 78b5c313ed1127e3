// src/progress.rs
/// Lightweight progress reporting for a monitoring run.
/// Frontends implement this to surface pipeline stages to users.
pub trait Progress {
    /// Called at the start with the number of stages the run will go through.
    fn begin(&mut self, _stages: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when the pipeline enters a named stage (collect, merge, ...).
    fn stage(&mut self, _name: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Prints stages to stderr, prefixed with their position.
#[derive(Default)]
pub struct ConsoleProgress {
    total: usize,
    done: usize,
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, stages: usize) {
        self.total = stages;
        self.done = 0;
    }

    fn log(&mut self, msg: &str) {
        eprintln!("  {msg}");
    }

    fn stage(&mut self, name: &str) {
        self.done += 1;
        eprintln!("[{}/{}] {name}", self.done, self.total);
    }

    fn finish(&mut self) {
        if self.done < self.total {
            eprintln!("stopped after {}/{} stages", self.done, self.total);
        }
    }
}
