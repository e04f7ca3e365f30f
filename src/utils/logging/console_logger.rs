use console::style;
use log::*;

/// Numbered step lines of one CLI run, e.g. `[2/3] Decoding map features...`.
pub struct ConsoleLogger {
    done: usize,
    total: usize,
}

impl ConsoleLogger {
    pub fn new(total: usize) -> Self {
        Self { done: 0, total }
    }

    fn next_step(&mut self) -> String {
        self.done = (self.done + 1).min(self.total);
        format!("[{}/{}]", self.done, self.total)
    }

    /// Logs `title` as the next step of the run.
    pub fn step(&mut self, title: &str) {
        let counter = self.next_step();
        info!("{} {}...", style(counter).bold().dim(), title);
    }
}

#[cfg(test)]
mod tests {
    use super::ConsoleLogger;

    #[test]
    fn counts_steps_up_to_total() {
        let mut steps = ConsoleLogger::new(2);
        assert_eq!(steps.next_step(), "[1/2]");
        steps.step("Decoding map features");
        assert_eq!(steps.next_step(), "[2/2]");
    }
}
