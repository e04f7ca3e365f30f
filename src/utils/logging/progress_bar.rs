use indicatif::ProgressBar;

/// Progress bar that is only drawn while `RUST_LOG` equals the given level.
#[derive(Default)]
pub struct MapProgressBar {
    progress_bar: Option<ProgressBar>,
}

impl MapProgressBar {
    pub fn new_from_len(env: &str, len: usize) -> Self {
        let progress_bar = if Self::check_correct_env(env) {
            Some(ProgressBar::new(len as u64))
        } else {
            None
        };
        Self { progress_bar }
    }

    pub fn check_correct_env(env: &str) -> bool {
        std::env::var("RUST_LOG").unwrap_or_else(|_| String::from("info")).eq(env)
    }

    pub fn inc(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(1)
        }
    }

    pub fn finish_and_clear(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear()
        }
    }
}
