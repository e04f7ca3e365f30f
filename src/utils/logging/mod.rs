pub(crate) mod console_logger;
pub(crate) mod progress_bar;

pub(crate) use console_logger::ConsoleLogger;
pub(crate) use progress_bar::MapProgressBar;
