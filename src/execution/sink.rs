use crate::execution::logs::{LogLevel, TaskLogLine};
use std::io::IsTerminal;

/// Destination for remote task log lines.
///
/// The orchestrator emits every line here instead of printing, so callers
/// choose console output, capture, or anything else.
pub trait LogSink: Send {
    fn emit(&mut self, line: TaskLogLine);
}

/// Prints task lines to stdout, coloured by severity when attached to a
/// terminal and `NO_COLOR` is unset.
pub struct ConsoleSink {
    use_color: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            use_color: should_use_color(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn emit(&mut self, line: TaskLogLine) {
        let color = match line.level {
            LogLevel::Error => Some("31"),
            LogLevel::Warning => Some("33"),
            LogLevel::Trace => Some("90"),
            LogLevel::Information => None,
        };

        let rendered = line.format();
        match color {
            Some(c) => println!("{}", paint(&rendered, c, self.use_color)),
            None => println!("{}", rendered),
        }
    }
}

fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[{}m{}\x1b[0m", color, text)
    } else {
        text.to_string()
    }
}

/// An in-memory sink used to assert on emitted lines in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Vec<TaskLogLine>,
}

#[cfg(test)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[TaskLogLine] {
        &self.lines
    }
}

#[cfg(test)]
impl LogSink for CollectingSink {
    fn emit(&mut self, line: TaskLogLine) {
        self.lines.push(line);
    }
}
