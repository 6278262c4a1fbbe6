use crate::error::ScriptError;

/// Where a run's printed output goes. The interpreter only ever appends.
pub trait OutputSink {
    fn log(&mut self, messages: Vec<String>);

    /// Records the error that ended the run.
    fn fail(&mut self, error: ScriptError);
}

/// Buffers everything in memory for the host to collect after the run.
#[derive(Debug, Default)]
pub struct Console {
    log: Vec<String>,
    fatal_error: Option<ScriptError>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    pub fn lines(&self) -> &[String] {
        &self.log
    }

    pub fn output(&self) -> String {
        self.log.join("\n")
    }

    pub fn fatal_error(&self) -> Option<&ScriptError> {
        self.fatal_error.as_ref()
    }
}

impl OutputSink for Console {
    fn log(&mut self, messages: Vec<String>) {
        self.log.extend(messages);
    }

    fn fail(&mut self, error: ScriptError) {
        if self.fatal_error.is_none() {
            self.fatal_error = Some(error);
        }
    }
}

/// Writes each printed string to stdout as soon as it arrives, and the
/// failure, if any, to stderr.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl OutputSink for StdoutConsole {
    fn log(&mut self, messages: Vec<String>) {
        for message in messages {
            println!("{}", message);
        }
    }

    fn fail(&mut self, error: ScriptError) {
        eprintln!("Error: {}", error.report());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_collects_output() {
        let mut console = Console::new();
        console.log(vec!["a".to_string(), "b".to_string()]);
        console.log(vec!["c".to_string()]);
        assert_eq!(console.lines(), ["a", "b", "c"]);
        assert_eq!(console.output(), "a\nb\nc");

        console.clear();
        assert!(console.lines().is_empty());
    }

    #[test]
    fn test_console_keeps_first_failure() {
        let mut console = Console::new();
        console.fail(ScriptError::Redeclaration {
            name: "x".to_string(),
        });
        console.fail(ScriptError::Type {
            got: "nil".to_string(),
        });
        assert!(matches!(
            console.fatal_error(),
            Some(ScriptError::Redeclaration { .. })
        ));
    }
}
