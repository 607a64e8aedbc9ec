use log::warn;

/// Receiver of the verbose failure reports of a context.
pub trait DiagnosticSink {
    /// `whom` names the step that failed.
    fn report(&self, whom: &str, message: &str);
}

/// Sends the reports to the `log` facade, at warning level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, whom: &str, message: &str) {
        warn!("{}: {}", whom, message);
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str, &str),
{
    fn report(&self, whom: &str, message: &str) {
        self(whom, message);
    }
}

/// Verbose flag plus the sink it gates.
pub(crate) struct Diagnostics {
    verbose: bool,
    sink: Box<dyn DiagnosticSink>,
}

impl Diagnostics {
    pub fn new(sink: Box<dyn DiagnosticSink>) -> Self {
        return Self {
            verbose: false,
            sink,
        };
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        return self.verbose;
    }

    pub fn report(&self, whom: &str, message: &str) {
        if self.verbose {
            self.sink.report(whom, message);
        }
    }

    pub fn report_error(&self, whom: &str, error: &dyn std::error::Error) {
        if self.verbose {
            self.sink.report(whom, &error.to_string());
        }
    }
}
