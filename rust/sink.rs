use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::clients::anthropic::GeneratedContent;

static CONSOLE: Mutex<()> = Mutex::new(());

/// Exclusive use of stdout. Extraction silences the process-wide stdout/stderr
/// while holding it, so output written under the same guard is never swallowed.
pub(crate) fn console_lock() -> MutexGuard<'static, ()> {
    CONSOLE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Destination for generated content.
pub trait OutputSink: Send + Sync {
    fn emit(&self, content: &GeneratedContent);
}

/// Prints the response text to stdout, or the raw JSON when the model returned no text.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, content: &GeneratedContent) {
        let _console = console_lock();
        if content.text.is_empty() {
            println!("{}", content.raw);
        } else {
            println!("{}", content.text);
        }
    }
}
