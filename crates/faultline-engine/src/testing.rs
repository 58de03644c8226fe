//! Error fixtures and log capture shared by unit tests.

use std::io;
use std::sync::Arc;

use faultline_core::error_lineage;
use faultline_core::raised::{FromMessage, Raised};
use parking_lot::Mutex;
use thiserror::Error;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParentFault(pub String);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ChildFault(pub String);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct GrandchildFault(pub String);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StageA(pub String);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StageB(pub String);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StageC(pub String);

#[derive(Debug, Error)]
#[error("{message}")]
pub struct CausedFault {
    pub message: String,
    #[source]
    pub cause: Option<Raised>,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct PlainFault(pub String);

error_lineage! {
    ParentFault,
    ChildFault => ParentFault,
    GrandchildFault => ChildFault,
    StageA,
    StageB,
    StageC,
    CausedFault,
    PlainFault,
}

impl FromMessage for CausedFault {
    fn from_message(message: String) -> Self {
        Self {
            message,
            cause: None,
        }
    }

    fn from_message_with_cause(message: String, cause: Raised) -> Self {
        Self {
            message,
            cause: Some(cause),
        }
    }
}

impl FromMessage for PlainFault {
    fn from_message(message: String) -> Self {
        Self(message)
    }
}

/// Buffer collecting formatted log lines.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(Arc::clone(&self.0))
    }
}

/// Runs `f` with a thread-local subscriber and returns its result together
/// with everything logged meanwhile.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let output = String::from_utf8_lossy(&logs.0.lock()).into_owned();
    (result, output)
}
