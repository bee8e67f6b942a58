// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The error sink (`Reporter`). See spec §4.2 and §5.
//!
//! Every pipeline stage owns its own numeric error-code space, discriminated
//! by [`Context`]; the sink itself is agnostic to the meaning of a code.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::source::Position;

/// Which stage of the pipeline raised an error. Each variant has its own
/// dense numeric code space (documented by the `*_CODE` constants next to
/// each stage's tokenizer/builder), matching spec §6 "Error record shape".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    Html5Tokenizer,
    Html5TreeBuilder,
    MarkdownTokenizer,
    MarkdownBridge,
    Config,
}

/// A single structured diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorRecord {
    pub path: PathBuf,
    pub context: Context,
    pub code: u32,
    pub position: Position,
    pub detail: Option<String>,
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} [{:?}#{}]",
            self.path.display(),
            self.position,
            self.context,
            self.code
        )?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

type OutputCallback = Box<dyn Fn(&ErrorRecord) + Send + Sync>;

/// The error sink. Thread-safe under concurrent `log` calls (spec §5):
/// every public method takes `&self` and serialises through an internal
/// mutex, mirroring the original `ParserLog`'s single static mutex-guarded
/// instance plus per-path buffering/flush.
pub struct Reporter {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    buffering: bool,
    pools: HashMap<PathBuf, Vec<ErrorRecord>>,
    primary: Option<OutputCallback>,
    named: HashMap<String, OutputCallback>,
}

impl Default for Reporter {
    fn default() -> Reporter {
        Reporter {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Reporter {
    pub fn new() -> Reporter {
        Reporter::default()
    }

    /// The process-wide singleton, for parity with the original's static
    /// `ParserLog` model. Prefer constructing a `Reporter` explicitly and
    /// threading it through, as `html5ever`'s `TreeSink` is always an
    /// explicit argument rather than ambient state; this exists only for
    /// callers that genuinely want one global sink.
    pub fn global() -> &'static Reporter {
        static INSTANCE: OnceLock<Reporter> = OnceLock::new();
        INSTANCE.get_or_init(Reporter::default)
    }

    /// Turn per-path buffering on or off. While buffering, records accumulate
    /// per `path` until [`flush`](Reporter::flush) is called for that path.
    pub fn set_buffering(&self, flag: bool) {
        self.inner.lock().unwrap().buffering = flag;
    }

    /// Attach the single primary output callback, replacing any previous one.
    pub fn attach_output_callback<F>(&self, cb: F)
    where
        F: Fn(&ErrorRecord) + Send + Sync + 'static,
    {
        self.inner.lock().unwrap().primary = Some(Box::new(cb));
    }

    pub fn detach_output_callback(&self) {
        self.inner.lock().unwrap().primary = None;
    }

    /// Attach a named, additional fan-out callback.
    pub fn append_output_callback<F>(&self, name: impl Into<String>, cb: F) -> bool
    where
        F: Fn(&ErrorRecord) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        let name = name.into();
        if inner.named.contains_key(&name) {
            return false;
        }
        inner.named.insert(name, Box::new(cb));
        true
    }

    pub fn detach_named_callback(&self, name: &str) -> bool {
        self.inner.lock().unwrap().named.remove(name).is_some()
    }

    pub fn log(
        &self,
        path: impl AsRef<Path>,
        context: Context,
        code: u32,
        position: Position,
        detail: Option<String>,
    ) {
        let record = ErrorRecord {
            path: path.as_ref().to_path_buf(),
            context,
            code,
            position,
            detail,
        };
        let mut inner = self.inner.lock().unwrap();
        if inner.buffering {
            inner
                .pools
                .entry(record.path.clone())
                .or_default()
                .push(record);
        } else {
            Self::dispatch(&inner, &record);
        }
    }

    fn dispatch(inner: &Inner, record: &ErrorRecord) {
        if let Some(cb) = &inner.primary {
            cb(record);
        }
        for cb in inner.named.values() {
            cb(record);
        }
    }

    /// Release all buffered records for `path`, dispatching them in order,
    /// oldest first.
    pub fn flush(&self, path: impl AsRef<Path>) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(records) = inner.pools.remove(path.as_ref()) {
            for record in &records {
                Self::dispatch(&inner, record);
            }
        }
    }

    /// Flush every buffered path.
    pub fn flush_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        let pools = std::mem::take(&mut inner.pools);
        for records in pools.values() {
            for record in records {
                Self::dispatch(&inner, record);
            }
        }
    }

    /// Number of records currently buffered for `path` (0 if unbuffered or empty).
    pub fn buffered_count(&self, path: impl AsRef<Path>) -> usize {
        self.inner
            .lock()
            .unwrap()
            .pools
            .get(path.as_ref())
            .map_or(0, Vec::len)
    }
}

/// A fatal, non-recoverable parser failure (spec §7.3): developer-error
/// situations such as an unreachable state or an impossible stack
/// invariant. Distinct from [`ErrorRecord`], which is always recoverable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsingFailure {
    pub message: String,
}

impl std::fmt::Display for ParsingFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parsing failure: {}", self.message)
    }
}

impl std::error::Error for ParsingFailure {}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn unbuffered_dispatches_immediately() {
        let reporter = Reporter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        reporter.attach_output_callback(move |_| {
            count2.fetch_add(1, Ordering::SeqCst);
        });
        reporter.log("a.html", Context::Html5Tokenizer, 1, Position::START, None);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn buffering_delays_until_flush() {
        let reporter = Reporter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        reporter.attach_output_callback(move |_| {
            count2.fetch_add(1, Ordering::SeqCst);
        });
        reporter.set_buffering(true);
        reporter.log("a.html", Context::Html5Tokenizer, 1, Position::START, None);
        reporter.log("a.html", Context::Html5Tokenizer, 2, Position::START, None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(reporter.buffered_count("a.html"), 2);
        reporter.flush("a.html");
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(reporter.buffered_count("a.html"), 0);
    }

    #[test]
    fn named_and_primary_both_fire() {
        let reporter = Reporter::new();
        let primary = Arc::new(AtomicUsize::new(0));
        let named = Arc::new(AtomicUsize::new(0));
        let p2 = primary.clone();
        let n2 = named.clone();
        reporter.attach_output_callback(move |_| {
            p2.fetch_add(1, Ordering::SeqCst);
        });
        assert!(reporter.append_output_callback("audit", move |_| {
            n2.fetch_add(1, Ordering::SeqCst);
        }));
        reporter.log("a.html", Context::MarkdownTokenizer, 7, Position::START, None);
        assert_eq!(primary.load(Ordering::SeqCst), 1);
        assert_eq!(named.load(Ordering::SeqCst), 1);
    }
}
