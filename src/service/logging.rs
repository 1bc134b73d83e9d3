//! Logging decorator for [`ViewService`].

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::{Method, ViewService};
use crate::error::Result;
use crate::store::ViewCount;

/// Logs every call made through the wrapped service.
///
/// Successful calls are logged at `debug`, failed calls at `warn`, each with
/// the method, its arguments and how long the call took.
///
/// ```rust
/// use classifica::service::{Logged, ViewService};
/// use classifica::RankedCounterStore;
///
/// let service = Logged::new(RankedCounterStore::new());
/// service.increment("video1")?;
/// // DEBUG classifica::service::logging: method=increment id="video1" took=1.2µs ok
/// # Ok::<(), classifica::ViewError>(())
/// ```
#[derive(Debug, Default)]
pub struct Logged<S> {
    inner: S,
}

impl<S> Logged<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Returns the wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps the decorator.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn log_call<T>(method: Method, args: fmt::Arguments<'_>, took: Duration, result: &Result<T>) {
    match result {
        Ok(_) => debug!("method={method} {args} took={took:?} ok"),
        Err(err) => warn!("method={method} {args} took={took:?} err={err}"),
    }
}

impl<S: ViewService> ViewService for Logged<S> {
    fn get_view(&self, id: &str) -> Result<u64> {
        let begin = Instant::now();
        let result = self.inner.get_view(id);
        log_call(Method::GetView, format_args!("id={id:?}"), begin.elapsed(), &result);
        result
    }

    fn get_all(&self) -> Result<Vec<ViewCount>> {
        let begin = Instant::now();
        let result = self.inner.get_all();
        log_call(Method::GetAll, format_args!(""), begin.elapsed(), &result);
        result
    }

    fn increment(&self, id: &str) -> Result<()> {
        let begin = Instant::now();
        let result = self.inner.increment(id);
        log_call(Method::Increment, format_args!("id={id:?}"), begin.elapsed(), &result);
        result
    }

    fn get_top(&self, n: i64) -> Result<Vec<ViewCount>> {
        let begin = Instant::now();
        let result = self.inner.get_top(n);
        log_call(Method::GetTop, format_args!("n={n}"), begin.elapsed(), &result);
        result
    }

    fn get_recent(&self, n: i64) -> Result<Vec<ViewCount>> {
        let begin = Instant::now();
        let result = self.inner.get_recent(n);
        log_call(Method::GetRecent, format_args!("n={n}"), begin.elapsed(), &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture_log::capture;
    use crate::error::ViewError;
    use crate::store::RankedCounterStore;
    use log::Level;

    #[test]
    fn test_forwards_calls() {
        let service = Logged::new(RankedCounterStore::new());
        service.increment("a").unwrap();
        service.increment("b").unwrap();
        service.increment("b").unwrap();
        assert_eq!(service.get_view("b"), Ok(2));
        assert_eq!(service.get_all().unwrap().len(), 2);
        assert_eq!(service.get_top(1).unwrap(), vec![ViewCount::new("b", 2)]);
        assert_eq!(service.get_recent(1).unwrap(), vec![ViewCount::new("b", 2)]);
        assert_eq!(service.inner().len(), 2);
    }

    #[test]
    fn test_forwards_errors() {
        let service = Logged::new(RankedCounterStore::new());
        assert!(matches!(
            service.increment(""),
            Err(ViewError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.get_top(-1),
            Err(ViewError::InvalidArgument(_))
        ));
        assert!(service.into_inner().is_empty());
    }

    fn calls(records: &[(Level, String)], method: &str) -> Vec<(Level, String)> {
        let prefix = format!("method={method} ");
        records
            .iter()
            .filter(|(_, message)| message.starts_with(&prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn test_success_logged_at_debug() {
        let service = Logged::new(RankedCounterStore::new());
        let records = capture(|| service.increment("a").unwrap());

        let logged = calls(&records, "increment");
        assert_eq!(logged.len(), 1);
        let (level, message) = &logged[0];
        assert_eq!(*level, Level::Debug);
        assert!(message.starts_with(r#"method=increment id="a" took="#));
        assert!(message.ends_with(" ok"));
    }

    #[test]
    fn test_failure_logged_at_warn() {
        let service = Logged::new(RankedCounterStore::new());
        let records = capture(|| {
            let _ = service.get_top(-1);
        });

        let logged = calls(&records, "get_top");
        assert_eq!(logged.len(), 1);
        let (level, message) = &logged[0];
        assert_eq!(*level, Level::Warn);
        assert!(message.starts_with("method=get_top n=-1 took="));
        assert!(message.ends_with("err=invalid argument: n must not be negative"));
    }

    #[test]
    fn test_no_warning_for_successful_calls() {
        let service = Logged::new(RankedCounterStore::new());
        let records = capture(|| {
            service.increment("a").unwrap();
            service.get_view("a").unwrap();
            service.get_all().unwrap();
            service.get_recent(3).unwrap();
        });

        assert!(records.iter().all(|(level, _)| *level != Level::Warn));
        assert!(calls(&records, "get_view")[0].1.contains(r#"id="a""#));
        assert_eq!(calls(&records, "get_all").len(), 1);
        assert!(calls(&records, "get_recent")[0].1.starts_with("method=get_recent n=3 "));
    }
}
