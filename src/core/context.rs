use super::diagnostics::{DiagnosticSink, Diagnostics, LogSink};
use super::negotiator::Negotiator;
use super::protocol::{CredentialCache, KrbSession};
use crate::error::{Error, Result};
use crate::native::{KrbNegotiator, NativeSession};
use log::debug;

/// A protocol session bound to one credentials cache.
///
/// Fields are dropped in declaration order, so the cache is released
/// before the session.
pub struct Context {
    pub(crate) cache: Option<Box<dyn CredentialCache>>,
    pub(crate) negotiator: Box<dyn Negotiator>,
    pub(crate) session: Box<dyn KrbSession>,
    pub(crate) diag: Diagnostics,
}

impl Context {
    /// Opens the cache `cache_name`, or the default cache when `None`,
    /// over the native protocol session. Failure reports go to the log.
    pub fn open(cache_name: Option<&str>) -> Result<Self> {
        return Self::open_with_sink(cache_name, Box::new(LogSink));
    }

    pub fn open_with_sink(
        cache_name: Option<&str>,
        sink: Box<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let session = NativeSession::init().map_err(Error::ProtocolInit)?;
        let negotiator = KrbNegotiator::new(session.config().clone());
        return Self::with_session(
            Box::new(session),
            Box::new(negotiator),
            cache_name,
            sink,
        );
    }

    /// Opens a context over the given collaborators.
    pub fn with_session(
        session: Box<dyn KrbSession>,
        negotiator: Box<dyn Negotiator>,
        cache_name: Option<&str>,
        sink: Box<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let name = match cache_name {
            Some(name) => name.to_string(),
            None => session.default_cache_name(),
        };

        let cache = session.resolve_cache(&name).map_err(|source| {
            Error::CacheResolution {
                name: name.clone(),
                source,
            }
        })?;
        debug!("Using ccache {}", cache.name());

        return Ok(Self {
            cache: Some(cache),
            negotiator,
            session,
            diag: Diagnostics::new(sink),
        });
    }

    /// Releases the cache and then the session.
    pub fn close(self) {
        drop(self);
    }

    /// Enables the failure reports to the diagnostic sink.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.diag.set_verbose(verbose);
    }

    pub fn is_verbose(&self) -> bool {
        return self.diag.is_verbose();
    }

    /// Name of the context cache, `None` once destroyed.
    pub fn cache_name(&self) -> Option<String> {
        return self.cache.as_ref().map(|cache| cache.name());
    }

    /// Destroys the context cache. Destroying a cache that does not
    /// exist succeeds. The context keeps no cache afterwards, even when
    /// the destruction fails.
    pub fn destroy(&mut self) -> Result<()> {
        let mut cache = match self.cache.take() {
            Some(cache) => cache,
            None => return Ok(()),
        };

        match cache.destroy() {
            Ok(()) => {
                debug!("Ticket cache {} destroyed", cache.name());
                return Ok(());
            }
            Err(err) if err.is_no_cache_file() => return Ok(()),
            Err(err) => {
                self.diag.report_error("destroy", &err);
                return Err(Error::CacheDestroy(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::{new_context, MockNegotiator, MockSession};
    use crate::core::ProtocolError;

    #[test]
    fn test_open_default_cache() {
        let session = MockSession::new();
        let context = new_context(&session, None);
        assert_eq!(Some("MEMORY:default".to_string()), context.cache_name());
        assert!(!context.is_verbose());
        context.close();
    }

    #[test]
    fn test_open_unknown_cache_type() {
        let session = MockSession::new();
        let result = Context::with_session(
            Box::new(session.clone()),
            Box::new(MockNegotiator::new()),
            Some("BOGUS:x"),
            Box::new(LogSink),
        );
        match result {
            Err(Error::CacheResolution { name, .. }) => {
                assert_eq!("BOGUS:x", name)
            }
            _ => panic!("expected a cache resolution error"),
        }
    }

    #[test]
    fn test_destroy_absent_cache_succeeds() {
        let session = MockSession::new();
        let mut context = new_context(&session, None);
        session.cache().set_destroy_error(ProtocolError::NoCacheFile(
            "MEMORY:default".into(),
        ));
        context.destroy().unwrap();
        assert_eq!(None, context.cache_name());
        context.destroy().unwrap();
    }

    #[test]
    fn test_destroy_failure_drops_cache() {
        let session = MockSession::new();
        let mut context = new_context(&session, None);
        session
            .cache()
            .set_destroy_error(ProtocolError::Data("locked".into()));
        match context.destroy() {
            Err(Error::CacheDestroy(_)) => {}
            _ => panic!("expected a destroy error"),
        }
        assert_eq!(None, context.cache_name());
    }

    #[test]
    fn test_destroy_removes_credentials() {
        let session = MockSession::new();
        session.cache().seed_default();
        let mut context = new_context(&session, None);
        context.destroy().unwrap();
        assert_eq!(0, session.cache().len());
        assert_eq!(1, session.cache().calls().destroy);
    }
}
