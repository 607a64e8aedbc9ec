use super::context::Context;
use super::protocol::read_all;
use crate::error::{Error, Result};
use log::{debug, info};

/// Cache kept by the Windows logon session.
pub const LEGACY_CACHE_NAME: &str = "MSLSA:";

impl Context {
    /// Imports the tickets of the Windows logon session cache.
    pub fn import_legacy_cache(&mut self) -> Result<bool> {
        return self.import_cache(LEGACY_CACHE_NAME);
    }

    /// Copies every ticket of the cache `source_name` into the context
    /// cache, which is reinitialized for the source principal.
    ///
    /// Nothing is copied unless the source holds an initial ticket;
    /// returns whether the copy was done.
    pub fn import_cache(&mut self, source_name: &str) -> Result<bool> {
        let session = &*self.session;
        let diag = &self.diag;
        let cache = self.cache.as_deref_mut().ok_or(Error::NoCache)?;

        let mut source =
            session.resolve_cache(source_name).map_err(|source| {
                diag.report_error("import_cache", &source);
                Error::CacheResolution {
                    name: source_name.to_string(),
                    source,
                }
            })?;

        let creds = read_all(&mut *source).map_err(|source| {
            diag.report_error("import_cache", &source);
            Error::CacheIteration {
                doing: "reading the source cache",
                source,
            }
        })?;

        if !creds.iter().any(|cred| cred.is_initial()) {
            diag.report(
                "import_cache",
                &format!("no initial ticket in {}", source.name()),
            );
            return Ok(false);
        }

        let principal = source.principal().map_err(|err| {
            Error::PrincipalResolution {
                name: source.name(),
                source: err,
            }
        })?;

        cache.initialize(&principal).map_err(|source| {
            diag.report_error("import_cache", &source);
            Error::CacheWrite {
                doing: "initializing cache",
                source,
            }
        })?;

        for cred in creds.iter() {
            cache.store(cred).map_err(|source| {
                diag.report_error("import_cache", &source);
                Error::CacheWrite {
                    doing: "storing credentials",
                    source,
                }
            })?;
            debug!("Imported ticket for {}", cred.server());
        }

        info!(
            "Imported {} tickets from {} into {}",
            creds.len(),
            source.name(),
            cache.name()
        );
        return Ok(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::{new_context, MockSession};

    #[test]
    fn test_import_copies_all_entries() {
        let session = MockSession::new();
        session.legacy().seed_default();
        let mut context = new_context(&session, None);

        assert!(context.import_legacy_cache().unwrap());
        assert_eq!(2, session.cache().len());
        assert_eq!(1, session.cache().calls().initialize);
        assert_eq!(
            "alice@EXAMPLE.COM",
            context.list_cache().unwrap().default_principal
        );
    }

    #[test]
    fn test_import_without_initial_ticket() {
        let session = MockSession::new();
        session.legacy().seed_without_initial("alice@EXAMPLE.COM");
        session.cache().seed_with_client("bob@EXAMPLE.COM");
        let mut context = new_context(&session, None);

        assert!(!context.import_legacy_cache().unwrap());
        assert_eq!(0, session.cache().calls().initialize);
        assert_eq!(1, session.cache().len());
    }

    #[test]
    fn test_import_unknown_source() {
        let session = MockSession::new();
        let mut context = new_context(&session, None);

        match context.import_cache("BOGUS:nothing") {
            Err(Error::CacheResolution { name, .. }) => {
                assert_eq!("BOGUS:nothing", name)
            }
            _ => panic!("expected a cache resolution error"),
        }
    }
}
