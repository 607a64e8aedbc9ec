use super::context::Context;
use super::protocol::{CacheCursor, CredentialCache, KrbSession, ProtoResult};
use super::diagnostics::Diagnostics;
use super::record::{build_record, TicketList};
use crate::error::{Error, Result};
use log::debug;

impl Context {
    /// Lists the tickets of the cache.
    ///
    /// The cache is read in exclusive mode and put back in normal mode
    /// afterwards. A cache that cannot be opened gives
    /// [`Error::CacheUnavailable`], which callers usually take as an empty
    /// list. Entries that cannot be read or whose ticket cannot be decoded
    /// are skipped.
    pub fn list_cache(&mut self) -> Result<TicketList> {
        let session = &*self.session;
        let diag = &self.diag;
        let cache = self.cache.as_deref_mut().ok_or(Error::NoCache)?;

        if let Err(source) = cache.set_exclusive(true) {
            diag.report_error("list_cache", &source);
            return Err(Error::CacheUnavailable {
                cache: cache.name(),
                source,
            });
        }

        let listed = collect(session, cache, diag);

        if let Err(err) = cache.set_exclusive(false) {
            diag.report("list_cache", &format!("{} while closing ccache", err));
        }

        return listed;
    }
}

fn collect(
    session: &dyn KrbSession,
    cache: &mut dyn CredentialCache,
    diag: &Diagnostics,
) -> Result<TicketList> {
    let principal = cache.principal().map_err(|source| {
        diag.report_error("list_cache", &source);
        Error::PrincipalResolution {
            name: cache.name(),
            source,
        }
    })?;
    let default_principal = session
        .unparse_name(&principal)
        .map_err(|source| Error::Unparse {
            what: "default principal",
            source,
        })?;

    let mut list = TicketList::new(default_principal);
    let mut cursor = cache.start_seq().map_err(|source| {
        diag.report_error("list_cache", &source);
        Error::CacheIteration {
            doing: "starting to retrieve tickets",
            source,
        }
    })?;

    loop {
        let cred = match cache.next_cred(&mut cursor) {
            Ok(Some(cred)) => cred,
            Ok(None) => break,
            Err(err) if err.is_bad_entry() => {
                diag.report_error("list_cache", &err);
                continue;
            }
            Err(source) => {
                diag.report_error("list_cache", &source);
                close_cursor(cache, cursor, diag);
                return Err(Error::CacheIteration {
                    doing: "retrieving a ticket",
                    source,
                });
            }
        };

        let ticket = match session.decode_ticket(&cred.raw_ticket()) {
            Ok(ticket) => ticket,
            Err(err) => {
                diag.report("list_cache", &format!("{} while decoding ticket", err));
                continue;
            }
        };

        match build_record(session, cred, ticket) {
            Ok(record) => list.push(record),
            Err(err) => diag.report_error("list_cache", &err),
        }
    }

    cache.end_seq(cursor).map_err(|source| Error::CacheIteration {
        doing: "finishing ticket retrieval",
        source,
    })?;

    debug!("{} tickets in {}", list.len(), cache.name());
    return Ok(list);
}

fn close_cursor(
    cache: &mut dyn CredentialCache,
    cursor: CacheCursor,
    diag: &Diagnostics,
) {
    let closed: ProtoResult<()> = cache.end_seq(cursor);
    if let Err(err) = closed {
        diag.report_error("list_cache", &err);
    }
}
