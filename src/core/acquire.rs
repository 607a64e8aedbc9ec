//! Ticket acquisition over a context: initial tickets and service tickets.

use super::context::Context;
use super::principal::Principal;
use super::protocol::ProtocolError;
use super::record::{build_record, TicketRecord};
use super::request::{AcquisitionRequest, KinitAction};
use super::ticket_cred::TicketCred;
use crate::error::{Error, Result};
use log::{debug, info};

impl Context {
    /// Obtains initial credentials and stores them in the cache, which is
    /// reinitialized for the acting principal.
    pub fn kinit(&mut self, request: &mut AcquisitionRequest) -> Result<()> {
        self.acquire_initial(request)?;
        return Ok(());
    }

    /// Same as [`Context::kinit`], returning the record of the new ticket.
    pub fn kinit_with_record(
        &mut self,
        request: &mut AcquisitionRequest,
    ) -> Result<TicketRecord> {
        let cred = self.acquire_initial(request)?;
        return self.record_of(cred);
    }

    fn acquire_initial(
        &mut self,
        request: &mut AcquisitionRequest,
    ) -> Result<TicketCred> {
        let session = &*self.session;
        let diag = &self.diag;
        let cache = self.cache.as_deref_mut().ok_or(Error::NoCache)?;

        let client = match &request.principal_name {
            Some(name) => session.parse_name(name).map_err(|source| {
                diag.report_error("kinit", &source);
                Error::PrincipalResolution {
                    name: name.clone(),
                    source,
                }
            })?,
            None => cache.principal().map_err(|source| {
                diag.report_error("kinit", &source);
                Error::PrincipalResolution {
                    name: cache.name(),
                    source,
                }
            })?,
        };
        let client_name = session
            .unparse_name(&client)
            .map_err(|source| Error::Unparse {
                what: "client",
                source,
            })?;

        let options = request.init_options();
        let service = request.service_name.as_deref();
        let action = request.action;
        info!("{} for {}", action.doing(), client_name);

        let acquired = match action {
            KinitAction::Password => match request.prompter.as_deref_mut() {
                Some(prompter) => {
                    session.acquire_initial(&client, service, prompter, &options)
                }
                None => Err(ProtocolError::Prompt(
                    "no password prompter available".into(),
                )),
            },
            KinitAction::Validate => session.validate(cache, &client, service),
            KinitAction::Renew => session.renew(cache, &client, service),
        };

        let cred = acquired.map_err(|source| {
            diag.report("kinit", &format!("{} while {}", source, action.doing()));
            if action == KinitAction::Password && source.is_bad_password() {
                return Error::Authentication {
                    principal: client_name.clone(),
                    doing: action.doing(),
                    source,
                };
            }
            return Error::Acquisition {
                doing: action.doing().to_string(),
                source,
            };
        })?;

        cache.initialize(&client).map_err(|source| {
            diag.report_error("kinit", &source);
            Error::CacheWrite {
                doing: "initializing cache",
                source,
            }
        })?;
        cache.store(&cred).map_err(|source| {
            diag.report_error("kinit", &source);
            Error::CacheWrite {
                doing: "storing credentials",
                source,
            }
        })?;

        debug!("Credentials of {} stored in {}", client_name, cache.name());
        return Ok(cred);
    }

    /// Gets a ticket for `service` at `hostname`, or for the principal
    /// named by `hostname` when `service` is `None`.
    ///
    /// When the host based name fails, the ticket is requested once more
    /// for `service/hostname@REALM`, REALM being the realm of the cache
    /// principal.
    pub fn get_service_ticket(
        &mut self,
        service: Option<&str>,
        hostname: &str,
    ) -> Result<TicketRecord> {
        let first_error = match self.service_ticket_attempt(service, hostname)
        {
            Ok(record) => return Ok(record),
            Err(err) => err,
        };

        let service = match service {
            Some(service) => service,
            None => return Err(first_error),
        };

        let realm = match self.cache_principal() {
            Ok(client) if !client.realm.is_empty() => client.realm,
            _ => return Err(first_error),
        };

        self.diag.report_error("get_service_ticket", &first_error);
        let fallback = format!("{}/{}@{}", service, hostname, realm);
        debug!("Retrying service ticket request for {}", fallback);
        return self.service_ticket_attempt(None, &fallback);
    }

    /// Gets the ticket for `service@hostname` and attaches to its record
    /// the initial token of a security context with that service.
    pub fn get_service_ticket_gss(
        &mut self,
        service: &str,
        hostname: &str,
    ) -> Result<TicketRecord> {
        let mut record = self.get_service_ticket(Some(service), hostname)?;

        let negotiator = &*self.negotiator;
        let diag = &self.diag;
        let cache = self.cache.as_deref_mut().ok_or(Error::NoCache)?;

        let target = format!("{}@{}", service, hostname);
        let name = negotiator.import_name(&target).map_err(|source| {
            diag.report_error("gss_import_name", &source);
            Error::TokenExchange {
                step: "importing name",
                source,
            }
        })?;

        let credential =
            negotiator.acquire_credential(cache).map_err(|source| {
                diag.report_error("gss_acquire_cred", &source);
                Error::TokenExchange {
                    step: "acquiring credentials",
                    source,
                }
            })?;

        let (_context, token) = negotiator
            .init_sec_context(&credential, &name)
            .map_err(|source| {
                diag.report_error("gss_init_sec_context", &source);
                Error::TokenExchange {
                    step: "initializing security context",
                    source,
                }
            })?;

        debug!("Security context token of {} bytes for {}", token.len(), name);
        record.attach_exchange_token(token);
        return Ok(record);
    }

    fn service_ticket_attempt(
        &mut self,
        service: Option<&str>,
        hostname: &str,
    ) -> Result<TicketRecord> {
        let session = &*self.session;
        let diag = &self.diag;
        let cache = self.cache.as_deref_mut().ok_or(Error::NoCache)?;

        let client = cache.principal().map_err(|source| {
            diag.report_error("get_service_ticket", &source);
            Error::PrincipalResolution {
                name: cache.name(),
                source,
            }
        })?;

        let server = match service {
            Some(service) => session.host_based_principal(service, hostname),
            None => session.parse_name(hostname),
        }
        .map_err(|source| {
            diag.report_error("get_service_ticket", &source);
            Error::PrincipalResolution {
                name: target_text(service, hostname),
                source,
            }
        })?;

        let cred = session
            .request_credentials(cache, &client, &server)
            .map_err(|source| {
                diag.report_error("get_service_ticket", &source);
                Error::Acquisition {
                    doing: format!(
                        "getting credentials for {}",
                        target_text(service, hostname)
                    ),
                    source,
                }
            })?;

        return self.record_of(cred);
    }

    fn cache_principal(&self) -> Result<Principal> {
        let cache = self.cache.as_deref().ok_or(Error::NoCache)?;
        return cache.principal().map_err(|source| {
            Error::PrincipalResolution {
                name: cache.name(),
                source,
            }
        });
    }

    /// Decodes the ticket of `cred` and builds its record.
    pub(crate) fn record_of(&self, cred: TicketCred) -> Result<TicketRecord> {
        let ticket = self
            .session
            .decode_ticket(&cred.raw_ticket())
            .map_err(|source| {
                self.diag.report_error("decode_ticket", &source);
                Error::TicketDecode(source)
            })?;
        return build_record(&*self.session, cred, ticket);
    }
}

fn target_text(service: Option<&str>, hostname: &str) -> String {
    match service {
        Some(service) => format!("{}/{}", service, hostname),
        None => hostname.to_string(),
    }
}
