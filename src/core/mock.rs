//! In-memory collaborators for the unit tests. They count the calls they
//! receive and fail on demand.

use super::context::Context;
use super::diagnostics::{DiagnosticSink, LogSink};
use super::negotiator::{GssCredential, GssName, Negotiator, SecurityContext};
use super::principal::Principal;
use super::protocol::{
    read_all, CacheCursor, CredentialCache, InitCredsOptions, KrbSession,
    ProtoResult, Prompter, ProtocolError,
};
use super::stringifier::etype_name;
use super::ticket_cred::{TicketCred, TicketCreds};
use chrono::{Duration, Utc};
use kerberos_asn1::{
    Asn1Object, EncryptedData, EncryptionKey, KrbCredInfo, Ticket,
};
use kerberos_constants::{error_codes, etypes, ticket_flags};
use std::cell::RefCell;
use std::rc::Rc;

pub const MOCK_REALM: &str = "EXAMPLE.COM";
pub const MOCK_PASSWORD: &str = "secret";

pub fn parse(name: &str) -> Principal {
    return Principal::parse(name, Some(MOCK_REALM)).unwrap();
}

/// Credential of `client` for `server`, valid for one day from now.
pub fn cred_for(client: &Principal, server: &Principal, flags: u32) -> TicketCred {
    let now = Utc::now();
    let ticket = Ticket {
        tkt_vno: 5,
        realm: server.realm.clone(),
        sname: server.name.clone(),
        enc_part: EncryptedData::new(
            etypes::AES256_CTS_HMAC_SHA1_96,
            Some(2),
            vec![0xab; 48],
        ),
    };

    let cred_info = KrbCredInfo {
        key: EncryptionKey {
            keytype: etypes::AES256_CTS_HMAC_SHA1_96,
            keyvalue: vec![0x01; 32],
        },
        prealm: Some(client.realm.clone()),
        pname: Some(client.name.clone()),
        flags: Some(flags.into()),
        authtime: Some(now.into()),
        starttime: None,
        endtime: Some((now + Duration::days(1)).into()),
        renew_till: None,
        srealm: Some(server.realm.clone()),
        sname: Some(server.name.clone()),
        caddr: None,
    };

    return TicketCred::new(ticket, cred_info);
}

pub fn new_ticket_cred(client: &str, server: &str, flags: u32) -> TicketCred {
    return cred_for(&parse(client), &parse(server), flags);
}

fn tgt_flags() -> u32 {
    return ticket_flags::INITIAL
        | ticket_flags::FORWARDABLE
        | ticket_flags::RENEWABLE
        | ticket_flags::PRE_AUTHENT;
}

#[derive(Debug, Default, Clone)]
pub struct CacheCalls {
    pub initialize: usize,
    pub store: usize,
    pub set_exclusive: Vec<bool>,
    pub start_seq: usize,
    pub next_cred: usize,
    pub end_seq: usize,
    pub destroy: usize,
}

#[derive(Default)]
struct CacheState {
    principal: Option<Principal>,
    creds: TicketCreds,
    exclusive: bool,
    calls: CacheCalls,
    exclusive_error: Option<ProtocolError>,
    restore_error: Option<ProtocolError>,
    iteration_error: Option<(usize, ProtocolError)>,
    store_error: Option<ProtocolError>,
    destroy_error: Option<ProtocolError>,
}

/// Cache whose clones share the same state.
#[derive(Clone)]
pub struct MockCache {
    name: String,
    state: Rc<RefCell<CacheState>>,
}

impl MockCache {
    pub fn new(name: &str) -> Self {
        return Self {
            name: name.to_string(),
            state: Rc::new(RefCell::new(CacheState::default())),
        };
    }

    fn renamed(&self, name: &str) -> Self {
        return Self {
            name: name.to_string(),
            state: self.state.clone(),
        };
    }

    /// alice with her TGT and an http ticket.
    pub fn seed_default(&self) {
        let client = parse("alice@EXAMPLE.COM");
        let mut state = self.state.borrow_mut();
        state.creds.push(cred_for(
            &client,
            &Principal::krbtgt(MOCK_REALM),
            tgt_flags(),
        ));
        state.creds.push(cred_for(
            &client,
            &parse("http/web@EXAMPLE.COM"),
            ticket_flags::FORWARDABLE | ticket_flags::PRE_AUTHENT,
        ));
        state.principal = Some(client);
    }

    pub fn seed_with_client(&self, client_name: &str) {
        let client = parse(client_name);
        let mut state = self.state.borrow_mut();
        let tgt = Principal::krbtgt(&client.realm);
        state.creds.push(cred_for(&client, &tgt, tgt_flags()));
        state.principal = Some(client);
    }

    pub fn seed_without_initial(&self, client_name: &str) {
        let client = parse(client_name);
        let mut state = self.state.borrow_mut();
        state.creds.push(cred_for(
            &client,
            &parse("http/web@EXAMPLE.COM"),
            ticket_flags::FORWARDABLE,
        ));
        state.principal = Some(client);
    }

    pub fn clear_credentials(&self) {
        self.state.borrow_mut().creds = TicketCreds::empty();
    }

    pub fn len(&self) -> usize {
        return self.state.borrow().creds.len();
    }

    pub fn is_exclusive(&self) -> bool {
        return self.state.borrow().exclusive;
    }

    pub fn calls(&self) -> CacheCalls {
        return self.state.borrow().calls.clone();
    }

    pub fn set_exclusive_error(&self, error: ProtocolError) {
        self.state.borrow_mut().exclusive_error = Some(error);
    }

    pub fn set_restore_error(&self, error: ProtocolError) {
        self.state.borrow_mut().restore_error = Some(error);
    }

    /// Fails the read of the entry at `position`.
    pub fn set_iteration_error(&self, position: usize, error: ProtocolError) {
        self.state.borrow_mut().iteration_error = Some((position, error));
    }

    pub fn set_store_error(&self, error: ProtocolError) {
        self.state.borrow_mut().store_error = Some(error);
    }

    pub fn set_destroy_error(&self, error: ProtocolError) {
        self.state.borrow_mut().destroy_error = Some(error);
    }
}

impl CredentialCache for MockCache {
    fn name(&self) -> String {
        return self.name.clone();
    }

    fn principal(&self) -> ProtoResult<Principal> {
        return self
            .state
            .borrow()
            .principal
            .clone()
            .ok_or_else(|| ProtocolError::NotFound("no principal".into()));
    }

    fn initialize(&mut self, principal: &Principal) -> ProtoResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.initialize += 1;
        state.creds = TicketCreds::empty();
        state.principal = Some(principal.clone());
        return Ok(());
    }

    fn store(&mut self, cred: &TicketCred) -> ProtoResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.store += 1;
        if let Some(error) = state.store_error.take() {
            return Err(error);
        }
        state.creds.replace_or_push(cred.clone());
        return Ok(());
    }

    fn set_exclusive(&mut self, exclusive: bool) -> ProtoResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.set_exclusive.push(exclusive);
        let error = if exclusive {
            state.exclusive_error.take()
        } else {
            state.restore_error.take()
        };
        if let Some(error) = error {
            return Err(error);
        }
        state.exclusive = exclusive;
        return Ok(());
    }

    fn start_seq(&mut self) -> ProtoResult<CacheCursor> {
        self.state.borrow_mut().calls.start_seq += 1;
        return Ok(CacheCursor::new());
    }

    fn next_cred(
        &mut self,
        cursor: &mut CacheCursor,
    ) -> ProtoResult<Option<TicketCred>> {
        let mut state = self.state.borrow_mut();
        state.calls.next_cred += 1;

        let fails_here = match &state.iteration_error {
            Some((position, _)) => *position == cursor.position(),
            None => false,
        };
        if fails_here {
            if let Some((_, error)) = state.iteration_error.take() {
                if error.is_bad_entry() {
                    cursor.advance();
                }
                return Err(error);
            }
        }

        let cred = state.creds.get(cursor.position()).cloned();
        if cred.is_some() {
            cursor.advance();
        }
        return Ok(cred);
    }

    fn end_seq(&mut self, _cursor: CacheCursor) -> ProtoResult<()> {
        self.state.borrow_mut().calls.end_seq += 1;
        return Ok(());
    }

    fn destroy(&mut self) -> ProtoResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.destroy += 1;
        if let Some(error) = state.destroy_error.take() {
            return Err(error);
        }
        state.creds = TicketCreds::empty();
        state.principal = None;
        return Ok(());
    }
}

#[derive(Debug, Default, Clone)]
pub struct SessionCalls {
    pub acquire_initial: usize,
    pub validate: usize,
    pub renew: usize,
    pub host_based: usize,
    pub request_credentials: usize,
    pub decode: usize,
}

impl SessionCalls {
    pub fn acquisitions(&self) -> usize {
        return self.acquire_initial + self.validate + self.renew;
    }
}

#[derive(Default)]
struct SessionState {
    calls: SessionCalls,
    acquisition_error: Option<ProtocolError>,
    failing_requests: usize,
    failing_decodes: usize,
    unparse_failure: Option<String>,
    parsed_names: Vec<String>,
}

/// Session over a `MEMORY:` cache and a `MSLSA:` legacy cache.
#[derive(Clone)]
pub struct MockSession {
    state: Rc<RefCell<SessionState>>,
    cache: MockCache,
    legacy: MockCache,
}

impl MockSession {
    pub fn new() -> Self {
        return Self {
            state: Rc::new(RefCell::new(SessionState::default())),
            cache: MockCache::new("MEMORY:default"),
            legacy: MockCache::new("MSLSA:"),
        };
    }

    pub fn cache(&self) -> MockCache {
        return self.cache.clone();
    }

    pub fn legacy(&self) -> MockCache {
        return self.legacy.clone();
    }

    pub fn calls(&self) -> SessionCalls {
        return self.state.borrow().calls.clone();
    }

    pub fn parsed_names(&self) -> Vec<String> {
        return self.state.borrow().parsed_names.clone();
    }

    /// The next acquisition (password, validate or renew) fails.
    pub fn fail_acquisition(&self, error: ProtocolError) {
        self.state.borrow_mut().acquisition_error = Some(error);
    }

    /// The next `count` service ticket requests fail.
    pub fn fail_requests(&self, count: usize) {
        self.state.borrow_mut().failing_requests = count;
    }

    /// The next `count` ticket decodings fail.
    pub fn fail_decodes(&self, count: usize) {
        self.state.borrow_mut().failing_decodes = count;
    }

    pub fn fail_unparse(&self, name: &str) {
        self.state.borrow_mut().unparse_failure = Some(name.to_string());
    }

    fn take_acquisition_error(&self) -> ProtoResult<()> {
        match self.state.borrow_mut().acquisition_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn target(client: &Principal, service: Option<&str>) -> Principal {
        match service {
            Some(service) => parse(service),
            None => Principal::krbtgt(&client.realm),
        }
    }
}

impl KrbSession for MockSession {
    fn default_cache_name(&self) -> String {
        return "MEMORY:default".to_string();
    }

    fn resolve_cache(
        &self,
        name: &str,
    ) -> ProtoResult<Box<dyn CredentialCache>> {
        if name.starts_with("MEMORY:") {
            return Ok(Box::new(self.cache.renamed(name)));
        }
        if name == "MSLSA:" {
            return Ok(Box::new(self.legacy.clone()));
        }
        return Err(ProtocolError::UnknownCacheType(name.to_string()));
    }

    fn parse_name(&self, name: &str) -> ProtoResult<Principal> {
        self.state.borrow_mut().parsed_names.push(name.to_string());
        return Principal::parse(name, Some(MOCK_REALM));
    }

    fn unparse_name(&self, principal: &Principal) -> ProtoResult<String> {
        let name = principal.to_string();
        if self.state.borrow().unparse_failure.as_ref() == Some(&name) {
            return Err(ProtocolError::Data(format!("cannot unparse {}", name)));
        }
        return Ok(name);
    }

    fn host_based_principal(
        &self,
        service: &str,
        hostname: &str,
    ) -> ProtoResult<Principal> {
        self.state.borrow_mut().calls.host_based += 1;
        return Ok(Principal::host_service(
            service,
            &hostname.to_lowercase(),
            MOCK_REALM,
        ));
    }

    fn acquire_initial(
        &self,
        client: &Principal,
        service: Option<&str>,
        prompter: &mut dyn Prompter,
        _options: &InitCredsOptions,
    ) -> ProtoResult<TicketCred> {
        self.state.borrow_mut().calls.acquire_initial += 1;
        self.take_acquisition_error()?;

        let password = prompter
            .prompt_password(&format!("Password for {}", client))
            .ok_or_else(|| ProtocolError::Prompt("cancelled".into()))?;
        if password != MOCK_PASSWORD {
            return Err(ProtocolError::Kdc(error_codes::KDC_ERR_PREAUTH_FAILED));
        }

        return Ok(cred_for(client, &Self::target(client, service), tgt_flags()));
    }

    fn validate(
        &self,
        _cache: &mut dyn CredentialCache,
        client: &Principal,
        service: Option<&str>,
    ) -> ProtoResult<TicketCred> {
        self.state.borrow_mut().calls.validate += 1;
        self.take_acquisition_error()?;
        return Ok(cred_for(client, &Self::target(client, service), tgt_flags()));
    }

    fn renew(
        &self,
        _cache: &mut dyn CredentialCache,
        client: &Principal,
        service: Option<&str>,
    ) -> ProtoResult<TicketCred> {
        self.state.borrow_mut().calls.renew += 1;
        self.take_acquisition_error()?;
        return Ok(cred_for(client, &Self::target(client, service), tgt_flags()));
    }

    fn request_credentials(
        &self,
        _cache: &mut dyn CredentialCache,
        client: &Principal,
        server: &Principal,
    ) -> ProtoResult<TicketCred> {
        let mut state = self.state.borrow_mut();
        state.calls.request_credentials += 1;
        if state.failing_requests > 0 {
            state.failing_requests -= 1;
            return Err(ProtocolError::Kdc(
                error_codes::KDC_ERR_S_PRINCIPAL_UNKNOWN,
            ));
        }
        return Ok(cred_for(client, server, ticket_flags::FORWARDABLE));
    }

    fn decode_ticket(&self, raw: &[u8]) -> ProtoResult<Ticket> {
        let mut state = self.state.borrow_mut();
        state.calls.decode += 1;
        if state.failing_decodes > 0 {
            state.failing_decodes -= 1;
            return Err(ProtocolError::Data("corrupt ticket".into()));
        }
        let (_, ticket) = Ticket::parse(raw)
            .map_err(|_| ProtocolError::Data("Error parsing Ticket".into()))?;
        return Ok(ticket);
    }

    fn enctype_name(&self, etype: i32) -> Option<String> {
        return etype_name(etype).map(String::from);
    }
}

/// Negotiator whose token is `token:<target>`.
pub struct MockNegotiator {
    failing: bool,
}

impl MockNegotiator {
    pub fn new() -> Self {
        return Self { failing: false };
    }

    /// Fails when initiating the security context.
    pub fn failing() -> Self {
        return Self { failing: true };
    }
}

impl Negotiator for MockNegotiator {
    fn import_name(&self, target: &str) -> ProtoResult<GssName> {
        let mut parts = target.splitn(2, '@');
        let service = parts.next().unwrap_or_default();
        let host = parts
            .next()
            .ok_or_else(|| ProtocolError::MalformedPrincipal(target.into()))?;
        return Ok(GssName::new(
            target.to_string(),
            Principal::host_service(service, host, MOCK_REALM),
        ));
    }

    fn acquire_credential(
        &self,
        cache: &mut dyn CredentialCache,
    ) -> ProtoResult<GssCredential> {
        let client = cache.principal()?;
        let creds = read_all(cache)?;
        return Ok(GssCredential::new(client, creds));
    }

    fn init_sec_context(
        &self,
        credential: &GssCredential,
        target: &GssName,
    ) -> ProtoResult<(SecurityContext, Vec<u8>)> {
        if self.failing {
            return Err(ProtocolError::Kdc(error_codes::KRB_AP_ERR_TKT_EXPIRED));
        }
        let session_key = credential
            .creds
            .first()
            .map(|cred| cred.cred_info.key.clone())
            .ok_or_else(|| ProtocolError::NotFound("no tickets".into()))?;
        let context = SecurityContext {
            target: target.principal.clone(),
            session_key,
        };
        return Ok((context, format!("token:{}", target).into_bytes()));
    }
}

pub fn new_context(session: &MockSession, cache_name: Option<&str>) -> Context {
    return Context::with_session(
        Box::new(session.clone()),
        Box::new(MockNegotiator::new()),
        cache_name,
        Box::new(LogSink),
    )
    .unwrap();
}

pub fn new_context_with_sink(
    session: &MockSession,
    sink: Box<dyn DiagnosticSink>,
) -> Context {
    return Context::with_session(
        Box::new(session.clone()),
        Box::new(MockNegotiator::new()),
        None,
        sink,
    )
    .unwrap();
}
