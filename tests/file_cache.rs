use chrono::{Duration, Utc};
use kerberos_asn1::{EncryptedData, EncryptionKey, KrbCredInfo, Ticket};
use kerberos_ccache::mappers::realm_and_principal_name_to_principal;
use kerberos_ccache::{CCache, CountedOctetString, Header};
use kerberos_constants::{etypes, ticket_flags};
use krbcache::core::decode_token;
use krbcache::native::vault::save_file_creds;
use krbcache::native::{
    unwrap_initial_token, CredFormat, Krb5Config, KrbNegotiator, NativeSession,
};
use krbcache::{
    AcquisitionRequest, Context, KinitAction, LogSink, Principal, TicketCred,
    TicketCreds,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const REALM: &str = "EXAMPLE.COM";

fn new_cred(client: &str, server: &str, flags: u32) -> TicketCred {
    let client = Principal::parse(client, Some(REALM)).unwrap();
    let server = Principal::parse(server, Some(REALM)).unwrap();
    let now = Utc::now();

    let ticket = Ticket {
        tkt_vno: 5,
        realm: server.realm.clone(),
        sname: server.name.clone(),
        enc_part: EncryptedData::new(
            etypes::AES256_CTS_HMAC_SHA1_96,
            Some(3),
            vec![0xcd; 64],
        ),
    };

    let cred_info = KrbCredInfo {
        key: EncryptionKey {
            keytype: etypes::AES256_CTS_HMAC_SHA1_96,
            keyvalue: vec![0x02; 32],
        },
        prealm: Some(client.realm.clone()),
        pname: Some(client.name.clone()),
        flags: Some(flags.into()),
        authtime: Some(now.into()),
        starttime: None,
        endtime: Some((now + Duration::hours(10)).into()),
        renew_till: None,
        srealm: Some(server.realm.clone()),
        sname: Some(server.name.clone()),
        caddr: None,
    };

    return TicketCred::new(ticket, cred_info);
}

fn tgt_flags() -> u32 {
    return ticket_flags::FORWARDABLE
        | ticket_flags::RENEWABLE
        | ticket_flags::INITIAL
        | ticket_flags::PRE_AUTHENT;
}

fn config() -> Krb5Config {
    let mut config = Krb5Config::default();
    config.default_realm = Some(REALM.into());
    config.dns_lookup_kdc = false;
    config
        .domain_realm
        .push((".example.com".into(), REALM.into()));
    return config;
}

fn cache_path(dir: &TempDir, name: &str) -> String {
    return dir.path().join(name).to_string_lossy().to_string();
}

fn seed(path: &str, creds: Vec<TicketCred>) {
    save_file_creds(path, TicketCreds::new(creds), CredFormat::Ccache)
        .unwrap();
}

fn open(path: &str) -> Context {
    return Context::with_session(
        Box::new(NativeSession::new(config())),
        Box::new(KrbNegotiator::new(config())),
        Some(&format!("FILE:{}", path)),
        Box::new(LogSink),
    )
    .unwrap();
}

fn seed_default(path: &str) {
    seed(
        path,
        vec![
            new_cred("alice", "krbtgt/EXAMPLE.COM", tgt_flags()),
            new_cred("alice", "http/web.example.com", ticket_flags::FORWARDABLE),
        ],
    );
}

#[test]
fn test_list_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_list");
    seed_default(&path);

    let mut context = open(&path);
    let tickets = context.list_cache().unwrap();

    assert_eq!("alice@EXAMPLE.COM", tickets.default_principal);
    assert_eq!(2, tickets.len());
    assert_eq!(1, tickets.tgts().len());

    let tgt = tickets.iter().next().unwrap();
    assert_eq!("krbtgt/EXAMPLE.COM@EXAMPLE.COM", tgt.server_name);
    assert_eq!("FRIA", tgt.flags);
    assert_eq!(Some(3), tgt.kvno());
    assert!(tgt.exchange_token.is_none());
}

#[test]
fn test_list_header_only_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_header");
    let carol = Principal::parse("carol", Some(REALM)).unwrap();
    let ccache = CCache::new(
        Header::default(),
        realm_and_principal_name_to_principal(&carol.realm, &carol.name),
        Vec::new(),
    );
    fs::write(&path, ccache.build()).unwrap();

    let mut context = open(&path);
    let tickets = context.list_cache().unwrap();
    assert_eq!("carol@EXAMPLE.COM", tickets.default_principal);
    assert_eq!(0, tickets.len());
}

#[test]
fn test_list_skips_undecodable_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_undecodable");
    seed_default(&path);

    let data = fs::read(&path).unwrap();
    let (_, mut ccache) = CCache::parse(&data).unwrap();
    let mut entry = ccache.credentials[0].clone();
    entry.ticket = CountedOctetString::new(vec![0xff, 0x00]);
    ccache.credentials.insert(1, entry);
    fs::write(&path, ccache.build()).unwrap();

    let mut context = open(&path);
    let tickets = context.list_cache().unwrap();
    assert_eq!("alice@EXAMPLE.COM", tickets.default_principal);
    assert_eq!(2, tickets.len());

    let servers: Vec<&str> =
        tickets.iter().map(|t| t.server_name.as_str()).collect();
    assert_eq!(
        vec![
            "krbtgt/EXAMPLE.COM@EXAMPLE.COM",
            "http/web.example.com@EXAMPLE.COM"
        ],
        servers
    );
}

#[test]
fn test_list_absent_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_absent");

    let mut context = open(&path);
    let err = context.list_cache().unwrap_err();
    assert!(err.is_cache_unavailable());
}

#[test]
fn test_service_ticket_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_service");
    seed_default(&path);

    let mut context = open(&path);
    let record = context
        .get_service_ticket(Some("http"), "web.example.com")
        .unwrap();
    assert_eq!("http/web.example.com@EXAMPLE.COM", record.server_name);
    assert_eq!("F", record.flags);
    assert!(record.exchange_token.is_none());
}

#[test]
fn test_service_ticket_gss_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_gss");
    seed_default(&path);

    let mut context = open(&path);
    let record = context
        .get_service_ticket_gss("http", "web.example.com")
        .unwrap();

    let token = record.exchange_token.unwrap();
    assert_eq!(0x60, token.token()[0]);
    assert_eq!(token.token().to_vec(), decode_token(token.base64()).unwrap());
    assert!(unwrap_initial_token(token.token()).is_ok());
}

#[test]
fn test_import_cache() {
    let dir = tempfile::tempdir().unwrap();
    let source = cache_path(&dir, "krb5cc_source");
    let target = cache_path(&dir, "krb5cc_target");
    seed(
        &source,
        vec![
            new_cred("bob", "krbtgt/EXAMPLE.COM", tgt_flags()),
            new_cred("bob", "cifs/fs.example.com", 0),
        ],
    );

    let mut context = open(&target);
    assert!(context.import_cache(&format!("FILE:{}", source)).unwrap());

    let tickets = context.list_cache().unwrap();
    assert_eq!("bob@EXAMPLE.COM", tickets.default_principal);
    assert_eq!(2, tickets.len());
}

#[test]
fn test_import_without_initial_ticket() {
    let dir = tempfile::tempdir().unwrap();
    let source = cache_path(&dir, "krb5cc_source");
    let target = cache_path(&dir, "krb5cc_target");
    seed(&source, vec![new_cred("bob", "cifs/fs.example.com", 0)]);

    let mut context = open(&target);
    assert!(!context.import_cache(&source).unwrap());
    assert!(!Path::new(&target).exists());
}

#[test]
fn test_import_legacy_cache_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_legacy");

    let mut context = open(&path);
    assert!(context.import_legacy_cache().is_err());
}

#[test]
fn test_destroy() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_destroy");
    seed_default(&path);

    let mut context = open(&path);
    context.destroy().unwrap();
    assert!(!Path::new(&path).exists());
    assert_eq!(None, context.cache_name());
    context.destroy().unwrap();
}

#[test]
fn test_destroy_absent_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_never");

    let mut context = open(&path);
    context.destroy().unwrap();
}

#[test]
fn test_renew_without_ticket() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir, "krb5cc_renew");
    seed(&path, vec![new_cred("alice", "http/web.example.com", 0)]);

    let mut context = open(&path);
    let mut request = AcquisitionRequest::new(KinitAction::Renew);
    let err = context.kinit(&mut request).unwrap_err();
    assert!(!err.is_authentication_error());
    assert!(Path::new(&path).exists());
}
