use crate::core::{
    CacheCursor, CredentialCache, Principal, ProtoResult, ProtocolError,
    TicketCred, TicketCreds,
};
use crate::native::CredFormat;
use kerberos_asn1::{Asn1Object, KrbCred};
use kerberos_ccache::mappers::{
    credential_to_krb_cred_info_and_ticket,
    krb_cred_info_and_ticket_to_credential,
    principal_to_realm_and_principal_name,
    realm_and_principal_name_to_principal,
};
use kerberos_ccache::Principal as CCachePrincipal;
use kerberos_ccache::{CCache, Credential, Header};
use log::debug;
use std::convert::TryFrom;
use std::fs;
use std::io;

pub const FILE_CACHE_PREFIX: &str = "FILE:";

/// Contents of a credentials file. Entries are kept as stored, so the ones
/// that cannot be turned into credentials survive a rewrite.
#[derive(Debug, Clone)]
pub struct CacheFile {
    pub format: CredFormat,
    pub header: Header,
    /// Default principal. KRB-CRED files take the client of their first
    /// ticket.
    pub principal: Option<Principal>,
    pub entries: Vec<Credential>,
}

impl CacheFile {
    pub fn new(format: CredFormat, principal: Option<Principal>) -> Self {
        return Self {
            format,
            header: Header::default(),
            principal,
            entries: Vec::new(),
        };
    }

    /// Credential of the entry at `index`, or `BadEntry` if that entry
    /// cannot be decoded.
    pub fn cred(&self, index: usize) -> Option<ProtoResult<TicketCred>> {
        return self.entries.get(index).cloned().map(entry_to_ticket_cred);
    }

    /// Readable credentials of the file.
    pub fn ticket_creds(&self) -> TicketCreds {
        return self
            .entries
            .iter()
            .cloned()
            .filter_map(|entry| entry_to_ticket_cred(entry).ok())
            .collect::<Vec<TicketCred>>()
            .into();
    }

    /// Adds the credential, replacing the entry with the same client and
    /// server if there is any.
    pub fn replace_or_push(&mut self, cred: &TicketCred) -> ProtoResult<()> {
        let entry = ticket_cred_to_entry(cred)?;
        let client = cred.client();
        let server = cred.server();

        let position = self.entries.iter().position(|stored| {
            same_principal(&stored.server, &server)
                && client
                    .as_ref()
                    .map_or(false, |client| same_principal(&stored.client, client))
        });

        match position {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }

        if self.principal.is_none() {
            self.principal = client;
        }
        return Ok(());
    }
}

/// Credentials cache kept in a ccache or KRB-CRED file.
pub struct FileCCache {
    file_path: String,
    /// Principal set by `initialize`, for files that cannot record it.
    principal: Option<Principal>,
    /// Contents read when the exclusive mode was enabled.
    snapshot: Option<CacheFile>,
}

impl FileCCache {
    pub fn new(file_path: String) -> Self {
        return Self {
            file_path,
            principal: None,
            snapshot: None,
        };
    }

    pub fn file_path(&self) -> &str {
        return &self.file_path;
    }

    fn contents(&self) -> ProtoResult<CacheFile> {
        if let Some(snapshot) = &self.snapshot {
            return Ok(snapshot.clone());
        }
        return load_cache_file(&self.file_path);
    }

    /// Format of the existing file, else the one of its extension.
    fn format(&self) -> CredFormat {
        match load_cache_file(&self.file_path) {
            Ok(file) => file.format,
            Err(_) => CredFormat::from_file_extension(&self.file_path)
                .unwrap_or_default(),
        }
    }
}

impl CredentialCache for FileCCache {
    fn name(&self) -> String {
        return format!("{}{}", FILE_CACHE_PREFIX, self.file_path);
    }

    fn principal(&self) -> ProtoResult<Principal> {
        return self
            .contents()?
            .principal
            .or_else(|| self.principal.clone())
            .ok_or_else(|| {
                ProtocolError::NotFound(format!(
                    "no principal in {}",
                    self.name()
                ))
            });
    }

    fn initialize(&mut self, principal: &Principal) -> ProtoResult<()> {
        let file = CacheFile::new(self.format(), Some(principal.clone()));
        save_cache_file(&self.file_path, &file)?;
        debug!("Initialized {} for {}", self.file_path, principal);

        self.principal = Some(principal.clone());
        if self.snapshot.is_some() {
            self.snapshot = Some(file);
        }
        return Ok(());
    }

    fn store(&mut self, cred: &TicketCred) -> ProtoResult<()> {
        let mut file = match load_cache_file(&self.file_path) {
            Ok(file) => file,
            Err(err) if err.is_no_cache_file() => CacheFile::new(
                CredFormat::from_file_extension(&self.file_path)
                    .unwrap_or_default(),
                self.principal.clone(),
            ),
            Err(err) => return Err(err),
        };

        file.replace_or_push(cred)?;
        save_cache_file(&self.file_path, &file)?;
        debug!("Saved ticket for {} in {}", cred.server(), self.file_path);

        if self.snapshot.is_some() {
            self.snapshot = Some(file);
        }
        return Ok(());
    }

    fn set_exclusive(&mut self, exclusive: bool) -> ProtoResult<()> {
        if exclusive {
            self.snapshot = Some(load_cache_file(&self.file_path)?);
        } else {
            self.snapshot = None;
        }
        return Ok(());
    }

    fn start_seq(&mut self) -> ProtoResult<CacheCursor> {
        if self.snapshot.is_none() {
            load_cache_file(&self.file_path)?;
        }
        return Ok(CacheCursor::new());
    }

    fn next_cred(
        &mut self,
        cursor: &mut CacheCursor,
    ) -> ProtoResult<Option<TicketCred>> {
        let cred = match &self.snapshot {
            Some(snapshot) => snapshot.cred(cursor.position()),
            None => load_cache_file(&self.file_path)?.cred(cursor.position()),
        };

        match cred {
            Some(cred) => {
                cursor.advance();
                return cred.map(Some);
            }
            None => return Ok(None),
        }
    }

    fn end_seq(&mut self, _cursor: CacheCursor) -> ProtoResult<()> {
        return Ok(());
    }

    fn destroy(&mut self) -> ProtoResult<()> {
        self.snapshot = None;
        self.principal = None;
        fs::remove_file(&self.file_path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                return ProtocolError::NoCacheFile(self.name());
            }
            let message = format!("Unable to remove {}", self.file_path);
            return (message, err).into();
        })?;
        return Ok(());
    }
}

/// Load a credentials file, detecting its format from the content.
pub fn load_cache_file(creds_file: &str) -> ProtoResult<CacheFile> {
    let data = fs::read(creds_file).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            return ProtocolError::NoCacheFile(format!(
                "{}{}",
                FILE_CACHE_PREFIX, creds_file
            ));
        }
        let message = format!("Unable to read the file '{}'", creds_file);
        return (message, err).into();
    })?;

    if let Ok((_, ccache)) = CCache::parse(&data) {
        let principal = from_ccache_principal(ccache.primary_principal)?;
        return Ok(CacheFile {
            format: CredFormat::Ccache,
            header: ccache.header,
            principal: Some(principal),
            entries: ccache.credentials,
        });
    }

    let (_, krb_cred) = KrbCred::parse(&data).map_err(|_| {
        ProtocolError::Data(format!(
            "Error parsing content of ccache/krb file '{}'",
            creds_file
        ))
    })?;

    let mut file = CacheFile::new(CredFormat::Krb, None);
    for cred in TicketCreds::try_from(krb_cred)? {
        file.replace_or_push(&cred)?;
    }
    return Ok(file);
}

/// Save the credentials file in its format.
pub fn save_cache_file(creds_file: &str, file: &CacheFile) -> ProtoResult<()> {
    let raw_cred = match file.format {
        CredFormat::Krb => KrbCred::from(file.ticket_creds()).build(),
        CredFormat::Ccache => {
            let principal = file.principal.as_ref().ok_or_else(|| {
                ProtocolError::Data(format!(
                    "No default principal to write in {}",
                    creds_file
                ))
            })?;
            CCache::new(
                file.header.clone(),
                to_ccache_principal(principal),
                file.entries.clone(),
            )
            .build()
        }
    };

    fs::write(creds_file, raw_cred).map_err(|err| {
        let message =
            format!("Unable to write credentials in file {}", creds_file);
        (message, err)
    })?;

    return Ok(());
}

/// Save the credentials in a new file. The client of the first one is the
/// default principal.
pub fn save_file_creds(
    creds_file: &str,
    creds: TicketCreds,
    cred_format: CredFormat,
) -> ProtoResult<()> {
    let principal = creds.first().and_then(|cred| cred.client());
    let mut file = CacheFile::new(cred_format, principal);
    for cred in creds.iter() {
        file.replace_or_push(cred)?;
    }
    return save_cache_file(creds_file, &file);
}

fn entry_to_ticket_cred(entry: Credential) -> ProtoResult<TicketCred> {
    let (cred_info, ticket) = credential_to_krb_cred_info_and_ticket(entry)
        .map_err(|err| ProtocolError::BadEntry(err.to_string()))?;
    return Ok(TicketCred::new(ticket, cred_info));
}

fn ticket_cred_to_entry(cred: &TicketCred) -> ProtoResult<Credential> {
    return krb_cred_info_and_ticket_to_credential(
        cred.cred_info.clone(),
        cred.ticket.clone(),
    )
    .map_err(|err| {
        ProtocolError::Data(format!(
            "Unable to store ticket for {}: {}",
            cred.server(),
            err
        ))
    });
}

fn from_ccache_principal(principal: CCachePrincipal) -> ProtoResult<Principal> {
    let (realm, name) =
        principal_to_realm_and_principal_name(principal).map_err(|err| {
            ProtocolError::Data(format!("Invalid ccache principal: {}", err))
        })?;
    return Ok(Principal::new(name, realm));
}

fn to_ccache_principal(principal: &Principal) -> CCachePrincipal {
    return realm_and_principal_name_to_principal(
        &principal.realm,
        &principal.name,
    );
}

fn same_principal(stored: &CCachePrincipal, principal: &Principal) -> bool {
    match from_ccache_principal(stored.clone()) {
        Ok(stored) => stored.same_name(principal),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::new_ticket_cred;
    use kerberos_ccache::CountedOctetString;
    use kerberos_constants::ticket_flags;

    fn new_cred(client: &str, server: &str) -> TicketCred {
        return new_ticket_cred(client, server, ticket_flags::INITIAL);
    }

    fn cache_in(dir: &tempfile::TempDir, name: &str) -> FileCCache {
        let path = dir.path().join(name);
        return FileCCache::new(path.to_string_lossy().to_string());
    }

    fn alice() -> Principal {
        return Principal::parse("alice@EXAMPLE.COM", None).unwrap();
    }

    /// Appends a copy of the first entry whose ticket is not DER.
    fn push_undecodable_entry(path: &str) {
        let data = fs::read(path).unwrap();
        let (_, mut ccache) = CCache::parse(&data).unwrap();
        let mut entry = ccache.credentials[0].clone();
        entry.ticket = CountedOctetString::new(b"yes".to_vec());
        ccache.credentials.push(entry);
        fs::write(path, ccache.build()).unwrap();
    }

    #[test]
    fn test_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache_in(&dir, "krb5cc_absent");

        assert!(cache.principal().unwrap_err().is_no_cache_file());
        assert!(cache.set_exclusive(true).unwrap_err().is_no_cache_file());
        assert!(cache.destroy().unwrap_err().is_no_cache_file());
    }

    #[test]
    fn test_initialize_writes_header_only_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache_in(&dir, "krb5cc_init");
        cache.initialize(&alice()).unwrap();

        let mut other = FileCCache::new(cache.file_path().to_string());
        assert_eq!(alice(), other.principal().unwrap());

        other.set_exclusive(true).unwrap();
        let mut cursor = other.start_seq().unwrap();
        assert!(other.next_cred(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_header_principal_is_default_principal() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache_in(&dir, "krb5cc_header");
        cache.initialize(&alice()).unwrap();
        cache
            .store(&new_cred("bob@EXAMPLE.COM", "http/web@EXAMPLE.COM"))
            .unwrap();

        let other = FileCCache::new(cache.file_path().to_string());
        assert_eq!(alice(), other.principal().unwrap());
    }

    #[test]
    fn test_initialize_store_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache_in(&dir, "krb5cc_test");

        cache.initialize(&alice()).unwrap();
        assert_eq!(alice(), cache.principal().unwrap());

        cache
            .store(&new_cred("alice@EXAMPLE.COM", "krbtgt/EXAMPLE.COM@EXAMPLE.COM"))
            .unwrap();
        cache.store(&new_cred("alice@EXAMPLE.COM", "http/web@EXAMPLE.COM")).unwrap();
        cache.store(&new_cred("alice@EXAMPLE.COM", "http/web@EXAMPLE.COM")).unwrap();

        let file = load_cache_file(cache.file_path()).unwrap();
        assert_eq!(CredFormat::Ccache, file.format);
        assert_eq!(2, file.entries.len());
        assert_eq!(2, file.ticket_creds().len());
        assert!(alice().same_name(&cache.principal().unwrap()));
    }

    #[test]
    fn test_exclusive_snapshot_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache_in(&dir, "krb5cc_seq");
        cache
            .store(&new_cred("alice@EXAMPLE.COM", "krbtgt/EXAMPLE.COM@EXAMPLE.COM"))
            .unwrap();
        cache.store(&new_cred("alice@EXAMPLE.COM", "cifs/fs@EXAMPLE.COM")).unwrap();

        cache.set_exclusive(true).unwrap();
        let mut cursor = cache.start_seq().unwrap();
        assert!(cache.next_cred(&mut cursor).unwrap().is_some());
        assert!(cache.next_cred(&mut cursor).unwrap().is_some());
        assert!(cache.next_cred(&mut cursor).unwrap().is_none());
        cache.end_seq(cursor).unwrap();
        cache.set_exclusive(false).unwrap();
    }

    #[test]
    fn test_undecodable_entry_is_bad_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache_in(&dir, "krb5cc_conf");
        cache
            .store(&new_cred("alice@EXAMPLE.COM", "krbtgt/EXAMPLE.COM@EXAMPLE.COM"))
            .unwrap();
        push_undecodable_entry(cache.file_path());

        let mut cursor = cache.start_seq().unwrap();
        assert!(cache.next_cred(&mut cursor).unwrap().is_some());
        assert!(cache.next_cred(&mut cursor).unwrap_err().is_bad_entry());
        assert!(cache.next_cred(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_store_keeps_undecodable_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache_in(&dir, "krb5cc_keep");
        cache
            .store(&new_cred("alice@EXAMPLE.COM", "krbtgt/EXAMPLE.COM@EXAMPLE.COM"))
            .unwrap();
        push_undecodable_entry(cache.file_path());

        cache.store(&new_cred("alice@EXAMPLE.COM", "cifs/fs@EXAMPLE.COM")).unwrap();

        let file = load_cache_file(cache.file_path()).unwrap();
        assert_eq!(3, file.entries.len());
        assert_eq!(b"yes".to_vec(), file.entries[1].ticket.data);
        assert_eq!(2, file.ticket_creds().len());
    }

    #[test]
    fn test_krb_format_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache_in(&dir, "alice.kirbi");
        cache
            .store(&new_cred("alice@EXAMPLE.COM", "krbtgt/EXAMPLE.COM@EXAMPLE.COM"))
            .unwrap();
        cache.store(&new_cred("alice@EXAMPLE.COM", "http/web@EXAMPLE.COM")).unwrap();

        let file = load_cache_file(cache.file_path()).unwrap();
        assert_eq!(CredFormat::Krb, file.format);
        assert_eq!(2, file.entries.len());
        assert!(alice().same_name(&cache.principal().unwrap()));

        cache.destroy().unwrap();
        assert!(!std::path::Path::new(cache.file_path()).exists());
    }

    #[test]
    fn test_garbage_file_is_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, "krb5cc_garbage");
        fs::write(cache.file_path(), b"not a cache").unwrap();
        assert!(cache.principal().unwrap_err().is_data_error());
    }
}
