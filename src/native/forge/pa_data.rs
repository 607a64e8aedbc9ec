use crate::core::Principal;
use crate::native::Cipher;
use chrono::{Timelike, Utc};
use kerberos_asn1::{
    ApReq, Asn1Object, Authenticator, Checksum, EncryptedData, PaData,
    PaEncTsEnc, Ticket,
};
use kerberos_constants::key_usages::{
    KEY_USAGE_AP_REQ_AUTHEN, KEY_USAGE_AS_REQ_TIMESTAMP,
    KEY_USAGE_TGS_REQ_AUTHEN,
};
use kerberos_constants::pa_data_types;
use kerberos_constants::ap_options;

/// Checksum type of the GSS authenticator checksum.
pub const GSS_CHECKSUM_TYPE: i32 = 0x8003;

/// Length of the channel bindings hash carried by the GSS checksum.
const GSS_BINDINGS_LENGTH: u32 = 16;

pub const GSS_C_MUTUAL_FLAG: u32 = 2;
pub const GSS_C_CONF_FLAG: u32 = 16;

/// Helper to create a PA-DATA that contains a PA-ENC-TS-ENC struct
pub fn new_pa_data_encrypted_timestamp(cipher: &Cipher) -> PaData {
    let timestamp = PaEncTsEnc::from(Utc::now());
    let encrypted_timestamp =
        cipher.encrypt(KEY_USAGE_AS_REQ_TIMESTAMP, &timestamp.build());
    let padata = PaData::new(
        pa_data_types::PA_ENC_TIMESTAMP,
        EncryptedData::new(cipher.etype(), None, encrypted_timestamp).build(),
    );

    return padata;
}

/// Helper to create a PA-DATA that contains an AP-REQ struct, to present
/// `ticket` to the TGS.
pub fn new_pa_data_ap_req(
    client: &Principal,
    ticket: Ticket,
    cipher: &Cipher,
) -> PaData {
    let authenticator = new_authenticator(client, None);

    let encrypted_authenticator =
        cipher.encrypt(KEY_USAGE_TGS_REQ_AUTHEN, &authenticator.build());

    let ap_req = new_ap_req(ticket, 0, cipher.etype(), encrypted_authenticator);
    return PaData::new(pa_data_types::PA_TGS_REQ, ap_req.build());
}

/// Creates the AP-REQ of a GSS initial token, asking for mutual
/// authentication and confidentiality.
pub fn new_gss_ap_req(
    client: &Principal,
    ticket: Ticket,
    cipher: &Cipher,
) -> ApReq {
    let flags = GSS_C_MUTUAL_FLAG | GSS_C_CONF_FLAG;
    let authenticator = new_authenticator(client, Some(new_gss_checksum(flags)));

    let encrypted_authenticator =
        cipher.encrypt(KEY_USAGE_AP_REQ_AUTHEN, &authenticator.build());

    return new_ap_req(
        ticket,
        ap_options::MUTUAL_REQUIRED,
        cipher.etype(),
        encrypted_authenticator,
    );
}

/// Authenticator checksum of a GSS context: the bindings length, zeroed
/// channel bindings and the context flags, little endian.
pub fn new_gss_checksum(flags: u32) -> Checksum {
    let mut value = GSS_BINDINGS_LENGTH.to_le_bytes().to_vec();
    value.extend_from_slice(&[0; GSS_BINDINGS_LENGTH as usize]);
    value.extend_from_slice(&flags.to_le_bytes());

    return Checksum {
        cksumtype: GSS_CHECKSUM_TYPE,
        checksum: value,
    };
}

/// Helper to create an Authenticator struct
fn new_authenticator(
    client: &Principal,
    cksum: Option<Checksum>,
) -> Authenticator {
    let now = Utc::now();
    let mut authenticator = Authenticator::default();
    authenticator.crealm = client.realm.clone();
    authenticator.cname = client.name.clone();
    authenticator.cksum = cksum;
    authenticator.cusec = (now.nanosecond() / 1000 % 1_000_000) as i32;
    authenticator.ctime = now.into();
    return authenticator;
}

/// Helper to create an AP-REQ struct
fn new_ap_req(
    ticket: Ticket,
    options: u32,
    etype: i32,
    cipher: Vec<u8>,
) -> ApReq {
    let mut ap_req = ApReq::default();
    ap_req.ap_options = options.into();
    ap_req.ticket = ticket;
    ap_req.authenticator = EncryptedData {
        etype,
        kvno: None,
        cipher,
    };

    return ap_req;
}
