//! Human readable forms of ticket fields.

use chrono::{DateTime, Local, Utc};
use kerberos_constants::etypes;
use kerberos_constants::ticket_flags;

/// Ticket flags with their one letter code, in display order.
pub const TICKET_FLAGS: [(u32, char); 14] = [
    (ticket_flags::FORWARDABLE, 'F'),
    (ticket_flags::FORWARDED, 'f'),
    (ticket_flags::PROXIABLE, 'P'),
    (ticket_flags::PROXY, 'p'),
    (ticket_flags::MAY_POSTDATE, 'D'),
    (ticket_flags::POSTDATE, 'd'),
    (ticket_flags::INVALID, 'i'),
    (ticket_flags::RENEWABLE, 'R'),
    (ticket_flags::INITIAL, 'I'),
    (ticket_flags::HW_AUTHENT, 'H'),
    (ticket_flags::PRE_AUTHENT, 'A'),
    (ticket_flags::TRANSITED_POLICY_CHECKED, 'T'),
    (ticket_flags::OK_AS_DELEGATE, 'O'),
    (ticket_flags::REQUEST_ANONYMOUS, 'a'),
];

/// Compact flag string, as `FRIA`. Unknown bits are ignored.
pub fn ticket_flags_to_codes(flags: u32) -> String {
    return TICKET_FLAGS
        .iter()
        .filter(|(mask, _)| (flags & mask) != 0)
        .map(|(_, code)| *code)
        .collect();
}

pub fn kerberos_time_to_string(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%m/%d/%Y %H:%M:%S")
        .to_string()
}

pub fn etype_name(etype: i32) -> Option<&'static str> {
    match etype {
        etypes::AES128_CTS_HMAC_SHA1_96 => Some("aes128-cts-hmac-sha1-96"),
        etypes::AES256_CTS_HMAC_SHA1_96 => Some("aes256-cts-hmac-sha1-96"),
        etypes::DES_CBC_CRC => Some("des-cbc-crc"),
        etypes::DES_CBC_MD5 => Some("des-cbc-md5"),
        etypes::RC4_HMAC => Some("arcfour-hmac"),
        etypes::RC4_HMAC_EXP => Some("arcfour-hmac-exp"),
        etypes::RC4_HMAC_OLD_EXP => Some("rc4-hmac-old-exp"),
        _ => None,
    }
}

/// Name of the encryption type, or `etype <n>` when it is unknown.
pub fn etype_label(name: Option<String>, etype: i32) -> String {
    return name.unwrap_or_else(|| format!("etype {}", etype));
}
