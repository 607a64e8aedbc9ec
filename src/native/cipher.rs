use crate::core::{Principal, ProtoResult, ProtocolError};
use kerberos_asn1::EncryptionKey;
use kerberos_constants::etypes;
use kerberos_crypto::{new_kerberos_cipher, KerberosCipher};
use std::convert::TryFrom;

/// Encryption type used to derive keys from passwords.
pub const DEFAULT_ETYPE: i32 = etypes::AES256_CTS_HMAC_SHA1_96;

/// A Kerberos cipher bound to a key.
pub struct Cipher {
    cipher: Box<dyn KerberosCipher>,
    key: Vec<u8>,
}

impl Cipher {
    pub fn new(cipher: Box<dyn KerberosCipher>, key: Vec<u8>) -> Self {
        return Self { cipher, key };
    }

    /// Derives the long term key of `principal` from its password. The salt
    /// is the realm followed by every name component.
    pub fn from_password(
        password: &str,
        principal: &Principal,
        etype: i32,
    ) -> ProtoResult<Self> {
        let cipher = new_cipher(etype)?;
        let salt = cipher
            .generate_salt(&principal.realm, &principal.components().join(""));
        let key = cipher.generate_key_from_string(password, &salt);
        return Ok(Self::new(cipher, key));
    }

    pub fn etype(&self) -> i32 {
        return self.cipher.etype();
    }

    pub fn encrypt(&self, key_usage: i32, plaintext: &[u8]) -> Vec<u8> {
        return self.cipher.encrypt(&self.key, key_usage, plaintext);
    }

    /// Decrypts `ciphertext`. A failed integrity check is reported as
    /// `BadIntegrity`, which usually means a wrong password.
    pub fn decrypt(
        &self,
        key_usage: i32,
        ciphertext: &[u8],
    ) -> ProtoResult<Vec<u8>> {
        return self
            .cipher
            .decrypt(&self.key, key_usage, ciphertext)
            .map_err(|_| ProtocolError::BadIntegrity);
    }
}

impl TryFrom<&EncryptionKey> for Cipher {
    type Error = ProtocolError;

    fn try_from(enc_key: &EncryptionKey) -> ProtoResult<Self> {
        let cipher = new_cipher(enc_key.keytype)?;
        return Ok(Self::new(cipher, enc_key.keyvalue.clone()));
    }
}

fn new_cipher(etype: i32) -> ProtoResult<Box<dyn KerberosCipher>> {
    return new_kerberos_cipher(etype).map_err(|_| {
        ProtocolError::Data(format!("Unsupported encryption type {}", etype))
    });
}
