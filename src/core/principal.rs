use super::protocol::{ProtoResult, ProtocolError};
use kerberos_asn1::PrincipalName;
use kerberos_constants::principal_names;
use std::fmt;

/// Name of the ticket granting service.
pub const TGS_NAME: &str = "krbtgt";

/// Kerberos identity: name components plus the realm where they live.
#[derive(Clone, Debug, PartialEq)]
pub struct Principal {
    pub realm: String,
    pub name: PrincipalName,
}

impl Principal {
    pub fn new(name: PrincipalName, realm: String) -> Self {
        return Self { name, realm };
    }

    pub fn from_components(
        components: Vec<String>,
        realm: String,
        name_type: i32,
    ) -> Self {
        return Self::new(
            PrincipalName {
                name_type,
                name_string: components,
            },
            realm,
        );
    }

    /// The TGS principal `krbtgt/REALM@REALM`.
    pub fn krbtgt(realm: &str) -> Self {
        return Self::from_components(
            vec![TGS_NAME.to_string(), realm.to_string()],
            realm.to_string(),
            principal_names::NT_SRV_INST,
        );
    }

    /// Host based service principal `service/hostname@REALM`.
    pub fn host_service(service: &str, hostname: &str, realm: &str) -> Self {
        return Self::from_components(
            vec![service.to_string(), hostname.to_string()],
            realm.to_string(),
            principal_names::NT_SRV_HST,
        );
    }

    /// Parses `comp1/comp2@REALM`. Backslash escapes the separators. When
    /// the realm is omitted `default_realm` is used.
    pub fn parse(text: &str, default_realm: Option<&str>) -> ProtoResult<Self> {
        let mut components = Vec::new();
        let mut current = String::new();
        let mut in_realm = false;
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or_else(|| malformed(text))?;
                    current.push(unescape(escaped));
                }
                '/' if !in_realm => {
                    components.push(std::mem::take(&mut current));
                }
                '@' if !in_realm => {
                    components.push(std::mem::take(&mut current));
                    in_realm = true;
                }
                '@' => return Err(malformed(text)),
                c => current.push(c),
            }
        }

        let realm = if in_realm {
            current
        } else {
            components.push(current);
            default_realm
                .ok_or_else(|| {
                    ProtocolError::Config(format!(
                        "no default realm to complete '{}'",
                        text
                    ))
                })?
                .to_string()
        };

        if components.iter().any(|c| c.is_empty()) {
            return Err(malformed(text));
        }

        let name_type = if components.len() == 2 && components[0] == TGS_NAME
        {
            principal_names::NT_SRV_INST
        } else {
            principal_names::NT_PRINCIPAL
        };

        return Ok(Self::from_components(components, realm, name_type));
    }

    pub fn components(&self) -> &[String] {
        return &self.name.name_string;
    }

    pub fn name_type(&self) -> i32 {
        return self.name.name_type;
    }

    /// Compares components and realm, ignoring the name type.
    pub fn same_name(&self, other: &Principal) -> bool {
        return self.realm == other.realm
            && self.components() == other.components();
    }

    pub fn is_tgs(&self) -> bool {
        let components = self.components();
        return components.len() == 2 && components[0] == TGS_NAME;
    }

    /// Realm served by a TGS principal.
    pub fn tgs_realm(&self) -> Option<&str> {
        if self.is_tgs() {
            return Some(&self.components()[1]);
        }
        return None;
    }
}

fn malformed(text: &str) -> ProtocolError {
    return ProtocolError::MalformedPrincipal(text.to_string());
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'b' => '\x08',
        '0' => '\0',
        c => c,
    }
}

fn escape(text: &str, in_realm: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\x08' => escaped.push_str("\\b"),
            '\0' => escaped.push_str("\\0"),
            '\\' | '@' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '/' if !in_realm => escaped.push_str("\\/"),
            c => escaped.push(c),
        }
    }
    return escaped;
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let components: Vec<String> =
            self.components().iter().map(|c| escape(c, false)).collect();
        write!(f, "{}@{}", components.join("/"), escape(&self.realm, true))
    }
}
