use super::protocol::{InitCredsOptions, Prompter};
use chrono::{DateTime, Duration, Utc};

/// How the initial credentials are obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KinitAction {
    /// Ask the KDC for a TGT with the password of the principal.
    Password,
    /// Validate a postdated ticket of the cache.
    Validate,
    /// Renew a ticket of the cache.
    Renew,
}

impl KinitAction {
    /// Description of the action in progress, used in error messages.
    pub fn doing(&self) -> &'static str {
        match self {
            Self::Password => "getting initial credentials",
            Self::Validate => "validating credentials",
            Self::Renew => "renewing credentials",
        }
    }
}

impl Default for KinitAction {
    fn default() -> Self {
        return Self::Password;
    }
}

/// Parameters of a kinit. Every optional field left unset keeps the
/// protocol defaults.
#[derive(Default)]
pub struct AcquisitionRequest {
    pub action: KinitAction,
    pub lifetime: Option<Duration>,
    pub renew_lifetime: Option<Duration>,
    pub start_time: Option<DateTime<Utc>>,
    pub forwardable: Option<bool>,
    pub proxiable: Option<bool>,
    /// Client principal; the cache principal when unset.
    pub principal_name: Option<String>,
    /// Service of the initial ticket; the TGS when unset.
    pub service_name: Option<String>,
    pub prompter: Option<Box<dyn Prompter>>,
}

impl AcquisitionRequest {
    pub fn new(action: KinitAction) -> Self {
        return Self {
            action,
            ..Default::default()
        };
    }

    pub fn password<P>(principal_name: &str, prompter: P) -> Self
    where
        P: Prompter + 'static,
    {
        let mut request = Self::new(KinitAction::Password);
        request.principal_name = Some(principal_name.to_string());
        request.prompter = Some(Box::new(prompter));
        return request;
    }

    pub fn init_options(&self) -> InitCredsOptions {
        return InitCredsOptions {
            lifetime: self.lifetime,
            renew_lifetime: self.renew_lifetime,
            start_time: self.start_time,
            forwardable: self.forwardable,
            proxiable: self.proxiable,
        };
    }
}
