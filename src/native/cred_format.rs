use std::fmt;

/// On-disk layouts of a file credentials cache.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CredFormat {
    /// KRB-CRED message, as produced by Windows tools.
    Krb,
    /// MIT ccache file.
    Ccache,
}

impl CredFormat {
    pub fn from_file_extension(filename: &str) -> Option<Self> {
        if filename.ends_with(".krb") || filename.ends_with(".kirbi") {
            return Some(Self::Krb);
        }

        if filename.ends_with(".ccache") {
            return Some(Self::Ccache);
        }

        return None;
    }
}

impl Default for CredFormat {
    fn default() -> Self {
        return Self::Ccache;
    }
}

impl fmt::Display for CredFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ccache => write!(f, "ccache"),
            Self::Krb => write!(f, "krb"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            Some(CredFormat::Krb),
            CredFormat::from_file_extension("/tmp/alice.kirbi")
        );
        assert_eq!(
            Some(CredFormat::Ccache),
            CredFormat::from_file_extension("alice.ccache")
        );
        assert_eq!(None, CredFormat::from_file_extension("/tmp/krb5cc_1000"));
    }
}
