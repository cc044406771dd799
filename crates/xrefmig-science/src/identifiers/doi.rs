use serde::{Deserialize, Serialize};

use crate::error::{Result, ScienceError};

const RESOLVER_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

/// A DOI split into its registrant prefix and suffix. Case is preserved;
/// `normalized` is the lowercase form used for comparisons.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doi {
    pub raw: String,
    pub value: String,
    pub normalized: String,
    slash: usize,
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = RESOLVER_PREFIXES
            .iter()
            .find_map(|prefix| input.strip_prefix(prefix))
            .or_else(|| input.strip_prefix("doi:").map(str::trim_start))
            .or_else(|| input.strip_prefix("DOI:").map(str::trim_start))
            .unwrap_or(input);

        // Must start with "10.", contain "/", and have a non-empty suffix
        if !stripped.starts_with("10.") {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }
        let slash = stripped
            .find('/')
            .ok_or_else(|| ScienceError::InvalidDoi(input.to_string()))?;
        if slash + 1 == stripped.len() {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }

        Ok(Self {
            raw: input.to_string(),
            value: stripped.to_string(),
            normalized: stripped.to_lowercase(),
            slash,
        })
    }

    /// Registrant prefix, e.g. `10.1234`.
    pub fn prefix(&self) -> &str {
        &self.value[..self.slash]
    }

    /// Everything after the first `/`.
    pub fn suffix(&self) -> &str {
        &self.value[self.slash + 1..]
    }

    /// Same suffix under another registrant prefix.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let value = format!("{prefix}/{}", self.suffix());
        Self {
            raw: value.clone(),
            normalized: value.to_lowercase(),
            slash: prefix.len(),
            value,
        }
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefix().eq_ignore_ascii_case(prefix)
    }

    /// The DOI as a URL path: each `/`-separated segment percent-encoded,
    /// so `#` and `?` in old SICI-style suffixes stay in the path.
    pub fn url_path(&self) -> String {
        self.value
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl std::fmt::Display for Doi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
