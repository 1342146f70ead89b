use thiserror::Error;
use url::Url;

const HANDLE_PLACEHOLDER: &str = "{handle}";
const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link template must contain {{id}}: {0}")]
    MissingIdPlaceholder(String),
    #[error("invalid link {link}: {source}")]
    InvalidUrl {
        link: String,
        #[source]
        source: url::ParseError,
    },
}

/// Derives an item's link from its handle and ID.
///
/// `{handle}` and `{id}` are substituted into the template; the result must
/// parse as an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplate {
    template: String,
}

impl LinkTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, LinkError> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(LinkError::MissingIdPlaceholder(template));
        }
        let parsed = Self { template };
        parsed.format("handle", "0")?;
        Ok(parsed)
    }

    pub fn format(&self, handle: &str, id: &str) -> Result<Url, LinkError> {
        let link = self
            .template
            .replace(HANDLE_PLACEHOLDER, handle)
            .replace(ID_PLACEHOLDER, id);
        Url::parse(&link).map_err(|source| LinkError::InvalidUrl { link, source })
    }
}
