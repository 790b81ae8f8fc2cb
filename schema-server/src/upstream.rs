use crate::config::UpstreamConfig;
use crate::errors::SchemaServerError;
use crate::reference::Reference;
use url::Url;

/// Builds schema URLs on the raw-content host.
#[derive(Clone, Debug)]
pub struct Upstream {
    base_url: Url,
    schema_path: Vec<String>,
}

impl TryFrom<UpstreamConfig> for Upstream {
    type Error = SchemaServerError;

    fn try_from(config: UpstreamConfig) -> Result<Self, Self::Error> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SchemaServerError::InvalidUpstream(format!("{}: {e}", config.base_url)))?;

        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(SchemaServerError::InvalidUpstream(format!(
                "{}: expected an http(s) URL",
                config.base_url
            )));
        }

        let schema_path = config
            .schema_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(String::from)
            .collect();

        Ok(Upstream {
            base_url,
            schema_path,
        })
    }
}

impl Upstream {
    /// `{base_url}/{ref}/{schema_path}`, with the ref escaped as a single path segment.
    pub fn schema_url(&self, reference: &Reference) -> Url {
        let mut url = self.base_url.clone();
        // try_from rejects cannot-be-a-base URLs, so path segments are always available
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&reference.upstream_ref())
                .extend(&self.schema_path);
        }
        url
    }
}
