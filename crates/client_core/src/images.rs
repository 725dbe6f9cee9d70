use shared::protocol::Thumbnails;
use url::{form_urlencoded, Url};

pub const DEFAULT_PLACEHOLDER_BASE_URL: &str = "https://ui-avatars.com/api/";
pub const IMAGE_PROXY_PATH: &str = "api/image-proxy";
const PLACEHOLDER_SIZE: &str = "240";

/// Decides which URL a card shows for a channel's artwork.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    relay_endpoint: Option<Url>,
    placeholder_base_url: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            relay_endpoint: None,
            placeholder_base_url: DEFAULT_PLACEHOLDER_BASE_URL.to_string(),
        }
    }
}

impl ImageOptions {
    /// Route remote thumbnails through the image relay mounted at `relay_base_url`.
    pub fn with_relay(mut self, relay_base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(relay_base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        self.relay_endpoint = Some(base.join(IMAGE_PROXY_PATH)?);
        Ok(self)
    }

    pub fn with_placeholder_base(mut self, placeholder_base_url: impl Into<String>) -> Self {
        self.placeholder_base_url = placeholder_base_url.into();
        self
    }

    pub fn relay_endpoint(&self) -> Option<&Url> {
        self.relay_endpoint.as_ref()
    }

    pub fn resolve(&self, thumbnails: &Thumbnails, channel_name: &str) -> String {
        match thumbnails.best() {
            Some(remote) => self.relayed(remote),
            None => self.placeholder(channel_name),
        }
    }

    pub fn relayed(&self, remote: &str) -> String {
        let Some(endpoint) = &self.relay_endpoint else {
            return remote.to_string();
        };
        let mut url = endpoint.clone();
        url.query_pairs_mut().append_pair("url", remote);
        url.into()
    }

    /// Generated avatar bearing the channel name.
    pub fn placeholder(&self, channel_name: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("name", channel_name)
            .append_pair("size", PLACEHOLDER_SIZE)
            .append_pair("background", "random")
            .finish();
        let separator = if self.placeholder_base_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!("{}{separator}{query}", self.placeholder_base_url)
    }
}

#[cfg(test)]
mod tests {
    use shared::protocol::Thumbnail;

    use super::*;

    fn thumbs(default: Option<&str>) -> Thumbnails {
        Thumbnails {
            high: None,
            medium: None,
            default: default.map(|url| Thumbnail { url: url.into() }),
        }
    }

    #[test]
    fn remote_thumbnail_is_used_as_is_without_relay() {
        let options = ImageOptions::default();
        assert_eq!(
            options.resolve(&thumbs(Some("https://yt3.ggpht.com/x=s88")), "Alpha"),
            "https://yt3.ggpht.com/x=s88"
        );
    }

    #[test]
    fn relay_wraps_remote_thumbnail_in_url_parameter() {
        let options = ImageOptions::default()
            .with_relay("http://localhost:8787")
            .expect("relay url");
        assert_eq!(
            options.resolve(&thumbs(Some("https://yt3.ggpht.com/a?b=1")), "Alpha"),
            "http://localhost:8787/api/image-proxy?url=https%3A%2F%2Fyt3.ggpht.com%2Fa%3Fb%3D1"
        );
    }

    #[test]
    fn relay_keeps_path_prefix() {
        let options = ImageOptions::default()
            .with_relay("https://example.com/tools")
            .expect("relay url");
        assert_eq!(
            options.relay_endpoint().map(Url::as_str),
            Some("https://example.com/tools/api/image-proxy")
        );
    }

    #[test]
    fn missing_thumbnail_falls_back_to_named_placeholder() {
        let options = ImageOptions::default()
            .with_relay("http://localhost:8787")
            .expect("relay url");
        assert_eq!(
            options.resolve(&thumbs(None), "Tom & Jerry"),
            "https://ui-avatars.com/api/?name=Tom+%26+Jerry&size=240&background=random"
        );
    }

    #[test]
    fn invalid_relay_url_is_rejected() {
        assert!(ImageOptions::default().with_relay("not a url").is_err());
    }
}
