use crate::url::normalize_url;
use crate::UrlError;
use url::{Origin, Url};

/// The site a crawl is confined to
///
/// Scoping compares the full origin tuple (scheme, host, effective port), never
/// a string prefix, so `http://x.test2/` is not part of `http://x.test`.
#[derive(Debug, Clone)]
pub struct SiteOrigin {
    /// Normalized base URL, also used as the crawl seed
    base: Url,

    /// Origin tuple of `base`
    origin: Origin,
}

impl SiteOrigin {
    /// Parses and normalizes a base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_sift::url::SiteOrigin;
    ///
    /// let site = SiteOrigin::parse("http://x.test").unwrap();
    /// assert_eq!(site.seed().as_str(), "http://x.test/");
    /// assert!(site.contains_str("http://x.test/a"));
    /// assert!(!site.contains_str("http://x.test2/a"));
    /// ```
    pub fn parse(base_url: &str) -> Result<Self, UrlError> {
        let base = normalize_url(base_url)?;
        let origin = base.origin();
        Ok(Self { base, origin })
    }

    /// The URL every crawl starts from
    pub fn seed(&self) -> &Url {
        &self.base
    }

    /// Returns true if the URL belongs to this site
    pub fn contains(&self, url: &Url) -> bool {
        url.origin() == self.origin
    }

    /// Parses `url` and checks it belongs to this site
    pub fn contains_str(&self, url: &str) -> bool {
        Url::parse(url).map_or(false, |u| self.contains(&u))
    }
}
