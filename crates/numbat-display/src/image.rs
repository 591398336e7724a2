//! Image asset registry.
//!
//! Decoding happens elsewhere; layout only needs each asset's natural size,
//! which may not be known yet when the element is laid out.

use std::collections::HashMap;

use crate::geometry::Size;

/// Natural sizes of image assets keyed by resolved URL.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    assets: HashMap<String, Option<Size>>,
}

impl ImageStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `url`, registering it as pending if it was never seen.
    ///
    /// Returns the natural size when known.
    pub fn find_or_materialize(&mut self, url: &str) -> Option<Size> {
        if let Some(size) = self.assets.get(url) {
            return *size;
        }
        log::debug!(target: "numbat::image", "pending image {url}");
        let _ = self.assets.insert(url.to_string(), None);
        None
    }

    /// Record the natural size of `url` once it is known.
    pub fn set_natural_size(&mut self, url: &str, size: Size) {
        let _ = self.assets.insert(url.to_string(), Some(size));
    }

    /// The natural size of `url`, if known.
    #[must_use]
    pub fn natural_size(&self, url: &str) -> Option<Size> {
        self.assets.get(url).copied().flatten()
    }

    /// URLs registered but still without a size.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.assets
            .iter()
            .filter(|(_, size)| size.is_none())
            .map(|(url, _)| url.as_str())
    }
}
