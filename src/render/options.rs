//! Rendering options and configuration.

use crate::pages::PageSet;

/// Options for rendering reconstructed documents.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix for image paths in output (e.g., "./images/")
    ///
    /// When set, images are referenced as prefix + file name.
    pub image_path_prefix: String,

    /// Emit page images
    pub include_images: bool,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Show low-confidence markers on paragraphs and cells
    pub show_confidence_markers: bool,

    /// Show page banners
    pub show_page_banners: bool,

    /// Pages to render (`None` = all)
    pub page_selection: Option<PageSet>,

    /// Collect statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Enable or disable page images.
    pub fn with_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Enable or disable low-confidence markers.
    pub fn with_confidence_markers(mut self, show: bool) -> Self {
        self.show_confidence_markers = show;
        self
    }

    /// Enable or disable page banners.
    pub fn with_page_banners(mut self, show: bool) -> Self {
        self.show_page_banners = show;
        self
    }

    /// Render only the given pages.
    pub fn with_pages(mut self, pages: PageSet) -> Self {
        self.page_selection = Some(pages);
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Check if a page number should be rendered.
    pub fn includes(&self, page: u32) -> bool {
        self.page_selection
            .as_ref()
            .map_or(true, |pages| pages.contains(page))
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_path_prefix: String::new(),
            include_images: true,
            escape_special_chars: true,
            show_confidence_markers: true,
            show_page_banners: true,
            page_selection: None,
            collect_stats: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_images(false)
            .with_image_prefix("./img/")
            .with_confidence_markers(false);

        assert!(!options.include_images);
        assert_eq!(options.image_path_prefix, "./img/");
        assert!(!options.show_confidence_markers);
        assert!(options.escape_special_chars);
    }

    #[test]
    fn test_page_selection() {
        let options = RenderOptions::new();
        assert!(options.includes(1));
        assert!(options.includes(100));

        let options = options.with_pages(PageSet::parse("2-3"));
        assert!(!options.includes(1));
        assert!(options.includes(2));
        assert!(options.includes(3));
    }
}
