use crate::units::{Mm, Pt};

/// Characters after which an automatic line break may happen
pub const DEFAULT_SEPARATORS: &str = " ,.:;";

/// Longest tag name that is still recognised as a tag
pub const DEFAULT_MAX_TAG_LEN: usize = 25;

/// Marker that stretches to fill the rest of the preceding sized run
pub const DEFAULT_PARAGRAPH_MARKER: &str = "~~~";

/// Per-engine settings of the text flow. One instance is typically shared by
/// every flow call made against a document.
///
/// ```
/// use pdf_flow::layout::FlowConfig;
/// use pdf_flow::Pt;
///
/// let config = FlowConfig::default()
///     .with_separators(" -")
///     .with_tab_width(Pt(36.0))
///     .with_max_lines(3);
/// assert!(config.is_separator('-'));
/// assert!(!config.is_separator(','));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FlowConfig {
    separators: Vec<char>,
    /// Tag names longer than this are treated as literal text
    pub max_tag_len: usize,
    /// Width a tab character occupies on a line
    pub tab_width: Pt,
    /// Stop breaking after this many lines; 0 means no limit. The cap applies to a
    /// whole flow call, across every page it spans.
    pub max_lines: usize,
    /// Text that the tag parser turns into a paragraph-fill run
    pub paragraph_marker: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        FlowConfig {
            separators: DEFAULT_SEPARATORS.chars().collect(),
            max_tag_len: DEFAULT_MAX_TAG_LEN,
            tab_width: Mm(10.0).into(),
            max_lines: 0,
            paragraph_marker: DEFAULT_PARAGRAPH_MARKER.to_string(),
        }
    }
}

impl FlowConfig {
    /// Replace the set of line-breaking characters
    pub fn with_separators(mut self, separators: &str) -> FlowConfig {
        self.set_separators(separators);
        self
    }

    pub fn with_max_tag_len(mut self, max_tag_len: usize) -> FlowConfig {
        self.max_tag_len = max_tag_len;
        self
    }

    pub fn with_tab_width<W: Into<Pt>>(mut self, tab_width: W) -> FlowConfig {
        self.tab_width = tab_width.into();
        self
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> FlowConfig {
        self.max_lines = max_lines;
        self
    }

    pub fn with_paragraph_marker<S: ToString>(mut self, marker: S) -> FlowConfig {
        self.paragraph_marker = marker.to_string();
        self
    }

    pub fn set_separators(&mut self, separators: &str) {
        self.separators = separators.chars().collect();
    }

    /// Restore the default line-breaking characters
    pub fn reset_separators(&mut self) {
        self.set_separators(DEFAULT_SEPARATORS);
    }

    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    pub fn is_separator(&self, ch: char) -> bool {
        self.separators.contains(&ch)
    }
}
