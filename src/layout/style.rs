//! Tag name → font lookup.
//!
//! A [StyleRegistry] belongs to one document. Styles are registered once, up
//! front, and every flow call seeds the registry's `DEFAULT` style from the base
//! style it was given; percentage sizes are measured against that base.

use crate::colour::{colours, Colour};
use crate::layout::surface::Surface;
use crate::layout::tags::{DEFAULT_TAG, PARAGRAPH_TAG, TAB_TAG};
use crate::units::Pt;
use crate::PDFError;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

/// Size of a registered style
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontSize {
    Absolute(Pt),
    /// Percentage of the base size of the flow the style is used in
    Percent(f32),
}

impl FontSize {
    pub fn resolve(self, base: Pt) -> Pt {
        match self {
            FontSize::Absolute(size) => size,
            FontSize::Percent(percent) => base * (percent / 100.0),
        }
    }
}

impl From<Pt> for FontSize {
    fn from(size: Pt) -> Self {
        FontSize::Absolute(size)
    }
}

/// `"12"` is 12 points, `"50%"` is half the base size
impl FromStr for FontSize {
    type Err = PDFError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PDFError::InvalidFontSize(s.to_string());
        let trimmed = s.trim();
        let (number, percent) = match trimmed.strip_suffix('%') {
            Some(number) => (number.trim(), true),
            None => (trimmed, false),
        };
        let value: f32 = number.parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        Ok(if percent {
            FontSize::Percent(value)
        } else {
            FontSize::Absolute(Pt(value))
        })
    }
}

/// A style as registered for a tag
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpec {
    /// Font family; empty inherits the base family
    pub family: String,
    /// Font variant such as `"B"`, `"I"`, `"BI"`; empty is the regular face
    pub variant: String,
    pub size: FontSize,
    /// Text colour; `None` inherits the base colour
    pub colour: Option<Colour>,
}

/// A fully resolved style, ready to be measured with or drawn in
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Upper-cased tag the style was resolved for
    pub tag: String,
    pub family: String,
    pub variant: String,
    pub size: Pt,
    pub colour: Colour,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            tag: DEFAULT_TAG.to_string(),
            family: String::new(),
            variant: String::new(),
            size: Pt(12.0),
            colour: colours::BLACK,
        }
    }
}

impl Style {
    /// A base style for a flow call
    pub fn new<F: ToString, V: ToString, P: Into<Pt>>(
        family: F,
        variant: V,
        size: P,
        colour: Colour,
    ) -> Style {
        Style {
            tag: DEFAULT_TAG.to_string(),
            family: family.to_string(),
            variant: variant.to_string(),
            size: size.into(),
            colour,
        }
    }
}

/// Upper-cased, trimmed form of a tag name
fn normalise(tag: &str) -> String {
    tag.trim().to_ascii_uppercase()
}

/// Registered styles for one document
#[derive(Debug, Default, Clone)]
pub struct StyleRegistry {
    specs: HashMap<String, StyleSpec>,
    base: Style,
    resolved: HashMap<String, Style>,
    active: Option<String>,
    ambiguous: BTreeSet<String>,
}

impl StyleRegistry {
    pub fn new() -> StyleRegistry {
        StyleRegistry::default()
    }

    /// Register a style from its textual description, e.g.
    /// `set_style("h1", "helvetica", "B", "150%", "50,50,50")`
    ///
    /// ```
    /// use pdf_flow::layout::StyleRegistry;
    ///
    /// let mut styles = StyleRegistry::new();
    /// styles.set_style("b", "helvetica", "B", "10", "0,0,0").unwrap();
    /// assert!(styles.set_style("ttags", "helvetica", "", "10", "").is_err());
    /// ```
    pub fn set_style(
        &mut self,
        tag: &str,
        family: &str,
        variant: &str,
        size: &str,
        colour: &str,
    ) -> Result<(), PDFError> {
        let colour = match colour.trim() {
            "" => None,
            c => Some(c.parse::<Colour>()?),
        };
        self.define(
            tag,
            StyleSpec {
                family: family.trim().to_string(),
                variant: variant.trim().to_string(),
                size: size.parse()?,
                colour,
            },
        )
    }

    /// Register a style for `tag`. The first definition of a tag wins; later ones
    /// only mark the tag as ambiguous.
    pub fn define(&mut self, tag: &str, spec: StyleSpec) -> Result<(), PDFError> {
        let key = normalise(tag);
        if key.is_empty() {
            return Err(PDFError::EmptyTagName);
        }
        if [TAB_TAG, PARAGRAPH_TAG, DEFAULT_TAG].contains(&key.as_str()) {
            return Err(PDFError::ReservedTag(key));
        }

        if self.specs.contains_key(&key) {
            log::warn!("style for tag {key} defined more than once, keeping the first definition");
            self.ambiguous.insert(key);
            return Ok(());
        }

        self.resolved.remove(&key);
        self.specs.insert(key, spec);
        Ok(())
    }

    /// Make `base` the `DEFAULT` style and the reference for percentage sizes.
    /// Called at the start of every flow.
    pub fn seed(&mut self, base: &Style) {
        self.base = Style {
            tag: DEFAULT_TAG.to_string(),
            ..base.clone()
        };
        self.resolved.clear();
        self.active = None;
    }

    /// The `DEFAULT` style of the current flow
    pub fn base(&self) -> &Style {
        &self.base
    }

    pub fn spec(&self, tag: &str) -> Option<&StyleSpec> {
        self.specs.get(&normalise(tag))
    }

    /// Whether any tag was registered more than once
    pub fn is_ambiguous(&self) -> bool {
        !self.ambiguous.is_empty()
    }

    pub fn ambiguous_tags(&self) -> impl Iterator<Item = &str> {
        self.ambiguous.iter().map(String::as_str)
    }

    /// Tag of the style last applied to a surface
    pub fn active_tag(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The style to use for `tag`; empty, reserved, and unknown tags resolve to
    /// `DEFAULT`
    pub fn resolve(&mut self, tag: &str) -> &Style {
        let key = self.lookup_key(tag);
        let StyleRegistry {
            specs,
            base,
            resolved,
            ..
        } = self;
        resolved.entry(key).or_insert_with_key(|key| match specs.get(key) {
            Some(spec) => Style {
                tag: key.clone(),
                family: if spec.family.is_empty() {
                    base.family.clone()
                } else {
                    spec.family.clone()
                },
                variant: spec.variant.clone(),
                size: spec.size.resolve(base.size),
                colour: spec.colour.unwrap_or(base.colour),
            },
            None => base.clone(),
        })
    }

    /// Activate the style of `tag` on the surface, unless it already is active
    pub fn apply<S: Surface>(&mut self, surface: &mut S, tag: &str) -> Result<(), PDFError> {
        let key = self.lookup_key(tag);
        if self.active.as_deref() == Some(key.as_str()) {
            return Ok(());
        }
        surface.activate_style(self.resolve(&key))?;
        self.active = Some(key);
        Ok(())
    }

    /// Advance of `ch` in the style of `tag`
    pub fn measure<S: Surface>(
        &mut self,
        surface: &mut S,
        tag: &str,
        ch: char,
    ) -> Result<Pt, PDFError> {
        surface.advance(self.resolve(tag), ch)
    }

    fn lookup_key(&self, tag: &str) -> String {
        let key = normalise(tag);
        if key.is_empty() || key == TAB_TAG || key == PARAGRAPH_TAG {
            return DEFAULT_TAG.to_string();
        }
        if key != DEFAULT_TAG && !self.specs.contains_key(&key) {
            log::debug!("no style registered for tag {key}, using {DEFAULT_TAG}");
            return DEFAULT_TAG.to_string();
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::recorder::Recorder;

    fn registry() -> StyleRegistry {
        let mut styles = StyleRegistry::new();
        styles.seed(&Style::new("sans", "", Pt(10.0), colours::BLACK));
        styles
    }

    #[test]
    fn percentages_resolve_against_the_seeded_base() {
        let mut styles = registry();
        styles.set_style("big", "", "B", "200%", "").unwrap();
        styles.set_style("half", "", "", "50%", "").unwrap();
        let mut surface = Recorder::default();

        styles.apply(&mut surface, "big").unwrap();
        assert_eq!(styles.resolve("half").size, Pt(5.0));
        styles.apply(&mut surface, "half").unwrap();
        styles.apply(&mut surface, "big").unwrap();
        assert_eq!(styles.resolve("half").size, Pt(5.0));
        assert_eq!(styles.resolve("big").size, Pt(20.0));

        styles.seed(&Style::new("sans", "", Pt(8.0), colours::BLACK));
        assert_eq!(styles.resolve("half").size, Pt(4.0));
    }

    #[test]
    fn unknown_and_reserved_tags_fall_back_to_default() {
        let mut styles = registry();
        assert_eq!(styles.resolve("nope").tag, DEFAULT_TAG);
        assert_eq!(styles.resolve("").tag, DEFAULT_TAG);
        assert_eq!(styles.resolve(TAB_TAG).tag, DEFAULT_TAG);
        assert_eq!(styles.resolve("pparg").family, "sans");
    }

    #[test]
    fn tags_are_case_insensitive_and_inherit_unset_fields() {
        let mut styles = registry();
        styles.set_style(" em ", "", "I", "12", "").unwrap();
        let em = styles.resolve("EM").clone();
        assert_eq!(em.tag, "EM");
        assert_eq!(em.family, "sans");
        assert_eq!(em.variant, "I");
        assert_eq!(em.size, Pt(12.0));
        assert_eq!(em.colour, colours::BLACK);
    }

    #[test]
    fn first_definition_wins() {
        let mut styles = registry();
        styles.set_style("b", "serif", "B", "10", "").unwrap();
        assert!(!styles.is_ambiguous());
        styles.set_style("B", "mono", "", "20", "").unwrap();
        assert!(styles.is_ambiguous());
        assert_eq!(styles.ambiguous_tags().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(styles.resolve("b").family, "serif");
    }

    #[test]
    fn rejects_bad_definitions() {
        let mut styles = registry();
        assert!(matches!(
            styles.set_style("", "sans", "", "10", ""),
            Err(PDFError::EmptyTagName)
        ));
        assert!(matches!(
            styles.set_style("TTags", "sans", "", "10", ""),
            Err(PDFError::ReservedTag(_))
        ));
        assert!(matches!(
            styles.set_style("x", "sans", "", "big", ""),
            Err(PDFError::InvalidFontSize(_))
        ));
        assert!(matches!(
            styles.set_style("x", "sans", "", "10", "1,2"),
            Err(PDFError::InvalidColour(_))
        ));
    }

    #[test]
    fn applying_the_active_style_is_a_no_op() {
        let mut styles = registry();
        styles.set_style("b", "", "B", "10", "").unwrap();
        let mut surface = Recorder::default();
        styles.apply(&mut surface, "b").unwrap();
        styles.apply(&mut surface, "B").unwrap();
        styles.apply(&mut surface, "").unwrap();
        styles.apply(&mut surface, "unknown").unwrap();
        assert_eq!(surface.activated_tags(), vec!["B", DEFAULT_TAG]);
    }
}
