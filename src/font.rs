use crate::{
    refs::{ObjectReferences, RefType},
    PDFError, Pt,
};
use id_arena::Id;
use owned_ttf_parser::{AsFaceRef, Face, GlyphId, OwnedFace};
use pdf_writer::{
    types::{CidFontType, FontFlags, SystemInfo},
    Filter, Finish, Name, Pdf, Ref, Str,
};
use std::collections::{BTreeMap, HashMap};

/// A parsed TTF or OTF font. Fonts are embedded in their entirety in the generated
/// PDF, so large fonts dramatically increase the size of the output.
///
/// Text is drawn with the font's glyph ids directly (`Identity-H` encoding), and a
/// `ToUnicode` map is embedded so the text stays searchable and copyable.
pub struct Font {
    pub face: OwnedFace,
}

/// Advance and height of a glyph, in font units
#[derive(Debug, Clone, Copy)]
struct GlyphMetrics {
    advance: u16,
    height: i16,
}

impl Font {
    /// Load a font from raw bytes, returning an error if the font can't be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, PDFError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font { face })
    }

    fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }

    fn name_entry(&self, id: u16) -> Option<String> {
        self.face()
            .names()
            .into_iter()
            .find(|name| name.name_id == id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// Full name of the font, if it has one
    pub fn name(&self) -> Option<String> {
        self.name_entry(owned_ttf_parser::name_id::FULL_NAME)
    }

    /// Family name of the font, if it has one
    pub fn family(&self) -> Option<String> {
        self.name_entry(owned_ttf_parser::name_id::FAMILY)
    }

    fn scale(&self, size: Pt) -> Pt {
        size / self.face().units_per_em() as f32
    }

    /// Distance from the baseline to the top of the font at the given size
    pub fn ascent(&self, size: Pt) -> Pt {
        self.scale(size) * self.face().ascender() as f32
    }

    /// Distance from the baseline to the bottom of the font at the given size.
    /// Usually negative.
    pub fn descent(&self, size: Pt) -> Pt {
        self.scale(size) * self.face().descender() as f32
    }

    /// Horizontal advance of `ch` at the given size. Characters missing from the
    /// font are measured as the glyph they are drawn with instead.
    pub fn advance(&self, ch: char, size: Pt) -> Pt {
        let advance = self
            .face()
            .glyph_hor_advance(GlyphId(self.glyph_or_fallback(ch)))
            .unwrap_or_default();
        self.scale(size) * advance as f32
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face().glyph_index(ch).map(|i| i.0)
    }

    pub fn replacement_glyph_id(&self) -> Option<u16> {
        self.glyph_id('\u{FFFD}')
    }

    /// Glyph used to draw `ch`: its own, the replacement character, `?`, or
    /// `.notdef`, whichever exists first
    pub fn glyph_or_fallback(&self, ch: char) -> u16 {
        self.glyph_id(ch)
            .or_else(|| self.replacement_glyph_id())
            .or_else(|| self.glyph_id('?'))
            .unwrap_or(0)
    }

    /// Every glyph reachable from a unicode codepoint, with one codepoint each
    fn glyph_chars(&self) -> BTreeMap<u16, char> {
        let mut map: BTreeMap<u16, char> = BTreeMap::new();
        let Some(cmap) = self.face().tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    fn glyph_metrics(&self, glyphs: &BTreeMap<u16, char>) -> BTreeMap<u16, GlyphMetrics> {
        let face = self.face();
        glyphs
            .keys()
            .filter_map(|&gid| {
                let glyph = GlyphId(gid);
                let advance = face.glyph_hor_advance(glyph)?;
                let height = face
                    .glyph_bounding_box(glyph)
                    .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                    .unwrap_or(1000);
                Some((gid, GlyphMetrics { advance, height }))
            })
            .collect()
    }

    fn write_cid(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        metrics: &BTreeMap<u16, GlyphMetrics>,
        writer: &mut Pdf,
    ) -> Ref {
        let font_descriptor_id = self.write_descriptor(refs, font_index, metrics, writer);
        let id = refs.gen(RefType::CidFont(font_index));
        let scaling = 1000.0 / self.face().units_per_em() as f32;

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        // the most common advance becomes the default width
        let mut counts: HashMap<u16, usize> = HashMap::new();
        for m in metrics.values() {
            *counts.entry(m.advance).or_insert(0) += 1;
        }
        let default_width = counts
            .iter()
            .max_by_key(|&(&advance, &count)| (count, advance))
            .map(|(&advance, _)| advance as f32 * scaling)
            .unwrap_or(1000.0);

        // runs of consecutive glyph ids share a widths entry
        let mut widths = cid_font.widths();
        let mut run: Option<(u16, Vec<f32>)> = None;
        for (&gid, m) in metrics.iter() {
            let width = m.advance as f32 * scaling;
            match run.as_mut() {
                Some((start, ws)) if *start as usize + ws.len() == gid as usize => ws.push(width),
                _ => {
                    if let Some((start, ws)) = run.take() {
                        widths.consecutive(start, ws);
                    }
                    run = Some((gid, vec![width]));
                }
            }
        }
        if let Some((start, ws)) = run {
            widths.consecutive(start, ws);
        }
        widths.finish();

        cid_font.default_width(default_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        metrics: &BTreeMap<u16, GlyphMetrics>,
        writer: &mut Pdf,
    ) -> Ref {
        let font_data_id = refs.gen(RefType::FontData(font_index));
        writer
            .stream(font_data_id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        let face = self.face();
        let scaling = 1000.0 / face.units_per_em() as f32;
        let max_width = metrics.values().map(|m| m.advance).max().unwrap_or_default();
        let max_height = metrics.values().map(|m| m.height).max().unwrap_or_default();
        let sum_width: usize = metrics.values().map(|m| m.advance as usize).sum();
        let avg_width = if metrics.is_empty() {
            0.0
        } else {
            sum_width as f32 / metrics.len() as f32
        };

        let name = self.name().unwrap_or_else(|| format!("F{font_index}"));
        let id = refs.gen(RefType::FontDescriptor(font_index));
        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(name.replace(' ', "").as_bytes()));
        if let Some(family) = self.family() {
            descriptor.family(Str(family.as_bytes()));
        }
        descriptor.weight(face.weight().to_number());

        let mut flags = FontFlags::NON_SYMBOLIC;
        if face.is_monospaced() {
            flags.insert(FontFlags::FIXED_PITCH);
        }
        if face.is_italic() {
            flags.insert(FontFlags::ITALIC);
        }
        descriptor.flags(flags);

        let bbox = face.global_bounding_box();
        descriptor.bbox(pdf_writer::Rect {
            x1: bbox.x_min as f32 * scaling,
            y1: bbox.y_min as f32 * scaling,
            x2: bbox.x_max as f32 * scaling,
            y2: (bbox.y_max.max(max_height)) as f32 * scaling,
        });
        descriptor.italic_angle(face.italic_angle());
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        descriptor.cap_height(
            face.capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(1000.0),
        );
        descriptor.x_height(
            face.x_height()
                .or_else(|| face.capital_height())
                .unwrap_or_default() as f32
                * scaling,
        );
        // TrueType fonts don't record stem widths; 80 is the customary stand-in
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);
        descriptor.font_file2(font_data_id);

        id
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        glyphs: &BTreeMap<u16, char>,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo\n\
             << /Registry (Adobe)\n\
             /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        // bfchar blocks hold at most 100 entries sharing a high byte
        let mut blocks: Vec<Vec<(u16, char)>> = Vec::new();
        for (&gid, &ch) in glyphs.iter() {
            match blocks.last_mut() {
                Some(block)
                    if block.len() < 100 && block.first().map(|(g, _)| g >> 8) == Some(gid >> 8) =>
                {
                    block.push((gid, ch))
                }
                _ => blocks.push(vec![(gid, ch)]),
            }
        }

        for block in blocks.into_iter() {
            map.push_str(&format!("{} beginbfchar\n", block.len()));
            for (gid, ch) in block.into_iter() {
                let mut utf16 = [0u16; 2];
                let units: String = ch
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04x}"))
                    .collect();
                map.push_str(&format!("<{gid:04x}> <{units}>\n"));
            }
            map.push_str("endbfchar\n");
        }
        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        writer
            .stream(id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        id
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, id: Id<Font>, writer: &mut Pdf) {
        let font_index = id.index();
        let font_id = refs.gen(RefType::Font(font_index));
        let glyphs = self.glyph_chars();
        let metrics = self.glyph_metrics(&glyphs);
        let cid_font_id = self.write_cid(refs, font_index, &metrics, writer);
        let to_unicode_id = self.write_to_unicode(refs, font_index, &glyphs, writer);

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(format!("F{font_index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono() -> Font {
        Font::load(include_bytes!("../tests/fonts/DejaVuSansMono.ttf").to_vec()).unwrap()
    }

    #[test]
    fn advances_scale_with_the_size() {
        let font = mono();
        // every glyph is 1233 of 2048 units wide
        assert_eq!(font.advance('a', Pt(10.0)), Pt(12330.0 / 2048.0));
        assert_eq!(font.advance(' ', Pt(10.0)), font.advance('W', Pt(10.0)));
        assert_eq!(font.advance('a', Pt(20.0)), Pt(24660.0 / 2048.0));
        assert_eq!(font.family().as_deref(), Some("DejaVu Sans Mono"));
    }

    #[test]
    fn unparsable_fonts_are_errors() {
        assert!(matches!(
            Font::load(vec![0; 64]),
            Err(PDFError::FaceParsingError(_))
        ));
    }
}
