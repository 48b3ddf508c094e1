//! Greedy line breaking over styled runs.
//!
//! Widths are accumulated glyph by glyph, in the style of the run each glyph
//! belongs to. When a line overflows, the break backs up to the last separator
//! seen in the current run; only when there is none does a line end mid-word.

use crate::layout::config::FlowConfig;
use crate::layout::style::StyleRegistry;
use crate::layout::surface::Surface;
use crate::layout::tags::{StyledRun, TagParser};
use crate::units::Pt;
use crate::PDFError;
use std::collections::VecDeque;

/// How a line ended
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// Not yet ended, or the input ran out
    #[default]
    None,
    /// At a newline in the text
    Explicit,
    /// Because the next glyph didn't fit
    Auto,
}

/// A piece of one line in a single style
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LineSegment {
    pub text: String,
    /// Tag of the run the text came from
    pub tag: String,
    /// Characters placed on the line so far, this segment included
    pub chars: usize,
    pub link: Option<String>,
    pub width: Pt,
    /// Number of spaces in `text`
    pub spaces: usize,
    /// How far the segment is raised above the line
    pub vertical_offset: Pt,
}

/// One line of output, ready to be rendered
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Line {
    pub segments: Vec<LineSegment>,
}

impl Line {
    pub fn width(&self) -> Pt {
        self.segments.iter().map(|s| s.width).sum()
    }

    pub fn spaces(&self) -> usize {
        self.segments.iter().map(|s| s.spaces).sum()
    }

    /// The text of every segment, concatenated
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// What is left to break, and how the previous lines ended
#[derive(Debug, Clone)]
pub struct FlowState {
    /// Runs not yet placed on a line; the head may be partially consumed
    pub runs: VecDeque<StyledRun>,
    pub last_break: BreakKind,
    pub current_break: BreakKind,
    pub tab_width: Pt,
    /// 0 for no limit
    pub max_lines: usize,
    /// Requested width and measured width of the last run placed on a line,
    /// used to size a paragraph-fill run
    last_requested: Pt,
    last_width: Pt,
}

impl FlowState {
    pub fn new(runs: Vec<StyledRun>, config: &FlowConfig) -> FlowState {
        FlowState {
            runs: runs.into(),
            last_break: BreakKind::None,
            current_break: BreakKind::None,
            tab_width: config.tab_width,
            max_lines: config.max_lines,
            last_requested: Pt::ZERO,
            last_width: Pt::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Separator {
    /// Index of the separator within the run
    pos: usize,
    ch: char,
    /// Run width accumulated before the separator
    width_before: Pt,
    width: Pt,
}

/// Produces [Line]s one at a time from a queue of runs
///
/// ```
/// use pdf_flow::layout::{FlowConfig, LineBreaker, Recorder, Style, StyleRegistry};
/// use pdf_flow::{colours, Pt};
///
/// let config = FlowConfig::default();
/// let mut styles = StyleRegistry::new();
/// styles.seed(&Style::new("mono", "", Pt(10.0), colours::BLACK));
/// // every glyph is 5pt wide on a recorder with the default metrics
/// let mut surface = Recorder::default();
///
/// let mut breaker = LineBreaker::from_markup(&config, "aaa bbb ccc");
/// let mut lines = Vec::new();
/// while !breaker.is_finished() {
///     lines.push(breaker.next_line(&mut surface, &mut styles, Pt(40.0)).unwrap().text());
/// }
/// assert_eq!(lines, vec!["aaa bbb", "ccc"]);
/// ```
#[derive(Debug, Clone)]
pub struct LineBreaker<'c> {
    config: &'c FlowConfig,
    state: FlowState,
    lines: usize,
}

impl<'c> LineBreaker<'c> {
    pub fn new(config: &'c FlowConfig, runs: Vec<StyledRun>) -> LineBreaker<'c> {
        LineBreaker {
            config,
            state: FlowState::new(runs, config),
            lines: 0,
        }
    }

    pub fn from_markup(config: &'c FlowConfig, markup: &str) -> LineBreaker<'c> {
        LineBreaker::new(config, TagParser::new(config).parse(markup))
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Number of lines produced so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// True once every run is placed, or the line limit is reached
    pub fn is_finished(&self) -> bool {
        self.state.runs.is_empty()
            || (self.state.max_lines > 0 && self.lines >= self.state.max_lines)
    }

    /// Break off the next line, at most `width` wide. A width of zero means the
    /// room between the surface's cursor and its right margin.
    pub fn next_line<S: Surface>(
        &mut self,
        surface: &mut S,
        styles: &mut StyleRegistry,
        width: Pt,
    ) -> Result<Line, PDFError> {
        let config = self.config;
        let state = &mut self.state;
        state.last_break = state.current_break;
        state.current_break = BreakKind::None;

        let max_width = if width == Pt::ZERO {
            surface.remaining_width()
        } else {
            width
        };

        let mut segments: Vec<LineSegment> = Vec::new();
        // summed in f64 so long lines don't drift past an exact fit
        let mut line_width = 0f64;
        let mut total_chars = 0usize;
        let mut last_sep_char: Option<char> = None;

        'runs: while let Some(run) = state.runs.front() {
            let chars: Vec<char> = run.text.chars().collect();
            let tag = run.tag.clone();
            let paragraph_fill = run.is_paragraph_fill();
            let link = run.attributes.link().map(str::to_string);
            let vertical_offset = run.attributes.vertical_offset();
            let requested = run.attributes.requested_size().unwrap_or_default();

            // chars[..j] go on this line, chars[..i] are consumed from the run
            let mut i = 0;
            let mut j = 0;
            let mut run_width = Pt::ZERO;
            let mut last_sep: Option<Separator> = None;
            let mut ante_sep: Option<Separator> = None;
            let mut line_done = false;

            while i < chars.len() {
                let c = chars[i];
                if c == '\n' {
                    i += 1;
                    state.current_break = BreakKind::Explicit;
                    line_done = true;
                    break;
                }

                let char_width = if c == '\t' {
                    if paragraph_fill {
                        (state.last_requested - state.last_width).max(Pt::ZERO)
                    } else {
                        state.tab_width
                    }
                } else {
                    styles.measure(surface, &tag, c)?
                };

                if config.is_separator(c) {
                    ante_sep = last_sep;
                    last_sep = Some(Separator {
                        pos: i,
                        ch: c,
                        width_before: run_width,
                        width: char_width,
                    });
                    last_sep_char = Some(c);
                }
                line_width += char_width.0 as f64;

                if max_width.is_exceeded_by(line_width) {
                    state.current_break = BreakKind::Auto;
                    line_done = true;

                    if total_chars == 0 {
                        // nothing fits; place one glyph anyway so the flow progresses
                        i = 1;
                        j = 1;
                        run_width = char_width;
                        total_chars = 1;
                        break;
                    }

                    if let Some(mut sep) = last_sep {
                        if sep.pos == i && c != ' ' {
                            match ante_sep {
                                Some(ante) => {
                                    sep = ante;
                                    last_sep_char = Some(ante.ch);
                                }
                                None => {
                                    // the overflowing glyph is itself the only separator
                                    j = i;
                                    break;
                                }
                            }
                        }
                        if sep.ch == ' ' {
                            j = sep.pos;
                            i = sep.pos + 1;
                            run_width = sep.width_before;
                        } else {
                            j = sep.pos + 1;
                            i = sep.pos + 1;
                            run_width = sep.width_before + sep.width;
                        }
                    } else if last_sep_char == Some(' ') {
                        if let Some(prev) = segments.last_mut() {
                            if prev.text.ends_with(' ') {
                                // break at the space ending the previous segment and
                                // leave this run untouched for the next line
                                prev.text.pop();
                                let space = styles.measure(surface, &prev.tag, ' ')?;
                                prev.width = (prev.width - space).max(Pt::ZERO);
                                prev.spaces = prev.spaces.saturating_sub(1);
                                break 'runs;
                            }
                        }
                        j = i;
                    } else {
                        j = i;
                    }
                    break;
                }

                run_width += char_width;
                i += 1;
                j = i;
                total_chars += 1;
            }

            let text: String = chars[..j].iter().filter(|&&c| c != '\t').collect();
            let spaces = text.chars().filter(|&c| c == ' ').count();

            if i >= chars.len() {
                state.runs.pop_front();
            } else if let Some(head) = state.runs.front_mut() {
                head.text = chars[i..].iter().collect();
            }

            if j > 0 {
                segments.push(LineSegment {
                    text,
                    tag,
                    chars: total_chars,
                    link,
                    width: run_width,
                    spaces,
                    vertical_offset,
                });
            }
            state.last_requested = requested;
            state.last_width = run_width;

            if line_done {
                break;
            }
        }

        if state.last_break == BreakKind::Auto {
            if let Some(first) = segments.first_mut() {
                if first.text.starts_with(' ') {
                    first.text.remove(0);
                    let space = styles.measure(surface, &first.tag, ' ')?;
                    first.width = (first.width - space).max(Pt::ZERO);
                    first.spaces = first.spaces.saturating_sub(1);
                }
            }
            if let Some(last) = segments.last_mut() {
                if last.text.ends_with(' ') {
                    last.text.pop();
                    let space = styles.measure(surface, &last.tag, ' ')?;
                    last.width = (last.width - space).max(Pt::ZERO);
                    last.spaces = last.spaces.saturating_sub(1);
                }
            }
        }
        if state.current_break == BreakKind::Explicit {
            for segment in segments.iter_mut() {
                segment.spaces = 0;
            }
        }

        self.lines += 1;
        let line = Line { segments };
        log::trace!(
            "line {}: {:?} ({} wide, {:?})",
            self.lines,
            line.text(),
            line.width(),
            self.state.current_break
        );
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::layout::recorder::Recorder;
    use crate::layout::style::Style;

    /// Breaks `markup` on a surface where every glyph is 5pt wide
    fn break_lines(config: &FlowConfig, markup: &str, width: f32) -> Vec<Line> {
        let mut styles = StyleRegistry::new();
        styles.seed(&Style::new("mono", "", Pt(10.0), colours::BLACK));
        styles.set_style("b", "", "B", "10", "").unwrap();
        let mut surface = Recorder::default();
        let mut breaker = LineBreaker::from_markup(config, markup);
        let mut lines = Vec::new();
        while !breaker.is_finished() {
            lines.push(
                breaker
                    .next_line(&mut surface, &mut styles, Pt(width))
                    .unwrap(),
            );
        }
        lines
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn breaks_at_spaces() {
        let lines = break_lines(&FlowConfig::default(), "aaa bbb ccc ddd", 40.0);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc ddd"]);
        assert_eq!(lines[0].width(), Pt(35.0));
        assert_eq!(lines[0].spaces(), 1);
    }

    #[test]
    fn keeps_punctuation_separators_on_the_line() {
        let lines = break_lines(&FlowConfig::default(), "aa,bb,cc", 30.0);
        assert_eq!(texts(&lines), vec!["aa,bb,", "cc"]);
    }

    #[test]
    fn overflowing_punctuation_backs_up_to_the_previous_separator() {
        // the second comma overflows: break after the first one
        let lines = break_lines(&FlowConfig::default(), "aa,bbb,c", 30.0);
        assert_eq!(texts(&lines), vec!["aa,", "bbb,c"]);
    }

    #[test]
    fn words_longer_than_the_line_are_split() {
        let lines = break_lines(&FlowConfig::default(), "abcdefgh", 20.0);
        assert_eq!(texts(&lines), vec!["abcd", "efgh"]);
    }

    #[test]
    fn at_least_one_glyph_per_line() {
        let lines = break_lines(&FlowConfig::default(), "abc", 1.0);
        assert_eq!(texts(&lines), vec!["a", "b", "c"]);
        assert_eq!(lines[0].width(), Pt(5.0));
    }

    #[test]
    fn newlines_end_lines_and_disable_justification() {
        let lines = break_lines(&FlowConfig::default(), "a b\n\nc d", 100.0);
        assert_eq!(texts(&lines), vec!["a b", "", "c d"]);
        assert_eq!(lines[0].spaces(), 0);
        assert!(lines[1].is_empty());
        assert_eq!(lines[2].spaces(), 1);
    }

    #[test]
    fn breaks_at_the_space_ending_the_previous_run() {
        let lines = break_lines(&FlowConfig::default(), "aaa <b>bbbbb</b>", 40.0);
        assert_eq!(texts(&lines), vec!["aaa", "bbbbb"]);
        assert_eq!(lines[0].width(), Pt(15.0));
        assert_eq!(lines[1].segments[0].tag, "B");
    }

    #[test]
    fn segments_follow_styles() {
        let lines = break_lines(&FlowConfig::default(), "a <b>b</b> c", 100.0);
        let segments = &lines[0].segments;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].tag, "B");
        assert_eq!(segments[2].chars, 5);
    }

    #[test]
    fn tabs_advance_without_text() {
        let config = FlowConfig::default().with_tab_width(Pt(20.0));
        let lines = break_lines(&config, "a\tb", 100.0);
        assert_eq!(lines[0].text(), "ab");
        assert_eq!(lines[0].width(), Pt(30.0));
        assert_eq!(lines[0].segments[1].width, Pt(20.0));
    }

    #[test]
    fn paragraph_fill_pads_to_the_requested_size() {
        let lines = break_lines(
            &FlowConfig::default(),
            "<b size=\"30\">ab</b>~~~cd",
            100.0,
        );
        assert_eq!(lines[0].text(), "abcd");
        assert_eq!(lines[0].segments[1].width, Pt(20.0));
        assert_eq!(lines[0].width(), Pt(40.0));
    }

    #[test]
    fn max_lines_stops_the_breaker() {
        let config = FlowConfig::default().with_max_lines(2);
        let lines = break_lines(&config, "a\nb\nc\nd", 100.0);
        assert_eq!(texts(&lines), vec!["a", "b"]);
    }

    #[test]
    fn exact_fits_survive_float_drift() {
        let config = FlowConfig::default();
        for em in [0.61, 0.37, 0.555, 0.83] {
            let mut surface = Recorder::default().with_glyph_width('a', em);
            let glyph = Pt(11.0) * em;
            for n in 5..40 {
                let mut styles = StyleRegistry::new();
                styles.seed(&Style::new("mono", "", Pt(11.0), colours::BLACK));
                let target = Pt((glyph.0 as f64 * n as f64) as f32);
                let word = "a".repeat(n);

                let mut breaker = LineBreaker::from_markup(&config, &word);
                let line = breaker.next_line(&mut surface, &mut styles, target).unwrap();
                assert_eq!(line.text().len(), n, "{n} glyphs of {em} em");
                assert!(breaker.is_finished());
            }
        }
    }

    #[test]
    fn lines_never_exceed_the_width() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit; sed: do. eiusmod";
        for width in [12.0, 33.0, 50.0, 71.0, 120.0] {
            for line in break_lines(&FlowConfig::default(), text, width) {
                assert!(line.width().0 <= width, "{:?} wider than {width}", line.text());
            }
        }
    }
}
