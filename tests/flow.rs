use pdf_flow::layout::{
    Align, Block, Border, FlowConfig, Margins, Padding, RecordedCell, Recorder, Style,
    StyleRegistry, TextFlow,
};
use pdf_flow::{colours, pagesize, Pt};

const EPSILON: f32 = 1e-3;

fn base() -> Style {
    Style::new("sans", "", Pt(10.0), colours::BLACK)
}

fn styles() -> StyleRegistry {
    let mut styles = StyleRegistry::new();
    styles.set_style("b", "", "B", "100%", "").unwrap();
    styles.set_style("big", "", "", "150%", "200,0,0").unwrap();
    styles.set_style("small", "", "", "50%", "").unwrap();
    styles
}

/// Text cells grouped by row, in drawing order
fn rows(surface: &Recorder) -> Vec<Vec<RecordedCell>> {
    let mut rows: Vec<Vec<RecordedCell>> = Vec::new();
    for cell in surface.text_cells() {
        match rows.last_mut() {
            Some(row) if row[0].page == cell.page && row[0].y == cell.y => {
                row.push(cell.clone())
            }
            _ => rows.push(vec![cell.clone()]),
        }
    }
    rows
}

/// Width a row of text cells covers once spaces are stretched
fn visual_width(row: &[RecordedCell]) -> f32 {
    row.iter()
        .map(|c| c.width.0 + c.word_spacing.0 * c.text.matches(' ').count() as f32)
        .sum()
}

#[test]
fn lines_fit_their_width() {
    let config = FlowConfig::default();
    let mut styles = styles();
    let mut surface = Recorder::default();
    let text = format!(
        "{} <b>{}</b> <big>{}</big> {}",
        lipsum::lipsum(40),
        lipsum::lipsum(12),
        lipsum::lipsum(20),
        lipsum::lipsum(30)
    );

    for width in [60.0, 97.5, 150.0, 233.0] {
        let lines = TextFlow::new(&mut surface, &mut styles, &config)
            .measure_lines(&base(), Pt(width), &text)
            .unwrap();
        assert!(lines.len() > 1);
        for line in lines.iter() {
            assert!(
                line.width().0 <= width + EPSILON,
                "{:?} is {} wide, more than {width}",
                line.text(),
                line.width()
            );
        }
    }
}

#[test]
fn breaking_only_drops_spaces() {
    let config = FlowConfig::default();
    let mut styles = styles();
    let mut surface = Recorder::default();
    let text = lipsum::lipsum(150);

    let lines = TextFlow::new(&mut surface, &mut styles, &config)
        .measure_lines(&base(), Pt(180.0), &text)
        .unwrap();
    let joined: String = lines.iter().map(|l| l.text()).collect();
    assert_eq!(joined.replace(' ', ""), text.replace(' ', ""));

    for line in lines.iter() {
        let text = line.text();
        assert!(!text.starts_with(' ') && !text.ends_with(' '), "{text:?}");
    }
}

#[test]
fn justified_lines_reach_the_right_edge() {
    let config = FlowConfig::default();
    let mut styles = styles();
    let mut surface = Recorder::default();
    let text = format!(
        "{} <b>{}</b> {}",
        lipsum::lipsum(60),
        lipsum::lipsum(10),
        lipsum::lipsum(60)
    );

    TextFlow::new(&mut surface, &mut styles, &config)
        .flow(&base(), &Block::new(Pt(200.0), Pt(12.0)), &text)
        .unwrap();

    let rows = rows(&surface);
    assert!(rows.len() > 3);
    let (last, full) = rows.split_last().unwrap();
    for row in full {
        assert!((visual_width(row) - 200.0).abs() < 0.01, "row {row:?}");
        assert_eq!(row[0].x, Pt::ZERO);
    }

    // the last line keeps its natural spacing
    assert!(last.iter().all(|c| c.word_spacing == Pt::ZERO));
    assert!(visual_width(last) <= 200.0);
}

#[test]
fn alignment_within_the_block() {
    let config = FlowConfig::default();
    let mut styles = styles();

    for (align, x) in [
        (Align::Left, 0.0),
        (Align::Right, 75.0),
        (Align::Center, 37.5),
        (Align::Justify, 0.0),
    ] {
        let mut surface = Recorder::default();
        TextFlow::new(&mut surface, &mut styles, &config)
            .flow(
                &base(),
                &Block::new(Pt(100.0), Pt(12.0)).with_align(align),
                "ab cd",
            )
            .unwrap();
        let first = surface.text_cells().next().unwrap();
        assert_eq!(first.x, Pt(x), "{align:?}");
    }
}

#[test]
fn blocks_continue_on_new_pages() {
    let config = FlowConfig::default();
    let mut styles = styles();
    // room for three 12pt lines per page
    let mut surface = Recorder::new((Pt(300.0), Pt(40.0)), Margins::empty());

    TextFlow::new(&mut surface, &mut styles, &config)
        .flow(
            &base(),
            &Block::new(Pt(100.0), Pt(12.0)).with_border(Border::ALL),
            "one\ntwo\nthree\nfour\nfive",
        )
        .unwrap();

    assert_eq!(surface.page_breaks(), 1);
    let pages: Vec<(usize, String)> = surface
        .text_cells()
        .map(|c| (c.page, c.text.clone()))
        .collect();
    assert_eq!(
        pages,
        vec![
            (0, "one".to_string()),
            (0, "two".to_string()),
            (0, "three".to_string()),
            (1, "four".to_string()),
            (1, "five".to_string()),
        ]
    );

    let borders: Vec<(usize, String)> = surface
        .cells()
        .filter(|c| !c.border.is_empty())
        .map(|c| (c.page, c.border.to_string()))
        .collect();
    assert_eq!(
        borders,
        vec![
            (0, "LTR".to_string()),
            (0, "LR".to_string()),
            (0, "LR".to_string()),
            (1, "LR".to_string()),
            (1, "LRB".to_string()),
        ]
    );
}

#[test]
fn padded_blocks_split_their_padding_across_pages() {
    let config = FlowConfig::default();
    let mut styles = styles();
    let mut surface = Recorder::new((Pt(300.0), Pt(60.0)), Margins::empty());
    let block = Block::new(Pt(100.0), Pt(12.0))
        .with_border(Border::ALL)
        .with_padding(Padding::all(Pt(5.0)));

    TextFlow::new(&mut surface, &mut styles, &config)
        .flow(&base(), &block, "1\n2\n3\n4\n5\n6")
        .unwrap();

    // (60 - 10) / 12 = 4 lines per page
    assert_eq!(surface.page_breaks(), 1);
    let top_padding: Vec<_> = surface
        .cells()
        .filter(|c| c.height == Pt(5.0))
        .map(|c| (c.page, c.border.to_string()))
        .collect();
    assert_eq!(
        top_padding,
        vec![(0, "LTR".to_string()), (1, "LRB".to_string())]
    );
    let first = surface.text_cells().next().unwrap();
    assert_eq!((first.x, first.y), (Pt(5.0), Pt(5.0)));
}

#[test]
fn percentage_sizes_follow_the_base_size() {
    let config = FlowConfig::default();
    let mut styles = styles();
    let mut surface = Recorder::default();

    TextFlow::new(&mut surface, &mut styles, &config)
        .flow(
            &base(),
            &Block::new(Pt(300.0), Pt(12.0)).with_align(Align::Left),
            "<big>ab</big><small>cd</small>ef",
        )
        .unwrap();

    let widths: Vec<(String, Pt)> = surface
        .text_cells()
        .map(|c| (c.text.clone(), c.width))
        .collect();
    assert_eq!(
        widths,
        vec![
            ("ab".to_string(), Pt(15.0)),
            ("cd".to_string(), Pt(5.0)),
            ("ef".to_string(), Pt(10.0)),
        ]
    );

    // a new base size rescales every percentage style
    let mut surface = Recorder::default();
    TextFlow::new(&mut surface, &mut styles, &config)
        .flow(
            &Style::new("sans", "", Pt(20.0), colours::BLACK),
            &Block::new(Pt(300.0), Pt(24.0)).with_align(Align::Left),
            "<small>cd</small>",
        )
        .unwrap();
    assert_eq!(surface.text_cells().next().unwrap().width, Pt(10.0));
}

#[test]
fn links_and_colours_reach_the_surface() {
    let config = FlowConfig::default();
    let mut styles = styles();
    let mut surface = Recorder::default();

    TextFlow::new(&mut surface, &mut styles, &config)
        .flow(
            &base(),
            &Block::new(Pt(300.0), Pt(12.0)),
            "see <big href=\"https://example.com\">here</big>",
        )
        .unwrap();

    let cells: Vec<_> = surface.text_cells().collect();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0].link, None);
    assert_eq!(cells[1].link.as_deref(), Some("https://example.com"));
    assert_eq!(cells[1].tag.as_deref(), Some("BIG"));
}

#[test]
fn line_limit_spans_pages() {
    let config = FlowConfig::default().with_max_lines(4);
    let mut styles = styles();
    let mut surface = Recorder::new((Pt(300.0), Pt(30.0)), Margins::empty());

    TextFlow::new(&mut surface, &mut styles, &config)
        .flow(&base(), &Block::new(Pt(100.0), Pt(10.0)), "a\nb\nc\nd\ne\nf")
        .unwrap();

    assert_eq!(surface.text_cells().count(), 4);
    assert_eq!(surface.page_breaks(), 1);
}

#[test]
fn measuring_text() {
    let config = FlowConfig::default();
    let mut styles = styles();
    let mut surface = Recorder::new(pagesize::A4, Margins::all(Pt(50.0)));
    let mut flow = TextFlow::new(&mut surface, &mut styles, &config);

    let text = lipsum::lipsum(80);
    let height = flow
        .block_height(&base(), Pt(120.0), Pt(12.0), &text)
        .unwrap();
    let lines = flow.measure_lines(&base(), Pt(120.0), &text).unwrap();
    assert_eq!(height, Pt(12.0 * lines.len() as f32));

    let widest = flow.max_line_width(&base(), "short\n<big>longer</big>", None).unwrap();
    assert_eq!(widest, Pt(45.0));
}
