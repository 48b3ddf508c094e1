//! Rich text flow: tagged markup in, styled, justified, paginated lines out.
//!
//! The pipeline runs in four stages:
//!
//! - [TagParser] turns markup such as `"<b>bold</b> text"` into [StyledRun]s
//! - [StyleRegistry] maps tags to fonts, sizes, and colours
//! - [LineBreaker] fills lines greedily, backing up to separators
//! - [render_line] places the segments of a line and stretches spaces to justify it
//!
//! [TextFlow] ties them together, drawing bordered, padded blocks that continue
//! onto new pages. Everything is drawn through the [Surface] trait; the crate
//! provides [PdfCanvas](crate::PdfCanvas) for PDF output and [Recorder] for dry runs.
//!
//! # Example
//!
//! ```
//! use pdf_flow::layout::{
//!     Block, Border, FlowConfig, Margins, Recorder, Style, StyleRegistry, TextFlow,
//! };
//! use pdf_flow::{colours, pagesize, Pt};
//!
//! let config = FlowConfig::default();
//! let mut styles = StyleRegistry::new();
//! styles.set_style("h", "", "B", "150%", "200,0,0").unwrap();
//!
//! let mut surface = Recorder::new(pagesize::A5, Margins::all(Pt(36.0)));
//! let base = Style::new("sans", "", Pt(10.0), colours::BLACK);
//! let block = Block::new(Pt(0.0), Pt(14.0)).with_border(Border::ALL);
//!
//! TextFlow::new(&mut surface, &mut styles, &config)
//!     .flow(&base, &block, "<h>Title</h>\nSome text,\tand a tab.")
//!     .unwrap();
//! assert_eq!(surface.page_breaks(), 0);
//! ```

mod breaker;
mod config;
mod flow;
mod margins;
mod recorder;
mod render;
mod style;
mod surface;
mod tags;

pub use breaker::*;
pub use config::*;
pub use flow::*;
pub use margins::*;
pub use recorder::*;
pub use render::*;
pub use style::*;
pub use surface::*;
pub use tags::*;
