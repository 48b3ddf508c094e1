//! Tag-styled rich text for PDF documents: markup such as `"<b>bold</b> text"` is
//! broken into lines, justified, framed, and paginated by the [layout] module, and
//! drawn into a PDF through [PdfCanvas].

mod canvas;
pub use canvas::*;

mod colour;
pub use colour::*;

mod document;
pub use document::*;

mod font;
pub use font::*;

/// Rich text flow: tag parsing, styles, line breaking, and block layout
pub mod layout;

mod page;
pub use page::*;

pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod units;
pub use units::*;

mod error;
pub use error::*;

/// Re-export PDF-writer functionality
pub use pdf_writer;
