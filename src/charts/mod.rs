//! Charts module - Chart bundle and rendering

mod bundle;
mod palette;
mod renderer;

pub use bundle::{ChartBundle, Reshaper, DATE_KEY};
pub use palette::{hex, ColorAssignment, PALETTE};
pub use renderer::{HtmlRenderer, PlotGeometry, RenderError, RenderOptions};
