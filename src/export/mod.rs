//! Report emitters. Both consume the resolved pixel tiles and the image
//! entries they refer to; neither does any geometry of its own.

pub mod html;
pub mod manifest;

pub use html::{render_html, write_html};
pub use manifest::{build_manifest, write_manifest, Manifest};
