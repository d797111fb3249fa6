mod labels;
mod qr;
mod typst;

pub use labels::{Language, ReceiptLabels};
pub use qr::qr_svg;
pub use typst::render_receipt;
