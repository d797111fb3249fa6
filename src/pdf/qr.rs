use qrcode::render::svg;
use qrcode::QrCode;

use crate::error::Result;

/// Encode `payload` as an SVG QR code. Fails if the payload is too long.
pub fn qr_svg(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes())?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .quiet_zone(true)
        .build())
}
