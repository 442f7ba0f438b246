// src/utils/fonts.rs
//! Bundled chart font. Charts ask plotters for "sans-serif", which resolves
//! only through fonts registered here; nothing is read from the system.

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use plotters::style::{FontStyle, register_font};

pub const CHART_FAMILY: &str = "sans-serif";

static REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

static REGISTERED: OnceCell<()> = OnceCell::new();

/// Register the bundled faces under [`CHART_FAMILY`]. Idempotent; call before drawing.
pub fn ensure_chart_fonts() -> Result<()> {
    REGISTERED
        .get_or_try_init(|| {
            register_font(CHART_FAMILY, FontStyle::Normal, REGULAR)
                .map_err(|_| anyhow!("bundled regular font is not a valid TTF"))?;
            register_font(CHART_FAMILY, FontStyle::Bold, BOLD)
                .map_err(|_| anyhow!("bundled bold font is not a valid TTF"))?;
            tracing::debug!(family = CHART_FAMILY, "chart fonts registered");
            Ok::<(), anyhow::Error>(())
        })
        .map(|_| ())
}
