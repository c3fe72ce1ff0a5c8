//! Terminal styling for `vra-guest` output.
//!
//! Only pass/fail states get color. Styling is skipped when stdout is not a
//! terminal or the user opted out.

use std::env;

use owo_colors::OwoColorize;

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c - green
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - red
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680 - gray

pub const ICON_PASS: &str = "\u{2713}"; // check mark
pub const ICON_FAIL: &str = "\u{2716}"; // heavy x

/// Determines if ANSI color codes should be used.
///
/// `NO_COLOR`, `CLICOLOR=0` and `TERM=dumb` disable color, `CLICOLOR_FORCE`
/// forces it, otherwise color follows TTY detection.
pub fn supports_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").as_deref() == Ok("0") || env::var("TERM").as_deref() == Ok("dumb") {
        return false;
    }
    if env::var_os("CLICOLOR_FORCE").is_some() {
        return true;
    }
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

pub fn render_pass_icon() -> String {
    color_str(ICON_PASS, PASS)
}

pub fn render_fail_icon() -> String {
    color_str(ICON_FAIL, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_keeps_text() {
        // Colored or not, the visible text is preserved.
        assert!(render_bold("host-1").contains("host-1"));
        assert!(render_muted("none").contains("none"));
        assert!(render_pass_icon().contains(ICON_PASS));
        assert!(render_fail_icon().contains(ICON_FAIL));
    }
}
