//! Colour detection for command output.

pub use cortex_plugins::renderers::Painter;

/// Colour on a terminal unless `--no-color` or `NO_COLOR` says otherwise.
pub fn detect_painter(no_color: bool) -> Painter {
    let env_off = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    Painter::new(!no_color && !env_off && atty::is(atty::Stream::Stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_color_flag_wins() {
        assert!(!detect_painter(true).enabled());
    }
}
