//! Custom glyphs, spinner frames and colors merged over the defaults.

use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use owo_colors::OwoColorize;
use stepline::{
    Color, Options, Renderer, SignStyle, SpinnerStyle, StepContainer, StyleOptions, identity,
};

fn main() {
    let magenta: Color = Arc::new(|text: &str| text.magenta().to_string());

    let tree = StepContainer::with_styles(StyleOptions {
        indent: Some("│  ".into()),
        running: Some(SpinnerStyle::new(magenta, ["◐", "◓", "◑", "◒"])),
        success: Some(SignStyle::new(
            Arc::new(|text: &str| text.green().bold().to_string()),
            "done",
        )),
        skipped: Some(SignStyle::new(identity(), "skip")),
        ..StyleOptions::default()
    })
    .unwrap();

    let fetch = tree.spawn("fetch assets");
    let lint = tree.spawn("lint");

    let renderer = Renderer::new(tree.clone(), Options {
        fps: 24.0,
        ..Options::default()
    })
    .unwrap();

    fetch.start();
    sleep(Duration::from_millis(1500));
    fetch.success_with("118 files");
    lint.skip_with("cache hit");

    while renderer.running() {
        sleep(Duration::from_millis(20));
    }
}
