//! A deeply nested step tree progressing over a few seconds. The renderer
//! auto-starts at construction and parks itself once every step settles.

use std::thread::sleep;
use std::time::Duration;

use stepline::{Options, Renderer, StepContainer};

fn main() {
    let tree = StepContainer::new();
    let foo = tree.spawn("foo");
    let bar = foo.spawn("bar");
    let baz = foo.spawn("baz");
    let qux = baz.spawn("qux");

    // Spawned after the pending steps exist, so auto_stop has work to watch.
    let renderer = Renderer::new(tree.clone(), Options::default()).unwrap();

    pause();
    foo.start();
    pause();
    bar.start();
    pause();
    bar.warn();
    pause();
    baz.start();
    pause();
    qux.start();
    pause();
    qux.error_with("bad things happened");
    pause();
    baz.info_with("something is wrong");
    pause();
    foo.success();

    // auto_stop flips running() once the final frame is drawn.
    while renderer.running() {
        sleep(Duration::from_millis(20));
    }
}

fn pause() {
    sleep(Duration::from_millis(700));
}
