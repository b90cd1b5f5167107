//! Spans from worker threads rendered as a live step tree.

use std::thread;
use std::time::Duration;

use stepline::{Options, Renderer, StepContainer, step_layer};
use tracing::{info, info_span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let tree = StepContainer::new();
    // The tree starts empty, so auto_stop would park the timer immediately;
    // stop by hand once the workers are done instead.
    let mut renderer = Renderer::new(tree.clone(), Options {
        auto_stop: false,
        ..Options::default()
    })
    .unwrap();
    tracing_subscriber::registry().with(step_layer(&tree)).init();

    let compile = thread::spawn(|| {
        let span = info_span!("compile");
        let steps = ["parsing sources", "type checking", "emitting binary"];
        for step in steps {
            sleep(600);
            span.in_scope(|| info!("{step}"));
        }
    });

    let deploy = thread::spawn(|| {
        let root = info_span!("deploy");
        for env in ["staging", "production"] {
            let child = info_span!(parent: &root, "rollout", message = format!("{env}"));
            for step in ["preflight checks", "swapping containers", "health check"] {
                sleep(500);
                child.in_scope(|| info!("{step}"));
            }
        }
    });

    compile.join().unwrap();
    deploy.join().unwrap();

    renderer.stop();
    renderer.render().unwrap();
}

fn sleep(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}
