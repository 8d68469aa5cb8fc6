use std::env;
use std::sync::Once;

use kafka_demo::log::setup_logger;

static INIT: Once = Once::new();

pub fn init_test_logger() {
    INIT.call_once(|| {
        let rust_log = env::var("RUST_LOG").ok();
        setup_logger(true, rust_log.as_deref());
    });
}
