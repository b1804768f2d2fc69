// Test case for NO_THREAD_SLEEP lint

use std::thread;
use std::time::Duration;

fn bad_qualified_sleep() {
    std::thread::sleep(Duration::from_secs(1));
}

fn bad_imported_sleep() {
    thread::sleep(Duration::from_millis(200));
}

// Bad: the import is flagged, since the bare call cannot be resolved early
mod bare_import {
    use std::thread::sleep;
    use std::time::Duration;

    pub fn bad_bare_sleep() {
        sleep(Duration::from_millis(50));
    }
}

mod nested_import {
    use std::thread::{sleep as nap, spawn};
    use std::time::Duration;

    pub fn bad_renamed_sleep() {
        let _ = spawn(|| ());
        nap(Duration::from_millis(50));
    }
}

// Good: a method named `sleep` on an injected sleeper
struct Sleeper;

impl Sleeper {
    fn sleep(&self, _delay: Duration) {}
}

fn good_injected_sleep(sleeper: &Sleeper) {
    sleeper.sleep(Duration::from_secs(1));
}

fn main() {
    bad_qualified_sleep();
    bad_imported_sleep();
    bare_import::bad_bare_sleep();
    nested_import::bad_renamed_sleep();
    good_injected_sleep(&Sleeper);
}
