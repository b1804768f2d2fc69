// Test case for NO_PRINTLN lint

fn bad_println(attempt: u32) {
    println!("Retrying... ({}/3)", attempt);
}

fn bad_eprintln() {
    eprintln!("Function failed after 3 attempts");
}

fn bad_dbg() {
    let attempts = 3;
    dbg!(attempts);
}

// Good: using tracing
fn good_tracing(attempt: u32) {
    tracing::warn!(target: "policy_chain::retry", attempt, "attempt failed");
}

fn main() {
    bad_println(1);
    bad_eprintln();
    bad_dbg();
    good_tracing(2);
}
