//! Enforcement pack: Custom lints for policy-chain invariants.
//!
//! ## Implemented Lints
//!
//! - `NO_PRINTLN`: Forbids println!, eprintln!, and dbg! macros; library code
//!   reports through `tracing` only.
//! - `NO_THREAD_SLEEP`: Forbids direct `thread::sleep` calls and imports of
//!   `std::thread::sleep`; retry delays go through a `Sleeper` so they stay
//!   injectable and cancellable.

#![feature(rustc_private)]
#![warn(unused_extern_crates)]

extern crate rustc_ast;
extern crate rustc_lint;
extern crate rustc_session;
extern crate rustc_span;

use rustc_ast::{Expr, ExprKind, Item, ItemKind, MacCall, Path, UseTree, UseTreeKind};
use rustc_lint::{EarlyContext, EarlyLintPass, LintContext};
use rustc_session::{declare_lint_pass, declare_tool_lint};

declare_tool_lint! {
    /// **What it does:** Forbids use of `println!`, `eprintln!`, and `dbg!` macros in library code.
    ///
    /// **Why is this bad?** Retry attempts and gate rejections are reported
    /// through `tracing` events with structured fields. Direct writes to
    /// stdout/stderr cannot be filtered or captured by a subscriber.
    ///
    /// **Example:**
    /// ```rust,ignore
    /// // Bad
    /// println!("Retrying... ({}/{})", attempt, max_attempts);
    ///
    /// // Good
    /// tracing::warn!(target: "policy_chain::retry", attempt, max_attempts, "attempt failed");
    /// ```
    pub enforcement_pack::NO_PRINTLN,
    Deny,
    "use of println!, eprintln!, or dbg! macros; use tracing instead"
}

declare_tool_lint! {
    /// **What it does:** Forbids calls to `std::thread::sleep` in library code.
    ///
    /// Qualified calls (`thread::sleep(..)`) are flagged at the call site.
    /// A bare `sleep(..)` can only be resolved after name resolution, so the
    /// `use std::thread::sleep` import that enables it is flagged instead.
    ///
    /// **Why is this bad?** A hard-coded sleep cannot be cancelled and makes
    /// tests wait in real time. Delays must go through a `Sleeper`.
    ///
    /// **Example:**
    /// ```rust,ignore
    /// // Bad
    /// std::thread::sleep(policy.delay());
    ///
    /// // Good
    /// self.sleeper.sleep(policy.delay())?;
    /// ```
    pub enforcement_pack::NO_THREAD_SLEEP,
    Deny,
    "call to thread::sleep; use a Sleeper instead"
}

declare_lint_pass!(NoPrintln => [NO_PRINTLN]);
declare_lint_pass!(NoThreadSleep => [NO_THREAD_SLEEP]);

impl EarlyLintPass for NoPrintln {
    fn check_expr(&mut self, cx: &EarlyContext<'_>, expr: &Expr) {
        if let ExprKind::MacCall(mac) = &expr.kind {
            check_macro(cx, mac, expr.span);
        }
    }
}

impl EarlyLintPass for NoThreadSleep {
    fn check_expr(&mut self, cx: &EarlyContext<'_>, expr: &Expr) {
        if let ExprKind::Call(func, _) = &expr.kind {
            if let ExprKind::Path(_, path) = &func.kind {
                if ends_in_thread_sleep(&segment_names(path)) {
                    lint_thread_sleep(cx, expr.span);
                }
            }
        }
    }

    fn check_item(&mut self, cx: &EarlyContext<'_>, item: &Item) {
        if let ItemKind::Use(tree) = &item.kind {
            check_use_tree(cx, tree, &mut Vec::new());
        }
    }
}

fn lint_thread_sleep(cx: &EarlyContext<'_>, span: rustc_span::Span) {
    cx.span_lint(NO_THREAD_SLEEP, span, |diag| {
        diag.help("inject a `Sleeper` and call `sleeper.sleep(delay)`");
        diag.note("`thread::sleep` cannot be cancelled or mocked in tests");
    });
}

/// Flags `use std::thread::sleep`, including nested and renamed imports.
fn check_use_tree(cx: &EarlyContext<'_>, tree: &UseTree, prefix: &mut Vec<String>) {
    let depth = prefix.len();
    prefix.extend(segment_names(&tree.prefix));

    match &tree.kind {
        UseTreeKind::Simple(_) => {
            if ends_in_thread_sleep(prefix) {
                lint_thread_sleep(cx, tree.span);
            }
        }
        UseTreeKind::Nested { items, .. } => {
            for (nested, _) in items.iter() {
                check_use_tree(cx, nested, prefix);
            }
        }
        UseTreeKind::Glob => {}
    }

    prefix.truncate(depth);
}

fn segment_names(path: &Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|segment| segment.ident.name.as_str().to_string())
        .collect()
}

/// Matches `thread::sleep` and `std::thread::sleep`.
fn ends_in_thread_sleep(names: &[String]) -> bool {
    matches!(names, [.., thread, sleep] if thread == "thread" && sleep == "sleep")
}

fn check_macro(cx: &EarlyContext<'_>, mac: &MacCall, span: rustc_span::Span) {
    let path = &mac.path;

    // Only bare macro names; qualified paths are someone else's macro
    if path.segments.len() != 1 {
        return;
    }

    let macro_name = path.segments[0].ident.name.as_str();

    match macro_name {
        "println" => {
            cx.span_lint(NO_PRINTLN, span, |diag| {
                diag.help("use `tracing::info!` for structured logging");
                diag.note("`println!` bypasses the subscriber");
            });
        }
        "eprintln" => {
            cx.span_lint(NO_PRINTLN, span, |diag| {
                diag.help("use `tracing::error!` or `tracing::warn!` for structured logging");
                diag.note("`eprintln!` bypasses the subscriber");
            });
        }
        "dbg" => {
            cx.span_lint(NO_PRINTLN, span, |diag| {
                diag.help("use `tracing::debug!` for structured logging");
                diag.note("`dbg!` bypasses the subscriber");
            });
        }
        _ => {}
    }
}

#[unsafe(no_mangle)]
#[allow(unsafe_code)]
pub extern "C" fn register_lints(_sess: &rustc_session::Session, lint_store: &mut rustc_lint::LintStore) {
    lint_store.register_lints(&[&NO_PRINTLN, &NO_THREAD_SLEEP]);
    lint_store.register_early_pass(|| Box::new(NoPrintln));
    lint_store.register_early_pass(|| Box::new(NoThreadSleep));
}

#[unsafe(no_mangle)]
pub fn dylint_version() -> *mut std::os::raw::c_char {
    std::ffi::CString::new(dylint_linting::DYLINT_VERSION)
        .expect("version string contains null byte")
        .into_raw()
}
