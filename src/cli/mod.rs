//! # CLI Module
//!
//! The `cprouter` binary: small inspection tools for operators wiring the
//! router into a service.
//!
//! ## Commands
//!
//! ### `tokenize`
//!
//! Show the segments of a path, whether it would be routed or left to static
//! serving, and the continuation key if it starts with the resume marker:
//!
//! ```bash
//! cprouter tokenize /x/abc0123456789/next
//! ```
//!
//! ### `keys`
//!
//! Print random keys of a given width and the size of that key space:
//!
//! ```bash
//! cprouter keys --width 3 --count 10
//! ```
//!
//! ### `config`
//!
//! Print the effective configuration (YAML file, then `CPR_*` environment):
//!
//! ```bash
//! CPR_CASE_INSENSITIVE_SEGMENTS=no cprouter config --file router.yaml
//! ```

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
