//! lazyconf-core: key/value configuration with lazy variable interpolation
//!
//! Raw values honor quoting, backslash escaping, and in-line comments; in the
//! interpolating variant, `$name` and `${...}` references are resolved
//! against other keys in the same store at read time, with cycle protection.
//!
//! # Example
//!
//! ```rust
//! use lazyconf_core::Store;
//!
//! let mut store = Store::interpolating();
//! store.set("greeting", "hello $name # who?");
//! store.set("name", "'world'");
//! assert_eq!(store.get("greeting").unwrap(), "hello world");
//! ```

pub mod error;
pub mod escape;
pub mod loader;
pub mod tokenizer;
pub mod value;

mod store;

pub use error::{Error, ErrorKind, Result};
pub use loader::LoadOutcome;
pub use store::{RecursionPolicy, Store, StoreOptions};
pub use tokenizer::Dialect;
pub use value::{Fragment, Scalar, StoredValue};
