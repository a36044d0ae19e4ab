//! Pipeline stages for rewriting one markdown document.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! text ──▶ extract ──▶ resolve ──▶ upload ──▶ substitute
//!          (refs)      (paths)    (URLs)     (output file)
//! ```
//!
//! 1. [`extract`]    — collect the distinct relative image targets from the text
//! 2. [`resolve`]    — map each target to an absolute path; abort on missing files
//! 3. `uploader::*`  — push each image to the remote store (the only network stage)
//! 4. [`substitute`] — replace every occurrence of every target and write the output

pub mod extract;
pub mod resolve;
pub mod substitute;
