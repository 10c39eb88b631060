//! Tag scanning and rule dispatch.
//!
//! This module is the operational core of the crate. Parsing an input string
//! is a single synchronous pass:
//!
//! ```text
//! input ── TagParser::scan (scanner.rs)
//!            │  literal text ──────────────────────────────▶ Output (rich + visible)
//!            │  tag body
//!            ▼
//!          decode (tag.rs) ── TagData { id, data, close_state }
//!            │
//!            ▼
//!          ReplaceProcessor / EventProcessor (dispatch.rs)
//!            │  Config::lookup (config.rs)
//!            │    sorted by specificity (specificity.rs)
//!            │    falls back to the parent config
//!            ▼
//!          ReplaceRule / EventRule::evaluate (rules.rs, dispatch.rs)
//!            │
//!            ▼
//!          Output: text runs coalesced, events appended in input order
//! ```
//!
//! ## Responsibilities by module
//!
//! - `tag.rs`: the Tag Data Decoder and [`CloseState`].
//! - `specificity.rs`: pattern scoring and wildcard matching.
//! - `rules.rs`: [`RuleBase`], [`ReplaceRule`], [`EventRule`] and their builders.
//! - `config.rs`: [`Config`], the lazily sorted rule set with a parent chain.
//! - `dispatch.rs`: the processor traits and rule evaluation.
//! - `scanner.rs`: [`TagParser`], the scan loop.
//! - `metrics.rs`: optional per-tag traces for debugging.
//!
//! ## Errors
//!
//! Nothing inside the scan loop returns an error. Malformed tags degrade to
//! literal text or to tags that match nothing. Only registration on a locked
//! config fails (see [`ConfigError`](crate::ConfigError)).
//!
//! ## Debugging
//!
//! Set `RUST_LOG=tagwright=trace` (with a subscriber installed) to see every
//! rule resolution; `debug` shows only unmatched and unterminated tags.

#[path = "engine/config.rs"]
mod config;
#[path = "engine/dispatch.rs"]
mod dispatch;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/rules.rs"]
mod rules;
#[path = "engine/scanner.rs"]
mod scanner;
#[path = "engine/specificity.rs"]
mod specificity;
#[path = "engine/tag.rs"]
mod tag;


pub use config::Config;
pub use dispatch::{EventProcessor, ReplaceProcessor};
pub use metrics::{ParseDetails, TagOutcome, TagTrace};
pub use rules::{
    EventArgument, EventBuilder, EventFn, EventRule, ReplaceBuilder, ReplaceFn, ReplaceRule, Replacement, RuleBase,
    TagReplaceFn, TagRule, TryReplaceFn,
};
pub use scanner::{TagParser, strip_tags};
pub use specificity::{WILDCARD, compute_specificity, score, wildcard_match};
pub use tag::{CloseState, OwnedTag, TagData, decode};
