//! Action DSL parser
//!
//! Two grammars are accepted for action values:
//!
//! - **Legacy**: flat `type:data` strings, where the data may be a bracketed
//!   comma list: `message:[ "line one", "line two" ]`
//! - **Block**: `type { - "v1" - "v2" }`, one value per `-`. A `- |` marker
//!   starts a literal multi-line value that runs until the next `-` at the
//!   same indentation.
//!
//! Everything here is pure: parsing never resolves placeholders or runs
//! handlers, so configurations can be validated without side effects.
//!
//! # Example
//!
//! ```
//! use gs_dsl::{is_block_format, parse_block_values};
//!
//! let text = r#"sound { - "ui.click:0.5:1.2" - "block.note:1.0:0.8" }"#;
//! assert!(is_block_format(text, "sound"));
//! assert_eq!(
//!     parse_block_values(text).unwrap(),
//!     vec!["ui.click:0.5:1.2", "block.note:1.0:0.8"]
//! );
//! ```

mod block;
mod condition;
mod error;
mod legacy;
mod scan;
mod weighted;

pub use block::{block_type, is_block_format, is_nested_random_block, parse_block_values};
pub use condition::{
    parse_conditional, Comparison, ConditionalSpec, Connective, Expression, Term,
};
pub use error::{ParseError, ParseResult};
pub use legacy::{parse_action, parse_legacy_list, parse_values, split_args};
pub use weighted::{parse_weighted_entry, WeightedAction};
