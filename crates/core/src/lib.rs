//! Configurator
//!
//! Rule evaluation and pricing engine for configurable products such as hot
//! tubs and saunas. Given a catalog snapshot, a base product and the
//! customer's partial selections, [`evaluate`](evaluation::evaluate) resolves
//! defaults, applies compatibility rules, validates group cardinality and
//! prices the result with VAT.
//!
//! ```
//! use configurator::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::from_yaml_str(
//!     "
//! currency: EUR
//! products:
//!   - id: tub
//!     name: Tub
//!     type: hottub
//!     price: 3000.00 EUR
//!     vat: 21%
//! ",
//! )?;
//!
//! let configurator = Configurator::new(&catalog);
//! let result = configurator.evaluate_request(&EvaluationRequest::new("tub"))?;
//!
//! assert!(result.can_proceed());
//! assert_eq!(result.pricing.total_incl.to_string(), "3630.00");
//! # Ok(())
//! # }
//! ```

pub mod applicability;
pub mod attributes;
pub mod catalog;
pub mod evaluation;
pub mod fixtures;
pub mod keys;
pub mod options;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod quote;
pub mod request;
pub mod resolver;
pub mod rules;
pub mod selections;
pub mod tags;
pub mod templates;
