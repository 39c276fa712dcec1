//! Declarative request validation for the scoring API
//!
//! Untyped request bodies are checked against explicit schemas before any
//! business logic sees them.
//!
//! ## Architecture
//!
//! 1. **Values** (`value`): runtime type, truthiness and emptiness of JSON
//!    values, and the normalized value a field stores.
//! 2. **Fields** (`field`): immutable [`FieldSpec`] constraints and the
//!    per-attempt [`Field`] that assigns and validates a value.
//! 3. **Schemas** (`schema`): ordered field lists bound to input mappings,
//!    first error wins.
//! 4. **Requests** (`request`): the concrete request types with their
//!    cross-field rules.
//!
//! ## Example
//!
//! ```rust
//! use scoring_schema::OnlineScoreRequest;
//! use serde_json::json;
//!
//! let arguments = json!({"phone": "79175002040", "email": "a@b.c"});
//! let request = OnlineScoreRequest::from_arguments(arguments.as_object().unwrap()).unwrap();
//! assert_eq!(request.provided_fields(), ["email", "phone"]);
//! ```

pub mod error;
pub mod field;
pub mod request;
pub mod schema;
pub mod value;

pub use error::{Result, SchemaError, ValidationError};
pub use field::{Field, FieldKind, FieldSpec, Gender};
pub use request::{ClientsInterestsRequest, MethodRequest, OnlineScoreRequest, ADMIN_LOGIN};
pub use schema::{BoundFields, Schema};
pub use value::{FieldValue, ValueType};
