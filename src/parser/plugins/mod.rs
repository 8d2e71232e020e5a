//! Backbone plugins.
//!
//! | Plugin                   | Order | Runs after       |
//! |--------------------------|-------|------------------|
//! | `type-variable`          | -10   |                  |
//! | `endpoint`               | 0     |                  |
//! | `endpoint-exposed`       | 10    | `type-variable`  |
//! | `transfer-types`         | 15    | `endpoint-exposed` |
//! | `method`                 | 20    |                  |
//! | `method-parameter`       | 30    |                  |
//! | `type-signature`         | 50    |                  |
//! | `entity`                 | 60    |                  |
//! | `property`               | 70    |                  |
//! | `nonnull`                | 100   | `type-signature` |
//! | `validation-constraints` | 110   | `type-signature` |

pub mod constraints;
pub mod endpoint;
pub mod entity;
pub mod exposed;
pub mod method;
pub mod nonnull;
pub mod parameter;
pub mod property;
pub mod signature;
pub mod transfer_types;
pub mod type_variable;

pub use constraints::ValidationConstraintsPlugin;
pub use endpoint::EndpointPlugin;
pub use entity::EntityPlugin;
pub use exposed::EndpointExposedPlugin;
pub use method::MethodPlugin;
pub use nonnull::{NonnullConfiguration, NonnullPlugin};
pub use parameter::MethodParameterPlugin;
pub use property::PropertyPlugin;
pub use signature::TypeSignaturePlugin;
pub use transfer_types::{TransferTypesConfiguration, TransferTypesPlugin};
pub use type_variable::TypeVariablePlugin;
