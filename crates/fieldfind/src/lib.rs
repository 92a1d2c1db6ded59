//! fieldfind - declarative member lookup over runtime class metadata
//!
//! Callers describe *which* field they want (exact or conditional name,
//! declared type, modifier constraints, positional index) and the engine walks
//! the target class and optionally its ancestors to find it. A found member
//! is exposed through a typed, instance-bound accessor.
//!
//! ## Layers
//!
//! - [`condition`]: pure name and modifier predicates
//! - [`spec`]: the [`FinderSpec`] criteria record and its builder
//! - [`backend`]: the [`ReflectiveBackend`] contract the engine consumes
//! - [`engine`]: level-by-level resolution of a spec
//! - [`remedy`]: ordered fallback specs tried after a failed lookup
//! - [`accessor`]: typed reads and writes on a resolved member
//! - [`finder`]: the [`Finder`] facade and its [`FindResult`]
//! - [`registry`]: an in-memory backend with a TOML class model
//!
//! ## Usage
//!
//! ```ignore
//! let finder = Finder::new(&registry);
//! finder
//!     .field(class, |spec| spec.name("count").super_class(false))?
//!     .remedys(|plan| {
//!         plan.field(|spec| spec.field_type("int").first())?;
//!         Ok(())
//!     })?
//!     .wait(Some(instance), |field| {
//!         let _ = field.write(Value::Int(3));
//!     });
//! ```

#![warn(missing_docs)]

pub mod accessor;
pub mod backend;
pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod finder;
pub mod registry;
pub mod remedy;
pub mod report;
pub mod spec;
pub mod value;

pub use accessor::{AccessorBinder, AccessorHandle};
pub use backend::{
    ClassRef, InstanceRef, MemberDescriptor, MemberHandle, ReflectiveBackend, ResolvedSet, TypeId,
};
pub use condition::{CharClass, ModifierRule, Modifiers, NameCondition};
pub use config::{ConfigError, FinderConfig};
pub use engine::ResolutionEngine;
pub use error::{BackendError, FinderError, MissReason};
pub use finder::{FindResult, Finder};
pub use registry::{ClassModel, ClassRegistry, ModelError, PrimitiveKind, RegistryError};
pub use remedy::{Alternative, RemedyOutcome, RemedyPlan};
pub use report::{RecordingReporter, Report, ReportLevel, ResultReporter, TracingReporter};
pub use spec::{FinderSpec, FinderSpecBuilder, IndexSelector, TypeDescriptor};
pub use value::{FromValue, Value};
