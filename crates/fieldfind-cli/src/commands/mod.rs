//! Subcommand implementations

pub mod classes;
pub mod query;

use anyhow::Context;
use fieldfind::{ClassModel, ClassRegistry, MemberDescriptor, ReflectiveBackend};
use serde::Serialize;
use std::path::Path;

/// Load and build a class model file.
pub fn load_registry(path: &Path) -> anyhow::Result<ClassRegistry> {
    let model = ClassModel::load(path)
        .with_context(|| format!("failed to load class model {}", path.display()))?;
    let registry = model
        .build_registry()
        .with_context(|| format!("invalid class model {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        classes = registry.classes().count(),
        "Loaded class model"
    );
    Ok(registry)
}

/// One member as printed by the commands.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemberRow {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub modifiers: String,
    pub declared_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl MemberRow {
    pub fn new(backend: &dyn ReflectiveBackend, member: &MemberDescriptor, value: Option<String>) -> Self {
        Self {
            name: member.name.clone(),
            type_name: member.type_name.clone(),
            modifiers: member.modifiers.to_string(),
            declared_in: backend.class_name(member.declaring_class),
            value,
        }
    }
}
