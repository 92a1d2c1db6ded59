//! `fieldfind classes` - list the classes of a model.

use fieldfind::{ClassRegistry, ReflectiveBackend};
use serde::Serialize;
use std::path::Path;
use termcolor::ColorChoice;

use super::{load_registry, MemberRow};
use crate::output::StyledOutput;

#[derive(Debug, Serialize)]
struct ClassRow {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extends: Option<String>,
    fields: Vec<MemberRow>,
}

fn rows(registry: &ClassRegistry) -> Vec<ClassRow> {
    registry
        .classes()
        .filter(|&class| class != registry.root())
        .map(|class| ClassRow {
            name: registry.class_name(class),
            extends: registry
                .parent(class)
                .filter(|&parent| parent != registry.root())
                .map(|parent| registry.class_name(parent)),
            fields: registry
                .declared_fields(class)
                .iter()
                .map(|member| {
                    let value = member
                        .is_static()
                        .then(|| registry.read_field(member, None).ok())
                        .flatten()
                        .map(|v| v.to_string());
                    MemberRow::new(registry, member, value)
                })
                .collect(),
        })
        .collect()
}

pub fn execute(model: &Path, json: bool, choice: ColorChoice) -> anyhow::Result<()> {
    let registry = load_registry(model)?;
    let classes = rows(&registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&classes)?);
        return Ok(());
    }

    let mut out = StyledOutput::new(choice);
    for class in &classes {
        out.heading(&class.name);
        if let Some(parent) = &class.extends {
            out.detail(&format!(" extends {}", parent));
        }
        out.newline();
        for field in &class.fields {
            out.plain("  ");
            if !field.modifiers.is_empty() {
                out.plain(&format!("{} ", field.modifiers));
            }
            out.plain(&format!("{} ", field.type_name));
            out.member(&field.name);
            if let Some(value) = &field.value {
                out.plain(&format!(" = {}", value));
            }
            out.newline();
        }
    }
    out.flush();
    Ok(())
}
