//! `fieldfind query` - resolve members of a class.

use anyhow::{anyhow, Context};
use clap::Args;
use fieldfind::{
    ClassRef, Finder, FinderConfig, FinderSpec, ModifierRule, Modifiers, NameCondition,
    TypeDescriptor,
};
use std::path::PathBuf;
use termcolor::ColorChoice;

use super::{load_registry, MemberRow};
use crate::output::StyledOutput;

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Class model file
    pub model: PathBuf,

    /// Target class
    #[arg(long)]
    pub class: String,

    /// Exact field name
    #[arg(long)]
    pub name: Option<String>,

    /// Name prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Name suffix
    #[arg(long)]
    pub suffix: Option<String>,

    /// Name substring
    #[arg(long)]
    pub contains: Option<String>,

    /// Regular expression the whole name must match
    #[arg(long)]
    pub pattern: Option<String>,

    /// Compare prefix, suffix and substring without case
    #[arg(long)]
    pub ignore_case: bool,

    /// Declared type; repeat to accept the first one the model knows
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<String>,

    /// Modifiers that must all be present, e.g. PRIVATE|STATIC
    #[arg(long)]
    pub require: Option<String>,

    /// Modifiers of which at least one must be present
    #[arg(long)]
    pub any: Option<String>,

    /// Modifiers that must be absent
    #[arg(long)]
    pub exclude: Option<String>,

    /// Pick the n-th declared field, ignoring every other condition
    #[arg(long)]
    pub order: Option<usize>,

    /// Pick the n-th field among the matches
    #[arg(long = "match", conflicts_with = "order")]
    pub matching: Option<usize>,

    /// Count --order / --match from the end
    #[arg(long)]
    pub from_end: bool,

    /// Scan superclasses after the target
    #[arg(long)]
    pub ancestors: bool,

    /// Start the scan at the direct superclass
    #[arg(long)]
    pub only_super: bool,

    /// Read instance fields from a fresh instance of the class
    #[arg(long)]
    pub instance: bool,

    /// Finder configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl QueryArgs {
    /// Translate the flags into a spec for `class`.
    pub fn to_spec(&self, class: ClassRef) -> anyhow::Result<FinderSpec> {
        let mut spec = FinderSpec::builder(class);

        if let Some(name) = &self.name {
            spec = spec.name(name.as_str());
        }
        if let Some(condition) = self.name_condition()? {
            spec = spec.name_condition(condition);
        }

        match self.types.as_slice() {
            [] => {}
            [single] => spec = spec.field_type(single.as_str()),
            many => spec = spec.field_type(TypeDescriptor::any_of(many.iter().cloned())),
        }

        let rule = ModifierRule::new()
            .all_of(parse_flags("--require", self.require.as_deref())?)
            .any_of(parse_flags("--any", self.any.as_deref())?)
            .none_of(parse_flags("--exclude", self.exclude.as_deref())?);
        if !rule.is_empty() {
            spec = spec.modifiers(rule);
        }

        spec = match (self.order, self.matching, self.from_end) {
            (Some(n), _, false) => spec.order(n),
            (Some(n), _, true) => spec.order_from_end(n),
            (None, Some(n), false) => spec.matching(n),
            (None, Some(n), true) => spec.matching_from_end(n),
            (None, None, _) => spec,
        };

        if self.only_super {
            spec = spec.super_class(true);
        } else if self.ancestors {
            spec = spec.ancestors(true);
        }

        Ok(spec.build()?)
    }

    fn name_condition(&self) -> anyhow::Result<Option<NameCondition>> {
        let mut parts = Vec::new();
        if let Some(prefix) = &self.prefix {
            parts.push(NameCondition::starts_with(prefix.as_str()));
        }
        if let Some(suffix) = &self.suffix {
            parts.push(NameCondition::ends_with(suffix.as_str()));
        }
        if let Some(needle) = &self.contains {
            parts.push(NameCondition::contains(needle.as_str()));
        }
        if self.ignore_case {
            parts = parts.into_iter().map(NameCondition::ignore_case).collect();
        }
        if let Some(pattern) = &self.pattern {
            parts.push(NameCondition::pattern(pattern)?);
        }

        Ok(parts.into_iter().reduce(NameCondition::and))
    }
}

fn parse_flags(flag: &str, value: Option<&str>) -> anyhow::Result<Modifiers> {
    match value {
        None => Ok(Modifiers::NONE),
        Some(text) => {
            Modifiers::parse(text).ok_or_else(|| anyhow!("{}: unknown modifier in {:?}", flag, text))
        }
    }
}

/// Run the query. Returns whether any member was found.
pub fn execute(args: &QueryArgs, choice: ColorChoice) -> anyhow::Result<bool> {
    let config = match &args.config {
        Some(path) => FinderConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FinderConfig::default(),
    };
    let registry = load_registry(&args.model)?;
    let class = registry
        .class_named(&args.class)
        .ok_or_else(|| anyhow!("unknown class {}", args.class))?;
    let instance = if args.instance {
        Some(registry.instantiate(class)?)
    } else {
        None
    };

    let spec = args.to_spec(class)?;
    tracing::debug!(class = %args.class, spec = ?spec, "Translated query");
    let finder = Finder::new(&registry).with_config(config);
    let result = finder.find(spec).ignored_error();

    let mut out = StyledOutput::new(choice);
    if let Some(cause) = result.cause() {
        if args.json {
            println!("{}", serde_json::json!({ "found": false, "reason": cause.to_string() }));
        } else {
            out.failure("not found", &cause.to_string());
        }
        out.flush();
        return Ok(false);
    }

    let rows: Vec<MemberRow> = result
        .all(instance)
        .iter()
        .map(|handle| {
            let value = if handle.member().is_static() || instance.is_some() {
                handle.any().map(|v| v.to_string())
            } else {
                None
            };
            MemberRow::new(&registry, handle.member(), value)
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            out.member(&row.name);
            out.plain("  ");
            if !row.modifiers.is_empty() {
                out.plain(&format!("{} ", row.modifiers));
            }
            out.plain(&row.type_name);
            out.detail(&format!("  in {}", row.declared_in));
            if let Some(value) = &row.value {
                out.plain(&format!(" = {}", value));
            }
            out.newline();
        }
    }
    out.flush();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldfind::{ClassModel, IndexSelector};

    const MODEL: &str = r#"
[[class]]
name = "demo.Base"

[[class.field]]
name = "mCount"
type = "int"
modifiers = "PRIVATE|STATIC"
value = 4

[[class.field]]
name = "mName"
type = "String"
modifiers = "PRIVATE"

[[class]]
name = "demo.Child"
extends = "demo.Base"
"#;

    fn args(class: &str) -> QueryArgs {
        QueryArgs {
            class: class.to_string(),
            ..QueryArgs::default()
        }
    }

    #[test]
    fn test_to_spec_maps_flags() {
        let registry = ClassModel::from_toml_str(MODEL)
            .unwrap()
            .build_registry()
            .unwrap();
        let child = registry.class_named("demo.Child").unwrap();

        let query = QueryArgs {
            prefix: Some("M".to_string()),
            ignore_case: true,
            require: Some("STATIC".to_string()),
            matching: Some(0),
            from_end: true,
            ancestors: true,
            ..args("demo.Child")
        };
        let spec = query.to_spec(child).unwrap();
        assert!(spec.ancestor_search());
        assert_eq!(
            spec.index_selector(),
            Some(IndexSelector::Match {
                index: 0,
                from_end: true
            })
        );

        let set = fieldfind::ResolutionEngine::new(&registry)
            .resolve(&spec)
            .unwrap();
        assert_eq!(set.first().unwrap().name, "mCount");
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(args("demo.Base").to_spec(ClassRef(1)).is_err());
    }

    #[test]
    fn test_bad_modifier_rejected() {
        let query = QueryArgs {
            require: Some("PRIVATE|LOUD".to_string()),
            ..args("demo.Base")
        };
        assert!(query.to_spec(ClassRef(1)).is_err());
    }

    #[test]
    fn test_execute_against_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.toml");
        std::fs::write(&path, MODEL).unwrap();

        let found = QueryArgs {
            model: path.clone(),
            name: Some("mCount".to_string()),
            ancestors: true,
            ..args("demo.Child")
        };
        assert!(execute(&found, ColorChoice::Never).unwrap());

        let missing = QueryArgs {
            model: path.clone(),
            name: Some("mCount".to_string()),
            ..args("demo.Child")
        };
        assert!(!execute(&missing, ColorChoice::Never).unwrap());

        let unknown = QueryArgs {
            model: path,
            name: Some("x".to_string()),
            ..args("demo.Nope")
        };
        assert!(execute(&unknown, ColorChoice::Never).is_err());
    }
}
