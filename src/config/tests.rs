// Author: Dustin Pilgrim
// License: MIT

#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::Value;

fn noop_plugin(name: &str, directive: &str) -> Plugin {
    Plugin::new(name).directive(directive, |_, _| Ok(()))
}

fn names(config: &CompilerConfig) -> Vec<String> {
    config.handlers.keys().cloned().collect()
}

#[test]
fn test_defaults() {
    let options = CompileOptions::default();
    assert!(options.interpolate);
    assert!(!options.asynchronous);
    assert!(options.handlers.is_empty());
    assert!(matches!(options.plugins, Plugins::Auto));
}

#[test]
fn test_mappers_join_the_directive_namespace() {
    let config = prepare(
        CompileOptions::new()
            .plugins(Plugins::Disabled)
            .directive("dir", |_, _| Ok(()))
            .mapper("map", |v, _| Ok(v)),
    )
    .expect("Failed to prepare config");

    assert_eq!(names(&config), vec!["dir", "map"]);
    assert!(config.handler("map").is_some());
    assert!(config.handler("missing").is_none());
}

#[test]
fn test_mapper_directive_name_conflict() {
    let err = prepare(
        CompileOptions::new()
            .plugins(Plugins::Disabled)
            .directive("double", |_, _| Ok(()))
            .mapper("double", |v, _| Ok(v)),
    )
    .unwrap_err();

    assert_eq!(err, KyoError::NameConflict { name: "double".into() });
    assert_eq!(
        err.to_string(),
        "Directives and mappers cannot share the same key (double)"
    );
}

#[test]
fn test_plugins_merge_after_host_handlers() {
    let config = prepare(
        CompileOptions::new()
            .directive("host", |_, _| Ok(()))
            .plugin(noop_plugin("one", "first"))
            .plugin(Plugin::new("two").mapper("second", |v, _| Ok(v))),
    )
    .expect("Failed to prepare config");

    assert_eq!(names(&config), vec!["host", "first", "second"]);
}

#[test]
fn test_duplicate_names_across_plugins() {
    let err = prepare(
        CompileOptions::new()
            .plugin(noop_plugin("one", "same"))
            .plugin(noop_plugin("two", "same")),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "Name conflict detected: same already defined");
}

#[test]
fn test_plugin_cannot_override_host_handler() {
    let err = prepare(
        CompileOptions::new()
            .directive("env", |_, _| Ok(()))
            .plugin(noop_plugin("env-plugin", "env")),
    )
    .unwrap_err();

    assert_eq!(err, KyoError::DuplicateHandler { name: "env".into() });
}

#[test]
fn test_plugin_mapper_conflicts_with_host_directive() {
    let err = prepare(
        CompileOptions::new()
            .directive("upper", |_, _| Ok(()))
            .plugin(Plugin::new("strings").mapper("upper", |v, _| Ok(v))),
    )
    .unwrap_err();

    assert_eq!(err, KyoError::NameConflict { name: "upper".into() });
}

fn registry_test_plugin() -> Plugin {
    Plugin::new("registry-test").mapper("registry_test_shout", |v, _| {
        Ok(Value::from(v.to_string().to_uppercase()))
    })
}

#[test]
fn test_registered_plugins_are_loaded_automatically() {
    register_plugin(registry_test_plugin);

    assert!(registered_plugins().iter().any(|p| p.name == "registry-test"));

    let auto = prepare(CompileOptions::new()).expect("Failed to prepare config");
    assert!(auto.handler("registry_test_shout").is_some());

    let disabled = prepare(CompileOptions::new().plugins(Plugins::Disabled))
        .expect("Failed to prepare config");
    assert!(disabled.handler("registry_test_shout").is_none());
}
