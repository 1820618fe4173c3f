use smol_str::SmolStr;
use std::collections::HashMap;
use std::path::Path;
use wireup_api::models::{
    AnnotationValue, Declaration, MarkerKind, RegistryArtifact, SourceUnit,
};
use wireup_api::{ApiError, ApiResult, ArtifactSink, SymbolSource};
use wireup_core::RegistryProcessor;
use wireup_core::config::ProcessorOptions;

#[derive(Default)]
struct FakeSource {
    providers: Vec<Declaration>,
    modules: Vec<Declaration>,
    fail: bool,
}

impl SymbolSource for FakeSource {
    fn provider_declarations(&self) -> ApiResult<Vec<Declaration>> {
        if self.fail {
            return Err(ApiError::Source("resolver unavailable".to_string()));
        }
        Ok(self.providers.clone())
    }

    fn module_declarations(&self) -> ApiResult<Vec<Declaration>> {
        if self.fail {
            return Err(ApiError::Source("resolver unavailable".to_string()));
        }
        Ok(self.modules.clone())
    }
}

#[derive(Default)]
struct MemorySink {
    artifacts: Vec<RegistryArtifact>,
    fail: bool,
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, artifact: &RegistryArtifact) -> ApiResult<()> {
        if self.fail {
            return Err(ApiError::Sink("disk full".to_string()));
        }
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

fn declaration(
    qualified_name: &str,
    marker: MarkerKind,
    args: Vec<(&str, AnnotationValue)>,
) -> Declaration {
    let (package_name, simple_name) = match qualified_name.rfind('.') {
        Some(idx) => (&qualified_name[..idx], &qualified_name[idx + 1..]),
        None => ("", qualified_name),
    };
    Declaration {
        qualified_name: qualified_name.to_string(),
        package_name: package_name.to_string(),
        simple_name: SmolStr::new(simple_name),
        marker,
        args: args
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        is_valid: true,
        unit: None,
    }
}

fn provider(qualified_name: &str, interfaces: &[&str], module: &str) -> Declaration {
    declaration(
        qualified_name,
        MarkerKind::Provider,
        vec![
            (
                "interfaces",
                AnnotationValue::IdentList(interfaces.iter().map(|s| s.to_string()).collect()),
            ),
            ("module", AnnotationValue::Str(module.to_string())),
        ],
    )
}

fn service_module(qualified_name: &str, name: &str, dependencies: &[&str]) -> Declaration {
    declaration(
        qualified_name,
        MarkerKind::Module,
        vec![
            ("name", AnnotationValue::Str(name.to_string())),
            (
                "dependencies",
                AnnotationValue::IdentList(dependencies.iter().map(|s| s.to_string()).collect()),
            ),
        ],
    )
}

fn processor() -> RegistryProcessor {
    RegistryProcessor::new(ProcessorOptions {
        registry_package: "com.test".to_string(),
        registry_class_name: "TestRegistry".to_string(),
        ..ProcessorOptions::default()
    })
}

#[test]
fn full_pass_generates_registry() {
    let source = FakeSource {
        providers: vec![
            provider("com.test.UserServiceImpl", &["com.test.UserService"], "core"),
            provider("com.test.AuthServiceImpl", &["com.test.AuthService"], "core"),
        ],
        modules: vec![service_module("com.test.CoreModule", "core", &[])],
        ..FakeSource::default()
    };
    let mut sink = MemorySink::default();

    let outcome = processor().process(&source, &mut sink).unwrap();

    assert!(outcome.deferred.is_empty());
    assert!(outcome.stats.artifact_generated);
    assert_eq!(sink.artifacts.len(), 1);

    let registry = &sink.artifacts[0];
    assert_eq!(registry.all_providers().len(), 2);
    assert_eq!(registry.all_modules().len(), 1);
    assert!(registry.provider_record);
    assert!(registry.module_record);
    assert_eq!(
        registry.providers_by_module("core").len(),
        2,
        "both providers belong to module 'core'"
    );
}

#[test]
fn round_trip_scenario() {
    let mut decl = provider("pkg.Impl", &["pkg.IFoo"], "m1");
    decl.args
        .push(("priority".to_string(), AnnotationValue::Int(5)));
    let source = FakeSource {
        providers: vec![decl],
        ..FakeSource::default()
    };
    let mut sink = MemorySink::default();

    processor().process(&source, &mut sink).unwrap();

    let registry = &sink.artifacts[0];
    let descriptor = registry.provider("pkg.Impl").expect("provider registered");
    assert_eq!(descriptor.interfaces, vec!["pkg.IFoo"]);
    assert_eq!(descriptor.priority, 5);
    assert_eq!(descriptor.module, "m1");
    assert_eq!(registry.providers_by_module("m1"), vec![descriptor]);
    assert!(registry.providers_by_module("other").is_empty());
    assert_eq!(registry.providers_by_interface("pkg.IFoo"), vec![descriptor]);
}

#[test]
fn unresolvable_declarations_defer_generation() {
    let mut pending = provider("com.test.Pending", &["com.test.IPending"], "");
    pending.is_valid = false;
    let source = FakeSource {
        providers: vec![
            provider("com.test.Ready", &["com.test.IReady"], ""),
            pending,
        ],
        ..FakeSource::default()
    };
    let mut sink = MemorySink::default();

    let outcome = processor().process(&source, &mut sink).unwrap();

    assert_eq!(outcome.deferred.len(), 1);
    assert_eq!(outcome.deferred[0].qualified_name, "com.test.Pending");
    assert!(!outcome.stats.artifact_generated);
    assert!(sink.artifacts.is_empty(), "no artifact while deferring");
}

#[test]
fn failing_symbol_source_is_not_a_crash() {
    let source = FakeSource {
        fail: true,
        ..FakeSource::default()
    };
    let mut sink = MemorySink::default();

    let outcome = processor().process(&source, &mut sink).unwrap();

    assert!(outcome.deferred.is_empty());
    assert!(!outcome.stats.artifact_generated);
    assert!(outcome.stats.errors > 0);
}

#[test]
fn empty_input_skips_generation_without_error() {
    let source = FakeSource::default();
    let mut sink = MemorySink::default();

    let outcome = processor().process(&source, &mut sink).unwrap();

    assert!(outcome.deferred.is_empty());
    assert!(!outcome.stats.artifact_generated);
    assert!(sink.artifacts.is_empty());
}

#[test]
fn dependency_cycle_aborts_the_pass() {
    let mut a = provider("com.test.ImplA", &["com.test.A"], "");
    a.args.push((
        "dependencies".to_string(),
        AnnotationValue::IdentList(vec!["com.test.B".to_string()]),
    ));
    let mut b = provider("com.test.ImplB", &["com.test.B"], "");
    b.args.push((
        "dependencies".to_string(),
        AnnotationValue::IdentList(vec!["com.test.A".to_string()]),
    ));
    let source = FakeSource {
        providers: vec![a, b],
        ..FakeSource::default()
    };
    let mut sink = MemorySink::default();

    let err = processor().process(&source, &mut sink).unwrap_err();
    assert!(err.to_string().contains("cycle"), "{err}");
    assert!(sink.artifacts.is_empty(), "no partial artifact on abort");
}

#[test]
fn duplicate_implementation_ids_abort_the_pass() {
    let source = FakeSource {
        providers: vec![
            provider("com.test.Dup", &["com.test.IFoo"], ""),
            provider("com.test.Dup", &["com.test.IBar"], ""),
        ],
        ..FakeSource::default()
    };
    let mut sink = MemorySink::default();

    let err = processor().process(&source, &mut sink).unwrap_err();
    assert!(err.to_string().contains("com.test.Dup"), "{err}");
    assert!(sink.artifacts.is_empty());
}

#[test]
fn sink_failure_is_wrapped_as_generation_error() {
    let source = FakeSource {
        providers: vec![provider("com.test.Impl", &["com.test.IFoo"], "")],
        ..FakeSource::default()
    };
    let mut sink = MemorySink {
        fail: true,
        ..MemorySink::default()
    };

    let err = processor().process(&source, &mut sink).unwrap_err();
    assert!(err.to_string().contains("persist"), "{err}");
}

#[test]
fn namespace_filters_shape_the_registry() {
    let mut options_map = HashMap::new();
    options_map.insert("includePackages".to_string(), "com.keep".to_string());
    options_map.insert("serviceRegistryPackage".to_string(), "com.test".to_string());
    let mut proc = RegistryProcessor::from_options_map(&options_map);

    let source = FakeSource {
        providers: vec![
            provider("com.keep.Impl", &["com.keep.IFoo"], ""),
            provider("com.drop.Impl", &["com.drop.IBar"], ""),
        ],
        ..FakeSource::default()
    };
    let mut sink = MemorySink::default();

    proc.process(&source, &mut sink).unwrap();

    let registry = &sink.artifacts[0];
    assert_eq!(registry.all_providers().len(), 1);
    assert!(registry.provider("com.keep.Impl").is_some());
    assert!(registry.provider("com.drop.Impl").is_none());
}

#[test]
fn touch_only_rebuild_reuses_cached_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let unit_path = dir.path().join("Impl.kt");
    std::fs::write(&unit_path, "class Impl").unwrap();

    let mut proc = processor();
    let mut sink = MemorySink::default();

    let decl_with_unit = |path: &Path, mtime: u64| {
        let mut decl = provider("com.test.Impl", &["com.test.IFoo"], "");
        decl.args.push((
            "dependencies".to_string(),
            AnnotationValue::IdentList(vec!["com.test.IBar".to_string()]),
        ));
        decl.unit = Some(SourceUnit {
            path: path.to_path_buf(),
            last_modified: mtime,
        });
        decl
    };

    let source = FakeSource {
        providers: vec![
            decl_with_unit(&unit_path, 100),
            provider("com.test.BarImpl", &["com.test.IBar"], ""),
        ],
        ..FakeSource::default()
    };
    let outcome = proc.process(&source, &mut sink).unwrap();
    assert!(outcome.stats.artifact_generated);

    // Touch-only rebuild: new mtime, identical content. The second pass
    // must reuse the cached dependency list and still regenerate the same
    // registry.
    let source = FakeSource {
        providers: vec![
            decl_with_unit(&unit_path, 200),
            provider("com.test.BarImpl", &["com.test.IBar"], ""),
        ],
        ..FakeSource::default()
    };
    let outcome = proc.process(&source, &mut sink).unwrap();
    assert!(outcome.stats.artifact_generated);
    assert_eq!(sink.artifacts.len(), 2);
    assert_eq!(
        sink.artifacts[0].provider("com.test.Impl").map(|p| &p.dependencies),
        sink.artifacts[1].provider("com.test.Impl").map(|p| &p.dependencies),
    );
}
