//! Pipeline stages
//!
//! Two stages mutate the service definition:
//! - Artifact build: compile, stage and zip every Swift function, then point
//!   each function at its archive and switch it to the custom runtime
//! - Layer attachment: append the shared Swift runtime layer to each function
//!
//! Both stages work fail-fast. The artifact build mutates a working copy of
//! the service and only writes it back once every function succeeded, so an
//! error never leaves a half-rewritten service behind.

use serde::Serialize;
use serde_yaml::Value;
use serverless_swift_core::ConfigError;
use serverless_swift_core::constants::{
    ARCHIVE_NAME, BASE_RUNTIME, MAX_LAYERS_PER_FUNCTION, SWIFT_RUNTIME,
};
use serverless_swift_core::domain::{Function, Handler, Service};
use serverless_swift_core::layer::{assert_region_supported, layer_arn};
use tracing::{debug, info};

use crate::dependencies::DependencyFetcher;
use crate::docker::ArtifactBuilder;
use crate::error::{BuildError, Result};
use crate::process::CommandRunner;
use crate::staging;

/// A function whose archive was built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltFunction {
    pub name: String,
    /// Executable taken from the handler
    pub binary: String,
    /// Rewritten handler
    pub handler: String,
    /// Archive path relative to the service root
    pub artifact: String,
    /// Files copied from `package.include`
    pub included_files: usize,
}

/// Result of the layer stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerAttachment {
    pub arn: String,
    /// Functions the layer was appended to
    pub attached: Vec<String>,
    /// Functions that already referenced the layer
    pub unchanged: Vec<String>,
}

/// Builds and packages every listed function
///
/// # Arguments
/// * `service` - Service definition, rewritten in place on success
/// * `functions` - Names of the Swift functions to build, in build order
/// * `builder` - Runs the container phases
///
/// # Errors
/// Fails before any command runs if `functions` is empty or a handler names
/// no executable. Any launch failure, non-zero exit or missing output aborts
/// the remaining functions; `service` is left untouched.
pub fn build_artifacts<R: CommandRunner>(
    service: &mut Service,
    functions: &[String],
    builder: &ArtifactBuilder<R>,
) -> Result<Vec<BuiltFunction>> {
    if functions.is_empty() {
        return Err(ConfigError::NoSwiftFunctions.into());
    }

    let mut staged = service.clone();

    let mut plan = Vec::with_capacity(functions.len());
    for name in functions {
        let function = staged
            .function(name)
            .ok_or_else(|| ConfigError::UnknownFunction(name.clone()))?;
        let handler =
            Handler::parse(&function.handler).ok_or_else(|| ConfigError::InvalidHandler {
                function: name.clone(),
                handler: function.handler.clone(),
            })?;
        plan.push((name, handler));
    }

    let mut built = Vec::with_capacity(plan.len());
    for (name, handler) in plan {
        let function = staged
            .function_mut(name)
            .ok_or_else(|| ConfigError::UnknownFunction(name.clone()))?;
        built.push(build_function(function, handler, builder)?);
    }

    if staged.provider.runtime.as_deref() == Some(SWIFT_RUNTIME) {
        debug!("Switching provider runtime to {}", BASE_RUNTIME);
        staged.provider.runtime = Some(BASE_RUNTIME.to_string());
    }

    *service = staged;
    info!("Built {} Swift function(s)", built.len());

    Ok(built)
}

fn build_function<R: CommandRunner>(
    function: &mut Function,
    handler: Handler,
    builder: &ArtifactBuilder<R>,
) -> Result<BuiltFunction> {
    let config = builder.config();
    let tag = builder.tag_for(function.swift.as_ref()).to_string();
    info!("Building native Swift {} function...", function.name);

    if config.fetch_dependencies {
        DependencyFetcher::new(config, &tag).fetch(builder.runner())?;
    }

    builder.run_compile(function.swift.as_ref())?;

    let binary = staging::locate_binary(&config.release_dir_for(&tag), &handler.binary)?;
    let staging_dir = config.staging_dir(&function.name);
    staging::prepare_staging_dir(&staging_dir)?;
    staging::stage_binary(&binary, &staging_dir)?;
    let included_files =
        staging::stage_includes(&config.source_path, function.include_paths(), &staging_dir)?;

    builder.run_package(&function.name, function.swift.as_ref())?;

    let archive = staging_dir.join(ARCHIVE_NAME);
    if !archive.is_file() {
        return Err(BuildError::MissingArchive(archive));
    }

    let artifact = config
        .staging_path(&function.name)
        .join(ARCHIVE_NAME)
        .to_string_lossy()
        .into_owned();

    function.handler = handler.bootstrap_handler();
    let package = function.package_mut();
    package.artifact = Some(artifact.clone());
    package.individually = true;

    if function.runtime.as_deref() == Some(SWIFT_RUNTIME) {
        function.runtime = Some(BASE_RUNTIME.to_string());
    }

    info!("Packaged {} into {}", function.name, artifact);

    Ok(BuiltFunction {
        name: function.name.clone(),
        binary: handler.binary,
        handler: function.handler.clone(),
        artifact,
        included_files,
    })
}

/// Appends the shared Swift runtime layer to every listed function
///
/// # Errors
/// Fails without touching any function if the provider region has no
/// published layer, `functions` is empty, or any function already carries
/// the maximum number of layers.
pub fn attach_layer(service: &mut Service, functions: &[String]) -> Result<LayerAttachment> {
    let region = service.provider.region().to_string();
    assert_region_supported(&region)?;

    if functions.is_empty() {
        return Err(ConfigError::NoSwiftFunctions.into());
    }

    let arn = layer_arn(&region);
    let layer = Value::String(arn.clone());

    let mut attached = Vec::new();
    let mut unchanged = Vec::new();
    for name in functions {
        let function = service
            .function(name)
            .ok_or_else(|| ConfigError::UnknownFunction(name.clone()))?;

        if function.layers.contains(&layer) {
            unchanged.push(name.clone());
        } else if function.layers.len() >= MAX_LAYERS_PER_FUNCTION {
            return Err(ConfigError::TooManyLayers {
                function: name.clone(),
                limit: MAX_LAYERS_PER_FUNCTION,
            }
            .into());
        } else {
            attached.push(name.clone());
        }
    }

    for function in service
        .functions
        .iter_mut()
        .filter(|f| attached.contains(&f.name))
    {
        debug!("Attaching {} to {}", arn, function.name);
        function.layers.push(layer.clone());
    }

    info!("Attached Swift layer {} to {} function(s)", arn, attached.len());

    Ok(LayerAttachment {
        arn,
        attached,
        unchanged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::testing::ScriptedRunner;
    use serverless_swift_core::domain::Provider;
    use std::fs;
    use std::path::Path;

    fn service(functions: Vec<Function>, provider_runtime: Option<&str>) -> Service {
        Service {
            service: "hello-swift".to_string(),
            provider: Provider {
                name: "aws".to_string(),
                region: Some("us-east-1".to_string()),
                runtime: provider_runtime.map(str::to_string),
                ..Default::default()
            },
            functions,
            ..Default::default()
        }
    }

    fn names(service: &Service) -> Vec<String> {
        service.swift_functions(None).unwrap()
    }

    fn builder(root: &Path, runner: ScriptedRunner) -> ArtifactBuilder<ScriptedRunner> {
        ArtifactBuilder::new(BuildConfig::new(root), runner)
    }

    #[test]
    fn test_no_swift_functions_runs_nothing() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(
            vec![Function::new("legacy", "index.handler").with_runtime("nodejs12.x")],
            None,
        );
        let builder = builder(root.path(), ScriptedRunner::new());

        let functions = names(&svc);
        let err = build_artifacts(&mut svc, &functions, &builder).unwrap_err();

        assert!(matches!(err, BuildError::Config(ConfigError::NoSwiftFunctions)));
        assert!(builder.runner().calls().is_empty());
    }

    #[test]
    fn test_build_rewrites_descriptor() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(
            vec![
                Function::new("hello", "Hello"),
                Function::new("world", "World.handler").with_runtime("swift"),
                Function::new("legacy", "index.handler").with_runtime("nodejs12.x"),
            ],
            Some("swift"),
        );
        let runner = ScriptedRunner::new().producing(root.path(), &["Hello", "World"]);
        let builder = builder(root.path(), runner);

        let functions = names(&svc);
        let built = build_artifacts(&mut svc, &functions, &builder).unwrap();

        assert_eq!(built.len(), 2);
        assert_eq!(svc.provider.runtime.as_deref(), Some("provided"));

        let hello = svc.function("hello").unwrap();
        assert_eq!(hello.handler, "bootstrap");
        assert_eq!(svc.effective_runtime(hello), Some("provided"));
        let package = hello.package.as_ref().unwrap();
        assert!(package.individually);
        assert!(package.artifact.as_ref().unwrap().ends_with("lambda.zip"));

        let world = svc.function("world").unwrap();
        assert_eq!(world.handler, "bootstrap.handler");
        assert_eq!(world.runtime.as_deref(), Some("provided"));
        let artifact = world.package.as_ref().unwrap().artifact.clone().unwrap();
        assert_eq!(artifact, ".serverless/.serverless-swift/world/lambda.zip");
        assert!(root.path().join(&artifact).is_file());

        let staged = root.path().join(".serverless/.serverless-swift/world/bootstrap");
        assert_eq!(fs::read_to_string(staged).unwrap(), "binary:World");

        let legacy = svc.function("legacy").unwrap();
        assert_eq!(legacy.handler, "index.handler");
        assert_eq!(legacy.runtime.as_deref(), Some("nodejs12.x"));
        assert!(legacy.package.is_none());

        // compile + package per function
        assert_eq!(builder.runner().calls().len(), 4);
    }

    #[test]
    fn test_compile_failure_stops_before_staging() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(vec![Function::new("hello", "Hello")], Some("swift"));
        let original = svc.clone();
        let runner = ScriptedRunner::new()
            .producing(root.path(), &["Hello"])
            .fail_on("build", 1);
        let builder = builder(root.path(), runner);

        let functions = names(&svc);
        let err = build_artifacts(&mut svc, &functions, &builder).unwrap_err();

        assert!(matches!(err, BuildError::Failed { status: Some(1), .. }));
        assert!(!root.path().join(".serverless").exists());
        assert_eq!(svc, original);
        assert_eq!(builder.runner().calls().len(), 1);
    }

    #[test]
    fn test_failure_leaves_earlier_functions_untouched() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(
            vec![Function::new("hello", "Hello"), Function::new("world", "World")],
            Some("swift"),
        );
        let original = svc.clone();
        // World is never produced by the compiler
        let runner = ScriptedRunner::new().producing(root.path(), &["Hello"]);
        let builder = builder(root.path(), runner);

        let functions = names(&svc);
        let err = build_artifacts(&mut svc, &functions, &builder).unwrap_err();

        match err {
            BuildError::MissingBinary { expected, found, .. } => {
                assert_eq!(expected, "World");
                assert_eq!(found, vec!["Hello".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(svc, original);
        assert!(!root.path().join(".serverless/.serverless-swift/world").exists());
    }

    #[test]
    fn test_package_failure_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(vec![Function::new("hello", "Hello")], Some("swift"));
        let runner = ScriptedRunner::new()
            .producing(root.path(), &["Hello"])
            .fail_on("zip", 12);
        let builder = builder(root.path(), runner);

        let functions = names(&svc);
        let err = build_artifacts(&mut svc, &functions, &builder).unwrap_err();
        assert!(matches!(err, BuildError::Failed { status: Some(12), .. }));
        assert_eq!(svc.provider.runtime.as_deref(), Some("swift"));
    }

    #[test]
    fn test_missing_archive_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(vec![Function::new("hello", "Hello")], Some("swift"));
        let runner = ScriptedRunner::new()
            .producing(root.path(), &["Hello"])
            .without_archive();
        let builder = builder(root.path(), runner);

        let functions = names(&svc);
        let err = build_artifacts(&mut svc, &functions, &builder).unwrap_err();
        assert!(matches!(err, BuildError::MissingArchive(_)));
    }

    #[test]
    fn test_invalid_handler_fails_before_commands() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(vec![Function::new("hello", ".handler")], Some("swift"));
        let builder = builder(root.path(), ScriptedRunner::new());

        let functions = names(&svc);
        let err = build_artifacts(&mut svc, &functions, &builder).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::InvalidHandler { .. })
        ));
        assert!(builder.runner().calls().is_empty());
    }

    #[test]
    fn test_includes_are_staged() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("settings.json"), b"{}").unwrap();
        let mut function = Function::new("hello", "Hello");
        function.package_mut().include = vec!["settings.json".to_string()];
        let mut svc = service(vec![function], Some("swift"));
        let runner = ScriptedRunner::new().producing(root.path(), &["Hello"]);
        let builder = builder(root.path(), runner);

        let functions = names(&svc);
        let built = build_artifacts(&mut svc, &functions, &builder).unwrap();

        assert_eq!(built[0].included_files, 1);
        assert!(
            root.path()
                .join(".serverless/.serverless-swift/hello/settings.json")
                .is_file()
        );
    }

    #[test]
    fn test_tag_override_builds_into_own_folder() {
        let root = tempfile::tempdir().unwrap();
        let mut legacy = Function::new("legacy", "Legacy");
        legacy.swift = Some(
            [("dockerTag".to_string(), "swift-5.1".to_string())]
                .into_iter()
                .collect(),
        );
        let mut svc = service(vec![Function::new("hello", "Hello"), legacy], Some("swift"));
        let runner = ScriptedRunner::new().producing(root.path(), &["Hello", "Legacy"]);
        let builder = builder(root.path(), runner);

        let functions = names(&svc);
        build_artifacts(&mut svc, &functions, &builder).unwrap();

        let build_paths: Vec<String> = builder
            .runner()
            .calls()
            .iter()
            .filter(|call| call.args.iter().any(|a| a == "--build-path"))
            .map(|call| call.args.last().unwrap().clone())
            .collect();
        assert_eq!(build_paths, vec![".build/lambda", ".build/lambda-swift-5.1"]);
        assert!(root.path().join(".build/lambda-swift-5.1/release/Legacy").is_file());
    }

    #[test]
    fn test_dependencies_fetched_before_compile() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(vec![Function::new("hello", "Hello")], Some("swift"));
        let mut config = BuildConfig::new(root.path());
        config.fetch_dependencies = true;
        let runner = ScriptedRunner::new().producing(root.path(), &["Hello"]);
        let builder = ArtifactBuilder::new(config, runner);

        let functions = names(&svc);
        build_artifacts(&mut svc, &functions, &builder).unwrap();

        let calls = builder.runner().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].program, "swift");
        assert_eq!(calls[1].program, "docker");
    }

    #[test]
    fn test_dependency_failure_aborts() {
        let root = tempfile::tempdir().unwrap();
        let mut svc = service(vec![Function::new("hello", "Hello")], Some("swift"));
        let mut config = BuildConfig::new(root.path());
        config.fetch_dependencies = true;
        let runner = ScriptedRunner::new()
            .producing(root.path(), &["Hello"])
            .unlaunchable("swift");
        let builder = ArtifactBuilder::new(config, runner);

        let functions = names(&svc);
        let err = build_artifacts(&mut svc, &functions, &builder).unwrap_err();
        assert!(matches!(err, BuildError::Launch { .. }));
        assert_eq!(builder.runner().calls().len(), 1);
    }

    #[test]
    fn test_attach_layer() {
        let mut svc = service(
            vec![Function::new("hello", "Hello"), Function::new("world", "World")],
            Some("swift"),
        );
        let functions = names(&svc);

        let attachment = attach_layer(&mut svc, &functions).unwrap();

        assert_eq!(attachment.arn, "arn:aws:lambda:us-east-1:635835178146:layer:swift:6");
        assert_eq!(attachment.attached.len(), 2);
        for function in &svc.functions {
            assert_eq!(function.layers, vec![Value::String(attachment.arn.clone())]);
        }
    }

    #[test]
    fn test_attach_layer_twice_is_a_no_op() {
        let mut svc = service(vec![Function::new("hello", "Hello")], Some("swift"));
        let functions = names(&svc);

        attach_layer(&mut svc, &functions).unwrap();
        let second = attach_layer(&mut svc, &functions).unwrap();

        assert!(second.attached.is_empty());
        assert_eq!(second.unchanged, vec!["hello".to_string()]);
        assert_eq!(svc.functions[0].layers.len(), 1);
    }

    #[test]
    fn test_attach_layer_unsupported_region() {
        let mut svc = service(vec![Function::new("hello", "Hello")], Some("swift"));
        svc.provider.region = Some("ap-east-1".to_string());
        let functions = names(&svc);

        let err = attach_layer(&mut svc, &functions).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::UnsupportedRegion(_))
        ));
        assert!(svc.functions[0].layers.is_empty());
    }

    #[test]
    fn test_attach_layer_respects_ceiling() {
        let mut full = Function::new("full", "Full");
        full.layers = (0..MAX_LAYERS_PER_FUNCTION)
            .map(|i| Value::String(format!("arn:aws:lambda:us-east-1:1:layer:l{}:1", i)))
            .collect();
        let mut svc = service(vec![Function::new("hello", "Hello"), full], Some("swift"));
        let functions = names(&svc);

        let err = attach_layer(&mut svc, &functions).unwrap_err();

        assert!(matches!(
            err,
            BuildError::Config(ConfigError::TooManyLayers { limit: 5, .. })
        ));
        assert_eq!(svc.function("full").unwrap().layers.len(), 5);
        assert!(svc.function("hello").unwrap().layers.is_empty());
    }

    #[test]
    fn test_attach_layer_without_functions() {
        let mut svc = service(vec![], Some("swift"));
        let err = attach_layer(&mut svc, &[]).unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::NoSwiftFunctions)));
    }
}
