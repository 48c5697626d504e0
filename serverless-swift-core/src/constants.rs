//! Fixed coordinates shared by the build and layer stages

/// Docker Hub account publishing the Swift build images
pub const DOCKER_USERNAME: &str = "mariusomdev";

/// Repository holding the Amazon Linux Swift toolchain images
pub const DOCKER_REPO: &str = "aws-lambda-swift";

/// Image tag used when neither the service nor the function overrides it
pub const DEFAULT_DOCKER_TAG: &str = "swift-5.2.5";

/// Runtime value that flags a function for this pipeline
pub const SWIFT_RUNTIME: &str = "swift";

/// Runtime the platform expects once a `bootstrap` executable is supplied
pub const BASE_RUNTIME: &str = "provided";

/// Entrypoint filename the custom runtime executes
pub const BOOTSTRAP: &str = "bootstrap";

/// Archive produced by the package phase
pub const ARCHIVE_NAME: &str = "lambda.zip";

/// The only provider this pipeline knows how to package for
pub const AWS_PROVIDER: &str = "aws";

/// Account that publishes the shared Swift runtime layer
pub const AWS_ACCOUNT_ID: &str = "635835178146";

/// Published version of the shared Swift runtime layer
pub const LAMBDA_LAYER_VERSION: u32 = 6;

/// Platform ceiling on layers attached to one function
pub const MAX_LAYERS_PER_FUNCTION: usize = 5;

/// Regions the shared runtime layer is replicated to
pub const LAYER_SUPPORTED_REGIONS: &[&str] = &[
    "us-east-2",
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-north-1",
    "sa-east-1",
];
