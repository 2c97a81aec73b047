/// Application name, used for the state directory.
pub const APP_NAME: &str = "slsrust";

/// The executable name the `provided` runtimes look up as the function entrypoint.
pub const BOOTSTRAP: &str = "bootstrap";

/// The single target every supported host cross-compiles to.
pub const MUSL_TARGET: &str = "x86_64-unknown-linux-musl";

/// Root of cargo's output directory, relative to the working directory.
pub const CARGO_TARGET_DIR: &str = "target";

/// The compiler driver invoked for builds.
pub const CARGO: &str = "cargo";

/// The only cloud provider the hooks act on.
pub const SUPPORTED_PROVIDER: &str = "aws";

/// Runtimes that execute a custom `bootstrap` binary.
pub const PROVIDED_RUNTIMES: [&str; 2] = ["provided", "provided.al2"];

/// Profile name that selects a debug build; anything else builds in release mode.
pub const DEV_PROFILE: &str = "dev";
