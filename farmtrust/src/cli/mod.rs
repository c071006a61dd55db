pub mod bugreport;
pub mod client;
pub mod server;
pub mod version;

pub const SERVER_SUBCOMMAND: &str = "server";
pub const SERVER_DESCRIPTION: &str = "Run the photo intake server";

pub const VERSION_SUBCOMMAND: &str = "version";
pub const VERSION_DESCRIPTION: &str = "Display the version and build information";

pub const BUGREPORT_SUBCOMMAND: &str = "bugreport";
pub const BUGREPORT_DESCRIPTION: &str = "Collect information about the system and the environment for bug reports";

pub const INSPECT_SUBCOMMAND: &str = "inspect";
pub const INSPECT_DESCRIPTION: &str = "Upload produce photos and print the inspection report";

pub const VERIFY_SUBCOMMAND: &str = "verify";
pub const VERIFY_DESCRIPTION: &str = "Print the provenance of a produce batch";

pub const SYNC_SUBCOMMAND: &str = "sync";
pub const SYNC_DESCRIPTION: &str = "Push a federated learning model update";
