//Provider CLI helpers. Each provider module knows the exact command lines of its CLI;
//what is shared is how the text those commands print gets scanned.
pub mod azure;
pub mod gcp;

use crate::shell_tools::{CommandRunner, RunInfo};

/// Provider naming rule: no uppercase character anywhere (empty names pass)
pub fn check_name(name: &str) -> bool {
    !name.chars().any(char::is_uppercase)
}

/// Scans the whitespace separated tokens of an image listing for the requested image.
/// `normalize` strips whatever decoration the provider puts around image names.
pub fn image_listed<F>(listing: &str, image: &str, normalize: F) -> bool
    where F: Fn(&str) -> &str {

    let image = image.trim();
    listing.split_whitespace().any(|token| normalize(token) == image)
}

/// Runs an image listing command and scans it. A listing that fails to run counts as empty.
pub fn check_image<F>(runner: &dyn CommandRunner, list_command: &str, image: &str, normalize: F) -> bool
    where F: Fn(&str) -> &str {

    let listing = runner.run(list_command);
    if listing.failure() {
        warn_with_time!("could not list images: {}", listing.failure_reason());
    }
    image_listed(listing.stdout(), image, normalize)
}

/// Checks the CLI binary can be started at all
pub fn check_cli_install(runner: &dyn CommandRunner, binary: &str) -> Result<(), String> {
    match runner.command_exists(binary) {
        true => Ok(()),
        false => Err(format!("'{}' is not installed on this system, please check the path in the settings and/or install it", binary)),
    }
}
