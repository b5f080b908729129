//! External command probing.

use tracing::debug;

use crate::error::ProbeError;

/// Check whether an executable named `name` resolves on the host's search
/// path.
///
/// "Not found" is a normal `false`, never an error; a [`ProbeError`] means
/// the probe mechanism itself failed (unreadable current directory, empty
/// search path).
pub async fn command_exists(name: &str) -> Result<bool, ProbeError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(false);
    }

    match which::which(name) {
        Ok(path) => {
            debug!(command = name, resolved = %path.display(), "Command found");
            Ok(true)
        }
        Err(which::Error::CannotFindBinaryPath) => Ok(false),
        Err(other) => Err(ProbeError {
            name: name.to_string(),
            message: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_a_ubiquitous_command() {
        assert!(command_exists("ls").await.unwrap());
    }

    #[tokio::test]
    async fn missing_command_is_false_not_an_error() {
        assert!(!command_exists("definitely-not-a-real-command-xyz")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn blank_names_never_exist() {
        assert!(!command_exists("").await.unwrap());
        assert!(!command_exists("   ").await.unwrap());
    }
}
