use std::path::PathBuf;

/// Maximum number of in-flight client connections (§3: `MAX_CLIENTS`).
pub const MAX_CLIENTS: usize = 400;
/// Bound on the accumulated client request before it is abandoned (§3:
/// `MAX_BYTES`).
pub const MAX_REQUEST_BYTES: usize = 4096;

/// Runtime configuration, assembled once at startup from CLI args and
/// passed explicitly to the server rather than read from statics.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub block_list_path: Option<PathBuf>,
    pub max_clients: usize,
    pub max_request_bytes: usize,
}

impl Config {
    /// Parses `proxy <port> [--block-list <path>]` from an argument
    /// iterator (excluding argv[0]). Command-line handling is intentionally
    /// minimal: a single required positional port and one optional flag.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut port = None;
        let mut block_list_path = None;

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--block-list" => {
                    let path = iter.next().ok_or("--block-list requires a path argument")?;
                    block_list_path = Some(PathBuf::from(path));
                }
                other => {
                    if port.is_some() {
                        return Err(format!("unexpected argument: {other}"));
                    }
                    port = Some(other.parse::<u16>().map_err(|_| format!("invalid port: {other}"))?);
                }
            }
        }

        Ok(Self {
            port: port.ok_or("usage: proxy <port> [--block-list <path>]")?,
            block_list_path,
            max_clients: MAX_CLIENTS,
            max_request_bytes: MAX_REQUEST_BYTES,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_port_only() {
        let config = Config::from_args(["8080".to_string()]).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.block_list_path.is_none());
    }

    #[test]
    fn parses_port_and_block_list() {
        let config = Config::from_args(
            ["3128".to_string(), "--block-list".to_string(), "/etc/block.txt".to_string()],
        )
        .unwrap();
        assert_eq!(config.port, 3128);
        assert_eq!(config.block_list_path, Some(PathBuf::from("/etc/block.txt")));
    }

    #[test]
    fn rejects_missing_port() {
        assert!(Config::from_args(Vec::<String>::new()).is_err());
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(Config::from_args(["not-a-port".to_string()]).is_err());
    }

    #[test]
    fn rejects_block_list_without_path() {
        assert!(Config::from_args(["8080".to_string(), "--block-list".to_string()]).is_err());
    }

    #[test]
    fn rejects_extra_positional_arguments() {
        assert!(Config::from_args(["8080".to_string(), "9090".to_string()]).is_err());
    }
}
