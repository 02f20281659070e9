use clap::{Parser, Subcommand};
use log::info;

use crate::api::response::ApiResponse;
use crate::collection::{list_documents, CollectionKind};
use crate::config::Config;
use crate::db::Database;
use crate::error::SomanaError;
use crate::query::ListQuery;

#[derive(Parser)]
#[command(
    name = "somana",
    version,
    about = "Somana: content-publishing backend for articles, music and podcasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the server (default if no command specified)
    Serve {
        /// Address to bind (overrides the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the configured port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a list query against a collection and print the response
    List {
        /// Collection to query
        #[arg(value_parser = ["articles", "music", "podcasts"])]
        collection: String,

        /// Query parameters as key=value, e.g. genre=Blog sort=-createdAt limit=4
        params: Vec<String>,
    },

    /// Print the effective configuration
    Config,
}

impl Cli {
    pub fn handle_command_line() -> Result<(), SomanaError> {
        let args = Cli::parse();

        // Default to Serve if no command specified
        match args.command.unwrap_or(Command::Serve {
            host: None,
            port: None,
        }) {
            Command::Serve { host, port } => Self::start_server(host, port),
            Command::List { collection, params } => Self::list(&collection, &params),
            Command::Config => Self::print_config(),
        }
    }

    fn start_server(host: Option<String>, port: Option<u16>) -> Result<(), SomanaError> {
        let server_config = &Config::get().server;
        let host = host.unwrap_or_else(|| server_config.host.clone());
        let port = port.unwrap_or(server_config.port);

        info!("Starting server on {}:{}", host, port);

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| SomanaError::Error(format!("Failed to create runtime: {}", e)))?;

        rt.block_on(async {
            let web_server = crate::server::WebServer::new(host, port);
            web_server.start().await
        })
    }

    fn list(collection: &str, params: &[String]) -> Result<(), SomanaError> {
        let kind: CollectionKind = collection
            .parse()
            .map_err(|_| SomanaError::Error(format!("Unknown collection '{collection}'")))?;
        let list_query = ListQuery::from_args(params)?;

        let conn = Database::get_connection()?;
        let documents = list_documents(&conn, kind, &list_query, &Config::get().query)?;

        let response = ApiResponse::list(kind, documents);
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }

    fn print_config() -> Result<(), SomanaError> {
        let toml_string = toml::to_string_pretty(Config::get())
            .map_err(|e| SomanaError::Error(format!("Failed to serialize config: {e}")))?;
        println!("{toml_string}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing_no_command_defaults_to_serve() {
        let cli = Cli::try_parse_from(["somana"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parsing_serve_overrides() {
        let cli = Cli::try_parse_from(["somana", "serve", "--host", "0.0.0.0", "--port", "9000"])
            .unwrap();
        match cli.command {
            Some(Command::Serve { host, port }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_cli_parsing_list() {
        let cli =
            Cli::try_parse_from(["somana", "list", "articles", "genre=Blog", "limit=4"]).unwrap();
        match cli.command {
            Some(Command::List { collection, params }) => {
                assert_eq!(collection, "articles");
                assert_eq!(params, vec!["genre=Blog", "limit=4"]);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_cli_parsing_invalid_arguments() {
        assert!(Cli::try_parse_from(["somana", "nonexistent-command"]).is_err());
        assert!(Cli::try_parse_from(["somana", "serve", "--invalid-flag"]).is_err());
        assert!(Cli::try_parse_from(["somana", "list", "blogs"]).is_err());
    }
}
