//! sqlway - command-line client for the sqlway data platform

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use sq_auth::{identity, AuthConfig, FileSessionStore, SessionManager};
use sq_client::PlatformClient;
use sq_keys::Keypair;

#[derive(Parser, Debug)]
#[command(name = "sqlway", version)]
#[command(about = "Authenticate against and query the sqlway data platform")]
struct Args {
    /// Base URL of the platform API
    #[arg(long, env = "SQLWAY_BASE_URL")]
    base_url: Option<Url>,

    /// User identifier to authenticate as
    #[arg(long, env = "SQLWAY_USER_ID", default_value = "")]
    user_id: String,

    /// Subscription prefix
    #[arg(long, env = "SQLWAY_PREFIX", default_value = "")]
    prefix: String,

    /// Subscription join code
    #[arg(long, env = "SQLWAY_JOIN_CODE", default_value = "")]
    join_code: String,

    /// Signature scheme identifier
    #[arg(long, env = "SQLWAY_SCHEME", default_value = sq_auth::DEFAULT_SCHEME)]
    scheme: String,

    /// Session record location (defaults under the user config dir)
    #[arg(long, env = "SQLWAY_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Identity record location (defaults under the user config dir)
    #[arg(long, env = "SQLWAY_IDENTITY_FILE")]
    identity_file: Option<PathBuf>,

    /// Base64 private key, overriding the persisted identity
    #[arg(long, env = "SQLWAY_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "SQLWAY_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Local key utilities, no platform access needed
    Keys {
        #[command(subcommand)]
        command: KeysCommand,
    },
    #[command(flatten)]
    Platform(PlatformCommand),
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a fresh Ed25519 keypair and print the public half
    Generate {
        /// Also print the private key
        #[arg(long)]
        show_private: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PlatformCommand {
    /// Check whether the configured user identifier is registered
    IdExists,
    /// Run the full authentication flow and persist the session
    Authenticate,
    /// Reuse, refresh or re-authenticate based on remaining token lifetime
    Rotate,
    /// Ask the platform who the stored access token belongs to
    Validate,
    /// End the session server-side and clear the local record
    Logout,
    /// Discovery endpoints
    Discover {
        #[command(subcommand)]
        command: DiscoverCommand,
    },
    /// SQL endpoints
    Sql {
        #[command(subcommand)]
        command: SqlCommand,
    },
    /// Execute a named view
    View {
        name: String,

        /// View parameter as NAME=VALUE (repeatable)
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum DiscoverCommand {
    /// List namespaces
    Namespaces,
    /// List tables in a namespace
    Tables {
        #[arg(long, default_value = "ALL")]
        scope: String,
        #[arg(long)]
        namespace: String,
    },
    /// List the columns of a table
    Columns {
        #[arg(long)]
        namespace: String,
        #[arg(long)]
        table: String,
    },
    /// List the indexes of a table
    Indexes {
        #[arg(long)]
        namespace: String,
        #[arg(long)]
        table: String,
    },
    /// List the primary keys of a table
    PrimaryKeys {
        #[arg(long)]
        namespace: String,
        #[arg(long)]
        table: String,
    },
    /// List table relationships in a namespace
    Relationships {
        #[arg(long, default_value = "ALL")]
        scope: String,
        #[arg(long)]
        namespace: String,
    },
    /// List the primary keys referenced by a foreign key column
    PrimaryKeyRefs {
        #[arg(long)]
        table: String,
        #[arg(long)]
        column: String,
        #[arg(long)]
        namespace: String,
    },
    /// List the foreign keys referencing a primary key column
    ForeignKeyRefs {
        #[arg(long)]
        table: String,
        #[arg(long)]
        column: String,
        #[arg(long)]
        namespace: String,
    },
}

#[derive(Subcommand, Debug)]
enum SqlCommand {
    /// Create a schema
    CreateSchema {
        /// SQL statement
        #[arg(long)]
        sql: String,
    },
    /// Create a table with the platform's ownership clause
    CreateTable {
        #[arg(long)]
        resource_id: String,
        #[arg(long)]
        sql: String,
        #[arg(long, default_value = "permissioned")]
        access_type: String,
        /// Public key for the ownership clause; defaults to the active identity
        #[arg(long)]
        public_key: Option<String>,
        #[arg(long, env = "SQLWAY_BISCUIT", hide_env_values = true)]
        biscuit: String,
    },
    /// Alter or drop a table
    Ddl {
        #[arg(long)]
        resource_id: String,
        #[arg(long)]
        sql: String,
        #[arg(long, env = "SQLWAY_BISCUIT", hide_env_values = true)]
        biscuit: String,
    },
    /// Insert, update, merge or delete rows
    Dml {
        #[arg(long)]
        resource_id: String,
        #[arg(long)]
        sql: String,
        #[arg(long, env = "SQLWAY_BISCUIT", hide_env_values = true)]
        biscuit: String,
    },
    /// Run a selection
    Dql {
        #[arg(long)]
        resource_id: String,
        #[arg(long)]
        sql: String,
        #[arg(long, env = "SQLWAY_BISCUIT", hide_env_values = true)]
        biscuit: String,
        /// Row limit; omit to fetch everything
        #[arg(long)]
        row_count: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "sqlway={0},sq_auth={0},sq_client={0},warn",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Command::Keys { command } => run_keys(command),
        Command::Platform(command) => {
            let base_url = args
                .base_url
                .context("base URL is not set; pass --base-url or set SQLWAY_BASE_URL")?;

            let mut config = AuthConfig::new(base_url, args.user_id, args.prefix, args.join_code);
            config.scheme = args.scheme;
            config.identity_path = Some(match args.identity_file {
                Some(path) => path,
                None => identity::default_path()?,
            });
            if let Some(private_key) = args.private_key {
                config.keypair = Some(Keypair::from_base64(&private_key)?);
            }

            let session_path = match args.session_file {
                Some(path) => path,
                None => FileSessionStore::default_path()?,
            };
            let store = Arc::new(FileSessionStore::new(session_path));

            run_platform(command, config, store).await
        }
    }
}

fn run_keys(command: KeysCommand) -> anyhow::Result<()> {
    match command {
        KeysCommand::Generate { show_private } => {
            let keypair = Keypair::generate();

            println!("public key (base64):  {}", keypair.public_key_base64());
            println!("public key (hex):     {}", keypair.public_key_hex());

            if show_private {
                println!("private key (base64): {}", keypair.private_key_base64());
                println!("private key (hex):    {}", keypair.private_key_hex());
            } else {
                println!("private key: withheld (pass --show-private to print it)");
            }

            Ok(())
        }
    }
}

async fn run_platform(
    command: PlatformCommand,
    config: AuthConfig,
    store: Arc<FileSessionStore>,
) -> anyhow::Result<()> {
    match command {
        PlatformCommand::IdExists => {
            let manager = SessionManager::new(config, store).await?;
            println!("{}", manager.user_exists().await?);
            Ok(())
        }
        PlatformCommand::Authenticate => {
            let mut manager = SessionManager::new(config, store).await?;
            let session = manager.authenticate().await?;

            println!("authenticated");
            println!("identity public key:      {}", manager.public_key_base64());
            println!("access token expires at:  {}", session.access_token_expires);
            println!("refresh token expires at: {}", session.refresh_token_expires);
            Ok(())
        }
        PlatformCommand::Rotate => {
            let mut manager = SessionManager::new(config, store).await?;
            let (session, action) = manager.rotate_tokens().await?;

            println!("rotation action: {:?}", action);
            println!("access token expires at:  {}", session.access_token_expires);
            println!("refresh token expires at: {}", session.refresh_token_expires);
            Ok(())
        }
        PlatformCommand::Validate => {
            let manager = SessionManager::new(config, store).await?;
            let subject = manager.validate().await?;

            println!("token belongs to {}", subject.user_id);
            Ok(())
        }
        PlatformCommand::Logout => {
            let manager = SessionManager::new(config, store).await?;
            manager.logout().await?;

            println!("logged out; local session cleared");
            Ok(())
        }
        PlatformCommand::Discover { command } => {
            let client = PlatformClient::new(&config, store)?;
            run_discover(command, client).await
        }
        PlatformCommand::Sql { command } => {
            let client = PlatformClient::new(&config, store)?;
            run_sql(command, client, &config).await
        }
        PlatformCommand::View { name, params } => {
            let client = PlatformClient::new(&config, store)?;

            let mut pairs = Vec::new();
            for param in &params {
                let (key, value) = param.split_once('=').with_context(|| {
                    format!("malformed view parameter {:?}, expected NAME=VALUE", param)
                })?;
                pairs.push((key, value));
            }

            print_json(&client.execute_view(&name, &pairs).await?)
        }
    }
}

async fn run_discover(command: DiscoverCommand, client: PlatformClient) -> anyhow::Result<()> {
    let value = match command {
        DiscoverCommand::Namespaces => client.namespaces().await?,
        DiscoverCommand::Tables { scope, namespace } => client.tables(&scope, &namespace).await?,
        DiscoverCommand::Columns { namespace, table } => {
            client.table_columns(&namespace, &table).await?
        }
        DiscoverCommand::Indexes { namespace, table } => {
            client.table_indexes(&namespace, &table).await?
        }
        DiscoverCommand::PrimaryKeys { namespace, table } => {
            client.table_primary_keys(&namespace, &table).await?
        }
        DiscoverCommand::Relationships { scope, namespace } => {
            client.table_relationships(&scope, &namespace).await?
        }
        DiscoverCommand::PrimaryKeyRefs {
            table,
            column,
            namespace,
        } => {
            client
                .primary_key_references(&table, &column, &namespace)
                .await?
        }
        DiscoverCommand::ForeignKeyRefs {
            table,
            column,
            namespace,
        } => {
            client
                .foreign_key_references(&table, &column, &namespace)
                .await?
        }
    };

    print_json(&value)
}

async fn run_sql(
    command: SqlCommand,
    client: PlatformClient,
    config: &AuthConfig,
) -> anyhow::Result<()> {
    let value = match command {
        SqlCommand::CreateSchema { sql } => client.create_schema(&sql).await?,
        SqlCommand::CreateTable {
            resource_id,
            sql,
            access_type,
            public_key,
            biscuit,
        } => {
            let public_key = match public_key {
                Some(key) => key,
                None => persisted_public_key(config).await?,
            };

            client
                .ddl_create_table(&resource_id, &sql, &access_type, &public_key, &biscuit)
                .await?
        }
        SqlCommand::Ddl {
            resource_id,
            sql,
            biscuit,
        } => client.ddl(&resource_id, &sql, &biscuit).await?,
        SqlCommand::Dml {
            resource_id,
            sql,
            biscuit,
        } => client.dml(&resource_id, &sql, &biscuit).await?,
        SqlCommand::Dql {
            resource_id,
            sql,
            biscuit,
            row_count,
        } => client.dql(&resource_id, &sql, &biscuit, row_count).await?,
    };

    print_json(&value)
}

/// The table ownership clause must name the key that authenticated, so
/// default to the persisted identity rather than generating anything new
async fn persisted_public_key(config: &AuthConfig) -> anyhow::Result<String> {
    let path = config
        .identity_path
        .as_ref()
        .context("no identity path configured")?;

    let keypair = identity::load(path)
        .await?
        .context("no persisted identity found; authenticate first or pass --public-key")?;

    Ok(keypair.public_key_base64())
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
