//! `up`, `down`, and `init` command handling.

use std::path::PathBuf;

use clap::Args;

use schemashift_core::orchestrator::{self, MigrateOptions};

/// Scope and credential options shared by every command.
#[derive(Args, Debug)]
pub struct ScopeArgs {
    /// Space id to use
    #[arg(short = 's', long, env = "SCHEMASHIFT_SPACE_ID")]
    pub space_id: String,

    /// Environment within the space
    #[arg(
        short = 'e',
        long,
        env = "SCHEMASHIFT_ENV_ID",
        default_value = schemashift_client::config::DEFAULT_ENVIRONMENT
    )]
    pub environment_id: String,

    /// App id used to obtain a management token
    #[arg(short = 'a', long, env = "SCHEMASHIFT_APP_ID")]
    pub app_id: Option<String>,

    /// Management API access token; overrides the app-token exchange
    #[arg(short = 't', long, env = "SCHEMASHIFT_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Management API base URL
    #[arg(
        long,
        env = "SCHEMASHIFT_BASE_URL",
        default_value = schemashift_client::config::DEFAULT_BASE_URL
    )]
    pub base_url: String,

    /// Only show the planned actions, write nothing remotely
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Directory holding one subdirectory of migration scripts per entity
    #[arg(
        long,
        env = "SCHEMASHIFT_MIGRATIONS_DIR",
        default_value = orchestrator::DEFAULT_MIGRATIONS_DIR
    )]
    pub migrations_dir: PathBuf,
}

/// Arguments for `schemashift up`.
#[derive(Args, Debug)]
pub struct UpArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// One or more entity names to process
    #[arg(short = 'c', long = "entity")]
    pub entities: Vec<String>,

    /// Process migrations for all entities
    #[arg(long)]
    pub all: bool,

    /// If specified, apply pending migrations up to this step only
    pub target: Option<String>,
}

/// Arguments for `schemashift down`.
#[derive(Args, Debug)]
pub struct DownArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// One or more entity names to process
    #[arg(short = 'c', long = "entity")]
    pub entities: Vec<String>,

    /// Process migrations for all entities
    #[arg(long)]
    pub all: bool,

    /// If specified, revert migrations down to this step; otherwise only
    /// the last applied step is reverted
    pub target: Option<String>,
}

/// Arguments for `schemashift init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
}

fn build_options(scope: ScopeArgs, entities: Vec<String>, all: bool) -> MigrateOptions {
    MigrateOptions {
        base_url: scope.base_url,
        space_id: scope.space_id,
        environment_id: scope.environment_id,
        entities,
        all,
        app_id: scope.app_id,
        access_token: scope.access_token,
        private_key_base64: None,
        migrations_dir: scope.migrations_dir,
        dry_run: scope.dry_run,
    }
}

/// Apply pending migrations.
pub async fn up(args: UpArgs) -> Result<(), Box<dyn std::error::Error>> {
    let target = args.target.clone();
    let options = build_options(args.scope, args.entities, args.all);
    orchestrator::up(options, target.as_deref()).await?;
    Ok(())
}

/// Revert applied migrations.
pub async fn down(args: DownArgs) -> Result<(), Box<dyn std::error::Error>> {
    let target = args.target.clone();
    let options = build_options(args.scope, args.entities, args.all);
    orchestrator::down(options, target.as_deref()).await?;
    Ok(())
}

/// Bootstrap the environment's reserved state entity type.
pub async fn init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = build_options(args.scope, Vec::new(), false);
    orchestrator::init(options).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: UpArgs,
    }

    #[test]
    fn test_parse_up_args() {
        let cli = TestCli::try_parse_from([
            "schemashift",
            "-s",
            "space1",
            "-c",
            "blog",
            "-c",
            "author",
            "--dry-run",
            "002-add-author",
        ])
        .unwrap();

        assert_eq!(cli.args.scope.space_id, "space1");
        assert_eq!(cli.args.entities, vec!["blog", "author"]);
        assert!(cli.args.scope.dry_run);
        assert!(!cli.args.all);
        assert_eq!(cli.args.target.as_deref(), Some("002-add-author"));
    }

    #[test]
    fn test_environment_defaults_to_master() {
        let cli = TestCli::try_parse_from(["schemashift", "-s", "space1", "--all"]).unwrap();
        assert_eq!(cli.args.scope.environment_id, "master");
        assert!(cli.args.all);
    }
}
