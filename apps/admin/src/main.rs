use std::{fs, path::PathBuf, sync::Arc};

use admin_core::{AdminClient, AdminHandle, RecordingCacheInvalidator};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use dashboard::decoration_table::DecorationTable;
use serde::Serialize;
use serde_json::json;
use shared::{
    domain::{BakeryId, BanAction, DecorationCategory, DecorationId, FileId},
    protocol::{BakeryProfileUpdate, ImageFileIds, SearchParams, SortOrder},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{build_session, load_settings};

#[derive(Parser, Debug)]
#[command(name = "bakery-admin", about = "Moderate bakeries and cake decorations")]
struct Cli {
    /// TOML settings file; defaults to ./bakery-admin.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    per_page: Option<u32>,
    /// `column.asc` or `column.desc`.
    #[arg(long, value_parser = parse_sort)]
    sort: Option<(String, SortOrder)>,
    /// Repeatable `key=value` filter.
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
}

impl ListArgs {
    fn into_params(self) -> SearchParams {
        let mut params = SearchParams {
            page: self.page,
            per_page: self.per_page,
            sort: self.sort,
            ..SearchParams::default()
        };
        for (key, value) in self.filters {
            params = params.filter(key, value);
        }
        params
    }
}

#[derive(clap::Args, Debug)]
struct UpdateProfileArgs {
    bakery_id: String,
    /// JSON file with the full profile. Without it the bakery's current
    /// profile is fetched and only the flags below change.
    #[arg(long)]
    from_json: Option<PathBuf>,
    /// Bare id or JSON-encoded list.
    #[arg(long)]
    shop_image_file_ids: Option<String>,
    #[arg(long)]
    open_time: Option<String>,
    #[arg(long)]
    close_time: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

impl UpdateProfileArgs {
    fn apply_flags(self, update: &mut BakeryProfileUpdate) {
        if let Some(ids) = self.shop_image_file_ids {
            update.shop_image_file_ids = Some(ImageFileIds::Raw(ids));
        }
        if let Some(v) = self.open_time {
            update.open_time = v;
        }
        if let Some(v) = self.close_time {
            update.close_time = v;
        }
        if self.password.is_some() {
            update.password = self.password;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    List(ListArgs),
    Get {
        bakery_id: String,
    },
    Approve {
        bakery_id: String,
    },
    Unapprove {
        bakery_id: String,
    },
    Ban {
        bakery_id: String,
    },
    Unban {
        bakery_id: String,
    },
    Delete {
        bakery_id: String,
    },
    UpdateProfile(UpdateProfileArgs),
    File {
        file_id: String,
    },
    Decorations(ListArgs),
    DeleteDecoration {
        decoration_id: String,
    },
}

fn parse_sort(raw: &str) -> Result<(String, SortOrder), String> {
    let (column, order) = raw
        .rsplit_once('.')
        .ok_or_else(|| format!("expected column.asc or column.desc, got '{raw}'"))?;
    let order = match order {
        "asc" => SortOrder::Asc,
        "desc" => SortOrder::Desc,
        other => return Err(format!("unknown sort order '{other}'")),
    };
    if column.is_empty() {
        return Err("sort column must not be empty".to_string());
    }
    Ok((column.to_string(), order))
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    if let Some(token) = cli.token {
        settings.access_token = Some(token);
    }

    let session = build_session(&settings)?;
    let invalidator = Arc::new(RecordingCacheInvalidator::default());
    let client = AdminClient::new_with_invalidator(session, invalidator.clone())
        .context("failed to build http client")?;

    run(&client, cli.command).await?;

    for path in invalidator.take() {
        info!(path = %path, "invalidated dashboard view");
    }
    Ok(())
}

async fn run(client: &AdminClient, command: Command) -> Result<()> {
    match command {
        Command::List(args) => {
            let page = client.list_bakeries(&args.into_params()).await;
            if let Some(err) = page.error {
                bail!("failed to list bakeries: {err}");
            }
            print_json(&json!({ "data": page.data, "page_count": page.page_count }))?;
        }
        Command::Get { bakery_id } => {
            let bakery = client
                .get_bakery(&BakeryId::new(bakery_id.clone()))
                .await
                .ok_or_else(|| anyhow!("bakery '{bakery_id}' could not be loaded"))?;
            print_json(&bakery)?;
        }
        Command::Approve { bakery_id } => {
            client.approve_bakery(&BakeryId::new(bakery_id)).await?;
            print_json(&json!({ "ok": true }))?;
        }
        Command::Unapprove { bakery_id } => {
            client.unapprove_bakery(&BakeryId::new(bakery_id)).await?;
            print_json(&json!({ "ok": true }))?;
        }
        Command::Ban { bakery_id } => {
            client
                .ban_bakery(&BakeryId::new(bakery_id), BanAction::Ban)
                .await?;
            print_json(&json!({ "ok": true }))?;
        }
        Command::Unban { bakery_id } => {
            client
                .ban_bakery(&BakeryId::new(bakery_id), BanAction::UnBan)
                .await?;
            print_json(&json!({ "ok": true }))?;
        }
        Command::Delete { bakery_id } => {
            client.delete_bakery(&BakeryId::new(bakery_id)).await?;
            print_json(&json!({ "ok": true }))?;
        }
        Command::UpdateProfile(args) => {
            let bakery_id = BakeryId::new(args.bakery_id.clone());
            let mut update = match &args.from_json {
                Some(path) => {
                    let raw = fs::read_to_string(path)
                        .with_context(|| format!("failed to read '{}'", path.display()))?;
                    serde_json::from_str::<BakeryProfileUpdate>(&raw)
                        .with_context(|| format!("invalid profile json in '{}'", path.display()))?
                }
                None => {
                    let current = client.get_bakery(&bakery_id).await.ok_or_else(|| {
                        anyhow!("bakery '{bakery_id}' could not be loaded; pass --from-json")
                    })?;
                    BakeryProfileUpdate::from(&current)
                }
            };
            args.apply_flags(&mut update);
            let bakery = client.update_bakery_profile(&bakery_id, update).await?;
            print_json(&bakery)?;
        }
        Command::File { file_id } => {
            let file = client
                .get_bakery_file(&FileId::new(file_id.clone()))
                .await
                .ok_or_else(|| anyhow!("file '{file_id}' could not be loaded"))?;
            print_json(&file)?;
        }
        Command::Decorations(args) => {
            let page = client.list_cake_decorations(&args.into_params()).await;
            if let Some(err) = &page.error {
                bail!("failed to list cake decorations: {err}");
            }
            let groups = page.data.clone();
            let table = DecorationTable::new(page);
            let existing = table.existing_types();
            let missing: Vec<&str> = DecorationCategory::ALL
                .iter()
                .map(|category| category.key())
                .filter(|key| !existing.iter().any(|t| t == key))
                .collect();
            print_json(&json!({
                "data": groups,
                "all_predefined_types_exist": table.all_predefined_types_exist(),
                "missing_types": missing,
            }))?;
        }
        Command::DeleteDecoration { decoration_id } => {
            client
                .delete_cake_decoration(&DecorationId::new(decoration_id))
                .await?;
            print_json(&json!({ "ok": true }))?;
        }
    }
    Ok(())
}
