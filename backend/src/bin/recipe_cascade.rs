//! Apply a recipe removal to a JSON message snapshot.
//!
//! Loads the snapshot into the in-memory store, publishes `RecipeRemoved`,
//! prunes the recipe from messages that keep other recipes, and writes the
//! surviving messages out.
//!
//! # Examples
//! ```sh
//! RUST_LOG=info cargo run --manifest-path backend/Cargo.toml --bin recipe-cascade -- \
//!     --messages messages.json --recipe-id r1 --output survivors.json
//! ```
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use messaging_backend::CascadeSettings;
use messaging_backend::domain::{
    IntegrityPolicy, NotificationPublisher, RecipeId, RecipeRemoved, RecipeRemovedCascade,
};
use messaging_backend::outbound::{InMemoryStore, load_messages, write_messages};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `recipe-cascade` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "recipe-cascade",
    about = "Delete messages orphaned by a recipe removal from a JSON snapshot",
    version
)]
struct CliArgs {
    /// Path to the JSON message snapshot to read.
    #[arg(long = "messages", value_name = "path")]
    messages: PathBuf,
    /// Identifier of the removed recipe.
    #[arg(long = "recipe-id", value_name = "id", value_parser = parse_recipe_id)]
    recipe_id: RecipeId,
    /// Where to write the surviving messages. Defaults to the input path.
    #[arg(long = "output", value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = CascadeSettings::load_from_iter([OsString::from("recipe-cascade")])
        .map_err(|error| io::Error::other(format!("load cascade settings: {error}")))?;

    let messages = load_messages(&args.messages).map_err(io::Error::other)?;
    let loaded = messages.len();
    let store = Arc::new(InMemoryStore::with_messages(messages));

    let summary = apply_removal(&store, &args.recipe_id, settings.integrity_policy()).await?;

    let output = args.output.unwrap_or(args.messages);
    write_messages(&output, &store.messages(), settings.pretty_output)
        .map_err(io::Error::other)?;

    info!(
        recipe_id = %args.recipe_id,
        loaded,
        stored = summary.stored,
        deleted = summary.deleted,
        pruned = summary.pruned,
        output = %output.display(),
        "snapshot updated"
    );
    Ok(())
}

/// Counts for one recipe removal over the in-memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RemovalSummary {
    /// Distinct messages held before the cascade ran.
    stored: usize,
    deleted: usize,
    pruned: usize,
}

/// Publish `RecipeRemoved` for `recipe_id`, then prune the surviving
/// references.
async fn apply_removal(
    store: &Arc<InMemoryStore>,
    recipe_id: &RecipeId,
    policy: IntegrityPolicy,
) -> io::Result<RemovalSummary> {
    let stored = store.message_count();
    let cascade = RecipeRemovedCascade::new(Arc::clone(store)).with_policy(policy);
    NotificationPublisher::<RecipeRemoved>::new()
        .with_handler(Arc::new(cascade))
        .publish(
            &RecipeRemoved::new(recipe_id.clone()),
            &CancellationToken::new(),
        )
        .await
        .map_err(|error| io::Error::other(format!("recipe cascade failed: {error}")))?;
    let pruned = store.prune_recipe(recipe_id);

    Ok(RemovalSummary {
        stored,
        deleted: stored.saturating_sub(store.message_count()),
        pruned,
    })
}

fn parse_recipe_id(raw: &str) -> Result<RecipeId, String> {
    RecipeId::new(raw).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing and the removal pass.

    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use messaging_backend::domain::{
        AccountId, Handler, IntegrityPolicy, Message, MessageContent, MessageDraft, MessageId,
        RecipeId, Role, UserAccount, UserName,
    };
    use messaging_backend::outbound::InMemoryStore;
    use rstest::rstest;

    use super::{CliArgs, RemovalSummary, apply_removal, parse_recipe_id};
    use clap::Parser;

    fn recipe_message(id: &str, recipes: &[&str]) -> Message {
        let sent_date = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let sender = Arc::new(UserAccount::new(
            AccountId::new("u1").expect("valid account id"),
            Handler::new("cook_u1").expect("valid handler"),
            UserName::new("Cook u1").expect("valid user name"),
            sent_date,
            Role::User,
        ));
        Message::new(MessageDraft {
            id: MessageId::new(id).expect("valid message id"),
            sender,
            sent_date,
            updated_date: None,
            replied_to: None,
            seen_by: Vec::new(),
            content: MessageContent::Recipe {
                text: String::new(),
                recipe_ids: recipes
                    .iter()
                    .map(|raw| RecipeId::new(*raw).expect("valid recipe id"))
                    .collect(),
            },
        })
        .expect("valid message")
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_snapshot_entries_are_not_counted_as_deleted() {
        let store = Arc::new(InMemoryStore::with_messages([
            recipe_message("msg1", &["r1"]),
            recipe_message("msg1", &["r1"]),
            recipe_message("msg2", &["r1", "r2"]),
            recipe_message("msg3", &["r2"]),
        ]));

        let summary = apply_removal(
            &store,
            &RecipeId::new("r1").expect("valid recipe id"),
            IntegrityPolicy::SkipAndLog,
        )
        .await
        .expect("removal succeeds");

        assert_eq!(
            summary,
            RemovalSummary {
                stored: 3,
                deleted: 1,
                pruned: 1,
            }
        );
        assert_eq!(store.message_count(), 2);
    }

    #[rstest]
    fn recipe_id_parser_rejects_padding() {
        let error = parse_recipe_id(" r1").expect_err("padded id");
        assert!(error.contains("whitespace"));
    }

    #[rstest]
    fn output_defaults_to_none() {
        let args = CliArgs::try_parse_from([
            "recipe-cascade",
            "--messages",
            "in.json",
            "--recipe-id",
            "r1",
        ])
        .expect("valid arguments");

        assert_eq!(args.recipe_id.as_str(), "r1");
        assert!(args.output.is_none());
    }

    #[rstest]
    fn missing_recipe_id_is_rejected() {
        let result = CliArgs::try_parse_from(["recipe-cascade", "--messages", "in.json"]);
        assert!(result.is_err());
    }
}
