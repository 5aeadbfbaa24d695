//! Behavioural tests for the recipe-removal cascade over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use messaging_backend::domain::ports::{MessageRepository, MessageRepositoryError};
use messaging_backend::domain::{
    ErrorCode, IntegrityPolicy, Message, NotificationPublisher, RecipeId, RecipeRemoved,
    RecipeRemovedCascade,
};
use messaging_backend::outbound::{InMemoryStore, load_messages, write_messages};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

mod support;

use support::{ids, recipe_message, text_message};

fn r1() -> RecipeId {
    RecipeId::new("r1").expect("valid recipe id")
}

#[fixture]
fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_messages([
        recipe_message("msg1", &["r1"], ""),
        recipe_message("msg2", &["r1", "r2"], ""),
        recipe_message("msg3", &["r1"], "dinner tonight?"),
        recipe_message("msg4", &["r2"], ""),
        text_message("msg5", "u2", "sounds good"),
    ]))
}

fn publisher(store: &Arc<InMemoryStore>) -> NotificationPublisher<RecipeRemoved> {
    NotificationPublisher::<RecipeRemoved>::new()
        .with_handler(Arc::new(RecipeRemovedCascade::new(Arc::clone(store))))
}

#[rstest]
#[tokio::test]
async fn orphaned_recipe_message_is_deleted(store: Arc<InMemoryStore>) {
    publisher(&store)
        .publish(&RecipeRemoved::new(r1()), &CancellationToken::new())
        .await
        .expect("cascade succeeds");

    assert_eq!(
        ids(&store.messages()),
        ["msg2", "msg3", "msg4", "msg5"]
    );
}

#[rstest]
#[tokio::test]
async fn second_run_leaves_the_same_messages(store: Arc<InMemoryStore>) {
    let publisher = publisher(&store);
    let token = CancellationToken::new();

    publisher
        .publish(&RecipeRemoved::new(r1()), &token)
        .await
        .expect("first run");
    let after_first = store.messages();
    publisher
        .publish(&RecipeRemoved::new(r1()), &token)
        .await
        .expect("second run");

    assert_eq!(store.messages(), after_first);
}

#[rstest]
#[tokio::test]
async fn pruning_then_rerunning_finds_nothing_more(store: Arc<InMemoryStore>) {
    let publisher = publisher(&store);
    let token = CancellationToken::new();

    publisher
        .publish(&RecipeRemoved::new(r1()), &token)
        .await
        .expect("cascade");
    assert_eq!(store.prune_recipe(&r1()), 1);
    publisher
        .publish(&RecipeRemoved::new(r1()), &token)
        .await
        .expect("rerun");

    let survivors = store.messages();
    assert_eq!(ids(&survivors), ["msg2", "msg3", "msg4", "msg5"]);
    let msg2 = survivors.first().expect("msg2 survives");
    assert_eq!(
        msg2.recipe_ids(),
        Some(&[RecipeId::new("r2").expect("valid recipe id")][..])
    );
}

/// Store whose recipe index also returns messages without recipes.
struct LeakyIndex(InMemoryStore);

#[async_trait]
impl MessageRepository for LeakyIndex {
    async fn messages_with_recipe(
        &self,
        _recipe_id: &RecipeId,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(self.0.messages())
    }

    async fn delete(
        &self,
        message: &Message,
        cancellation: &CancellationToken,
    ) -> Result<bool, MessageRepositoryError> {
        self.0.delete(message, cancellation).await
    }
}

fn leaky_index() -> Arc<LeakyIndex> {
    Arc::new(LeakyIndex(InMemoryStore::with_messages([
        text_message("msg0", "u2", "hello"),
        recipe_message("msg1", &["r1"], ""),
    ])))
}

#[rstest]
#[tokio::test]
async fn skip_and_log_still_deletes_orphans_past_a_stray_message() {
    let repo = leaky_index();
    let cascade = RecipeRemovedCascade::new(Arc::clone(&repo));

    cascade
        .cascade(&r1(), &CancellationToken::new())
        .await
        .expect("stray message is skipped");

    assert_eq!(ids(&repo.0.messages()), ["msg0"]);
}

#[rstest]
#[tokio::test]
async fn fail_fast_stops_at_a_stray_message() {
    let repo = leaky_index();
    let cascade =
        RecipeRemovedCascade::new(Arc::clone(&repo)).with_policy(IntegrityPolicy::FailFast);

    let error = cascade
        .cascade(&r1(), &CancellationToken::new())
        .await
        .expect_err("integrity violation");

    assert_eq!(error.code(), ErrorCode::DataIntegrity);
    assert_eq!(ids(&repo.0.messages()), ["msg0", "msg1"]);
}

#[rstest]
#[tokio::test]
async fn cancelled_event_changes_nothing(store: Arc<InMemoryStore>) {
    let token = CancellationToken::new();
    token.cancel();

    let error = publisher(&store)
        .publish(&RecipeRemoved::new(r1()), &token)
        .await
        .expect_err("cancelled");

    assert_eq!(error.code(), ErrorCode::Cancelled);
    assert_eq!(store.messages().len(), 5);
}

#[rstest]
#[tokio::test]
async fn snapshot_round_trip_applies_the_cascade(store: Arc<InMemoryStore>) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("messages.json");
    write_messages(&path, &store.messages(), false).expect("write snapshot");

    let reloaded = Arc::new(InMemoryStore::with_messages(
        load_messages(&path).expect("load snapshot"),
    ));
    publisher(&reloaded)
        .publish(&RecipeRemoved::new(r1()), &CancellationToken::new())
        .await
        .expect("cascade succeeds");
    write_messages(&path, &reloaded.messages(), true).expect("rewrite snapshot");

    let survivors = load_messages(&path).expect("reload survivors");
    assert_eq!(ids(&survivors), ["msg2", "msg3", "msg4", "msg5"]);
}
