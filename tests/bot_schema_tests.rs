mod common;

use std::sync::Arc;

use common::{setup_test_db, RecordingOutbox};
use tokio_test::assert_ok;
use meetup_companion_bot::bot::handlers::BotHandler;
use meetup_companion_bot::flows::candidates::StubCandidateProvider;
use meetup_companion_bot::flows::session::SessionStore;
use meetup_companion_bot::flows::FlowEngine;

#[tokio::test]
async fn update_handler_schema_builds() {
    let (db, _temp_dir) = assert_ok!(setup_test_db().await);

    let outbox = Arc::new(RecordingOutbox::default());
    let engine = Arc::new(FlowEngine::new(
        db.clone(),
        SessionStore::new(),
        Arc::new(StubCandidateProvider::new()),
        outbox.clone(),
    ));

    let handler = BotHandler::new(db, engine, outbox);

    // Building the dptree schema must not panic.
    let _schema = handler.schema();
}
