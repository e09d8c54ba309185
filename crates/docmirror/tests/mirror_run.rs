//! End-to-end mirror runs against the in-memory channel and stores.

use std::sync::Arc;

use proptest::prelude::*;

use docmirror::channel::{CallCounts, Channel, MemoryChannel};
use docmirror::core::ChunkError;
use docmirror::store::{
    IdFormat, IdentifierStore, MemoryStore, SaveOutcome, StorageBackend, StorageConfig,
};
use docmirror::{Mirror, MirrorConfig, MirrorError, PublishError, RunOutcome};
use docmirror_testkit::generators::document;
use docmirror_testkit::{paragraphs, MirrorFixture, SAMPLE_DOCUMENT};

fn mirror(fixture: &MirrorFixture) -> Mirror<Arc<MemoryChannel>, Arc<MemoryStore>> {
    let config = MirrorConfig::new(fixture.document_path()).with_output_file(fixture.output_path());
    Mirror::new(fixture.channel.clone(), fixture.store.clone(), config)
}

#[tokio::test]
async fn unchanged_document_is_a_no_op() {
    let fixture = MirrorFixture::with_document(SAMPLE_DOCUMENT);

    let first = mirror(&fixture).run().await.unwrap();
    assert!(matches!(first, RunOutcome::Published { .. }));
    fixture.channel.reset_counts().await;

    let second = mirror(&fixture).run().await.unwrap();
    assert_eq!(second, RunOutcome::Unchanged);

    let counts = fixture.channel.counts().await;
    assert_eq!(counts.fetch, 1);
    assert_eq!(counts.mutations(), 0);
    assert_eq!(fixture.store.save_count().await, 1);
}

#[tokio::test]
async fn block_count_change_republishes() {
    let fixture = MirrorFixture::with_document(&paragraphs(3, 1500));
    let prior = fixture.seed(&["old one", "old two"]).await;

    let outcome = mirror(&fixture).run().await.unwrap();

    let ids = match outcome {
        RunOutcome::Published { ids, retired, saved } => {
            assert_eq!(retired.deleted.len(), 2);
            assert_eq!(saved, SaveOutcome::Saved);
            ids
        }
        other => panic!("expected Published, got {:?}", other),
    };
    assert_eq!(ids.len(), 3);
    assert_eq!(fixture.store.ids().await, ids);

    let counts = fixture.channel.counts().await;
    assert_eq!(counts.send, 3);
    assert_eq!(counts.delete, 2);
    for id in &prior {
        assert_eq!(fixture.channel.content_of(id).await, None);
    }
}

#[tokio::test]
async fn edited_document_replaces_messages() {
    let fixture = MirrorFixture::with_document("first version");
    mirror(&fixture).run().await.unwrap();
    let before = fixture.store.ids().await;

    fixture.write_document("second version");
    mirror(&fixture).run().await.unwrap();

    assert_eq!(fixture.live_contents().await, vec!["second version"]);
    assert_ne!(fixture.store.ids().await, before);
}

#[tokio::test]
async fn failed_send_rolls_back_and_saves_nothing() {
    let fixture = MirrorFixture::with_document(&paragraphs(3, 1500));
    let prior = fixture.seed(&["old"]).await;
    fixture.channel.fail_send_attempt(2).await;

    let err = mirror(&fixture).run().await.unwrap_err();
    assert!(matches!(err, MirrorError::PublishFailed(_)), "{}", err);

    let counts = fixture.channel.counts().await;
    assert_eq!(counts.send, 2);
    assert_eq!(fixture.channel.sent().await.len(), 1);
    assert_eq!(counts.delete, 1);
    assert_eq!(fixture.channel.deleted().await, fixture.channel.sent().await);

    // Only the seed save happened, the old message is still there.
    assert_eq!(fixture.store.save_count().await, 1);
    assert_eq!(fixture.store.ids().await, prior);
    assert_eq!(fixture.live_contents().await, vec!["old"]);
    assert_eq!(fixture.output(), None);
}

#[tokio::test]
async fn oversized_paragraph_fails_before_any_traffic() {
    let fixture = MirrorFixture::with_document(&format!("ok\n\n{}", "x".repeat(2001)));
    fixture.seed(&["old"]).await;

    let err = mirror(&fixture).run().await.unwrap_err();
    match err {
        MirrorError::Chunk(ChunkError::BlockTooLarge { index, length, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(length, 2001);
        }
        other => panic!("expected BlockTooLarge, got {:?}", other),
    }
    assert_eq!(fixture.channel.counts().await, CallCounts::default());
}

#[tokio::test]
async fn unreadable_prior_message_fails_the_run() {
    let fixture = MirrorFixture::with_document("doc");
    let prior = fixture.seed(&["doc"]).await;
    fixture.channel.fail_fetch(&prior[0]).await;

    let err = mirror(&fixture).run().await.unwrap_err();
    assert!(matches!(
        err,
        MirrorError::Publish(PublishError::Fetch { ref id, .. }) if id == &prior[0]
    ));
    assert_eq!(fixture.channel.counts().await.mutations(), 0);
}

#[tokio::test]
async fn failed_retirement_does_not_fail_the_run() {
    let fixture = MirrorFixture::with_document("new");
    let prior = fixture.seed(&["old"]).await;
    fixture.channel.fail_delete(&prior[0]).await;

    let outcome = mirror(&fixture).run().await.unwrap();
    match outcome {
        RunOutcome::Published { retired, .. } => {
            assert!(retired.deleted.is_empty());
            assert_eq!(retired.failed.len(), 1);
        }
        other => panic!("expected Published, got {:?}", other),
    }
    assert_eq!(fixture.store.ids().await.len(), 1);
}

#[tokio::test]
async fn failed_save_fails_the_run_after_publishing() {
    let fixture = MirrorFixture::with_document("doc");
    fixture.store.fail_saves().await;

    let err = mirror(&fixture).run().await.unwrap_err();
    assert!(matches!(err, MirrorError::Store(_)));
    assert_eq!(fixture.live_contents().await, vec!["doc"]);
    // The output file is written before the save.
    assert!(fixture.output().is_some());
}

#[tokio::test]
async fn output_file_lists_new_ids() {
    let fixture = MirrorFixture::with_document(&paragraphs(2, 1500));
    mirror(&fixture).run().await.unwrap();

    let ids = fixture.channel.sent().await;
    assert_eq!(fixture.output().unwrap(), IdFormat::Lines.encode(&ids));
    assert_eq!(fixture.output().unwrap().lines().count(), 2);
}

#[tokio::test]
async fn tracking_message_backend_settles() {
    let fixture = MirrorFixture::with_document(SAMPLE_DOCUMENT);
    let tracking = fixture.channel.insert("").await;
    let channel: Arc<dyn Channel> = fixture.channel.clone();

    let run = || {
        let store = StorageBackend::from_config(
            StorageConfig::TrackingMessage {
                message_id: Some(tracking.clone()),
            },
            channel.clone(),
        );
        Mirror::new(channel.clone(), store, MirrorConfig::new(fixture.document_path()))
    };

    let first = run().run().await.unwrap();
    let ids = match first {
        RunOutcome::Published { ids, saved, .. } => {
            assert_eq!(saved, SaveOutcome::Saved);
            ids
        }
        other => panic!("expected Published, got {:?}", other),
    };
    assert_eq!(
        fixture.channel.content_of(&tracking).await,
        Some(IdFormat::CommaList.encode(&ids))
    );

    assert_eq!(run().run().await.unwrap(), RunOutcome::Unchanged);
}

#[tokio::test]
async fn blob_artifact_backend_settles() {
    let fixture = MirrorFixture::with_document(&paragraphs(2, 1500));
    let channel: Arc<dyn Channel> = fixture.channel.clone();
    let blobs = fixture.dir().join("blobs");

    let run = || {
        let store = StorageBackend::from_config(
            StorageConfig::BlobArtifact {
                root: blobs.clone(),
                name: "message-ids".into(),
                file_name: "messageIDs.txt".into(),
                retention_days: 90,
            },
            channel.clone(),
        );
        Mirror::new(channel.clone(), store, MirrorConfig::new(fixture.document_path()))
    };

    assert!(matches!(run().run().await.unwrap(), RunOutcome::Published { .. }));
    assert_eq!(run().run().await.unwrap(), RunOutcome::Unchanged);
}

#[tokio::test]
async fn none_backend_always_republishes() {
    let fixture = MirrorFixture::with_document("doc");
    let channel: Arc<dyn Channel> = fixture.channel.clone();

    for _ in 0..2 {
        let store = StorageBackend::from_config(StorageConfig::None, channel.clone());
        assert!(store.load().await.is_empty());
        let outcome = Mirror::new(channel.clone(), store, MirrorConfig::new(fixture.document_path()))
            .run()
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Published { saved: SaveOutcome::NotSaved, .. }
        ));
    }
    // Nothing remembered the first run's message, so it stays behind.
    assert_eq!(fixture.live_contents().await, vec!["doc", "doc"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_document_settles_after_one_publish(doc in document()) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let fixture = MirrorFixture::with_document(&doc);
            let first = mirror(&fixture).run().await.unwrap();
            assert!(matches!(first, RunOutcome::Published { .. }));

            fixture.channel.reset_counts().await;
            assert_eq!(mirror(&fixture).run().await.unwrap(), RunOutcome::Unchanged);
            assert_eq!(fixture.channel.counts().await.mutations(), 0);
        });
    }
}
