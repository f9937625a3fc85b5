//! Tests for the editor save/publish boundary

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::db::{DocumentStore, InMemoryStore};
    use crate::editor::{EditIntent, EditorSession, SaveError};
    use crate::models::{CreatePageInput, CreateSpaceInput, Page, PageStatus, SpaceType};
    use crate::services::{SaveTarget, ServiceError, WikiServices};
    use std::sync::Arc;

    async fn setup_with(config: EngineConfig) -> (WikiServices, Arc<InMemoryStore>, Page) {
        let store = Arc::new(InMemoryStore::new());
        let services = WikiServices::new(store.clone(), config);
        let space = services
            .spaces
            .create_space(
                CreateSpaceInput {
                    key: "DOC".to_string(),
                    name: "Docs".to_string(),
                    description: String::new(),
                    space_type: SpaceType::Team,
                },
                "alice",
            )
            .await
            .unwrap();
        let page = services
            .pages
            .create_page(CreatePageInput::new(&space.id, "Runbook"), "alice")
            .await
            .unwrap();
        (services, store, page)
    }

    async fn setup() -> (WikiServices, Arc<InMemoryStore>, Page) {
        setup_with(EngineConfig::default()).await
    }

    async fn open(services: &WikiServices, page: &Page) -> EditorSession {
        EditorSession::open(services.pages.clone(), &page.id, "alice")
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_missing_page() {
        let (services, _store, _page) = setup().await;
        let session = EditorSession::open(services.pages.clone(), "missing", "alice")
            .await
            .unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_save_persists_whole_document() {
        let (services, store, page) = setup().await;
        let mut session = open(&services, &page).await;

        session.apply(EditIntent::set_content(0, "Step one"));
        session.apply(EditIntent::InsertAfter(0));
        session.apply(EditIntent::set_content(1, "Step two"));
        assert!(session.state().is_dirty);

        let saved = session.save().await.unwrap();
        assert_eq!(saved.version, 2);
        assert_eq!(saved.status, PageStatus::Draft);
        assert!(!session.state().is_dirty);
        assert_eq!(session.loaded_version(), 2);

        let stored = store.get_page(&page.id).await.unwrap().unwrap();
        let texts: Vec<&str> = stored.content.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(texts, vec!["Step one", "Step two"]);
    }

    #[tokio::test]
    async fn test_clean_draft_has_nothing_to_save_but_can_publish() {
        let (services, _store, page) = setup().await;
        let mut session = open(&services, &page).await;

        assert!(matches!(
            session.save().await,
            Err(SaveError::NothingToSave(_))
        ));
        assert!(!session.is_saving());

        let published = session.publish().await.unwrap();
        assert_eq!(published.status, PageStatus::Published);
        assert!(published.published_at.is_some());
        assert_eq!(session.status(), PageStatus::Published);
    }

    #[tokio::test]
    async fn test_second_save_rejected_while_outstanding() {
        let (services, _store, page) = setup().await;
        let mut session = open(&services, &page).await;
        session.apply(EditIntent::set_content(0, "v1"));

        let request = session.begin_save(SaveTarget::Draft).unwrap();
        assert!(session.is_saving());
        assert!(matches!(
            session.begin_save(SaveTarget::Published),
            Err(SaveError::AlreadySaving(_))
        ));

        // Editing continues while the write is outstanding
        assert!(session.apply(EditIntent::set_content(0, "v2")));

        let result = services
            .pages
            .save_blocks(
                &request.page_id,
                request.blocks.clone(),
                request.target,
                request.expected_version,
                "alice",
            )
            .await;
        let saved = session.complete_save(&request, result).unwrap();

        assert_eq!(saved.content[0].content, "v1");
        assert_eq!(session.state().blocks[0].content, "v2");
        // Edits after the snapshot are still unsaved
        assert!(session.state().is_dirty);
        assert!(!session.is_saving());
    }

    #[tokio::test]
    async fn test_stale_completion_is_rejected() {
        let (services, _store, page) = setup().await;
        let mut session = open(&services, &page).await;
        session.apply(EditIntent::set_content(0, "v1"));

        let request = session.begin_save(SaveTarget::Draft).unwrap();
        let result = Ok(Some(page.clone()));
        session.complete_save(&request, result.clone()).unwrap();

        assert_eq!(
            session.complete_save(&request, result),
            Err(SaveError::StaleRequest {
                revision: request.revision
            })
        );
    }

    #[tokio::test]
    async fn test_failed_save_keeps_draft_and_dirty_flag() {
        let (services, store, page) = setup().await;
        let mut session = open(&services, &page).await;
        session.apply(EditIntent::set_content(0, "precious"));
        let blocks_before = session.state().blocks.clone();

        store.set_fail_writes(true);
        let err = session.save().await.unwrap_err();
        assert!(matches!(
            err,
            SaveError::Service(ServiceError::Persistence(_))
        ));
        assert!(err.is_retryable());
        assert_eq!(session.state().blocks, blocks_before);
        assert!(session.state().is_dirty);
        assert_eq!(session.last_error(), Some(&err));
        assert_eq!(session.loaded_version(), 1);

        store.set_fail_writes(false);
        let saved = session.save().await.unwrap();
        assert_eq!(saved.content[0].content, "precious");
        assert!(session.last_error().is_none());
        assert!(!session.state().is_dirty);
    }

    #[tokio::test]
    async fn test_deleted_page_reports_missing() {
        let (services, _store, page) = setup().await;
        let mut session = open(&services, &page).await;
        session.apply(EditIntent::set_content(0, "orphaned"));

        services.pages.delete_page(&page.id, "bob").await.unwrap();

        assert!(matches!(
            session.save().await,
            Err(SaveError::PageMissing(_))
        ));
        assert_eq!(session.state().blocks[0].content, "orphaned");
    }

    #[tokio::test]
    async fn test_last_writer_wins_by_default() {
        let (services, _store, page) = setup().await;
        let mut alice = open(&services, &page).await;
        let mut bob = open(&services, &page).await;

        alice.apply(EditIntent::set_content(0, "alice"));
        bob.apply(EditIntent::set_content(0, "bob"));

        alice.save().await.unwrap();
        let saved = bob.save().await.unwrap();
        assert_eq!(saved.version, 3);
        assert_eq!(saved.content[0].content, "bob");
    }

    #[tokio::test]
    async fn test_conflict_detection_rejects_stale_draft() {
        let config = EngineConfig {
            detect_version_conflicts: true,
            ..EngineConfig::default()
        };
        let (services, _store, page) = setup_with(config).await;
        let mut alice = open(&services, &page).await;
        let mut bob = open(&services, &page).await;

        alice.apply(EditIntent::set_content(0, "alice"));
        bob.apply(EditIntent::set_content(0, "bob"));

        alice.save().await.unwrap();
        let err = bob.save().await.unwrap_err();
        assert_eq!(
            err,
            SaveError::Service(ServiceError::version_conflict(&page.id, 1, 2))
        );
        assert!(!err.is_retryable());
        assert_eq!(bob.state().blocks[0].content, "bob");
        assert!(bob.state().is_dirty);
    }
}
