//! Tests for page hierarchy operations
//!
//! Validates moving (sibling renumbering, cycle rejection, cross-space
//! moves), deleting with reparenting, tree construction and breadcrumbs.

#[cfg(test)]
mod hierarchy_tests {
    use crate::config::EngineConfig;
    use crate::db::{DocumentStore, InMemoryStore};
    use crate::models::{
        CreatePageInput, CreateSpaceInput, MovePageInput, Page, PageStatus, PageTreeNode,
        PageUpdate, Space, SpaceType, ValidationError,
    };
    use crate::services::{ServiceError, TreeError, WikiServices};
    use std::sync::Arc;
    use std::time::Duration;

    /// Helper to create test services
    async fn create_test_services() -> (WikiServices, Arc<InMemoryStore>, Space) {
        let store = Arc::new(InMemoryStore::new());
        let services = WikiServices::new(store.clone(), EngineConfig::default());
        let space = create_space(&services, "ENG").await;
        (services, store, space)
    }

    async fn create_space(services: &WikiServices, key: &str) -> Space {
        services
            .spaces
            .create_space(
                CreateSpaceInput {
                    key: key.to_string(),
                    name: format!("{} space", key),
                    description: String::new(),
                    space_type: SpaceType::Team,
                },
                "u",
            )
            .await
            .unwrap()
    }

    async fn create(services: &WikiServices, space: &Space, title: &str, parent: Option<&Page>) -> Page {
        let mut input = CreatePageInput::new(&space.id, title);
        if let Some(parent) = parent {
            input = input.with_parent(&parent.id);
        }
        services.pages.create_page(input, "u").await.unwrap()
    }

    /// Services over a store slow enough for concurrent calls to interleave
    async fn create_slow_services() -> (WikiServices, Space) {
        let store = Arc::new(InMemoryStore::with_latency(Duration::from_millis(5)));
        let services = WikiServices::new(store, EngineConfig::default());
        let space = create_space(&services, "ENG").await;
        (services, space)
    }

    fn titles(nodes: &[PageTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.title.as_str()).collect()
    }

    fn move_to(parent: Option<&Page>, position: i64) -> MovePageInput {
        MovePageInput {
            target_parent: parent.map(|p| p.id.clone()),
            target_position: position,
            target_space: None,
        }
    }

    #[tokio::test]
    async fn test_tree_example() {
        let (services, _store, space) = create_test_services().await;
        let a = create(&services, &space, "A", None).await;
        create(&services, &space, "B", None).await;
        create(&services, &space, "C", Some(&a)).await;

        let tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(titles(&tree), vec!["A", "B"]);
        assert_eq!(titles(&tree[0].children), vec!["C"]);
        assert!(tree[0].has_children);
    }

    #[tokio::test]
    async fn test_move_to_front_reorders_roots() {
        let (services, store, space) = create_test_services().await;
        create(&services, &space, "First", None).await;
        let second = create(&services, &space, "Second", None).await;
        create(&services, &space, "Third", None).await;

        let moved = services
            .pages
            .move_page(&second.id, move_to(None, 0), "u")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.position, 0);
        // Moves are positional, not content-affecting
        assert_eq!(moved.version, 1);

        let tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(titles(&tree), vec!["Second", "First", "Third"]);

        // Positions stay unique and dense
        let mut positions: Vec<i64> = store
            .list_pages_in_space(&space.id)
            .await
            .unwrap()
            .iter()
            .map(|p| p.position)
            .collect();
        positions.sort();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_move_under_new_parent_clamps_position() {
        let (services, _store, space) = create_test_services().await;
        let parent = create(&services, &space, "Parent", None).await;
        create(&services, &space, "Existing", Some(&parent)).await;
        let loose = create(&services, &space, "Loose", None).await;

        let moved = services
            .pages
            .move_page(&loose.id, move_to(Some(&parent), 99), "u")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some(parent.id.as_str()));
        assert_eq!(moved.position, 1);

        let tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(titles(&tree), vec!["Parent"]);
        assert_eq!(titles(&tree[0].children), vec!["Existing", "Loose"]);
    }

    #[tokio::test]
    async fn test_move_rejects_cycles() {
        let (services, _store, space) = create_test_services().await;
        let a = create(&services, &space, "A", None).await;
        let b = create(&services, &space, "B", Some(&a)).await;
        let c = create(&services, &space, "C", Some(&b)).await;

        let under_self = services
            .pages
            .move_page(&a.id, move_to(Some(&a), 0), "u")
            .await;
        assert!(matches!(
            under_self,
            Err(ServiceError::Validation(ValidationError::CircularReference { .. }))
        ));

        let under_grandchild = services
            .pages
            .move_page(&a.id, move_to(Some(&c), 0), "u")
            .await;
        assert!(matches!(
            under_grandchild,
            Err(ServiceError::Validation(ValidationError::CircularReference { .. }))
        ));

        // Hierarchy untouched
        let tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].subtree_size(), 3);
    }

    #[tokio::test]
    async fn test_move_rejects_missing_parent_and_page() {
        let (services, _store, space) = create_test_services().await;
        let a = create(&services, &space, "A", None).await;

        let result = services
            .pages
            .move_page(
                &a.id,
                MovePageInput {
                    target_parent: Some("missing".to_string()),
                    target_position: 0,
                    target_space: None,
                },
                "u",
            )
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation(ValidationError::InvalidParent(_)))
        ));

        assert!(services
            .pages
            .move_page("missing", move_to(None, 0), "u")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_cross_space_move_carries_subtree() {
        let (services, store, space) = create_test_services().await;
        let other = create_space(&services, "OPS").await;
        create(&services, &other, "Ops Home", None).await;

        let a = create(&services, &space, "A", None).await;
        let b = create(&services, &space, "B", Some(&a)).await;
        let c = create(&services, &space, "C", Some(&b)).await;
        create(&services, &space, "Stays", None).await;

        let moved = services
            .pages
            .move_page(
                &a.id,
                MovePageInput {
                    target_parent: None,
                    target_position: 5,
                    target_space: Some(other.id.clone()),
                },
                "u",
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.space_id, other.id);
        assert_eq!(moved.position, 1);

        for id in [&b.id, &c.id] {
            let page = store.get_page(id).await.unwrap().unwrap();
            assert_eq!(page.space_id, other.id);
        }

        let source_tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(titles(&source_tree), vec!["Stays"]);

        let target_tree = services.pages.build_page_tree(&other.id).await.unwrap();
        assert_eq!(titles(&target_tree), vec!["Ops Home", "A"]);
        assert_eq!(target_tree[1].subtree_size(), 3);
    }

    #[tokio::test]
    async fn test_delete_reparents_children() {
        let (services, store, space) = create_test_services().await;
        let root = create(&services, &space, "Root", None).await;
        let doomed = create(&services, &space, "Doomed", Some(&root)).await;
        create(&services, &space, "Sibling", Some(&root)).await;
        let x = create(&services, &space, "X", Some(&doomed)).await;
        let y = create(&services, &space, "Y", Some(&doomed)).await;
        let grandchild = create(&services, &space, "Grandchild", Some(&x)).await;

        let mut rx = services.subscribe_to_events();
        assert!(services.pages.delete_page(&doomed.id, "u").await.unwrap());

        let tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(titles(&tree), vec!["Root"]);
        // Children appended after the existing siblings, original order kept
        assert_eq!(titles(&tree[0].children), vec!["Sibling", "X", "Y"]);
        // One level of flattening only
        assert_eq!(titles(&tree[0].children[1].children), vec!["Grandchild"]);

        let x_now = store.get_page(&x.id).await.unwrap().unwrap();
        let y_now = store.get_page(&y.id).await.unwrap().unwrap();
        assert_eq!(x_now.parent_id.as_deref(), Some(root.id.as_str()));
        assert!(x_now.position < y_now.position);
        let gc_now = store.get_page(&grandchild.id).await.unwrap().unwrap();
        assert_eq!(gc_now.parent_id.as_deref(), Some(x.id.as_str()));

        let event = rx.recv().await.unwrap();
        match event {
            crate::db::DomainEvent::PageDeleted { id, reparented, .. } => {
                assert_eq!(id, doomed.id);
                assert_eq!(reparented, vec![x.id.clone(), y.id.clone()]);
            }
            other => panic!("unexpected event {:?}", other),
        }

        assert!(!services.pages.delete_page(&doomed.id, "u").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_root_page_promotes_children_to_roots() {
        let (services, _store, space) = create_test_services().await;
        let top = create(&services, &space, "Top", None).await;
        create(&services, &space, "Other", None).await;
        create(&services, &space, "Kid", Some(&top)).await;

        services.pages.delete_page(&top.id, "u").await.unwrap();

        let tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(titles(&tree), vec!["Other", "Kid"]);
    }

    #[tokio::test]
    async fn test_delete_removes_related_records() {
        let (services, store, space) = create_test_services().await;
        let page = create(&services, &space, "Gone", None).await;
        services
            .pages
            .update_page(&page.id, PageUpdate::title("Gone soon"), "u")
            .await
            .unwrap();
        services
            .collaboration
            .add_comment(&page.id, "u", "bye", None)
            .await
            .unwrap();
        services
            .collaboration
            .record_visit("u", &page.id)
            .await
            .unwrap();

        services.pages.delete_page(&page.id, "u").await.unwrap();

        assert!(store.list_versions(&page.id).await.unwrap().is_empty());
        assert!(store.list_comments(&page.id).await.unwrap().is_empty());
        assert!(services
            .collaboration
            .recent_visits("u", None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_archived_parent_promotes_children_in_tree() {
        let (services, _store, space) = create_test_services().await;
        let shelf = create(&services, &space, "Shelf", None).await;
        create(&services, &space, "Book", Some(&shelf)).await;

        services
            .pages
            .update_page(
                &shelf.id,
                PageUpdate::default().with_status(PageStatus::Archived),
                "u",
            )
            .await
            .unwrap();

        let tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(titles(&tree), vec!["Book"]);
    }

    #[tokio::test]
    async fn test_breadcrumbs() {
        let (services, _store, space) = create_test_services().await;
        let a = create(&services, &space, "Docs", None).await;
        let b = create(&services, &space, "Guides", Some(&a)).await;
        let c = create(&services, &space, "Setup", Some(&b)).await;

        let crumbs = services.pages.get_breadcrumbs(&c.id).await.unwrap();
        let crumb_titles: Vec<&str> = crumbs.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(crumb_titles, vec!["Docs", "Guides"]);
        assert_eq!(crumbs[1].slug, "guides");

        assert!(services.pages.get_breadcrumbs(&a.id).await.unwrap().is_empty());
        assert!(services.pages.get_breadcrumbs("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_hierarchy_is_reported() {
        let (services, store, space) = create_test_services().await;
        let a = create(&services, &space, "A", None).await;
        let b = create(&services, &space, "B", Some(&a)).await;

        // Write a cycle directly, bypassing the service's guards
        let mut a_cyclic = store.get_page(&a.id).await.unwrap().unwrap();
        a_cyclic.parent_id = Some(b.id.clone());
        store.replace_pages(vec![a_cyclic]).await.unwrap();

        assert!(matches!(
            services.pages.build_page_tree(&space.id).await,
            Err(ServiceError::Corruption(TreeError::CycleDetected { .. }))
        ));
        assert!(matches!(
            services.pages.get_breadcrumbs(&b.id).await,
            Err(ServiceError::Corruption(TreeError::CycleDetected { .. }))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_positions() {
        let (services, space) = create_slow_services().await;
        let parent = create(&services, &space, "Parent", None).await;

        let (a, b) = tokio::join!(
            services.pages.create_page(
                CreatePageInput::new(&space.id, "A").with_parent(&parent.id),
                "u"
            ),
            services.pages.create_page(
                CreatePageInput::new(&space.id, "B").with_parent(&parent.id),
                "u"
            ),
        );
        let mut positions = vec![a.unwrap().position, b.unwrap().position];
        positions.sort();
        assert_eq!(positions, vec![0, 1]);

        let (c, d) = tokio::join!(
            services
                .pages
                .create_page(CreatePageInput::new(&space.id, "C"), "u"),
            services
                .pages
                .create_page(CreatePageInput::new(&space.id, "D"), "u"),
        );
        let mut positions = vec![c.unwrap().position, d.unwrap().position];
        positions.sort();
        assert_eq!(positions, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_concurrent_move_and_update_both_land() {
        let (services, space) = create_slow_services().await;
        let p1 = create(&services, &space, "P1", None).await;
        let p2 = create(&services, &space, "P2", None).await;

        let (moved, updated) = tokio::join!(
            services.pages.move_page(&p2.id, move_to(Some(&p1), 0), "u"),
            services
                .pages
                .update_page(&p2.id, PageUpdate::title("Renamed"), "u"),
        );
        assert!(moved.unwrap().is_some());
        assert!(updated.unwrap().is_some());

        let page = services.pages.get_page(&p2.id).await.unwrap().unwrap();
        assert_eq!(page.parent_id.as_deref(), Some(p1.id.as_str()));
        assert_eq!(page.position, 0);
        assert_eq!(page.title, "Renamed");
        assert_eq!(page.version, 2);

        let tree = services.pages.build_page_tree(&space.id).await.unwrap();
        assert_eq!(titles(&tree), vec!["P1"]);
        assert_eq!(titles(&tree[0].children), vec!["Renamed"]);
    }
}
