//! End-to-end scenarios through the public API
//!
//! Drives spaces, pages, the tree builder, version history, search and the
//! block editor together against an `InMemoryStore`.

#[cfg(test)]
mod wiki_scenarios_tests {
    use anyhow::Result;
    use std::sync::Arc;
    use wikispace_core::editor::{translate_key, Caret, EditIntent, EditorSession, Key, KeyInput};
    use wikispace_core::{
        generate_slug, next_position, BlockKind, ContentBlock, CreatePageInput, CreateSpaceInput,
        EngineConfig, InMemoryStore, MovePageInput, PageStatus, PageUpdate, SearchOptions, Space,
        SpaceType, WikiServices,
    };

    /// Helper to create services over a fresh store with one space
    async fn create_wiki() -> Result<(WikiServices, Space)> {
        let services = WikiServices::new(Arc::new(InMemoryStore::new()), EngineConfig::default());
        let space = services
            .spaces
            .create_space(
                CreateSpaceInput {
                    key: "kb".to_string(),
                    name: "Knowledge Base".to_string(),
                    description: "Shared docs".to_string(),
                    space_type: SpaceType::Documentation,
                },
                "alice",
            )
            .await?;
        Ok((services, space))
    }

    #[test]
    fn test_slug_and_position_helpers() {
        assert_eq!(generate_slug("  Hello, World!! "), "hello-world");
        assert_eq!(generate_slug(&generate_slug("Hello World")), "hello-world");
        assert_eq!(next_position(Vec::<i64>::new()), 0);
        assert_eq!(next_position(vec![0, 4, 2]), 5);
    }

    #[tokio::test]
    async fn test_create_page_scenario() -> Result<()> {
        let (services, space) = create_wiki().await?;
        assert_eq!(space.key, "KB");

        let page = services
            .pages
            .create_page(CreatePageInput::new(&space.id, "Getting Started"), "alice")
            .await?;

        assert_eq!(page.slug, "getting-started");
        assert_eq!(page.position, 0);
        assert_eq!(page.version, 1);
        assert_eq!(page.status, PageStatus::Draft);
        assert_eq!(page.content.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_move_to_front_scenario() -> Result<()> {
        let (services, space) = create_wiki().await?;
        let mut ids = Vec::new();
        for title in ["Zero", "One", "Two"] {
            let page = services
                .pages
                .create_page(CreatePageInput::new(&space.id, title), "alice")
                .await?;
            ids.push(page.id);
        }

        services
            .pages
            .move_page(
                &ids[1],
                MovePageInput {
                    target_parent: None,
                    target_position: 0,
                    target_space: None,
                },
                "alice",
            )
            .await?;

        let tree = services.pages.build_page_tree(&space.id).await?;
        assert_eq!(tree[0].id, ids[1]);
        let positions: Vec<i64> = tree.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_version_history_counts_updates() -> Result<()> {
        let (services, space) = create_wiki().await?;
        let page = services
            .pages
            .create_page(CreatePageInput::new(&space.id, "Changelog"), "alice")
            .await?;

        let k = 4;
        for i in 0..k {
            services
                .pages
                .update_page(
                    &page.id,
                    PageUpdate::content(vec![ContentBlock::new(
                        BlockKind::Paragraph,
                        format!("entry {}", i),
                    )]),
                    "bob",
                )
                .await?;
        }

        let current = services.pages.get_page(&page.id).await?.unwrap();
        assert_eq!(current.version, 1 + k);
        let versions = services.pages.list_versions(&page.id).await?;
        assert_eq!(versions.len(), k as usize);
        assert_eq!(versions[0].version, 1 + k);
        Ok(())
    }

    #[tokio::test]
    async fn test_editor_round_trip() -> Result<()> {
        let (services, space) = create_wiki().await?;
        let page = services
            .pages
            .create_page(CreatePageInput::new(&space.id, "Setup"), "alice")
            .await?;

        let mut session = EditorSession::open(services.pages.clone(), &page.id, "alice")
            .await?
            .unwrap();

        // Only block: deleting is refused
        assert!(!session.apply(EditIntent::Delete(0)));
        assert_eq!(session.state().blocks.len(), 1);

        // Type a slash command and pick the second heading level with the keyboard
        session.apply(EditIntent::Select(0));
        session.apply(EditIntent::set_content(0, "/head"));
        assert_eq!(session.state().slash_menu.query, "head");
        assert_eq!(session.state().slash_menu.highlighted(), 0);
        assert_eq!(session.state().slash_menu.target_index, Some(0));

        let down = translate_key(KeyInput::new(Key::ArrowDown), Caret::at(5), session.state());
        session.apply(down.unwrap());
        let enter = translate_key(KeyInput::new(Key::Enter), Caret::at(5), session.state());
        session.apply(enter.unwrap());

        let heading = &session.state().blocks[0];
        assert_eq!(heading.kind, BlockKind::Heading { level: 2 });
        assert_eq!(heading.content, "");

        session.apply(EditIntent::set_content(0, "Install"));
        let enter = translate_key(KeyInput::new(Key::Enter), Caret::at(7), session.state());
        session.apply(enter.unwrap());
        session.apply(EditIntent::set_content(1, "Run the installer."));

        let published = session.publish().await?;
        assert_eq!(published.status, PageStatus::Published);
        assert_eq!(published.version, 2);

        let details = services
            .pages
            .get_page_by_slug("kb", "setup")
            .await?
            .unwrap();
        assert_eq!(details.page.content.len(), 2);
        assert_eq!(details.page.content[1].content, "Run the installer.");
        Ok(())
    }

    #[tokio::test]
    async fn test_search_across_spaces() -> Result<()> {
        let (services, space) = create_wiki().await?;
        let other = services
            .spaces
            .create_space(
                CreateSpaceInput {
                    key: "OPS".to_string(),
                    name: "Operations".to_string(),
                    description: String::new(),
                    space_type: SpaceType::Team,
                },
                "alice",
            )
            .await?;

        for (space_id, title) in [
            (&space.id, "Deploy guide"),
            (&other.id, "Deploy checklist"),
            (&space.id, "Style guide"),
        ] {
            services
                .pages
                .create_page(
                    CreatePageInput::new(space_id, title).with_content(vec![ContentBlock::new(
                        BlockKind::Paragraph,
                        format!("About {}", title.to_lowercase()),
                    )]),
                    "alice",
                )
                .await?;
        }

        let all = services
            .pages
            .search_pages("DEPLOY", &SearchOptions::default())
            .await?;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.highlight.starts_with("<mark>Deploy</mark>")));

        let scoped = services
            .pages
            .search_pages("deploy", &SearchOptions::in_space(&space.id))
            .await?;
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].excerpt, "About deploy guide");

        services.spaces.delete_space(&other.id, "alice").await?;
        let after_delete = services
            .pages
            .search_pages("deploy", &SearchOptions::default())
            .await?;
        assert_eq!(after_delete.len(), 1);
        Ok(())
    }
}
