//! In-Memory DocumentStore
//!
//! Instance-owned maps behind a single `tokio::sync::RwLock`. Each compound
//! write runs under one write guard, which makes it atomic with respect to
//! every other store call.
//!
//! Besides serving as the default embedded store, it can simulate a slow or
//! failing backend for tests via [`InMemoryStore::with_latency`] and
//! [`InMemoryStore::set_fail_writes`].

use crate::db::{DocumentStore, StoreError};
use crate::models::{
    next_position, Activity, Comment, Label, Page, PageVersion, RecentVisit, Space, SpaceStatus,
    Template,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// A record tagged with its insertion sequence number
#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    record: T,
}

#[derive(Debug, Default)]
struct StoreState {
    next_seq: u64,
    spaces: HashMap<String, Stored<Space>>,
    pages: HashMap<String, Stored<Page>>,
    versions: HashMap<String, Vec<PageVersion>>,
    labels: HashMap<String, Label>,
    /// page id → attached label ids
    page_labels: HashMap<String, HashSet<String>>,
    templates: HashMap<String, Stored<Template>>,
    comments: HashMap<String, Stored<Comment>>,
    /// append order
    activity: Vec<Activity>,
    /// least recent first
    visits: Vec<RecentVisit>,
}

impl StoreState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn add_page(&mut self, page: Page) -> Result<Page, StoreError> {
        if self.pages.contains_key(&page.id) {
            return Err(StoreError::duplicate_key(format!("page {}", page.id)));
        }
        let seq = self.next_seq();
        self.pages.insert(
            page.id.clone(),
            Stored {
                seq,
                record: page.clone(),
            },
        );
        Ok(page)
    }

    /// Copy the placement of `page` onto its stored record
    fn place_page(&mut self, page: Page) {
        let Some(stored) = self.pages.get_mut(&page.id) else {
            return;
        };
        let record = &mut stored.record;
        if record.space_id != page.space_id {
            record.slug = page.slug;
        }
        record.space_id = page.space_id;
        record.parent_id = page.parent_id;
        record.position = page.position;
        record.updated_by = page.updated_by;
        record.updated_at = page.updated_at;
    }
}

/// Sort stored records by insertion order and unwrap them
fn in_insertion_order<'a, T: Clone + 'a>(records: impl Iterator<Item = &'a Stored<T>>) -> Vec<T> {
    let mut stored: Vec<&Stored<T>> = records.collect();
    stored.sort_by_key(|s| s.seq);
    stored.into_iter().map(|s| s.record.clone()).collect()
}

/// Map-backed store owned by whoever constructs it
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    fail_writes: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            fail_writes: AtomicBool::new(false),
            latency: None,
        }
    }

    /// Delay every call by `latency` to mimic a network-backed store
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn before_write(&self, operation: &str) -> Result<(), StoreError> {
        self.simulate_latency().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(format!(
                "simulated failure during {}",
                operation
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_space(&self, space: Space) -> Result<Space, StoreError> {
        self.before_write("insert_space").await?;
        let mut state = self.state.write().await;
        if state.spaces.contains_key(&space.id) {
            return Err(StoreError::duplicate_key(format!("space {}", space.id)));
        }
        let seq = state.next_seq();
        state.spaces.insert(
            space.id.clone(),
            Stored {
                seq,
                record: space.clone(),
            },
        );
        Ok(space)
    }

    async fn get_space(&self, id: &str) -> Result<Option<Space>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(state.spaces.get(id).map(|s| s.record.clone()))
    }

    async fn find_space_by_key(&self, key: &str) -> Result<Option<Space>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut matches = in_insertion_order(state.spaces.values())
            .into_iter()
            .filter(|space| space.key == key)
            .collect::<Vec<_>>();
        // Prefer a live space over a soft-deleted one with the same key
        matches.sort_by_key(|space| space.status == SpaceStatus::Deleted);
        Ok(matches.into_iter().next())
    }

    async fn list_spaces(&self) -> Result<Vec<Space>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut spaces = in_insertion_order(state.spaces.values());
        spaces.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(spaces)
    }

    async fn replace_space(&self, space: Space) -> Result<Option<Space>, StoreError> {
        self.before_write("replace_space").await?;
        let mut state = self.state.write().await;
        match state.spaces.get_mut(&space.id) {
            Some(stored) => {
                stored.record = space.clone();
                Ok(Some(space))
            }
            None => Ok(None),
        }
    }

    async fn insert_page(&self, page: Page) -> Result<Page, StoreError> {
        self.before_write("insert_page").await?;
        let mut state = self.state.write().await;
        state.add_page(page)
    }

    async fn insert_page_at_end(&self, mut page: Page) -> Result<Page, StoreError> {
        self.before_write("insert_page_at_end").await?;
        let mut state = self.state.write().await;
        page.position = next_position(
            state
                .pages
                .values()
                .map(|s| &s.record)
                .filter(|p| p.space_id == page.space_id && p.parent_id == page.parent_id)
                .map(|p| p.position),
        );
        state.add_page(page)
    }

    async fn get_page(&self, id: &str) -> Result<Option<Page>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(state.pages.get(id).map(|s| s.record.clone()))
    }

    async fn list_pages_in_space(&self, space_id: &str) -> Result<Vec<Page>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(in_insertion_order(
            state
                .pages
                .values()
                .filter(|s| s.record.space_id == space_id),
        ))
    }

    async fn list_all_pages(&self) -> Result<Vec<Page>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(in_insertion_order(state.pages.values()))
    }

    async fn commit_page_revision(
        &self,
        page: Page,
        message: Option<String>,
        expected_version: Option<i64>,
    ) -> Result<Option<Page>, StoreError> {
        self.before_write("commit_page_revision").await?;
        let mut state = self.state.write().await;

        let Some(stored) = state.pages.get_mut(&page.id) else {
            return Ok(None);
        };

        let record = &mut stored.record;
        if let Some(expected) = expected_version {
            if expected != record.version {
                return Err(StoreError::version_mismatch(
                    page.id,
                    expected,
                    record.version,
                ));
            }
        }

        // Placement stays as stored; moves go through replace_pages
        record.title = page.title;
        record.slug = page.slug;
        record.content = page.content;
        record.status = page.status;
        record.published_at = page.published_at;
        record.updated_by = page.updated_by;
        record.updated_at = page.updated_at;
        record.version += 1;
        let committed = record.clone();

        let snapshot = PageVersion::snapshot(&committed, message);
        state
            .versions
            .entry(committed.id.clone())
            .or_default()
            .push(snapshot);

        Ok(Some(committed))
    }

    async fn replace_pages(&self, pages: Vec<Page>) -> Result<(), StoreError> {
        self.before_write("replace_pages").await?;
        let mut state = self.state.write().await;

        if let Some(missing) = pages.iter().find(|p| !state.pages.contains_key(&p.id)) {
            return Err(StoreError::write_failed(format!(
                "replace_pages: page {} does not exist",
                missing.id
            )));
        }

        for page in pages {
            state.place_page(page);
        }
        Ok(())
    }

    async fn remove_page(&self, id: &str, reparented: Vec<Page>) -> Result<bool, StoreError> {
        self.before_write("remove_page").await?;
        let mut state = self.state.write().await;

        if !state.pages.contains_key(id) {
            return Ok(false);
        }
        if let Some(missing) = reparented
            .iter()
            .find(|p| !state.pages.contains_key(&p.id))
        {
            return Err(StoreError::write_failed(format!(
                "remove_page: reparented page {} does not exist",
                missing.id
            )));
        }

        for page in reparented {
            state.place_page(page);
        }

        state.pages.remove(id);
        state.versions.remove(id);
        state.page_labels.remove(id);
        state.comments.retain(|_, c| c.record.page_id != id);
        state.visits.retain(|v| v.page_id != id);
        Ok(true)
    }

    async fn list_versions(&self, page_id: &str) -> Result<Vec<PageVersion>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(state.versions.get(page_id).cloned().unwrap_or_default())
    }

    async fn insert_label(&self, label: Label) -> Result<Label, StoreError> {
        self.before_write("insert_label").await?;
        let mut state = self.state.write().await;
        if state.labels.contains_key(&label.id) {
            return Err(StoreError::duplicate_key(format!("label {}", label.id)));
        }
        state.labels.insert(label.id.clone(), label.clone());
        Ok(label)
    }

    async fn get_label(&self, id: &str) -> Result<Option<Label>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(state.labels.get(id).cloned())
    }

    async fn list_labels(&self, space_id: &str) -> Result<Vec<Label>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut labels: Vec<Label> = state
            .labels
            .values()
            .filter(|l| l.space_id == space_id)
            .cloned()
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(labels)
    }

    async fn attach_label(&self, page_id: &str, label_id: &str) -> Result<bool, StoreError> {
        self.before_write("attach_label").await?;
        let mut state = self.state.write().await;
        Ok(state
            .page_labels
            .entry(page_id.to_string())
            .or_default()
            .insert(label_id.to_string()))
    }

    async fn detach_label(&self, page_id: &str, label_id: &str) -> Result<bool, StoreError> {
        self.before_write("detach_label").await?;
        let mut state = self.state.write().await;
        Ok(state
            .page_labels
            .get_mut(page_id)
            .is_some_and(|ids| ids.remove(label_id)))
    }

    async fn labels_for_page(&self, page_id: &str) -> Result<Vec<Label>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut labels: Vec<Label> = state
            .page_labels
            .get(page_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.labels.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(labels)
    }

    async fn pages_with_label(&self, label_id: &str) -> Result<Vec<String>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut page_ids: Vec<String> = state
            .page_labels
            .iter()
            .filter(|(_, ids)| ids.contains(label_id))
            .map(|(page_id, _)| page_id.clone())
            .collect();
        page_ids.sort();
        Ok(page_ids)
    }

    async fn insert_template(&self, template: Template) -> Result<Template, StoreError> {
        self.before_write("insert_template").await?;
        let mut state = self.state.write().await;
        if state.templates.contains_key(&template.id) {
            return Err(StoreError::duplicate_key(format!("template {}", template.id)));
        }
        let seq = state.next_seq();
        state.templates.insert(
            template.id.clone(),
            Stored {
                seq,
                record: template.clone(),
            },
        );
        Ok(template)
    }

    async fn get_template(&self, id: &str) -> Result<Option<Template>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(state.templates.get(id).map(|s| s.record.clone()))
    }

    async fn list_templates(&self) -> Result<Vec<Template>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut templates = in_insertion_order(state.templates.values());
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn delete_template(&self, id: &str) -> Result<bool, StoreError> {
        self.before_write("delete_template").await?;
        let mut state = self.state.write().await;
        Ok(state.templates.remove(id).is_some())
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment, StoreError> {
        self.before_write("insert_comment").await?;
        let mut state = self.state.write().await;
        if state.comments.contains_key(&comment.id) {
            return Err(StoreError::duplicate_key(format!("comment {}", comment.id)));
        }
        let seq = state.next_seq();
        state.comments.insert(
            comment.id.clone(),
            Stored {
                seq,
                record: comment.clone(),
            },
        );
        Ok(comment)
    }

    async fn get_comment(&self, id: &str) -> Result<Option<Comment>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(state.comments.get(id).map(|s| s.record.clone()))
    }

    async fn replace_comment(&self, mut comment: Comment) -> Result<Option<Comment>, StoreError> {
        self.before_write("replace_comment").await?;
        let mut state = self.state.write().await;
        match state.comments.get_mut(&comment.id) {
            Some(stored) => {
                comment.updated_at = Utc::now();
                stored.record = comment.clone();
                Ok(Some(comment))
            }
            None => Ok(None),
        }
    }

    async fn list_comments(&self, page_id: &str) -> Result<Vec<Comment>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(in_insertion_order(
            state
                .comments
                .values()
                .filter(|s| s.record.page_id == page_id),
        ))
    }

    async fn delete_comment(&self, id: &str) -> Result<bool, StoreError> {
        self.before_write("delete_comment").await?;
        let mut state = self.state.write().await;
        if state.comments.remove(id).is_none() {
            return Ok(false);
        }

        // Cascade to replies (and replies of replies)
        let mut removed = vec![id.to_string()];
        while let Some(parent) = removed.pop() {
            let replies: Vec<String> = state
                .comments
                .values()
                .filter(|s| s.record.parent_comment_id.as_deref() == Some(parent.as_str()))
                .map(|s| s.record.id.clone())
                .collect();
            for reply in replies {
                state.comments.remove(&reply);
                removed.push(reply);
            }
        }
        Ok(true)
    }

    async fn append_activity(&self, activity: Activity) -> Result<(), StoreError> {
        self.before_write("append_activity").await?;
        let mut state = self.state.write().await;
        state.activity.push(activity);
        Ok(())
    }

    async fn list_activity(
        &self,
        space_id: &str,
        limit: usize,
    ) -> Result<Vec<Activity>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(state
            .activity
            .iter()
            .rev()
            .filter(|a| a.space_id == space_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn upsert_visit(&self, visit: RecentVisit) -> Result<(), StoreError> {
        self.before_write("upsert_visit").await?;
        let mut state = self.state.write().await;
        state
            .visits
            .retain(|v| !(v.user_id == visit.user_id && v.page_id == visit.page_id));
        state.visits.push(visit);
        Ok(())
    }

    async fn list_visits(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<RecentVisit>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(state
            .visits
            .iter()
            .rev()
            .filter(|v| v.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
