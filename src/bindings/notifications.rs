use super::{
    apply_patch, revert_patch, MutationErrors, MutationOutcome, PatchDelta, QueryBinding,
    RollbackPolicy,
};
use crate::error::{ApiError, Result};
use crate::filter::FilterSpec;
use crate::http::ApiClient;
use crate::models::{notifications_from_value, Notification};
use crate::resource::LoadOutcome;
use crate::state::FetchState;
use futures::future::join_all;
use tokio::sync::watch;

#[derive(Clone)]
pub struct NotificationsBinding {
    query: QueryBinding<Vec<Notification>>,
    policy: RollbackPolicy,
    errors: MutationErrors,
}

impl NotificationsBinding {
    pub fn new(client: ApiClient, policy: RollbackPolicy) -> Self {
        let query = QueryBinding::new(client, FilterSpec::new(), |api, _| async move {
            notifications_from_value(api.notifications().list().await?)
        });
        Self {
            query,
            policy,
            errors: MutationErrors::default(),
        }
    }

    pub fn state(&self) -> FetchState<Vec<Notification>> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Vec<Notification>>> {
        self.query.subscribe()
    }

    pub fn mutation_error(&self) -> Option<String> {
        self.errors.get()
    }

    pub async fn mount(&self) -> Option<LoadOutcome> {
        self.query.mount().await
    }

    pub async fn refetch(&self) -> LoadOutcome {
        self.query.refetch().await
    }

    pub fn dispose(&self) {
        self.query.dispose();
    }

    pub fn unread_count(&self) -> usize {
        self.query
            .state()
            .data
            .map(|list| list.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<MutationOutcome> {
        let resource = self.query.resource();
        let generation = resource.generation();
        let Some(patch) = resource
            .update_data(|list| {
                apply_patch(list, id, PatchDelta::MarkRead, generation, |n| n.read = true)
            })
            .flatten()
        else {
            return Ok(MutationOutcome::NotLoaded);
        };
        if patch.before.read {
            return Ok(MutationOutcome::Unchanged);
        }

        match self.query.client().notifications().mark_as_read(id).await {
            Ok(_) => {
                self.errors.clear_for(id);
                Ok(MutationOutcome::Confirmed)
            }
            Err(e) => {
                self.errors.record("mark_as_read", id, &e);
                if self.policy == RollbackPolicy::Restore && resource.generation() == patch.generation {
                    resource.update_data(|list| revert_patch(list, &patch));
                }
                Err(e)
            }
        }
    }

    /// Mark every unread entry, one request each, sent concurrently. Entries
    /// whose request failed are restored individually; the first failure is
    /// returned.
    pub async fn mark_all_as_read(&self) -> Result<()> {
        let resource = self.query.resource();
        let generation = resource.generation();
        let patches = resource
            .update_data(|list| {
                let unread: Vec<String> = list
                    .iter()
                    .filter(|n| !n.read)
                    .map(|n| n.id.clone())
                    .collect();
                unread
                    .iter()
                    .filter_map(|id| {
                        apply_patch(list, id, PatchDelta::MarkRead, generation, |n| n.read = true)
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if patches.is_empty() {
            return Ok(());
        }

        let api = self.query.client();
        let results = join_all(
            patches
                .iter()
                .map(|p| async move { api.notifications().mark_as_read(&p.target).await }),
        )
        .await;

        let mut first_err: Option<ApiError> = None;
        for (patch, res) in patches.iter().zip(results) {
            if let Err(e) = res {
                self.errors.record("mark_as_read", &patch.target, &e);
                if self.policy == RollbackPolicy::Restore && resource.generation() == patch.generation {
                    resource.update_data(|list| revert_patch(list, patch));
                }
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Remove the entry locally, then `DELETE` it. On failure it goes back
    /// at its old position.
    pub async fn delete(&self, id: &str) -> Result<MutationOutcome> {
        let resource = self.query.resource();
        let generation = resource.generation();
        let Some(patch) = resource
            .update_data(|list| apply_patch(list, id, PatchDelta::Remove, generation, |_| {}))
            .flatten()
        else {
            return Ok(MutationOutcome::NotLoaded);
        };

        match self.query.client().notifications().delete(id).await {
            Ok(_) => {
                self.errors.clear_for(id);
                Ok(MutationOutcome::Confirmed)
            }
            Err(e) => {
                self.errors.record("delete", id, &e);
                if self.policy == RollbackPolicy::Restore && resource.generation() == patch.generation {
                    resource.update_data(|list| revert_patch(list, &patch));
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::testing::{scripted, Reply};
    use crate::http::Method;
    use serde_json::json;

    fn inbox() -> serde_json::Value {
        json!({"notifications": [
            {"id": "a", "title": "Outbid", "type": "auction", "read": false},
            {"id": "b", "title": "Sold", "type": "sale", "is_read": true},
            {"id": "c", "title": "New follower", "read": false}
        ]})
    }

    #[tokio::test]
    async fn unread_and_mark_one() {
        let (client, script) = scripted();
        script.on(Method::Get, "/notifications", Reply::Json(200, inbox()));
        script.on(Method::Put, "/notifications/a/read", Reply::Json(200, json!({"message": "ok"})));

        let b = NotificationsBinding::new(client, RollbackPolicy::Restore);
        b.mount().await;
        assert_eq!(b.unread_count(), 2);
        assert_eq!(b.mark_as_read("a").await, Ok(MutationOutcome::Confirmed));
        assert_eq!(b.unread_count(), 1);

        // already read: no request
        assert_eq!(b.mark_as_read("b").await, Ok(MutationOutcome::Unchanged));
        assert_eq!(b.mark_as_read("zz").await, Ok(MutationOutcome::NotLoaded));
        assert_eq!(script.count(Method::Put, "/notifications/b/read"), 0);
    }

    #[tokio::test]
    async fn mark_all_restores_only_failed() {
        let (client, script) = scripted();
        script.on(Method::Get, "/notifications", Reply::Json(200, inbox()));
        script.on(Method::Put, "/notifications/a/read", Reply::Json(200, json!({})));
        script.on(Method::Put, "/notifications/c/read", Reply::Json(500, json!({"error": "db down"})));

        let b = NotificationsBinding::new(client, RollbackPolicy::Restore);
        b.mount().await;
        let err = b.mark_all_as_read().await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        let list = b.state().data.unwrap();
        let read: Vec<(&str, bool)> = list.iter().map(|n| (n.id.as_str(), n.read)).collect();
        assert_eq!(read, vec![("a", true), ("b", true), ("c", false)]);
    }

    #[tokio::test]
    async fn failed_delete_reinserts_in_place() {
        let (client, script) = scripted();
        script.on(Method::Get, "/notifications", Reply::Json(200, inbox()));
        script.on(Method::Delete, "/notifications/b", Reply::Json(403, json!({"msg": "forbidden"})));

        let b = NotificationsBinding::new(client, RollbackPolicy::Restore);
        b.mount().await;
        assert!(b.delete("b").await.is_err());
        let ids: Vec<String> = b.state().data.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn keep_patched_leaves_deletion() {
        let (client, script) = scripted();
        script.on(Method::Get, "/notifications", Reply::Json(200, inbox()));
        script.on(Method::Delete, "/notifications/b", Reply::Json(403, json!({"msg": "forbidden"})));

        let b = NotificationsBinding::new(client, RollbackPolicy::KeepPatched);
        b.mount().await;
        assert!(b.delete("b").await.is_err());
        assert_eq!(b.state().data.unwrap().len(), 2);
        assert_eq!(b.mutation_error().as_deref(), Some("HTTP 403: forbidden"));
    }
}
