use crate::error::Result;
use crate::filter::FilterSpec;
use crate::http::{seg, ApiClient};
use serde_json::Value;

pub struct AntiBrushing<'a> {
    pub(super) api: &'a ApiClient,
}

impl AntiBrushing<'_> {
    pub async fn logs(&self) -> Result<Value> {
        self.api.get("/anti-brushing/logs").await
    }

    pub async fn block_user(&self, user_id: &str) -> Result<Value> {
        self.api
            .post(&format!("/anti-brushing/block/{}", seg(user_id)), None)
            .await
    }

    pub async fn unblock_user(&self, user_id: &str) -> Result<Value> {
        self.api
            .post(&format!("/anti-brushing/unblock/{}", seg(user_id)), None)
            .await
    }
}

pub struct ActivityCalendar<'a> {
    pub(super) api: &'a ApiClient,
}

impl ActivityCalendar<'_> {
    pub async fn events(&self, filter: &FilterSpec) -> Result<Value> {
        self.api
            .get_with("/activity-calendar/events", filter.to_query())
            .await
    }

    pub async fn create_event(&self, data: Value) -> Result<Value> {
        self.api.post("/activity-calendar/events", Some(data)).await
    }

    pub async fn update_event(&self, event_id: &str, data: Value) -> Result<Value> {
        self.api
            .put(
                &format!("/activity-calendar/events/{}", seg(event_id)),
                Some(data),
            )
            .await
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<Value> {
        self.api
            .delete(&format!("/activity-calendar/events/{}", seg(event_id)))
            .await
    }

    pub async fn calendars(&self) -> Result<Value> {
        self.api.get("/activity-calendar/calendars").await
    }

    pub async fn create_calendar(&self, data: Value) -> Result<Value> {
        self.api
            .post("/activity-calendar/calendars", Some(data))
            .await
    }
}

pub struct IntentPool<'a> {
    pub(super) api: &'a ApiClient,
}

impl IntentPool<'_> {
    pub async fn list(&self, filter: &FilterSpec) -> Result<Value> {
        self.api
            .get_with("/intent-pool/intents", filter.to_query())
            .await
    }

    pub async fn create(&self, data: Value) -> Result<Value> {
        self.api.post("/intent-pool/intents", Some(data)).await
    }

    pub async fn get(&self, intent_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/intent-pool/intents/{}", seg(intent_id)))
            .await
    }

    pub async fn respond(&self, intent_id: &str, data: Value) -> Result<Value> {
        self.api
            .post(
                &format!("/intent-pool/intents/{}/respond", seg(intent_id)),
                Some(data),
            )
            .await
    }

    pub async fn create_match(&self, intent_id: &str, data: Value) -> Result<Value> {
        self.api
            .post(
                &format!("/intent-pool/intents/{}/match", seg(intent_id)),
                Some(data),
            )
            .await
    }

    pub async fn user_intents(&self, user_id: &str) -> Result<Value> {
        self.api
            .get(&format!("/intent-pool/intents/user/{}", seg(user_id)))
            .await
    }

    pub async fn pools(&self) -> Result<Value> {
        self.api.get("/intent-pool/pools").await
    }

    pub async fn alerts(&self) -> Result<Value> {
        self.api.get("/intent-pool/alerts").await
    }

    pub async fn create_alert(&self, data: Value) -> Result<Value> {
        self.api.post("/intent-pool/alerts", Some(data)).await
    }
}

pub struct Disputes<'a> {
    pub(super) api: &'a ApiClient,
}

impl Disputes<'_> {
    pub async fn submit(&self, data: Value) -> Result<Value> {
        self.api.post("/dispute/disputes", Some(data)).await
    }

    pub async fn list(&self, filter: &FilterSpec) -> Result<Value> {
        self.api
            .get_with("/dispute/disputes", filter.to_query())
            .await
    }

    pub async fn upload_evidence(&self, dispute_id: &str, data: Value) -> Result<Value> {
        self.api
            .post(
                &format!("/dispute/disputes/{}/evidence", seg(dispute_id)),
                Some(data),
            )
            .await
    }

    pub async fn add_message(&self, dispute_id: &str, data: Value) -> Result<Value> {
        self.api
            .post(
                &format!("/dispute/disputes/{}/messages", seg(dispute_id)),
                Some(data),
            )
            .await
    }

    pub async fn assign_mediator(&self, dispute_id: &str, mediator_id: &str) -> Result<Value> {
        self.api
            .post(
                &format!(
                    "/dispute/disputes/{}/assign/{}",
                    seg(dispute_id),
                    seg(mediator_id)
                ),
                None,
            )
            .await
    }

    pub async fn resolve(&self, dispute_id: &str, data: Value) -> Result<Value> {
        self.api
            .post(
                &format!("/dispute/disputes/{}/resolve", seg(dispute_id)),
                Some(data),
            )
            .await
    }

    pub async fn mediators(&self) -> Result<Value> {
        self.api.get("/dispute/mediators").await
    }
}
