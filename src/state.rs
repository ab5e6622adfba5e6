use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Tri-state container a binding exposes to its view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    /// HTTP status behind `error`, when the backend answered at all.
    pub error_status: Option<u16>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            error_status: None,
        }
    }
}

impl<T> FetchState<T> {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.data.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase(), Phase::Success | Phase::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_fields() {
        let mut s: FetchState<u32> = FetchState::default();
        assert_eq!(s.phase(), Phase::Idle);
        s.loading = true;
        assert_eq!(s.phase(), Phase::Loading);
        s.loading = false;
        s.data = Some(1);
        assert_eq!(s.phase(), Phase::Success);
        assert!(s.is_settled());
        s.data = None;
        s.error = Some("boom".into());
        assert_eq!(s.phase(), Phase::Failed);
    }
}
