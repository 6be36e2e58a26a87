use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

pub(crate) const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Success,
    Error,
}

/// A short lived notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub(crate) message: String,
    pub(crate) kind: ToastKind,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub(crate) struct Toasts {
    toasts: VecDeque<Toast>,
}

impl Toasts {
    pub(crate) fn push<S: Into<String>>(&mut self, kind: ToastKind, message: S) {
        self.push_at(kind, message, Instant::now());
    }

    fn push_at<S: Into<String>>(&mut self, kind: ToastKind, message: S, now: Instant) {
        self.toasts.push_back(Toast { message: message.into(), kind, expires_at: now + TOAST_DURATION });
    }

    /// Drop every toast that expired by `now`, returning whether any was dropped.
    pub(crate) fn expire(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.expires_at > now);
        before != self.toasts.len()
    }

    /// The most recent toast that's still visible.
    pub(crate) fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    #[cfg(test)]
    pub(crate) fn messages(&self) -> Vec<&str> {
        self.toasts.iter().map(|toast| toast.message.as_str()).collect()
    }
}
