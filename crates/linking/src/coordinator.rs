//! Linking coordinator.
//!
//! One session at a time. A session owns a cancellation token shared by its
//! poll task and its timeout task; ending the session by any path cancels
//! both. Requests already issued are not aborted, but every result is
//! checked against the active session id before it is applied.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError};

use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tribute_gateway::{Gateway, HostCapability};

use crate::error::LinkingError;
use crate::refresher::DashboardRefresher;
use crate::types::{EndReason, LinkingConfig, LinkingEvent, SessionInfo, StartOutcome};

struct ActiveSession {
    id: u64,
    checked: HashSet<String>,
    started_at: Instant,
    deadline: Instant,
    cancel: CancellationToken,
}

struct Shared {
    gateway: Arc<dyn Gateway>,
    host: Arc<dyn HostCapability>,
    refresher: Arc<dyn DashboardRefresher>,
    config: LinkingConfig,
    session: std::sync::Mutex<Option<ActiveSession>>,
    next_id: AtomicU64,
    events_tx: mpsc::Sender<LinkingEvent>,
}

/// Drives channel-linking sessions.
pub struct LinkingCoordinator {
    shared: Arc<Shared>,
    events_rx: Mutex<Option<mpsc::Receiver<LinkingEvent>>>,
}

impl LinkingCoordinator {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        host: Arc<dyn HostCapability>,
        refresher: Arc<dyn DashboardRefresher>,
        config: LinkingConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);
        Self {
            shared: Arc::new(Shared {
                gateway,
                host,
                refresher,
                config,
                session: std::sync::Mutex::new(None),
                next_id: AtomicU64::new(0),
                events_tx,
            }),
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub async fn take_events(&self) -> Option<mpsc::Receiver<LinkingEvent>> {
        self.events_rx.lock().await.take()
    }

    /// Opens the deep link and starts polling for new channels.
    ///
    /// No-op while a session is in progress. If the host cannot open the
    /// link the session is discarded and the error returned.
    pub async fn start_linking(&self) -> Result<StartOutcome, LinkingError> {
        let shared = &self.shared;
        let (id, deadline, cancel) = {
            let mut guard = shared.lock_session();
            if let Some(active) = guard.as_ref() {
                debug!(session = active.id, "linking already in progress");
                return Ok(StartOutcome::AlreadyInProgress);
            }
            let id = shared.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let started_at = Instant::now();
            let deadline = started_at + shared.config.session_timeout();
            let cancel = CancellationToken::new();
            *guard = Some(ActiveSession {
                id,
                checked: HashSet::new(),
                started_at,
                deadline,
                cancel: cancel.clone(),
            });
            (id, deadline, cancel)
        };

        let url = shared.config.deep_link().url();
        if let Err(e) = shared.host.open_external_link(&url) {
            warn!(session = id, %url, error = %e, "failed to open deep link");
            shared.end_session(id, None);
            return Err(e.into());
        }

        info!(session = id, %url, "linking session started");
        shared.emit(LinkingEvent::Started { session: id });

        tokio::spawn(run_timeout(shared.clone(), id, deadline, cancel.clone()));
        tokio::spawn(run_polling(shared.clone(), id, cancel));

        Ok(StartOutcome::Started(id))
    }

    /// Ends the active session, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        let active = self.shared.lock_session().as_ref().map(|s| s.id);
        match active {
            Some(id) => self.shared.end_session(id, Some(EndReason::Cancelled)),
            None => false,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.shared.lock_session().is_some()
    }

    pub fn session(&self) -> SessionInfo {
        match self.shared.lock_session().as_ref() {
            Some(s) => SessionInfo {
                in_progress: true,
                checked_channel_ids: s.checked.clone(),
                started_at: Some(s.started_at),
                deadline: Some(s.deadline),
            },
            None => SessionInfo::default(),
        }
    }
}

impl Drop for LinkingCoordinator {
    fn drop(&mut self) {
        if let Some(active) = self.shared.lock_session().take() {
            active.cancel.cancel();
        }
    }
}

impl Shared {
    fn lock_session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_active(&self, id: u64) -> bool {
        self.lock_session().as_ref().is_some_and(|s| s.id == id)
    }

    /// Ends session `id` if it is still the active one.
    ///
    /// `reason` is `None` when the session never got going and nothing
    /// should be announced.
    fn end_session(&self, id: u64, reason: Option<EndReason>) -> bool {
        let ended = {
            let mut guard = self.lock_session();
            if guard.as_ref().is_some_and(|s| s.id == id) {
                guard.take()
            } else {
                None
            }
        };

        let Some(session) = ended else {
            return false;
        };
        session.cancel.cancel();

        if let Some(reason) = reason {
            info!(
                session = id,
                ?reason,
                checked = session.checked.len(),
                "linking session ended"
            );
            self.emit(LinkingEvent::Ended {
                session: id,
                reason,
            });
        }
        true
    }

    fn emit(&self, event: LinkingEvent) {
        if let Err(e) = self.events_tx.try_send(event) {
            debug!("linking event dropped: {e}");
        }
    }

    /// Claims the unverified channels not yet checked in session `id`.
    fn claim_unchecked(&self, id: u64, channels: &[tribute_protocol::Channel]) -> Vec<String> {
        let mut guard = self.lock_session();
        let Some(session) = guard.as_mut().filter(|s| s.id == id) else {
            return Vec::new();
        };
        channels
            .iter()
            .filter(|c| !c.verified)
            .filter(|c| session.checked.insert(c.id.clone()))
            .map(|c| c.id.clone())
            .collect()
    }

    /// One poll: list channels, verify each new unverified one, refresh
    /// the dashboard after every successful verification.
    async fn poll_once(&self, id: u64) {
        if !self.is_active(id) {
            return;
        }
        let channels = match self.gateway.list_channels().await {
            Ok(channels) => channels,
            Err(e) => {
                warn!(session = id, error = %e, "channel list poll failed");
                return;
            }
        };

        if !self.is_active(id) {
            debug!(session = id, "discarding channel list from ended session");
            return;
        }

        let claimed = self.claim_unchecked(id, &channels);
        if claimed.is_empty() {
            debug!(session = id, listed = channels.len(), "no new channels");
            return;
        }

        for channel_id in claimed {
            if !self.is_active(id) {
                debug!(session = id, %channel_id, "session ended, skipping verification");
                return;
            }
            if let Err(e) = self.gateway.check_channel(&channel_id).await {
                warn!(session = id, %channel_id, error = %e, "channel verification failed");
                continue;
            }
            if !self.is_active(id) {
                debug!(session = id, %channel_id, "discarding verification from ended session");
                return;
            }
            info!(session = id, %channel_id, "channel linked");
            self.emit(LinkingEvent::ChannelLinked {
                session: id,
                channel_id,
            });
            self.refresher.refresh_dashboard().await;
        }
    }
}

async fn run_timeout(shared: Arc<Shared>, id: u64, deadline: Instant, cancel: CancellationToken) {
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep_until(deadline) => {
            shared.end_session(id, Some(EndReason::TimedOut));
        }
    }
}

/// Sequential ticks; a slow poll delays the next one and missed ticks are
/// skipped, so polls never overlap.
async fn run_polling(shared: Arc<Shared>, id: u64, cancel: CancellationToken) {
    let period = shared.config.poll_interval();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        shared.poll_once(id).await;
    }
    debug!(session = id, "linking poll loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::Notify;
    use tribute_gateway::{GatewayError, GatewayFuture, HostError};
    use tribute_protocol::messages::{
        AddBotResponse, CheckChannelResponse, CreateSubscribeRequest, CreateUserResponse,
        MessageResponse, PublishSubscriptionRequest, PublishSubscriptionResponse,
        SetUpPayoutsRequest, UploadVerifiedPassportRequest,
    };
    use tribute_protocol::{Channel, DashboardSnapshot};

    /// Gateway returning a fixed channel list and recording verifications.
    #[derive(Default)]
    struct ChannelGateway {
        channels: StdMutex<Vec<Channel>>,
        checked: StdMutex<Vec<String>>,
        list_calls: AtomicUsize,
        /// When set, `list_channels` waits for a notification before answering.
        list_gate: Option<Arc<Notify>>,
    }

    impl ChannelGateway {
        fn with_channels(channels: Vec<Channel>) -> Self {
            Self {
                channels: StdMutex::new(channels),
                ..Default::default()
            }
        }

        fn checked(&self) -> Vec<String> {
            self.checked.lock().unwrap().clone()
        }
    }

    fn unused<T: Send + 'static>() -> GatewayFuture<'static, T> {
        Box::pin(async { Err(GatewayError::Network("not scripted".into())) })
    }

    impl Gateway for ChannelGateway {
        fn health_check(&self) -> GatewayFuture<'_, serde_json::Value> {
            unused()
        }

        fn get_dashboard(&self) -> GatewayFuture<'_, DashboardSnapshot> {
            unused()
        }

        fn create_user(&self) -> GatewayFuture<'_, CreateUserResponse> {
            unused()
        }

        fn add_bot(&self, _channel_username: &str) -> GatewayFuture<'_, AddBotResponse> {
            unused()
        }

        fn list_channels(&self) -> GatewayFuture<'_, Vec<Channel>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if let Some(gate) = &self.list_gate {
                    gate.notified().await;
                }
                Ok(self.channels.lock().unwrap().clone())
            })
        }

        fn check_channel(&self, channel_id: &str) -> GatewayFuture<'_, CheckChannelResponse> {
            self.checked.lock().unwrap().push(channel_id.to_string());
            Box::pin(async {
                Ok(CheckChannelResponse {
                    status: Some("verified".into()),
                    channel: None,
                })
            })
        }

        fn publish_subscription(
            &self,
            _request: &PublishSubscriptionRequest,
        ) -> GatewayFuture<'_, PublishSubscriptionResponse> {
            unused()
        }

        fn create_subscribe(
            &self,
            _request: &CreateSubscribeRequest,
        ) -> GatewayFuture<'_, MessageResponse> {
            unused()
        }

        fn set_up_payouts(
            &self,
            _request: &SetUpPayoutsRequest,
        ) -> GatewayFuture<'_, MessageResponse> {
            unused()
        }

        fn upload_verified_passport(
            &self,
            _request: &UploadVerifiedPassportRequest,
        ) -> GatewayFuture<'_, MessageResponse> {
            unused()
        }
    }

    #[derive(Default)]
    struct MockHost {
        opened: StdMutex<Vec<String>>,
        fail: bool,
    }

    impl HostCapability for MockHost {
        fn open_external_link(&self, url: &str) -> Result<(), HostError> {
            if self.fail {
                return Err(HostError::Unavailable);
            }
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn read_init_data(&self) -> Option<String> {
            None
        }

        fn is_available(&self) -> bool {
            !self.fail
        }
    }

    #[derive(Default)]
    struct CountingRefresher {
        count: AtomicUsize,
    }

    impl CountingRefresher {
        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    impl DashboardRefresher for CountingRefresher {
        fn refresh_dashboard(&self) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        }
    }

    fn channel(id: &str, verified: bool) -> Channel {
        Channel {
            id: id.into(),
            handle: format!("@{id}_channel"),
            verified,
        }
    }

    struct Fixture {
        gateway: Arc<ChannelGateway>,
        host: Arc<MockHost>,
        refresher: Arc<CountingRefresher>,
        coordinator: LinkingCoordinator,
    }

    fn fixture(gateway: ChannelGateway, host: MockHost) -> Fixture {
        let gateway = Arc::new(gateway);
        let host = Arc::new(host);
        let refresher = Arc::new(CountingRefresher::default());
        let coordinator = LinkingCoordinator::new(
            gateway.clone(),
            host.clone(),
            refresher.clone(),
            LinkingConfig::default(),
        );
        Fixture {
            gateway,
            host,
            refresher,
            coordinator,
        }
    }

    fn drain(rx: &mut mpsc::Receiver<LinkingEvent>) -> Vec<LinkingEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn each_channel_is_verified_once_per_session() {
        let f = fixture(
            ChannelGateway::with_channels(vec![
                channel("a", false),
                channel("b", false),
                channel("c", true),
            ]),
            MockHost::default(),
        );
        let mut events = f.coordinator.take_events().await.unwrap();

        f.coordinator.start_linking().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(f.gateway.list_calls.load(Ordering::SeqCst) >= 5);
        assert_eq!(f.gateway.checked(), vec!["a", "b"]);
        assert_eq!(f.refresher.count(), 2);

        let session = f.coordinator.session();
        assert!(session.in_progress);
        assert_eq!(
            session.checked_channel_ids,
            HashSet::from(["a".to_string(), "b".to_string()])
        );

        let events = drain(&mut events);
        assert_eq!(events[0], LinkingEvent::Started { session: 1 });
        assert_eq!(
            events[1..],
            [
                LinkingEvent::ChannelLinked {
                    session: 1,
                    channel_id: "a".into()
                },
                LinkingEvent::ChannelLinked {
                    session: 1,
                    channel_id: "b".into()
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn session_times_out_without_refresh() {
        let f = fixture(
            ChannelGateway::with_channels(vec![channel("a", true)]),
            MockHost::default(),
        );
        let mut events = f.coordinator.take_events().await.unwrap();

        f.coordinator.start_linking().await.unwrap();
        let deadline = f.coordinator.session().deadline.unwrap();
        assert_eq!(
            deadline - f.coordinator.session().started_at.unwrap(),
            Duration::from_secs(30)
        );

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(f.coordinator.is_in_progress());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!f.coordinator.is_in_progress());
        assert_eq!(f.coordinator.session(), SessionInfo::default());
        assert_eq!(f.refresher.count(), 0);
        assert!(f.gateway.checked().is_empty());

        assert_eq!(
            drain(&mut events).last(),
            Some(&LinkingEvent::Ended {
                session: 1,
                reason: EndReason::TimedOut
            })
        );

        // Polling stops with the session.
        let calls = f.gateway.list_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(f.gateway.list_calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_a_no_op() {
        let f = fixture(ChannelGateway::default(), MockHost::default());

        assert_eq!(
            f.coordinator.start_linking().await.unwrap(),
            StartOutcome::Started(1)
        );
        assert_eq!(
            f.coordinator.start_linking().await.unwrap(),
            StartOutcome::AlreadyInProgress
        );
        assert_eq!(f.host.opened.lock().unwrap().len(), 1);
        assert!(f.host.opened.lock().unwrap()[0].contains("startgroup=true"));
    }

    #[tokio::test(start_paused = true)]
    async fn host_failure_resets_session() {
        let f = fixture(
            ChannelGateway::default(),
            MockHost {
                fail: true,
                ..Default::default()
            },
        );
        let mut events = f.coordinator.take_events().await.unwrap();

        let err = f.coordinator.start_linking().await.unwrap_err();
        assert!(matches!(err, LinkingError::Host(HostError::Unavailable)));
        assert!(!f.coordinator.is_in_progress());
        assert!(drain(&mut events).is_empty());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(f.gateway.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn response_after_cancel_is_discarded() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            ChannelGateway {
                channels: StdMutex::new(vec![channel("a", false)]),
                list_gate: Some(gate.clone()),
                ..Default::default()
            },
            MockHost::default(),
        );
        let mut events = f.coordinator.take_events().await.unwrap();

        f.coordinator.start_linking().await.unwrap();
        // First poll fires at 1.5 s and blocks inside list_channels.
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(f.gateway.list_calls.load(Ordering::SeqCst), 1);

        assert!(f.coordinator.cancel());
        gate.notify_one();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(f.gateway.checked().is_empty());
        assert_eq!(f.refresher.count(), 0);
        assert_eq!(
            drain(&mut events).last(),
            Some(&LinkingEvent::Ended {
                session: 1,
                reason: EndReason::Cancelled
            })
        );
    }

    /// Refresher that takes a minute to finish.
    #[derive(Default)]
    struct SlowRefresher {
        count: AtomicUsize,
    }

    impl DashboardRefresher for SlowRefresher {
        fn refresh_dashboard(&self) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Box::pin(tokio::time::sleep(Duration::from_secs(60)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_tick_stops_remaining_verifications() {
        let gateway = Arc::new(ChannelGateway::with_channels(vec![
            channel("a", false),
            channel("b", false),
        ]));
        let refresher = Arc::new(SlowRefresher::default());
        let coordinator = LinkingCoordinator::new(
            gateway.clone(),
            Arc::new(MockHost::default()),
            refresher.clone(),
            LinkingConfig::default(),
        );

        coordinator.start_linking().await.unwrap();
        // First tick verifies `a`, then blocks in the refresh.
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(gateway.checked(), vec!["a"]);
        assert!(coordinator.is_in_progress());

        assert!(coordinator.cancel());
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(gateway.checked(), vec!["a"]);
        assert_eq!(refresher.count.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_in_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn new_session_rechecks_channels() {
        let f = fixture(
            ChannelGateway::with_channels(vec![channel("a", false)]),
            MockHost::default(),
        );

        f.coordinator.start_linking().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(f.gateway.checked(), vec!["a"]);
        assert!(f.coordinator.cancel());
        assert!(!f.coordinator.cancel());

        assert_eq!(
            f.coordinator.start_linking().await.unwrap(),
            StartOutcome::Started(2)
        );
        assert!(f.coordinator.session().checked_channel_ids.is_empty());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(f.gateway.checked(), vec!["a", "a"]);
        assert_eq!(f.refresher.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_channel_list_is_not_an_error() {
        let f = fixture(ChannelGateway::default(), MockHost::default());

        f.coordinator.start_linking().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(f.coordinator.is_in_progress());
        assert!(f.gateway.checked().is_empty());
    }

    #[tokio::test]
    async fn events_can_only_be_taken_once() {
        let f = fixture(ChannelGateway::default(), MockHost::default());
        assert!(f.coordinator.take_events().await.is_some());
        assert!(f.coordinator.take_events().await.is_none());
    }
}
