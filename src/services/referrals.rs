use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::{ReferralSource, ServiceError};
use crate::models::referrals::{ReferralStats, ACTIVE_REFERRAL_BONUS};
use crate::platform::{Clipboard, Navigator};
use crate::repositories::referrals::ReferralRepository;
use crate::utils::{encode_uri_component, format_currency, format_date};

/// How long the "copied" confirmation stays up after the last copy.
pub const COPIED_WINDOW: Duration = Duration::from_secs(3);

#[async_trait]
impl ReferralSource for ReferralRepository {
    async fn fetch_referral_stats(&self) -> Result<ReferralStats, ServiceError> {
        self.get_referral_stats()
            .await
            .map_err(|e| ServiceError::from_repository("Referrals", e))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ShareChannel {
    Whatsapp,
    Telegram,
}

impl ShareChannel {
    pub fn message(self, stats: &ReferralStats) -> String {
        let code = &stats.referral_code;
        let link = &stats.referral_link;

        match self {
            ShareChannel::Whatsapp => format!(
                "🎯 Venha jogar raspadinhas online comigo no Raspou, Levou! \n\n\
                 🎲 Ganhe prêmios incríveis de até R$ 25.000\n\
                 💰 PIX na conta instantâneo\n\
                 🎁 Use meu código de indicação: {code}\n\n\
                 Cadastre-se aqui: {link}"
            ),
            ShareChannel::Telegram => format!(
                "🎯 Venha jogar raspadinhas online comigo no Raspou, Levou! \n\n\
                 🎲 Ganhe prêmios incríveis de até R$ 25.000\n\
                 💰 PIX na conta instantâneo\n\
                 🎁 Use meu código: {code}\n\n\
                 {link}"
            ),
        }
    }

    pub fn share_url(self, stats: &ReferralStats) -> String {
        let message = encode_uri_component(&self.message(stats));

        match self {
            ShareChannel::Whatsapp => format!("https://wa.me/?text={}", message),
            ShareChannel::Telegram => format!(
                "https://t.me/share/url?url={}&text={}",
                encode_uri_component(&stats.referral_link),
                message
            ),
        }
    }
}

/// Transient "copied" flag. Every flash aborts the previous timer, so only
/// the most recent window can clear the flag.
pub struct CopyIndicator {
    window: Duration,
    generation: u64,
    active: Arc<AtomicU64>,
    timer: Option<JoinHandle<()>>,
}

impl CopyIndicator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            active: Arc::new(AtomicU64::new(0)),
            timer: None,
        }
    }

    /// Raises the flag and schedules its reset on `runtime`.
    pub fn flash(&mut self, runtime: &Handle) {
        self.cancel();

        self.generation += 1;
        let generation = self.generation;
        self.active.store(generation, Ordering::SeqCst);

        let active = self.active.clone();
        let window = self.window;
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(window).await;
            // A newer flash owns the flag if the generation moved on.
            let _ = active.compare_exchange(generation, 0, Ordering::SeqCst, Ordering::SeqCst);
        }));
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) != 0
    }

    fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for CopyIndicator {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Clone, Debug)]
pub enum LoadState {
    Loading,
    Loaded(ReferralStats),
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsCards {
    pub total_earnings: String,
    pub total_referred: String,
    pub active_referred: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferredUserRow {
    pub id: String,
    pub name: String,
    pub date_referred: String,
    pub status: &'static str,
    pub bonus: Option<String>,
}

pub struct ReferralViewModel<S, C, N> {
    source: S,
    clipboard: C,
    navigator: N,
    offset: FixedOffset,
    state: LoadState,
    copied: CopyIndicator,
}

impl<S, C, N> ReferralViewModel<S, C, N>
where
    S: ReferralSource,
    C: Clipboard,
    N: Navigator,
{
    pub fn new(source: S, clipboard: C, navigator: N, offset: FixedOffset) -> Self {
        Self {
            source,
            clipboard,
            navigator,
            offset,
            state: LoadState::Loading,
            copied: CopyIndicator::new(COPIED_WINDOW),
        }
    }

    /// Fetches the referral stats once. Failures are logged and leave the
    /// view empty for the rest of its life.
    pub async fn load(&mut self) {
        if !self.is_loading() {
            log::debug!("Referral stats already requested, skipping.");
            return;
        }

        self.state = match self.source.fetch_referral_stats().await {
            Ok(stats) => {
                if stats.active_referred > stats.total_referred {
                    log::warn!(
                        "Referral stats report {} active out of {} referred users.",
                        stats.active_referred,
                        stats.total_referred
                    );
                }
                log::info!(
                    "Loaded referral stats for code {} ({} referred users).",
                    stats.referral_code,
                    stats.referred_users.len()
                );
                LoadState::Loaded(stats)
            }
            Err(e) => {
                log::error!("Could not fetch referral data: {}", e);
                LoadState::Failed
            }
        };
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn stats(&self) -> Option<&ReferralStats> {
        match &self.state {
            LoadState::Loaded(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn referral_code(&self) -> &str {
        self.stats().map(|s| s.referral_code.as_str()).unwrap_or("")
    }

    pub fn referral_link(&self) -> &str {
        self.stats().map(|s| s.referral_link.as_str()).unwrap_or("")
    }

    pub fn cards(&self) -> StatsCards {
        let (earnings, referred, active) = self
            .stats()
            .map(|s| (s.total_earnings, s.total_referred, s.active_referred))
            .unwrap_or_default();

        StatsCards {
            total_earnings: format_currency(earnings),
            total_referred: referred.to_string(),
            active_referred: active.to_string(),
        }
    }

    pub fn referred_users(&self) -> Vec<ReferredUserRow> {
        let Some(stats) = self.stats() else {
            return Vec::new();
        };

        stats
            .referred_users
            .iter()
            .map(|user| ReferredUserRow {
                id: user.id.clone(),
                name: user.name.clone(),
                date_referred: format_date(&user.date_referred, &self.offset),
                status: if user.is_active { "✅ Ativo" } else { "⏳ Pendente" },
                bonus: user
                    .is_active
                    .then(|| format!("+{}", format_currency(ACTIVE_REFERRAL_BONUS))),
            })
            .collect()
    }

    /// Sum of the per-user bonuses shown in the list, independent of the
    /// server's `total_earnings`.
    pub fn displayed_bonus_total(&self) -> f64 {
        self.stats()
            .map(|s| s.active_users().count() as f64 * ACTIVE_REFERRAL_BONUS)
            .unwrap_or(0.0)
    }

    /// Returns `false` when there is nothing to copy yet.
    pub fn copy_code(&mut self) -> Result<bool, ServiceError> {
        let code = self.stats().map(|s| s.referral_code.clone());
        self.copy(code)
    }

    pub fn copy_link(&mut self) -> Result<bool, ServiceError> {
        let link = self.stats().map(|s| s.referral_link.clone());
        self.copy(link)
    }

    fn copy(&mut self, text: Option<String>) -> Result<bool, ServiceError> {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Ok(false);
        };

        // The flag needs a timer, so refuse before touching the clipboard.
        let runtime = Handle::try_current().map_err(|e| ServiceError::Platform(e.to_string()))?;

        self.clipboard
            .write_text(&text)
            .map_err(|e| ServiceError::Platform(e.to_string()))?;
        self.copied.flash(&runtime);

        Ok(true)
    }

    pub fn is_copied(&self) -> bool {
        self.copied.is_active()
    }

    pub fn share_url(&self, channel: ShareChannel) -> Option<String> {
        self.stats().map(|stats| channel.share_url(stats))
    }

    /// Opens the channel's share page and returns the URL that was opened.
    pub fn share_via(&mut self, channel: ShareChannel) -> Result<String, ServiceError> {
        let url = self.share_url(channel).ok_or(ServiceError::NoData)?;

        self.navigator
            .open(&url)
            .map_err(|e| ServiceError::Platform(e.to_string()))?;
        log::info!("Shared referral link via {:?}.", channel);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::referrals::ReferredUser;
    use crate::utils::brasilia_offset;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct FakeSource {
        stats: Option<ReferralStats>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReferralSource for FakeSource {
        async fn fetch_referral_stats(&self) -> Result<ReferralStats, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.stats.clone().ok_or_else(|| {
                ServiceError::Communication(
                    "Referrals".to_string(),
                    "connection refused".to_string(),
                )
            })
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Clipboard for Recorder {
        fn write_text(&mut self, text: &str) -> Result<(), anyhow::Error> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    impl Navigator for Recorder {
        fn open(&mut self, url: &str) -> Result<(), anyhow::Error> {
            self.0.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn referred(id: &str, name: &str, is_active: bool) -> ReferredUser {
        ReferredUser {
            id: id.to_string(),
            name: name.to_string(),
            date_referred: Utc.with_ymd_and_hms(2024, 6, 9, 14, 0, 0).unwrap(),
            is_active,
        }
    }

    fn sample_stats() -> ReferralStats {
        ReferralStats {
            referral_code: "ABC123".to_string(),
            referral_link: "https://x/r/ABC123".to_string(),
            total_earnings: 20.0,
            total_referred: 2,
            active_referred: 2,
            referred_users: vec![referred("u1", "Ana", true), referred("u2", "Bruno", true)],
        }
    }

    fn view_model(
        stats: Option<ReferralStats>,
    ) -> (ReferralViewModel<FakeSource, Recorder, Recorder>, Recorder, Recorder) {
        let clipboard = Recorder::default();
        let navigator = Recorder::default();
        let vm = ReferralViewModel::new(
            FakeSource {
                stats,
                calls: AtomicUsize::new(0),
            },
            clipboard.clone(),
            navigator.clone(),
            brasilia_offset(),
        );

        (vm, clipboard, navigator)
    }

    #[tokio::test]
    async fn test_loaded_view() {
        let (mut vm, _, navigator) = view_model(Some(sample_stats()));
        assert!(vm.is_loading());

        vm.load().await;

        assert_eq!(
            vm.cards(),
            StatsCards {
                total_earnings: "R$ 20,00".to_string(),
                total_referred: "2".to_string(),
                active_referred: "2".to_string(),
            }
        );

        let url = vm.share_via(ShareChannel::Whatsapp).unwrap();
        assert!(url.starts_with("https://wa.me/?text="));
        assert!(url.contains("ABC123"));
        assert_eq!(navigator.entries(), vec![url]);
    }

    #[tokio::test]
    async fn test_failed_load_renders_empty() {
        let (mut vm, clipboard, _) = view_model(None);

        vm.load().await;

        assert!(matches!(vm.state(), LoadState::Failed));
        assert_eq!(vm.cards().total_earnings, "R$ 0,00");
        assert_eq!(vm.cards().total_referred, "0");
        assert_eq!(vm.referral_code(), "");
        assert!(vm.referred_users().is_empty());
        assert!(!vm.copy_code().unwrap());
        assert!(!vm.is_copied());
        assert!(clipboard.entries().is_empty());
        assert!(matches!(
            vm.share_via(ShareChannel::Telegram),
            Err(ServiceError::NoData)
        ));
    }

    #[tokio::test]
    async fn test_bonus_total_ignores_total_earnings() {
        let mut stats = sample_stats();
        stats.total_earnings = 999.0;
        stats.total_referred = 3;
        stats.referred_users.push(referred("u3", "Carla", false));
        let (mut vm, _, _) = view_model(Some(stats));

        vm.load().await;

        assert_eq!(vm.displayed_bonus_total(), 20.0);
        let rows = vm.referred_users();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].bonus.as_deref(), Some("+R$ 10,00"));
        assert_eq!(rows[0].status, "✅ Ativo");
        assert_eq!(rows[0].date_referred, "09/06/2024");
        assert_eq!(rows[2].bonus, None);
        assert_eq!(rows[2].status, "⏳ Pendente");
    }

    #[test]
    fn test_telegram_url() {
        let url = ShareChannel::Telegram.share_url(&sample_stats());

        assert!(url.starts_with("https://t.me/share/url?url=https%3A%2F%2Fx%2Fr%2FABC123&text="));
        assert!(url.contains("Use%20meu%20c%C3%B3digo%3A%20ABC123"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_whatsapp_message() {
        let message = ShareChannel::Whatsapp.message(&sample_stats());

        assert!(message.contains("Use meu código de indicação: ABC123"));
        assert!(message.ends_with("Cadastre-se aqui: https://x/r/ABC123"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copied_flag_clears_after_window() {
        let (mut vm, clipboard, _) = view_model(Some(sample_stats()));
        vm.load().await;

        assert!(vm.copy_code().unwrap());
        assert!(vm.is_copied());
        assert_eq!(clipboard.entries(), vec!["ABC123".to_string()]);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert!(!vm.is_copied());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_copy_restarts_window() {
        let (mut vm, clipboard, _) = view_model(Some(sample_stats()));
        vm.load().await;

        vm.copy_code().unwrap();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        vm.copy_link().unwrap();

        // The first window would have ended here.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(vm.is_copied());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!vm.is_copied());
        assert_eq!(
            clipboard.entries(),
            vec!["ABC123".to_string(), "https://x/r/ABC123".to_string()]
        );
    }

    #[tokio::test]
    async fn test_load_runs_once() {
        let (mut vm, _, _) = view_model(Some(sample_stats()));

        vm.load().await;
        vm.load().await;

        assert_eq!(vm.source.calls(), 1);
        assert_eq!(vm.referral_link(), "https://x/r/ABC123");
    }

    #[tokio::test]
    async fn test_failed_load_is_not_retried() {
        let (mut vm, _, _) = view_model(None);

        vm.load().await;
        vm.load().await;

        assert_eq!(vm.source.calls(), 1);
        assert!(matches!(vm.state(), LoadState::Failed));
    }

    #[test]
    fn test_copy_outside_runtime_is_refused() {
        let (mut vm, clipboard, _) = view_model(None);
        vm.state = LoadState::Loaded(sample_stats());

        assert!(matches!(vm.copy_code(), Err(ServiceError::Platform(_))));
        assert!(!vm.is_copied());
        assert!(clipboard.entries().is_empty());
    }
}
