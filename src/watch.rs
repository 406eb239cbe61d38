//! Periodic detection on the attached tab.

use std::sync::Arc;

use glidepath_cdp::{CdpSliderPage, Locator, PageSession};
use glidepath_config::{RuleKind, SliderRule, WatchConfig};
use glidepath_core::SliderTarget;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::solver::{PuzzleCapture, Solver};

pub(crate) struct Watcher {
    session: Arc<PageSession>,
    page: CdpSliderPage,
    solver: Solver,
    rules: Vec<SliderRule>,
    watch: WatchConfig,
}

impl Watcher {
    pub fn new(
        session: Arc<PageSession>,
        page: CdpSliderPage,
        solver: Solver,
        rules: Vec<SliderRule>,
        watch: WatchConfig,
    ) -> Self {
        Self {
            session,
            page,
            solver,
            rules,
            watch,
        }
    }

    /// Scan every `interval_ms` until Ctrl-C.
    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            rules = self.rules.len(),
            interval_ms = self.watch.interval_ms,
            "Watching {}",
            self.session.target_id()
        );

        let mut interval = tokio::time::interval(self.watch.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl-C, stopping");
                    return Ok(());
                }
            }

            if let Err(e) = self.scan().await {
                warn!("Scan failed: {:#}", e);
            }
        }
    }

    async fn scan(&self) -> anyhow::Result<()> {
        if self.solver.is_busy() {
            trace!("Slide lock held, skipping scan");
            return Ok(());
        }
        self.solver.purge_expired();

        let url = self.session.url().await?;
        let host = url.host_str().unwrap_or_default();
        let rules: Vec<&SliderRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches_host(host))
            .collect();
        if rules.is_empty() {
            return Ok(());
        }

        let result = self.scan_rules(&rules, url.as_str()).await;
        if let Err(e) = self.session.release_handles().await {
            debug!("Failed to release element handles: {}", e);
        }
        result
    }

    /// Try rules in order; stop after the first one that dragged.
    async fn scan_rules(&self, rules: &[&SliderRule], page_url: &str) -> anyhow::Result<()> {
        let locator = Locator::new(&self.session);

        for rule in rules {
            let report = match rule.kind {
                RuleKind::Puzzle => {
                    let (Some(big), Some(small)) =
                        (rule.big_image.as_deref(), rule.small_image.as_deref())
                    else {
                        continue;
                    };
                    let Some(found) = locator.find_puzzle(big, small, &rule.move_item).await?
                    else {
                        continue;
                    };
                    debug!(rule = %rule.name, "Puzzle slider visible");

                    let capture = PuzzleCapture {
                        big_image: self.page.capture_image(&found.big_image).await?,
                        small_image: self.page.capture_image(&found.small_image).await?,
                        big_width: self.page.width(&found.big_image).await? as u32,
                        small_width: self.page.width(&found.small_image).await? as u32,
                        target: SliderTarget::puzzle(
                            found.big_image,
                            found.small_image,
                            found.handle,
                        ),
                    };
                    self.solver.solve_puzzle(&self.page, page_url, capture).await?
                }
                RuleKind::Behavior => {
                    let Some(slider) = locator.find_behavior(&rule.move_item).await? else {
                        continue;
                    };
                    debug!(rule = %rule.name, left = slider.left, "Behaviour slider visible");
                    self.solver.solve_behavior(&self.page, page_url, slider).await?
                }
            };

            if let Some(report) = report {
                info!(rule = %rule.name, outcome = ?report.outcome, "Captcha handled");
                break;
            }
        }
        Ok(())
    }
}
