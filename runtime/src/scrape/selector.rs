// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Indicator selection: load the target page, pick the indicator in the
//! page's own dropdown, and press "show results" with a real click.
//!
//! The option is chosen the way the native dropdown chooses it (the
//! `<option>` element is selected and the control sees input and change),
//! and "show results" gets CDP mouse input. Writing `.value` on the control
//! and dispatching a synthetic click instead leaves the chart on the
//! previous indicator.

use super::{bounded, ACTION_TIMEOUT};
use crate::renderer::PageSession;
use sa_series::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Navigation deadline for the target page.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// How long the selection control may take to appear after load.
pub const CONTROL_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between existence checks for the selection control.
pub const CONTROL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// CSS selectors for the page's form controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLayout {
    /// The indicator `<select>`.
    pub select: String,
    /// Candidate selectors for the "show results" control, tried in order.
    /// Older page variants render it differently.
    pub show_actions: Vec<String>,
}

impl Default for ControlLayout {
    fn default() -> Self {
        Self {
            select: "#indicator".to_string(),
            show_actions: vec![
                "#btnShow".to_string(),
                "#showResults".to_string(),
                "input[type='submit'][value*='Show']".to_string(),
                "button[type='submit']".to_string(),
            ],
        }
    }
}

/// Drives the page to a chosen indicator.
#[derive(Debug, Clone)]
pub struct IndicatorSelector {
    target_url: String,
    layout: ControlLayout,
    navigation_timeout: Duration,
    control_timeout: Duration,
    action_timeout: Duration,
    poll_interval: Duration,
}

impl IndicatorSelector {
    pub fn new(target_url: impl Into<String>, layout: ControlLayout) -> Self {
        Self {
            target_url: target_url.into(),
            layout,
            navigation_timeout: NAVIGATION_TIMEOUT,
            control_timeout: CONTROL_TIMEOUT,
            action_timeout: ACTION_TIMEOUT,
            poll_interval: CONTROL_POLL_INTERVAL,
        }
    }

    pub fn with_deadlines(mut self, navigation: Duration, control: Duration) -> Self {
        self.navigation_timeout = navigation;
        self.control_timeout = control;
        self
    }

    /// Deadline for choosing the option and for each click attempt.
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Navigate, wait for the control, choose `code`, then click "show".
    pub async fn select(&self, session: &mut dyn PageSession, code: &str) -> Result<()> {
        self.navigate(session).await?;
        self.wait_for_control(session).await?;

        let chosen = bounded(
            self.action_timeout,
            "choosing the indicator option",
            session.choose_option(&self.layout.select, code),
        )
        .await?;
        if !chosen {
            return Err(ScrapeError::OptionNotFound {
                code: code.to_string(),
            });
        }
        debug!(indicator = code, "indicator option chosen");

        for selector in &self.layout.show_actions {
            let clicked = bounded(
                self.action_timeout,
                "show-results click",
                session.click(selector),
            )
            .await?;
            if clicked {
                info!(indicator = code, action = %selector, "show-results clicked");
                return Ok(());
            }
        }
        Err(ScrapeError::ActionControlNotFound {
            selectors: self.layout.show_actions.join(", "),
        })
    }

    async fn navigate(&self, session: &mut dyn PageSession) -> Result<()> {
        match tokio::time::timeout(self.navigation_timeout, session.navigate(&self.target_url))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::NavigationTimeout {
                url: self.target_url.clone(),
                timeout_ms: self.navigation_timeout.as_millis() as u64,
            }),
        }
    }

    /// Poll for the selection control. A check that errors (the document
    /// may still be replacing itself) counts as not present yet; a check
    /// that stalls is cut off by the deadline.
    async fn wait_for_control(&self, session: &dyn PageSession) -> Result<()> {
        let poll = async {
            loop {
                match session.element_exists(&self.layout.select).await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(e) => {
                        debug!(selector = %self.layout.select, error = %e, "control check failed")
                    }
                }
                sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(self.control_timeout, poll)
            .await
            .map_err(|_| ScrapeError::ControlNotFound {
                selector: self.layout.select.clone(),
                timeout_ms: self.control_timeout.as_millis() as u64,
            })
    }
}
