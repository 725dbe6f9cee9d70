use std::str::FromStr;

use client_core::{
    fetch_subscriptions, AccessToken, ImageOptions, SubscriptionsApi, SwipeOutcome, SwipeSession,
};
use shared::domain::SwipeDirection;

pub const HELP: &str = "Commands: [k]eep, [r]emove, [s]how, reload, [h]elp, [q]uit";
const DESCRIPTION_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Swipe(SwipeDirection),
    Show,
    Reload,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "k" | "keep" | "right" => Ok(Self::Swipe(SwipeDirection::Keep)),
            "r" | "remove" | "left" => Ok(Self::Swipe(SwipeDirection::Remove)),
            "s" | "show" => Ok(Self::Show),
            "reload" => Ok(Self::Reload),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}'. {HELP}")),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Print(String),
    Quit,
}

pub struct App<A> {
    api: A,
    token: AccessToken,
    images: ImageOptions,
    session: SwipeSession,
    loaded: bool,
}

impl<A: SubscriptionsApi> App<A> {
    pub fn new(api: A, token: AccessToken, images: ImageOptions) -> Self {
        Self {
            api,
            token,
            images,
            session: SwipeSession::new(),
            loaded: false,
        }
    }

    pub fn session(&self) -> &SwipeSession {
        &self.session
    }

    /// Runs a full fetch from scratch. A failure leaves no list behind.
    pub async fn reload(&mut self) -> String {
        match fetch_subscriptions(&self.api, &self.token, &self.images).await {
            Ok(subscriptions) => {
                self.session.load(subscriptions);
                self.loaded = true;
                self.render_current()
            }
            Err(err) => {
                self.session = SwipeSession::new();
                self.loaded = false;
                format!("Failed to load subscriptions. Please try again. ({err})\nType `reload` to retry.")
            }
        }
    }

    pub async fn handle(&mut self, command: Command) -> Step {
        let text = match command {
            Command::Quit => return Step::Quit,
            Command::Help => HELP.to_string(),
            Command::Reload => self.reload().await,
            Command::Show => self.render_current(),
            Command::Swipe(_) if !self.loaded => {
                "Subscriptions are not loaded. Type `reload` to try again.".to_string()
            }
            Command::Swipe(direction) => self.swipe(direction).await,
        };
        Step::Print(text)
    }

    async fn swipe(&mut self, direction: SwipeDirection) -> String {
        match self.session.swipe(&self.api, &self.token, direction).await {
            Ok(SwipeOutcome::Removed(subscription)) => {
                format!("Unsubscribed from {}.\n{}", subscription.name, self.render_current())
            }
            Ok(SwipeOutcome::Dropped) => {
                "Still removing the previous channel, try again in a moment.".to_string()
            }
            Ok(SwipeOutcome::Kept { .. } | SwipeOutcome::Empty) => self.render_current(),
            Err(err) => format!(
                "Failed to unsubscribe. Please try again. ({err})\n{}",
                self.render_current()
            ),
        }
    }

    pub fn render_current(&self) -> String {
        let (Some(subscription), Some((number, total))) =
            (self.session.current(), self.session.position())
        else {
            return "No subscriptions found. You don't have any YouTube subscriptions to manage."
                .to_string();
        };

        let mut card = format!(
            "[{number} of {total}] {}\n  {}\n  image: {}",
            subscription.name,
            subscription.channel_url(),
            subscription.image_url
        );
        if let Some(description) = &subscription.description {
            for line in description.lines().filter(|l| !l.trim().is_empty()).take(DESCRIPTION_LINES) {
                card.push_str("\n  ");
                card.push_str(line.trim());
            }
        }
        card
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
