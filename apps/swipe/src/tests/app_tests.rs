use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use shared::{
    domain::SubscriptionId,
    error::ClientError,
    protocol::{
        ResourceId, SubscriptionItem, SubscriptionListResponse, SubscriptionSnippet, Thumbnails,
    },
};

use super::*;

#[derive(Default)]
struct FakeApi {
    list_results: Mutex<VecDeque<Result<SubscriptionListResponse, ClientError>>>,
    delete_results: Mutex<VecDeque<Result<(), ClientError>>>,
}

#[async_trait]
impl SubscriptionsApi for FakeApi {
    async fn list_page(
        &self,
        _token: &AccessToken,
        _page_token: Option<&str>,
    ) -> Result<SubscriptionListResponse, ClientError> {
        self.list_results
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Ok(SubscriptionListResponse::default()))
    }

    async fn delete_subscription(
        &self,
        _token: &AccessToken,
        _id: &SubscriptionId,
    ) -> Result<(), ClientError> {
        self.delete_results
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

fn page(titles: &[(&str, &str)]) -> SubscriptionListResponse {
    SubscriptionListResponse {
        items: titles
            .iter()
            .map(|(title, description)| SubscriptionItem {
                id: format!("sub-{}", title.to_lowercase()),
                snippet: SubscriptionSnippet {
                    title: title.to_string(),
                    description: description.to_string(),
                    resource_id: ResourceId {
                        channel_id: format!("UC{title}"),
                    },
                    thumbnails: Thumbnails::default(),
                },
            })
            .collect(),
        next_page_token: None,
        page_info: None,
    }
}

fn app_with(api: FakeApi) -> App<FakeApi> {
    App::new(
        api,
        AccessToken::new("ya29.token").expect("token"),
        ImageOptions::default(),
    )
}

#[test]
fn parses_commands_case_insensitively() {
    assert_eq!("K".parse::<Command>(), Ok(Command::Swipe(SwipeDirection::Keep)));
    assert_eq!(" remove ".parse::<Command>(), Ok(Command::Swipe(SwipeDirection::Remove)));
    assert_eq!("left".parse::<Command>(), Ok(Command::Swipe(SwipeDirection::Remove)));
    assert_eq!("reload".parse::<Command>(), Ok(Command::Reload));
    assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    assert!("dance".parse::<Command>().is_err());
}

#[tokio::test]
async fn failed_load_offers_reload_and_blocks_swipes() {
    let api = FakeApi::default();
    api.list_results
        .lock()
        .expect("lock")
        .extend([
            Err(ClientError::Network("offline".into())),
            Ok(page(&[("Zeta", ""), ("Alpha", "")])),
        ]);
    let mut app = app_with(api);

    let message = app.reload().await;
    assert!(message.starts_with("Failed to load subscriptions."), "{message}");
    assert_eq!(
        app.handle(Command::Swipe(SwipeDirection::Keep)).await,
        Step::Print("Subscriptions are not loaded. Type `reload` to try again.".into())
    );

    let Step::Print(card) = app.handle(Command::Reload).await else {
        panic!("expected output");
    };
    assert!(card.starts_with("[1 of 2] Alpha"), "{card}");
}

#[tokio::test]
async fn keep_remove_and_failed_remove_render_progress() {
    let api = FakeApi::default();
    api.list_results
        .lock()
        .expect("lock")
        .push_back(Ok(page(&[("Zeta", ""), ("Alpha", ""), ("Mid", "")])));
    api.delete_results
        .lock()
        .expect("lock")
        .extend([Ok(()), Err(ClientError::remote(403, "insufficientPermissions"))]);
    let mut app = app_with(api);
    app.reload().await;

    let Step::Print(text) = app.handle(Command::Swipe(SwipeDirection::Remove)).await else {
        panic!("expected output");
    };
    assert!(text.starts_with("Unsubscribed from Alpha.\n[1 of 2] Mid"), "{text}");

    let Step::Print(text) = app.handle(Command::Swipe(SwipeDirection::Remove)).await else {
        panic!("expected output");
    };
    assert!(
        text.starts_with(
            "Failed to unsubscribe. Please try again. (YouTube API error: insufficientPermissions)\n[1 of 2] Mid"
        ),
        "{text}"
    );

    let Step::Print(text) = app.handle(Command::Swipe(SwipeDirection::Keep)).await else {
        panic!("expected output");
    };
    assert!(text.starts_with("[2 of 2] Zeta"), "{text}");
    assert_eq!(app.session().len(), 2);
}

#[tokio::test]
async fn card_shows_first_description_lines() {
    let api = FakeApi::default();
    api.list_results
        .lock()
        .expect("lock")
        .push_back(Ok(page(&[("Alpha", "Line one\n\nLine two\nLine three")])));
    let mut app = app_with(api);

    let card = app.reload().await;

    assert!(card.ends_with("\n  Line one\n  Line two"), "{card}");
    assert!(card.contains("https://www.youtube.com/channel/UCAlpha"));
    assert!(card.contains("image: https://ui-avatars.com/api/?name=Alpha"));
}

#[tokio::test]
async fn empty_account_reports_no_subscriptions() {
    let mut app = app_with(FakeApi::default());
    let message = app.reload().await;
    assert!(message.starts_with("No subscriptions found."));
    assert_eq!(app.handle(Command::Quit).await, Step::Quit);
}
