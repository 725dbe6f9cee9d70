//! Loads every subscription of the signed-in account.
//!
//! Pages are requested strictly one after another until the API stops
//! returning a continuation token. Items are normalized, de-duplicated by
//! subscription id and sorted by name. Any failure discards the whole batch.

use std::collections::HashSet;

use icu_collator::{Collator, CollatorOptions, Strength};
use shared::{
    domain::{ChannelId, Subscription, SubscriptionId},
    error::ClientError,
    protocol::SubscriptionItem,
};
use tracing::{debug, info, warn};

use crate::{images::ImageOptions, AccessToken, SubscriptionsApi};

pub const PAGE_SIZE: u32 = 50;

pub async fn fetch_subscriptions<A>(
    api: &A,
    token: &AccessToken,
    images: &ImageOptions,
) -> Result<Vec<Subscription>, ClientError>
where
    A: SubscriptionsApi + ?Sized,
{
    let items = fetch_all_items(api, token).await?;
    let fetched = items.len();

    let mut seen = HashSet::with_capacity(fetched);
    let mut subscriptions: Vec<Subscription> = items
        .iter()
        .map(|item| normalize_item(item, images))
        .filter(|subscription| seen.insert(subscription.id.clone()))
        .collect();
    sort_subscriptions(&mut subscriptions);

    info!(
        fetched,
        kept = subscriptions.len(),
        "loaded subscriptions"
    );
    Ok(subscriptions)
}

/// Follows continuation tokens until the last page. There is no page cap.
pub async fn fetch_all_items<A>(
    api: &A,
    token: &AccessToken,
) -> Result<Vec<SubscriptionItem>, ClientError>
where
    A: SubscriptionsApi + ?Sized,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    let mut page_number = 0usize;

    loop {
        let page = api.list_page(token, page_token.as_deref()).await?;
        page_number += 1;

        let next = page.continuation().map(str::to_string);
        debug!(
            page = page_number,
            items = page.items.len(),
            has_next = next.is_some(),
            total_results = ?page.page_info.as_ref().and_then(|info| info.total_results),
            "fetched subscriptions page"
        );
        items.extend(page.items);

        match next {
            Some(next_token) => page_token = Some(next_token),
            None => break,
        }
    }

    Ok(items)
}

pub fn normalize_item(item: &SubscriptionItem, images: &ImageOptions) -> Subscription {
    let snippet = &item.snippet;
    let description = Some(snippet.description.as_str())
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string);

    Subscription {
        id: SubscriptionId(item.id.clone()),
        channel_id: ChannelId(snippet.resource_id.channel_id.clone()),
        name: snippet.title.clone(),
        image_url: images.resolve(&snippet.thumbnails, &snippet.title),
        description,
    }
}

/// Collated ascending order by name. Secondary strength ignores case but
/// not accents. Names that collate equal keep fetch order.
pub fn sort_subscriptions(subscriptions: &mut [Subscription]) {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);

    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => {
            subscriptions.sort_by(|a, b| collator.compare(&a.name, &b.name));
        }
        Err(error) => {
            warn!(?error, "name collator unavailable, sorting by lowercase name");
            subscriptions.sort_by_cached_key(|subscription| subscription.name.to_lowercase());
        }
    }
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
