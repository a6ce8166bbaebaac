pub mod auth;
pub mod blog;
pub mod developments;
pub mod properties;
pub mod testimonials;
pub mod users;

use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
    Collection,
};
use serde::de::DeserializeOwned;

use crate::errors::AppResult;
use crate::pagination::PageQuery;

/// Newest-first page of a collection plus the total match count.
pub(crate) async fn find_page<T>(
    collection: &Collection<T>,
    filter: Document,
    page: &PageQuery,
) -> AppResult<(Vec<T>, u64)>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let total = collection.count_documents(filter.clone(), None).await?;
    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .skip(page.skip())
        .limit(page.limit())
        .build();
    let cursor = collection.find(filter, options).await?;
    let items = cursor.try_collect().await?;
    Ok((items, total))
}
