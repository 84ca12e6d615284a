//! Forum accessors.

use std::sync::Arc;

use tracing::instrument;

use super::{into_store_error, many, one, RequestContext};
use crate::adapters::cache::GetOptions;
use crate::domain::errors::{CacheResult, LazyError};
use crate::domain::models::{ForumCategory, ForumComment, ForumThread, ForumTopic, PrivateTopic};
use crate::domain::ports::Querier;

impl<Q: Querier> RequestContext<Q> {
    pub async fn forum_categories(&self) -> CacheResult<Arc<Vec<ForumCategory>>> {
        let registry = self.registry("forum_categories")?;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .forum_categories
            .load(|| async move { many(querier.forum_categories(viewer).await) })
            .await
            .map_err(LazyError::Fetch)
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn forum_thread_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<ForumThread>>>,
    ) -> CacheResult<Option<Arc<ForumThread>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("forum_thread_rows")?
            .forum_thread_rows
            .get(id, |id| async move { one(querier.thread_by_id(viewer, id).await) }, opts)
            .await
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn forum_topic_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<ForumTopic>>>,
    ) -> CacheResult<Option<Arc<ForumTopic>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("forum_topics")?
            .forum_topics
            .get(id, |id| async move { one(querier.topic_by_id(viewer, id).await) }, opts)
            .await
    }

    /// Topics of one forum category.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn forum_topics_in_category(
        &self,
        category_id: i32,
        opts: GetOptions<i32, Arc<Vec<ForumTopic>>>,
    ) -> CacheResult<Arc<Vec<ForumTopic>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("forum_topic_lists")?
            .forum_topic_lists
            .get(
                category_id,
                |id| async move { many(querier.topics_by_category(viewer, id).await) },
                opts,
            )
            .await
    }

    /// Threads of one topic, most recently active first.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn forum_threads_in_topic(
        &self,
        topic_id: i32,
        opts: GetOptions<i32, Arc<Vec<ForumThread>>>,
    ) -> CacheResult<Arc<Vec<ForumThread>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("forum_threads")?
            .forum_threads
            .get(
                topic_id,
                |id| async move { many(querier.threads_by_topic(viewer, id).await) },
                opts,
            )
            .await
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn comment_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<ForumComment>>>,
    ) -> CacheResult<Option<Arc<ForumComment>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("forum_comments")?
            .forum_comments
            .get(id, |id| async move { one(querier.comment_by_id(viewer, id).await) }, opts)
            .await
    }

    /// Comments of one thread, oldest first.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn thread_comments(
        &self,
        thread_id: i32,
        opts: GetOptions<i32, Arc<Vec<ForumComment>>>,
    ) -> CacheResult<Arc<Vec<ForumComment>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("thread_comments")?
            .thread_comments
            .get(
                thread_id,
                |id| async move { many(querier.comments_by_thread(viewer, id).await) },
                opts,
            )
            .await
    }

    /// The thread selected by the request, `None` when none is selected.
    pub async fn current_thread(
        &self,
        opts: GetOptions<i32, Option<Arc<ForumThread>>>,
    ) -> CacheResult<Option<Arc<ForumThread>>> {
        match self.selection.thread_id {
            Some(id) => self.forum_thread_by_id(id, opts).await,
            None => Ok(None),
        }
    }

    /// The selected thread if this request already loaded it.
    pub fn current_thread_loaded(&self) -> Option<Arc<ForumThread>> {
        let id = self.selection.thread_id?;
        self.registry.as_ref()?.forum_thread_rows.peek(&id)?.ok().flatten()
    }

    pub async fn current_topic(
        &self,
        opts: GetOptions<i32, Option<Arc<ForumTopic>>>,
    ) -> CacheResult<Option<Arc<ForumTopic>>> {
        match self.selection.topic_id {
            Some(id) => self.forum_topic_by_id(id, opts).await,
            None => Ok(None),
        }
    }

    pub fn current_topic_loaded(&self) -> Option<Arc<ForumTopic>> {
        let id = self.selection.topic_id?;
        self.registry.as_ref()?.forum_topics.peek(&id)?.ok().flatten()
    }

    pub async fn current_comment(
        &self,
        opts: GetOptions<i32, Option<Arc<ForumComment>>>,
    ) -> CacheResult<Option<Arc<ForumComment>>> {
        match self.selection.comment_id {
            Some(id) => self.comment_by_id(id, opts).await,
            None => Ok(None),
        }
    }

    /// Private conversations the viewer takes part in, titled for them.
    /// Anonymous viewers have none.
    pub async fn private_forum_topics(&self) -> CacheResult<Arc<Vec<PrivateTopic>>> {
        let registry = self.registry("private_forum_topics")?;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .private_forum_topics
            .load(|| async move {
                if viewer == 0 {
                    return Ok(Arc::new(Vec::new()));
                }
                let topics = querier.private_topics_by_user(viewer).await?;
                let mut private = Vec::with_capacity(topics.len());
                for topic in topics {
                    let participants = querier.private_topic_participants(viewer, topic.id).await?;
                    private.push(PrivateTopic::new(topic, &participants, viewer));
                }
                Ok(Arc::new(private))
            })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Whether the viewer may reply in the selected thread: signed in, and
    /// the thread exists and is not locked.
    pub async fn selected_thread_can_reply(&self) -> CacheResult<bool> {
        let registry = self.registry("selected_thread_can_reply")?;
        registry
            .selected_thread_can_reply
            .load(|| async {
                if !self.is_signed_in() {
                    return Ok(false);
                }
                let thread = self
                    .current_thread(GetOptions::new())
                    .await
                    .map_err(into_store_error)?;
                Ok(thread.is_some_and(|t| !t.locked))
            })
            .await
            .map_err(LazyError::Fetch)
    }
}
